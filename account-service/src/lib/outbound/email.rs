pub mod smtp;
pub mod template;

pub use smtp::SmtpEmailSender;
pub use template::TemplateRenderer;
