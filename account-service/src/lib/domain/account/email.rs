use std::collections::HashMap;

use crate::account::verification::TokenValue;

/// Template shared by every account email (title, greeting, body copy and a call-to-action link).
pub const ACTION_TEMPLATE: &str = "mail/verify";

/// Everything the email collaborator needs to render and send one message.
pub trait EmailContext {
    fn template_name(&self) -> &str;
    fn subject(&self) -> &str;
    fn variables(&self) -> HashMap<String, String>;
}

/// Email asking a new account to confirm its address.
#[derive(Debug, Clone)]
pub struct VerifyEmailContext<'a> {
    pub name: &'a str,
    pub token: &'a TokenValue,
    pub base_url: &'a str,
}

impl EmailContext for VerifyEmailContext<'_> {
    fn template_name(&self) -> &str {
        ACTION_TEMPLATE
    }

    fn subject(&self) -> &str {
        "Please verify your email address"
    }

    fn variables(&self) -> HashMap<String, String> {
        action_variables(
            self.name,
            "Email verification",
            "Welcome aboard!<br>\nClick the button below to verify your email address and get started.",
            format!(
                "{}/auth/verify-email?token={}",
                self.base_url.trim_end_matches('/'),
                self.token
            ),
        )
    }
}

/// Email carrying a password reset link.
#[derive(Debug, Clone)]
pub struct PasswordResetEmailContext<'a> {
    pub name: &'a str,
    pub token: &'a TokenValue,
    pub base_url: &'a str,
}

impl EmailContext for PasswordResetEmailContext<'_> {
    fn template_name(&self) -> &str {
        ACTION_TEMPLATE
    }

    fn subject(&self) -> &str {
        "Reset your password"
    }

    fn variables(&self) -> HashMap<String, String> {
        action_variables(
            self.name,
            "Password reset",
            "Click the button below to choose a new password.<br>\nIf you did not request this, you can ignore this email.",
            format!(
                "{}/auth/password/reset?token={}",
                self.base_url.trim_end_matches('/'),
                self.token
            ),
        )
    }
}

fn action_variables(name: &str, title: &str, content: &str, link: String) -> HashMap<String, String> {
    HashMap::from([
        ("name".to_string(), name.to_string()),
        ("title".to_string(), title.to_string()),
        ("content".to_string(), content.to_string()),
        ("link".to_string(), link),
    ])
}
