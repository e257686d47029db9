use thiserror::Error;

/// Error for PublicId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PublicIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for DisplayName validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DisplayNameError {
    #[error("Name must not be blank")]
    Blank,

    #[error("Name too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for password policy violations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Password may only contain letters, digits and @$!%*#?&")]
    InvalidCharacters,

    #[error("Password must contain a letter")]
    MissingLetter,

    #[error("Password must contain a digit")]
    MissingDigit,

    #[error("Password must contain one of @$!%*#?&")]
    MissingSpecial,
}

/// Error for PhoneNumber validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PhoneNumberError {
    #[error("Invalid phone number format: {0}")]
    InvalidFormat(String),
}

/// Error for verification token string parsing
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenFormatError {
    #[error("Invalid verification token format")]
    InvalidFormat,
}

/// A rejected request field.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    Name(#[from] DisplayNameError),

    #[error("{0}")]
    Email(#[from] EmailError),

    #[error("{0}")]
    Password(#[from] PasswordPolicyError),

    #[error("{0}")]
    PhoneNumber(#[from] PhoneNumberError),

    #[error("{0}")]
    Token(#[from] TokenFormatError),
}

impl ValidationError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Name(_) => "name",
            ValidationError::Email(_) => "email",
            ValidationError::Password(_) => "password",
            ValidationError::PhoneNumber(_) => "phoneNumber",
            ValidationError::Token(_) => "token",
        }
    }
}

/// Error for outbound email delivery
#[derive(Debug, Clone, Error)]
pub enum EmailSendError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Unknown email template: {0}")]
    UnknownTemplate(String),

    #[error("Failed to build message: {0}")]
    MessageBuild(String),

    #[error("Failed to deliver message: {0}")]
    Transport(String),
}

/// Top-level error for all authentication operations
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // Request validation (automatically converted via #[from])
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    // Account errors
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Account not found: {0}")]
    UserNotFound(String),

    #[error("Invalid credentials")]
    BadCredentials,

    #[error("Email address not verified")]
    AccountDisabled,

    #[error("Account is banned or deleted")]
    AccountLocked,

    // Verification token errors
    #[error("Verification token not found")]
    TokenNotFound,

    #[error("Verification token already used")]
    TokenAlreadyUsed,

    #[error("Verification token expired")]
    TokenExpired,

    // Infrastructure errors
    #[error("Email delivery failed: {0}")]
    EmailSend(#[from] EmailSendError),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
