use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::DateTime;
use chrono::Utc;
use regex::Regex;
use regex::RegexBuilder;
use uuid::Uuid;

use crate::account::errors::DisplayNameError;
use crate::account::errors::EmailError;
use crate::account::errors::PasswordPolicyError;
use crate::account::errors::PhoneNumberError;
use crate::account::errors::PublicIdError;

/// Account aggregate entity.
///
/// `id` is the storage key and never leaves the service; `public_id` is what
/// tokens and external references carry.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub public_id: PublicId,
    pub name: DisplayName,
    pub email: EmailAddress,
    pub password_hash: String,
    pub phone_number: Option<PhoneNumber>,
    pub status: AccountStatus,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Mark the email address as verified.
    ///
    /// Only a PENDING account moves to ACTIVE; every other status is left untouched.
    pub fn activate(&mut self) {
        if self.status == AccountStatus::Pending {
            self.status = AccountStatus::Active;
            self.updated_at = Utc::now();
        }
    }

    /// Replace the stored password hash.
    pub fn change_password_hash(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.updated_at = Utc::now();
    }
}

/// Account that has not been persisted yet (no storage key assigned).
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub public_id: PublicId,
    pub name: DisplayName,
    pub email: EmailAddress,
    pub password_hash: String,
    pub phone_number: Option<PhoneNumber>,
    pub status: AccountStatus,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl NewAccount {
    /// Regular signup: PENDING until the email address is verified.
    pub fn pending(
        name: DisplayName,
        email: EmailAddress,
        password_hash: String,
        phone_number: Option<PhoneNumber>,
    ) -> Self {
        Self {
            public_id: PublicId::new(),
            name,
            email,
            password_hash,
            phone_number,
            status: AccountStatus::Pending,
            role: Role::User,
            created_at: Utc::now(),
        }
    }

    /// Bootstrap administrator, active from the start.
    pub fn admin(name: DisplayName, email: EmailAddress, password_hash: String) -> Self {
        Self {
            public_id: PublicId::new(),
            name,
            email,
            password_hash,
            phone_number: None,
            status: AccountStatus::Active,
            role: Role::Admin,
            created_at: Utc::now(),
        }
    }

    /// Attach the storage key assigned on insert.
    pub fn into_account(self, id: AccountId) -> Account {
        Account {
            id,
            public_id: self.public_id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            phone_number: self.phone_number,
            status: self.status,
            role: self.role,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Internal storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(pub i64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Externally visible account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicId(pub Uuid);

impl PublicId {
    /// Generate a new random public id (UUID v4).
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a public id from its string form.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, PublicIdError> {
        Uuid::parse_str(s)
            .map(PublicId)
            .map_err(|e| PublicIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for PublicId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PublicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle status of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountStatus {
    Pending,
    Active,
    Banned,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StatusFlags {
    enabled: bool,
    locked: bool,
}

impl AccountStatus {
    const fn flags(self) -> StatusFlags {
        match self {
            AccountStatus::Pending => StatusFlags {
                enabled: false,
                locked: false,
            },
            AccountStatus::Active => StatusFlags {
                enabled: true,
                locked: false,
            },
            AccountStatus::Banned | AccountStatus::Deleted => StatusFlags {
                enabled: false,
                locked: true,
            },
        }
    }

    pub const fn is_enabled(self) -> bool {
        self.flags().enabled
    }

    pub const fn is_locked(self) -> bool {
        self.flags().locked
    }

    pub const fn can_login(self) -> bool {
        let flags = self.flags();
        flags.enabled && !flags.locked
    }

    pub const fn can_reset_password(self) -> bool {
        !self.flags().locked
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AccountStatus::Pending => "PENDING",
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Banned => "BANNED",
            AccountStatus::Deleted => "DELETED",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(AccountStatus::Pending),
            "ACTIVE" => Ok(AccountStatus::Active),
            "BANNED" => Ok(AccountStatus::Banned),
            "DELETED" => Ok(AccountStatus::Deleted),
            other => Err(format!("unknown account status: {}", other)),
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account role, mapped 1:1 to the authority embedded in access tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn authority(self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Admin => "ROLE_ADMIN",
        }
    }

    /// Reverse of [`Role::authority`]; `None` for anything unknown.
    pub fn from_authority(authority: &str) -> Option<Self> {
        match authority {
            "ROLE_USER" => Some(Role::User),
            "ROLE_ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Display name value type
///
/// 2-100 characters, not blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    const MIN_LENGTH: usize = 2;
    const MAX_LENGTH: usize = 100;

    pub fn new(name: String) -> Result<Self, DisplayNameError> {
        if name.trim().is_empty() {
            return Err(DisplayNameError::Blank);
        }

        let length = name.chars().count();
        if length < Self::MIN_LENGTH {
            Err(DisplayNameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(DisplayNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser. Compared exactly as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Phone number in `NN(N)-NNN(N)-NNNN` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(phone_number: String) -> Result<Self, PhoneNumberError> {
        if Self::pattern().is_some_and(|re| re.is_match(&phone_number)) {
            Ok(Self(phone_number))
        } else {
            Err(PhoneNumberError::InvalidFormat(phone_number))
        }
    }

    /// Blank or missing input means "no phone number".
    pub fn optional(phone_number: Option<String>) -> Result<Option<Self>, PhoneNumberError> {
        match phone_number {
            Some(value) if !value.trim().is_empty() => Self::new(value).map(Some),
            _ => Ok(None),
        }
    }

    // ASCII digits only: `\d` would otherwise accept every Unicode decimal digit.
    fn pattern() -> Option<&'static Regex> {
        static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
        PATTERN
            .get_or_init(|| {
                RegexBuilder::new(r"^\d{2,3}-\d{3,4}-\d{4}$")
                    .unicode(false)
                    .build()
                    .ok()
            })
            .as_ref()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Plaintext password that satisfies the password policy.
///
/// At least 8 characters from `[A-Za-z0-9@$!%*#?&]`, with at least one letter,
/// one digit and one special character. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct NewPassword(String);

impl NewPassword {
    const MIN_LENGTH: usize = 8;
    const SPECIAL: &'static str = "@$!%*#?&";

    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }

        let is_special = |c: char| Self::SPECIAL.contains(c);
        if !password
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || is_special(c))
        {
            return Err(PasswordPolicyError::InvalidCharacters);
        }
        if !password.chars().any(|c| c.is_ascii_alphabetic()) {
            return Err(PasswordPolicyError::MissingLetter);
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(PasswordPolicyError::MissingDigit);
        }
        if !password.chars().any(is_special) {
            return Err(PasswordPolicyError::MissingSpecial);
        }

        Ok(Self(password))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for NewPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NewPassword(***)")
    }
}

/// Command to register a new account with domain types
#[derive(Debug)]
pub struct SignupCommand {
    pub name: DisplayName,
    pub email: EmailAddress,
    pub password: NewPassword,
    pub phone_number: Option<PhoneNumber>,
}

impl SignupCommand {
    pub fn new(
        name: DisplayName,
        email: EmailAddress,
        password: NewPassword,
        phone_number: Option<PhoneNumber>,
    ) -> Self {
        Self {
            name,
            email,
            password,
            phone_number,
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub access_token: String,
    pub name: String,
    pub email: String,
}
