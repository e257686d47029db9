use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Access token payload.
///
/// `sub` is always the account's public identifier, never its storage key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (account public identifier)
    pub sub: String,

    /// Account email at issue time
    pub email: String,

    /// Authority string, e.g. `ROLE_USER`
    pub role: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Build claims issued now and valid for `validity`.
    pub fn for_account(
        public_id: impl ToString,
        email: impl Into<String>,
        authority: impl Into<String>,
        validity: Duration,
    ) -> Self {
        Self::issued_at(public_id, email, authority, Utc::now(), validity)
    }

    /// Build claims with an explicit issue instant.
    pub fn issued_at(
        public_id: impl ToString,
        email: impl Into<String>,
        authority: impl Into<String>,
        issued_at: DateTime<Utc>,
        validity: Duration,
    ) -> Self {
        let expiration = issued_at + validity;

        Self {
            sub: public_id.to_string(),
            email: email.into(),
            role: authority.into(),
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_account() {
        let claims = Claims::for_account(
            "pid-123",
            "alice@example.com",
            "ROLE_USER",
            Duration::minutes(30),
        );

        assert_eq!(claims.sub, "pid-123");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, "ROLE_USER");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn test_issued_at_uses_given_instant() {
        let issued = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let claims = Claims::issued_at("pid", "a@x.com", "ROLE_ADMIN", issued, Duration::hours(1));

        assert_eq!(claims.iat, 1_700_000_000);
        assert_eq!(claims.exp, 1_700_003_600);
    }

    #[test]
    fn test_serialized_field_names() {
        let claims = Claims::for_account("pid", "a@x.com", "ROLE_USER", Duration::minutes(1));
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["sub"], "pid");
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["role"], "ROLE_USER");
        assert!(json["iat"].is_i64());
        assert!(json["exp"].is_i64());
    }
}
