//! Authentication utilities library
//!
//! Provides the credential primitives used by the account service:
//! - Password hashing and verification (Argon2id)
//! - Signed access tokens (HS256 JWT) carrying an account's public id, email and authority
//! - An `Authenticator` coordinating both, shared by the service layer and the HTTP middleware
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("Secret1!").unwrap();
//! assert!(hasher.verify("Secret1!", &hash).unwrap());
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::TokenCodec;
//! use chrono::Duration;
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!", Duration::minutes(30)).unwrap();
//! let token = codec.issue("2f1c0e9a-5b7d-4c1e-9a3f-0d8e6b4a2c11", "alice@example.com", "ROLE_USER").unwrap();
//! let claims = codec.decode(&token).unwrap();
//! assert_eq!(claims.email, "alice@example.com");
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::Authenticator;
//! use auth::TokenCodec;
//! use chrono::Duration;
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!", Duration::minutes(30)).unwrap();
//! let auth = Authenticator::new(codec);
//!
//! // Signup: hash password
//! let hash = auth.hash_password("Secret1!").unwrap();
//!
//! // Login: verify and issue token
//! auth.verify_password("Secret1!", &hash).unwrap();
//! let token = auth.issue_token("public-id", "alice@example.com", "ROLE_USER").unwrap();
//!
//! // Per request: validate token
//! let claims = auth.validate_token(&token).unwrap();
//! assert_eq!(claims.sub, "public-id");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::TokenCodec;
pub use password::PasswordError;
pub use password::PasswordHasher;
