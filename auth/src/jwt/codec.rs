use base64ct::Base64;
use base64ct::Encoding;
use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;

/// Signs and verifies access tokens.
///
/// Uses HS256 (HMAC with SHA-256) with a server-held symmetric key.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    validity: Duration,
}

impl TokenCodec {
    /// Minimum key length for HS256 (256 bits).
    pub const MIN_SECRET_BYTES: usize = 32;

    /// Create a codec from raw key material.
    ///
    /// # Arguments
    /// * `secret` - Signing key, at least 32 bytes
    /// * `validity` - Lifetime of every issued token
    ///
    /// # Errors
    /// * `InvalidSecret` - Key shorter than `MIN_SECRET_BYTES`
    pub fn new(secret: &[u8], validity: Duration) -> Result<Self, JwtError> {
        if secret.len() < Self::MIN_SECRET_BYTES {
            return Err(JwtError::InvalidSecret(format!(
                "key must be at least {} bytes, got {}",
                Self::MIN_SECRET_BYTES,
                secret.len()
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            validity,
        })
    }

    /// Create a codec from a base64 encoded secret (as found in configuration).
    ///
    /// # Errors
    /// * `InvalidSecret` - Not valid base64, or decoded key too short
    pub fn from_base64_secret(secret: &str, validity: Duration) -> Result<Self, JwtError> {
        let key = Base64::decode_vec(secret.trim())
            .map_err(|e| JwtError::InvalidSecret(format!("not valid base64: {}", e)))?;

        Self::new(&key, validity)
    }

    /// Lifetime applied to tokens produced by `issue`.
    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Issue a token for an account, valid from now for the configured duration.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue(&self, public_id: &str, email: &str, authority: &str) -> Result<String, JwtError> {
        let claims = Claims::for_account(public_id, email, authority, self.validity);
        self.encode(&claims)
    }

    /// Sign arbitrary claims.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(Algorithm::HS256);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify signature and expiry, returning the embedded claims.
    ///
    /// # Errors
    /// * `TokenExpired` - The `exp` claim is in the past
    /// * `InvalidToken` - Bad signature, malformed token or missing claims
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::InvalidToken(e.to_string()),
            })
    }
}
