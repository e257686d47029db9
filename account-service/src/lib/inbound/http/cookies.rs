use axum::http::header::COOKIE;
use axum::http::header::InvalidHeaderValue;
use axum::http::HeaderMap;
use axum::http::HeaderValue;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Attributes shared by every `accessToken` cookie the service emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieSettings {
    pub secure: bool,
}

impl CookieSettings {
    /// `HttpOnly` cookie carrying the access token for web clients.
    pub fn access_token(
        &self,
        token: &str,
        max_age_seconds: i64,
    ) -> Result<HeaderValue, InvalidHeaderValue> {
        self.build(token, max_age_seconds)
    }

    /// Expired, empty `accessToken` cookie.
    pub fn cleared(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        self.build("", 0)
    }

    fn build(&self, value: &str, max_age_seconds: i64) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!(
            "{ACCESS_TOKEN_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_seconds}"
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }
}

/// Value of the first cookie called `name` across all `Cookie` headers.
pub fn find_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
}
