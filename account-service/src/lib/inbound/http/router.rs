use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::header::AUTHORIZATION;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderName;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::Request;
use axum::http::Response;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::cookies::CookieSettings;
use super::errors::ApiError;
use super::errors::ErrorCode;
use super::handlers::current_account::current_account;
use super::handlers::login::login;
use super::handlers::login::CLIENT_TYPE_HEADER;
use super::handlers::logout::logout;
use super::handlers::password_reset::request_password_reset;
use super::handlers::password_reset::reset_password;
use super::handlers::resend_verification::resend_verification_email;
use super::handlers::signup::signup;
use super::handlers::verify_email::verify_email;
use super::middleware::authenticate as auth_middleware;
use crate::account::ports::AuthServicePort;

pub struct AppState<S: AuthServicePort> {
    pub auth_service: Arc<S>,
    pub authenticator: Arc<Authenticator>,
    pub cookies: CookieSettings,
}

impl<S: AuthServicePort> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            auth_service: Arc::clone(&self.auth_service),
            authenticator: Arc::clone(&self.authenticator),
            cookies: self.cookies,
        }
    }
}

pub fn create_router<S: AuthServicePort>(
    auth_service: Arc<S>,
    authenticator: Arc<Authenticator>,
    cookies: CookieSettings,
    frontend_origin: &str,
) -> Router {
    let state = AppState {
        auth_service,
        authenticator,
        cookies,
    };

    let auth_routes = Router::new()
        .route("/signup", post(signup::<S>))
        .route("/login", post(login::<S>))
        .route("/logout", post(logout::<S>))
        .route("/verify-email", post(verify_email::<S>))
        .route("/verify-email/resend", post(resend_verification_email::<S>))
        .route("/password/reset-request", post(request_password_reset::<S>))
        .route("/password/reset", post(reset_password::<S>));

    let user_routes = Router::new().route("/me", get(current_account::<S>));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/users", user_routes)
        .fallback(not_found)
        .layer(middleware::map_response(method_not_allowed))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<S>,
        ))
        .layer(trace_layer)
        .layer(cors_layer(frontend_origin))
        .with_state(state)
}

fn cors_layer(frontend_origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static(CLIENT_TYPE_HEADER),
        ])
        .allow_credentials(true);

    match HeaderValue::from_str(frontend_origin.trim_end_matches('/')) {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::warn!(origin = %frontend_origin, error = %e, "Invalid frontend origin, CORS disabled");
            layer
        }
    }
}

async fn not_found() -> ApiError {
    ApiError::Code(ErrorCode::NotFound)
}

/// Give the router's bare 405 responses the error envelope.
async fn method_not_allowed(response: Response<Body>) -> Response<Body> {
    if response.status() == StatusCode::METHOD_NOT_ALLOWED {
        ApiError::Code(ErrorCode::MethodNotAllowed).into_response()
    } else {
        response
    }
}
