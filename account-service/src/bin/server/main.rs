use std::sync::Arc;

use account_service::account::models::DisplayName;
use account_service::account::models::EmailAddress;
use account_service::account::service::AuthService;
use account_service::config::Config;
use account_service::inbound::http::cookies::CookieSettings;
use account_service::inbound::http::router::create_router;
use account_service::outbound::email::SmtpEmailSender;
use account_service::outbound::repositories::PostgresAccountRepository;
use account_service::outbound::repositories::PostgresVerificationTokenRepository;
use auth::Authenticator;
use auth::TokenCodec;
use chrono::Duration;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        frontend = %config.frontend.base_url,
        smtp_host = %config.smtp.host,
        access_token_validity_seconds = config.jwt.access_token_validity_seconds,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let token_codec = TokenCodec::from_base64_secret(
        &config.jwt.secret,
        Duration::seconds(config.jwt.access_token_validity_seconds),
    )?;
    let authenticator = Arc::new(Authenticator::new(token_codec));

    let account_repository = Arc::new(PostgresAccountRepository::new(pg_pool.clone()));
    let token_repository = Arc::new(PostgresVerificationTokenRepository::new(pg_pool));
    let email_sender = Arc::new(SmtpEmailSender::new(&config.smtp)?);

    let auth_service = Arc::new(AuthService::new(
        account_repository,
        token_repository,
        email_sender,
        Arc::clone(&authenticator),
        config.frontend.base_url.clone(),
    ));

    if let Some(admin) = &config.admin {
        let created = auth_service
            .ensure_admin(
                DisplayName::new(admin.name.clone())?,
                EmailAddress::new(admin.email.clone())?,
                &admin.password,
            )
            .await?;
        if created.is_none() {
            tracing::info!(email = %admin.email, "Administrator account already present");
        }
    }

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(
        auth_service,
        authenticator,
        CookieSettings {
            secure: config.cookie.secure,
        },
        &config.frontend.base_url,
    );

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
    }

    Ok(())
}
