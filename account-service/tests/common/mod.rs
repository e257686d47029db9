use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use account_service::account::errors::EmailSendError;
use account_service::account::models::AccountStatus;
use account_service::account::ports::EmailSender;
use account_service::account::service::AuthService;
use account_service::inbound::http::cookies::CookieSettings;
use account_service::inbound::http::router::create_router;
use account_service::outbound::repositories::InMemoryStore;
use async_trait::async_trait;
use auth::Authenticator;
use auth::TokenCodec;
use chrono::Duration;
use serde_json::json;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const FRONTEND_URL: &str = "http://localhost:3000";
pub const PASSWORD: &str = "Secret1!";

/// One email handed to the sender.
#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub template_name: String,
    pub subject: String,
    pub variables: HashMap<String, String>,
}

impl SentEmail {
    /// Token carried by the call-to-action link.
    pub fn token(&self) -> String {
        self.variables["link"]
            .split_once("token=")
            .map(|(_, token)| token.to_string())
            .expect("Link without token")
    }
}

/// Email sender that keeps every message in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingEmailSender {
    sent: Arc<Mutex<Vec<SentEmail>>>,
}

impl RecordingEmailSender {
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, to: &str) -> Vec<SentEmail> {
        self.sent().into_iter().filter(|e| e.to == to).collect()
    }

    pub fn last_to(&self, to: &str) -> SentEmail {
        self.sent_to(to).pop().expect("No email sent to recipient")
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(
        &self,
        to: &str,
        template_name: &str,
        subject: &str,
        variables: &HashMap<String, String>,
    ) -> Result<(), EmailSendError> {
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            template_name: template_name.to_string(),
            subject: subject.to_string(),
            variables: variables.clone(),
        });
        Ok(())
    }
}

/// Test application that spawns a real server over the in-memory store
pub struct TestApp {
    pub address: String,
    pub store: InMemoryStore,
    pub emails: RecordingEmailSender,
    pub api_client: reqwest::Client,
    pub token_codec: TokenCodec,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let store = InMemoryStore::new();
        let emails = RecordingEmailSender::default();
        let authenticator = Arc::new(Authenticator::new(codec()));

        let auth_service = Arc::new(AuthService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(emails.clone()),
            Arc::clone(&authenticator),
            FRONTEND_URL,
        ));

        let router = create_router(
            auth_service,
            authenticator,
            CookieSettings { secure: false },
            FRONTEND_URL,
        );

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            store,
            emails,
            api_client: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .expect("Failed to create reqwest client"),
            token_codec: codec(),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    pub async fn signup(&self, name: &str, email: &str) -> reqwest::Response {
        self.post("/api/v1/auth/signup")
            .json(&json!({
                "name": name,
                "email": email,
                "password": PASSWORD,
                "phoneNumber": ""
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn verify(&self, token: &str) -> reqwest::Response {
        self.post("/api/v1/auth/verify-email")
            .json(&json!({ "token": token }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, email: &str, password: &str, client_type: &str) -> reqwest::Response {
        self.post("/api/v1/auth/login")
            .header("X-Client-Type", client_type)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register and verify an account, returning a bearer token for it.
    pub async fn active_account(&self, name: &str, email: &str) -> String {
        self.signup(name, email).await;
        let token = self.emails.last_to(email).token();
        self.verify(&token).await;

        let body: serde_json::Value = self
            .login(email, PASSWORD, "mobile")
            .await
            .json()
            .await
            .expect("Failed to parse response");
        body["data"]["accessToken"]
            .as_str()
            .expect("Missing access token")
            .to_string()
    }

    pub async fn set_status(&self, email: &str, status: AccountStatus) {
        assert!(self.store.set_status(email, status).await);
    }
}

fn codec() -> TokenCodec {
    TokenCodec::new(JWT_SECRET, Duration::minutes(30)).expect("Invalid test secret")
}
