use std::sync::Arc;

use auth::HashingConfig;
use auth::JwtHandler;
use auth::PasswordHasher;
use auth::TokenConfig;
use secrecy::SecretString;
use serde_json::json;
use user_service::domain::user::service::UserService;
use user_service::inbound::http::router::create_router;
use user_service::inbound::http::router::AppState;
use user_service::outbound::repositories::InMemoryUserRepository;

pub const TEST_SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub repository: InMemoryUserRepository,
    pub api_client: reqwest::Client,
    pub jwt_handler: JwtHandler,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let token_config = TokenConfig {
            secret: SecretString::from(TEST_SECRET.to_string()),
            algorithm: "HS256".to_string(),
            expire_minutes: 30,
            issuer: None,
        };
        let jwt_handler =
            JwtHandler::from_config(&token_config).expect("Failed to build token handler");

        // Cheap parameters keep the suite fast.
        let password_hasher = PasswordHasher::from_config(&HashingConfig {
            memory_kib: 4096,
            iterations: 1,
            parallelism: 1,
        })
        .expect("Failed to build password hasher");

        let repository = InMemoryUserRepository::new();
        let user_service = Arc::new(UserService::new(
            Arc::new(repository.clone()),
            password_hasher,
        ));
        let state = AppState::new(user_service, Arc::new(jwt_handler.clone()));
        let router = create_router(state, &[]);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            repository,
            api_client: reqwest::Client::new(),
            jwt_handler,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register an account through the API
    pub async fn register(&self, username: &str, password: &str) -> reqwest::Response {
        self.post("/auth/register")
            .json(&json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Request a token with the OAuth2 password form
    pub async fn request_token(&self, username: &str, password: &str) -> reqwest::Response {
        self.post("/auth/token")
            .form(&[
                ("grant_type", "password"),
                ("username", username),
                ("password", password),
            ])
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register and log in, returning the access token
    pub async fn login(&self, username: &str, password: &str) -> String {
        self.register(username, password).await;
        let body: serde_json::Value = self
            .request_token(username, password)
            .await
            .json()
            .await
            .expect("Failed to parse response");

        body["access_token"]
            .as_str()
            .expect("access_token missing")
            .to_string()
    }
}
