use std::sync::Arc;

use auth::JwtHandler;
use auth::PasswordHasher;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use user_service::config::Config;
use user_service::domain::user::ports::UserRepository;
use user_service::domain::user::service::UserService;
use user_service::inbound::http::router::create_router;
use user_service::inbound::http::router::AppState;
use user_service::outbound::repositories::InMemoryUserRepository;
use user_service::outbound::repositories::PostgresUserRepository;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_service=debug,auth=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "user-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    // Bad key material or hashing parameters must stop startup.
    let jwt_handler = Arc::new(JwtHandler::from_config(&config.auth.token)?);
    let password_hasher = PasswordHasher::from_config(&config.auth.hashing)?;

    tracing::info!(
        http_port = config.server.http_port,
        algorithm = ?jwt_handler.algorithm(),
        expire_minutes = config.auth.token.expire_minutes,
        persistent = config.database.is_some(),
        "Configuration loaded"
    );

    match &config.database {
        Some(database) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(database.max_connections)
                .connect(&database.url)
                .await?;
            tracing::info!(
                max_connections = database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            let repository = PostgresUserRepository::new(pg_pool);
            serve(&config, repository, password_hasher, jwt_handler).await
        }
        None => {
            tracing::warn!("No database configured, accounts are kept in memory");
            let repository = InMemoryUserRepository::new();
            serve(&config, repository, password_hasher, jwt_handler).await
        }
    }
}

async fn serve<UR: UserRepository>(
    config: &Config,
    repository: UR,
    password_hasher: PasswordHasher,
    jwt_handler: Arc<JwtHandler>,
) -> Result<(), anyhow::Error> {
    let user_service = Arc::new(UserService::new(Arc::new(repository), password_hasher));
    let state = AppState::new(user_service, jwt_handler);

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(state, &config.server.cors_origins);
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited successfully");
    Ok(())
}
