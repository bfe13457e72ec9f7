use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use auth::JwtHandler;
use auth::SessionGuard;
use axum::body::Body;
use axum::http::HeaderValue;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::AllowHeaders;
use tower_http::cors::AllowMethods;
use tower_http::cors::AllowOrigin;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::read_me::read_me;
use super::handlers::read_my_items::read_my_items;
use super::handlers::register::register;
use super::handlers::token::token;
use super::middleware::require_active_user;
use crate::domain::user::ports::UserRepository;
use crate::domain::user::service::UserService;

pub struct AppState<UR: UserRepository> {
    pub user_service: Arc<UserService<UR>>,
    pub authenticator: Arc<Authenticator<UserService<UR>>>,
    pub session_guard: Arc<SessionGuard<UserService<UR>>>,
}

// Derived Clone would require UR: Clone.
impl<UR: UserRepository> Clone for AppState<UR> {
    fn clone(&self) -> Self {
        Self {
            user_service: Arc::clone(&self.user_service),
            authenticator: Arc::clone(&self.authenticator),
            session_guard: Arc::clone(&self.session_guard),
        }
    }
}

impl<UR: UserRepository> AppState<UR> {
    /// Wire the authenticator and the session guard around one user service.
    ///
    /// The service is the credential store of both; the token handler is shared.
    pub fn new(user_service: Arc<UserService<UR>>, jwt_handler: Arc<JwtHandler>) -> Self {
        let authenticator = Authenticator::new(
            Arc::clone(&user_service),
            user_service.password_hasher().clone(),
            Arc::clone(&jwt_handler),
        );
        let session_guard = SessionGuard::new(Arc::clone(&user_service), jwt_handler);

        Self {
            user_service,
            authenticator: Arc::new(authenticator),
            session_guard: Arc::new(session_guard),
        }
    }
}

pub fn create_router<UR: UserRepository>(state: AppState<UR>, cors_origins: &[String]) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(register::<UR>))
        .route("/auth/token", post(token::<UR>));

    let protected_routes = Router::new()
        .route("/users/me", get(read_me))
        .route("/users/me/items", get(read_my_items))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_active_user::<UR>,
        ));

    // Headers are left out of the span: they carry bearer tokens.
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
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Credentialed CORS for the configured origins, or permissive when none are set.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
