use auth::Identity;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use super::handlers::ApiError;
use crate::domain::user::ports::UserRepository;
use crate::inbound::http::router::AppState;

/// Extension type to store the resolved caller in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub identity: Identity,
}

/// Middleware that admits only requests carrying a valid token for an active account
pub async fn require_active_user<UR: UserRepository>(
    State(state): State<AppState<UR>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    // A header that is not valid ASCII is treated as absent.
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let identity = state
        .session_guard
        .authorize(authorization.as_deref())
        .await
        .map_err(|denial| ApiError::from(denial).into_response())?;

    req.extensions_mut()
        .insert(AuthenticatedUser { identity });

    Ok(next.run(req).await)
}
