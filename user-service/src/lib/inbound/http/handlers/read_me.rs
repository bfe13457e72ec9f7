use auth::Identity;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedUser;

pub async fn read_me(
    Extension(authenticated): Extension<AuthenticatedUser>,
) -> Result<ApiSuccess<Identity>, ApiError> {
    Ok(ApiSuccess::new(StatusCode::OK, authenticated.identity))
}
