use auth::Identity;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedUser;

/// Demonstration resource owned by the caller.
pub async fn read_my_items(
    Extension(authenticated): Extension<AuthenticatedUser>,
) -> Result<ApiSuccess<Vec<ItemData>>, ApiError> {
    let items = vec![ItemData {
        item_id: 1,
        owner: authenticated.identity,
    }];

    Ok(ApiSuccess::new(StatusCode::OK, items))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemData {
    pub item_id: u64,
    pub owner: Identity,
}
