use auth::AccessToken;
use axum::extract::State;
use axum::Form;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use crate::domain::user::ports::UserRepository;
use crate::inbound::http::router::AppState;

/// OAuth2 password grant. The response is the bare token object rather than
/// the usual envelope so standard OAuth2 clients can read it.
pub async fn token<UR: UserRepository>(
    State(state): State<AppState<UR>>,
    Form(form): Form<TokenRequestForm>,
) -> Result<Json<AccessToken>, ApiError> {
    if let Some(grant_type) = form.grant_type.as_deref() {
        if grant_type != "password" {
            return Err(ApiError::BadRequest(format!(
                "Unsupported grant type: {}",
                grant_type
            )));
        }
    }

    state
        .authenticator
        .login(&form.username, &form.password)
        .await
        .map(Json)
        .map_err(ApiError::from)
}

#[derive(Deserialize)]
pub struct TokenRequestForm {
    username: String,
    password: String,
    #[serde(default)]
    grant_type: Option<String>,
}
