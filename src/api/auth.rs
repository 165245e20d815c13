use crate::api::AppState;
use crate::domain::User;
use crate::error::AppError;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Email/password login. The response never includes the password hash.
pub async fn post_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<User>, AppError> {
    if req.email.trim().is_empty() {
        return Err(AppError::BadRequest("email must not be empty".into()));
    }

    let user = state
        .repo
        .authenticate_user(&req.email, &req.password)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid email or password".into()))?;

    Ok(Json(user))
}
