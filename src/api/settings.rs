use crate::api::AppState;
use crate::domain::Settings;
use crate::error::AppError;
use axum::extract::{Path, State};
use axum::Json;

/// Returns stored settings, or the defaults for users without a row.
pub async fn get_settings(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Settings>, AppError> {
    let settings = state.repo.get_settings(&user_id).await?;
    Ok(Json(settings))
}

pub async fn put_settings(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    Json(settings): Json<Settings>,
) -> Result<Json<Settings>, AppError> {
    if settings.commission_value.is_negative() {
        return Err(AppError::BadRequest(
            "commissionValue must be >= 0".into(),
        ));
    }
    if settings.tax_rate_percent.is_negative() {
        return Err(AppError::BadRequest("taxRatePercent must be >= 0".into()));
    }

    state.repo.save_settings(&user_id, &settings).await?;
    Ok(Json(settings))
}
