use axum::Json;
use axum::extract::State;
use screenbook_core::models::profile::Profile;

use crate::error::ApiError;
use crate::extract::Caller;
use crate::state::AppState;

pub async fn profile(
    State(state): State<AppState>,
    Caller(ctx): Caller,
) -> Result<Json<Profile>, ApiError> {
    Ok(Json(state.accounts.profile(&ctx).await?))
}

pub async fn participant_profile(
    State(state): State<AppState>,
    Caller(ctx): Caller,
) -> Result<Json<Profile>, ApiError> {
    ctx.require_participant()?;
    Ok(Json(state.accounts.profile(&ctx).await?))
}

pub async fn admin_profile(
    State(state): State<AppState>,
    Caller(ctx): Caller,
) -> Result<Json<Profile>, ApiError> {
    ctx.require_admin()?;
    Ok(Json(state.accounts.profile(&ctx).await?))
}
