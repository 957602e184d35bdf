//! Signed download of stored result PDFs.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use screenbook_auth::token::verify_download_token;
use screenbook_core::error::ScreeningError;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub token: Option<String>,
}

/// Streams a result PDF to the holder of a valid download token.
pub async fn download_result(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(q): Query<DownloadQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let token = q
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::unauthorized("download token is required"))?;
    let file_key = verify_download_token(&token, id, &state.auth).map_err(ScreeningError::from)?;

    let (result, bytes) = state.results.result_file(id).await?;
    if result.file_key != file_key {
        return Err(ApiError::unauthorized("download token does not match this file"));
    }

    info!(result_id = %id, "Result file downloaded");
    let disposition = format!("inline; filename=\"result_{id}.pdf\"");
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
