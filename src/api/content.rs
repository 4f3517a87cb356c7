use axum::{Json, extract::State};
use std::collections::HashMap;
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, ContentUpdateRequest, MessageResponse};
use crate::services::{Action, Verdict, authorize};

/// Keys a full content edit must provide.
const REQUIRED_CONTENT_KEYS: [&str; 6] = [
    "main_title",
    "main_description",
    "feature_1",
    "feature_2",
    "feature_3",
    "footer_text",
];

/// GET /content
/// Public read of the site content key-value map.
pub async fn get_content(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<HashMap<String, String>>>, ApiError> {
    let content = state.store().get_content().await?;
    Ok(Json(ApiResponse::success(content)))
}

/// POST /content
/// Content-management action: administrator and developer roles only.
pub async fn update_content(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<ContentUpdateRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let account = super::auth::current_account(&session)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

    if authorize(Some(&account), Action::ManageContent) == Verdict::Deny {
        return Err(ApiError::Forbidden("Insufficient permission".to_string()));
    }

    for key in REQUIRED_CONTENT_KEYS {
        if payload.data.get(key).is_none_or(|v| v.trim().is_empty()) {
            return Err(ApiError::validation(format!("Required field: {key}")));
        }
    }

    let now = chrono::Utc::now().to_rfc3339();
    state.store().update_content(&payload.data, &now).await?;

    tracing::info!("Site content updated by '{}'", account.handle);

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Content updated successfully".to_string(),
    })))
}
