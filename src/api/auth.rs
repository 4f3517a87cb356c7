use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;
use tower_sessions::Session;

use super::{
    ApiError, ApiResponse, AppState, LoginRequest, RegisterRequest, RegistrationDto, SessionDto,
    VerifyRequest,
};
use crate::models::account::SessionAccount;

/// Session key the account binding is stored under.
const SESSION_ACCOUNT_KEY: &str = "account";

/// Reads the current session binding, if any. "No session" is an expected
/// empty case here, not an error.
pub async fn current_account(session: &Session) -> Result<Option<SessionAccount>, ApiError> {
    session
        .get::<SessionAccount>(SESSION_ACCOUNT_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))
}

async fn establish_session(session: &Session, account: &SessionAccount) -> Result<(), ApiError> {
    session
        .insert(SESSION_ACCOUNT_KEY, account)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))
}

/// POST /auth/register
/// Creates an unverified account and returns the verification code the user
/// must place in their profile motto.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<RegistrationDto>>, ApiError> {
    if payload.handle.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Please complete all fields"));
    }

    let registration = state
        .accounts()
        .register(&payload.handle, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(RegistrationDto {
        account_id: registration.account_id,
        handle: registration.handle,
        verification_code: registration.verification_code,
        needs_verification: true,
    })))
}

/// POST /auth/login
/// Authenticates a verified account and binds it to the session.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<SessionDto>>, ApiError> {
    if payload.handle.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Please complete all fields"));
    }

    let account = state
        .auth()
        .login(&payload.handle, &payload.password)
        .await?;

    establish_session(&session, &account).await?;

    Ok(Json(ApiResponse::success(SessionDto {
        account_id: account.account_id,
        handle: account.handle,
        role: account.role,
    })))
}

/// POST /auth/verify
/// Runs the motto check and, on success, promotes the account and logs it in.
pub async fn verify_account(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<VerifyRequest>,
) -> Result<Json<ApiResponse<SessionDto>>, ApiError> {
    if payload.handle.trim().is_empty() {
        return Err(ApiError::validation("Handle is required"));
    }

    let verified = state.accounts().verify_account(&payload.handle).await?;

    let account = SessionAccount {
        account_id: verified.account_id,
        handle: verified.handle,
        role: verified.role,
    };

    // Auto-login straight after promotion.
    establish_session(&session, &account).await?;

    Ok(Json(ApiResponse::success(SessionDto {
        account_id: account.account_id,
        handle: account.handle,
        role: account.role,
    })))
}

/// POST /auth/logout
/// Destroys the current session. Idempotent: no active session is fine.
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    (StatusCode::OK, "Logged out")
}

/// GET /auth/session
/// Returns the active session binding, or 401 if there is none.
pub async fn check_session(
    session: Session,
) -> Result<Json<ApiResponse<SessionDto>>, ApiError> {
    let account = current_account(&session)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("No active session".to_string()))?;

    Ok(Json(ApiResponse::success(SessionDto {
        account_id: account.account_id,
        handle: account.handle,
        role: account.role,
    })))
}
