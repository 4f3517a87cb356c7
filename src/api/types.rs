use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::account::Role;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub handle: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegistrationDto {
    pub account_id: i32,
    pub handle: String,
    pub verification_code: String,
    pub needs_verification: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub handle: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub handle: String,
}

#[derive(Debug, Serialize)]
pub struct SessionDto {
    pub account_id: i32,
    pub handle: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct ContentUpdateRequest {
    pub data: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
