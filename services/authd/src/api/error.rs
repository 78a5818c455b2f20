//! API 错误定义与响应转换。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::{debug, error};

use super::response::ApiEnvelope;
use crate::{auth::token::TokenError, store::StoreError};

/// 对外统一的 500 文案，不暴露内部细节。
const SERVER_ERROR_MESSAGE: &str = "Server error";

/// 接口错误：状态码 + 内部错误码 + 对外文案。
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    pub(crate) code: &'static str,
    pub(crate) message: String,
}

impl ApiError {
    /// 构造统一 API 错误。
    pub(crate) fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// 缺少 email / password，或请求体无法解析。
    pub(crate) fn missing_credentials() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "MISSING_CREDENTIALS",
            "Email and password required",
        )
    }

    pub(crate) fn account_exists() -> Self {
        Self::new(StatusCode::CONFLICT, "ACCOUNT_EXISTS", "User already exists")
    }

    /// 账号不存在与口令错误共用，避免枚举账号。
    pub(crate) fn invalid_credentials() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "INVALID_CREDENTIALS",
            "Invalid credentials",
        )
    }

    pub(crate) fn missing_authorization() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "MISSING_AUTHORIZATION",
            "Authorization header required",
        )
    }

    pub(crate) fn invalid_token() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "TOKEN_INVALID", "Invalid token")
    }

    pub(crate) fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", "Admin access required")
    }

    pub(crate) fn reset_disabled() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            "RESET_DISABLED",
            "Reset is only available in testing mode",
        )
    }

    pub(crate) fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Endpoint not found")
    }

    /// 500：原始错误只写日志。
    pub(crate) fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        error!("{context}: {err}");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            SERVER_ERROR_MESSAGE,
        )
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::internal("credential store failed", err)
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        Self::internal("issue token failed", err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        debug!("request failed: {} {}", self.status.as_u16(), self.code);
        (
            self.status,
            Json(ApiEnvelope::<Value> {
                success: false,
                message: Some(self.message),
                data: None,
            }),
        )
            .into_response()
    }
}
