//! 鉴权 HTTP 路由处理函数。

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use tracing::debug;

use crate::{
    api::{
        error::ApiError,
        response::{ApiReply, ok_response},
        types::{CredentialsRequest, ResetData, TokenData, UsersData, VerifyData},
    },
    state::AppState,
};

/// 请求体解析失败按缺少字段处理。
fn credentials_body(
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<CredentialsRequest, ApiError> {
    body.map(|Json(req)| req).map_err(|err| {
        debug!("credentials body rejected: {err}");
        ApiError::missing_credentials()
    })
}

/// 注册接口。
pub(crate) async fn signup_handler(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<ApiReply<TokenData>, ApiError> {
    let req = credentials_body(body)?;
    let data = state.register_account(&req).await?;
    Ok(ok_response(
        StatusCode::CREATED,
        Some("User created successfully"),
        data,
    ))
}

/// 登录接口。
pub(crate) async fn signin_handler(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<ApiReply<TokenData>, ApiError> {
    let req = credentials_body(body)?;
    let data = state.authenticate(&req).await?;
    Ok(ok_response(StatusCode::OK, Some("Login successful"), data))
}

/// token 校验接口。
pub(crate) async fn verify_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiReply<VerifyData>, ApiError> {
    let data = state.verify_bearer(&headers)?;
    Ok(ok_response(StatusCode::OK, None, data))
}

/// 账号列表接口。
pub(crate) async fn users_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiReply<UsersData>, ApiError> {
    let data = state.list_accounts(&headers).await?;
    Ok(ok_response(StatusCode::OK, None, data))
}

/// 清空存储接口（测试模式）。
pub(crate) async fn reset_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiReply<ResetData>, ApiError> {
    let data = state.reset_accounts(&headers).await?;
    Ok(ok_response(StatusCode::OK, Some("All users deleted"), data))
}

/// 未匹配的路径或方法。
pub(crate) async fn not_found_handler() -> ApiError {
    ApiError::not_found()
}
