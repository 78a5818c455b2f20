//! API 响应包裹：`{ success, message?, ...data }`。

use axum::{Json, http::StatusCode};
use serde::Serialize;

/// 通用 API 成功/失败包裹结构；`data` 字段平铺到顶层。
#[derive(Debug, Serialize)]
pub(crate) struct ApiEnvelope<T>
where
    T: Serialize,
{
    pub(crate) success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<String>,
    #[serde(flatten)]
    pub(crate) data: Option<T>,
}

/// 成功响应的统一形态。
pub(crate) type ApiReply<T> = (StatusCode, Json<ApiEnvelope<T>>);

/// 构造成功响应。
pub(crate) fn ok_response<T: Serialize>(
    status: StatusCode,
    message: Option<&str>,
    data: T,
) -> ApiReply<T> {
    (
        status,
        Json(ApiEnvelope {
            success: true,
            message: message.map(str::to_string),
            data: Some(data),
        }),
    )
}
