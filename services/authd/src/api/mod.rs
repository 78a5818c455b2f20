//! HTTP 接口层：请求/响应类型、统一错误与响应包裹。

pub(crate) mod error;
pub(crate) mod response;
pub(crate) mod types;
