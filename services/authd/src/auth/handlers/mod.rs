//! 鉴权 HTTP 接口处理模块。

mod authenticate;
mod http;
mod register;
mod users;
mod verify;

pub(crate) use http::{
    not_found_handler, reset_handler, signin_handler, signup_handler, users_handler,
    verify_handler,
};

use crate::api::{error::ApiError, types::CredentialsRequest};

/// 取出必填的 email（去首尾空白）与 password（原样）。
fn required_credentials(req: &CredentialsRequest) -> Result<(&str, &str), ApiError> {
    let email = req.email.as_deref().map(str::trim).unwrap_or_default();
    let password = req.password.as_deref().unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::missing_credentials());
    }
    Ok((email, password))
}
