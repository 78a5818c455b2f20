//! Bearer token 校验。

use axum::http::{HeaderMap, header::AUTHORIZATION};
use serde_json::Value;
use tracing::debug;

use crate::{
    api::{
        error::ApiError,
        types::{VerifiedUser, VerifyData},
    },
    state::AppState,
};

/// 从 `Authorization: Bearer <token>` 取出 token；`Bearer ` 之后整段即 token。
pub(super) fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let raw = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(ApiError::missing_authorization)?;
    raw.strip_prefix("Bearer ")
        .ok_or_else(ApiError::missing_authorization)
}

impl AppState {
    /// 校验请求携带的 token，返回其中的 email。
    pub(crate) fn verify_bearer(&self, headers: &HeaderMap) -> Result<VerifyData, ApiError> {
        let token = bearer_token(headers)?;
        let claims = self.codec.validate(token).map_err(|err| {
            debug!("token rejected: {err}");
            ApiError::invalid_token()
        })?;
        let Some(email) = claims.get("email").and_then(Value::as_str) else {
            debug!("token rejected: payload has no email");
            return Err(ApiError::invalid_token());
        };
        Ok(VerifyData {
            user: VerifiedUser {
                email: email.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header::AUTHORIZATION};

    use super::bearer_token;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_token_after_bearer_scheme() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(bearer_token(&headers("Bearer abc extra")).unwrap(), "abc extra");
        assert_eq!(bearer_token(&headers("Bearer   abc")).unwrap(), "  abc");
        assert_eq!(bearer_token(&headers("Bearer ")).unwrap(), "");
    }

    #[test]
    fn rejects_missing_or_other_scheme() {
        let missing = bearer_token(&HeaderMap::new()).unwrap_err();
        assert_eq!(missing.code, "MISSING_AUTHORIZATION");
        assert_eq!(
            bearer_token(&headers("Basic dXNlcjpwdw==")).unwrap_err().code,
            "MISSING_AUTHORIZATION"
        );
        assert_eq!(
            bearer_token(&headers("bearer abc")).unwrap_err().code,
            "MISSING_AUTHORIZATION"
        );
    }
}
