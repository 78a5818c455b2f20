//! 注册逻辑：创建账号并签发 token。

use chrono::Utc;
use serde_json::json;
use tracing::info;

use super::required_credentials;
use crate::{
    api::{
        error::ApiError,
        types::{CredentialsRequest, TokenData},
    },
    auth::{
        password::{generate_salt, hash_password},
        token::Claims,
    },
    state::AppState,
    store::{Account, PutOutcome},
};

impl AppState {
    /// 注册新账号；email 已存在返回 409。
    pub(crate) async fn register_account(
        &self,
        req: &CredentialsRequest,
    ) -> Result<TokenData, ApiError> {
        let (email, password) = required_credentials(req)?;

        if self.store.exists(email).await? {
            return Err(ApiError::account_exists());
        }

        let salt = generate_salt();
        let account = Account {
            email: email.to_string(),
            password_hash: hash_password(password, &salt),
            salt,
            created_at: Utc::now(),
        };

        // exists 与 put 之间可能有并发注册，由 put 的条件写入兜底。
        if self.store.put(account).await? == PutOutcome::Exists {
            return Err(ApiError::account_exists());
        }

        let token = self.codec.issue(claims_for(email))?;
        info!("account registered: {email}");
        Ok(TokenData { token })
    }
}

/// token 载荷：仅 email。
pub(super) fn claims_for(email: &str) -> Claims {
    let mut claims = Claims::new();
    claims.insert("email".to_string(), json!(email));
    claims
}
