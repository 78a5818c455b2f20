//! 登录逻辑：校验口令并签发 token。

use tracing::{info, warn};

use super::{register::claims_for, required_credentials};
use crate::{
    api::{
        error::ApiError,
        types::{CredentialsRequest, TokenData},
    },
    auth::password::{burn_hash, verify_password},
    state::AppState,
};

impl AppState {
    /// 登录；账号不存在与口令错误返回同一个 401。
    pub(crate) async fn authenticate(
        &self,
        req: &CredentialsRequest,
    ) -> Result<TokenData, ApiError> {
        let (email, password) = required_credentials(req)?;

        let Some(account) = self.store.get(email).await? else {
            burn_hash(password);
            warn!("signin rejected: unknown account");
            return Err(ApiError::invalid_credentials());
        };

        if !verify_password(password, &account.salt, &account.password_hash) {
            warn!("signin rejected: password mismatch for {email}");
            return Err(ApiError::invalid_credentials());
        }

        let token = self.codec.issue(claims_for(email))?;
        info!("account signed in: {email}");
        Ok(TokenData { token })
    }
}
