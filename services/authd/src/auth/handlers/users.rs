//! 管理接口：账号列表与测试模式下清空存储。

use axum::http::HeaderMap;
use tracing::{info, warn};

use crate::{
    api::{
        error::ApiError,
        types::{PublicAccount, ResetData, UsersData},
    },
    state::AppState,
};

impl AppState {
    /// 列出全部账号的公开字段。
    pub(crate) async fn list_accounts(&self, headers: &HeaderMap) -> Result<UsersData, ApiError> {
        self.require_admin(headers)?;
        let users = self
            .store
            .list()
            .await?
            .into_iter()
            .map(PublicAccount::from)
            .collect::<Vec<_>>();
        Ok(UsersData {
            user_count: users.len(),
            users,
        })
    }

    /// 清空存储，仅测试模式可用。
    pub(crate) async fn reset_accounts(&self, headers: &HeaderMap) -> Result<ResetData, ApiError> {
        if !self.testing_mode {
            warn!("reset rejected: testing mode disabled");
            return Err(ApiError::reset_disabled());
        }
        self.require_admin(headers)?;
        let deleted_count = self.store.clear().await?;
        info!("credential store reset: {deleted_count} accounts removed");
        Ok(ResetData { deleted_count })
    }
}
