//! authd 共享状态：存储句柄、token 编解码器与管理接口开关。

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::{
    api::{error::ApiError, types::ADMIN_KEY_HEADER},
    auth::{password::constant_time_eq, token::TokenCodec},
    config::Config,
    store::{SharedStore, open_store},
};

/// 请求间共享的只读状态；可变数据只在存储内部。
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) store: SharedStore,
    pub(crate) codec: Arc<TokenCodec>,
    /// 管理接口密钥；`None` 表示不校验。
    pub(crate) admin_key: Option<Arc<str>>,
    pub(crate) testing_mode: bool,
}

impl AppState {
    pub(crate) fn new(
        store: SharedStore,
        codec: TokenCodec,
        admin_key: Option<String>,
        testing_mode: bool,
    ) -> Self {
        Self {
            store,
            codec: Arc::new(codec),
            admin_key: admin_key.map(Arc::from),
            testing_mode,
        }
    }

    /// 按配置打开存储并装配状态。
    pub(crate) async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = open_store(&config.store).await?;
        Ok(Self::new(
            store,
            TokenCodec::new(config.token_secret.clone()),
            config.admin_key.clone(),
            config.testing_mode,
        ))
    }

    /// 管理接口校验：配置了密钥时要求 `X-Admin-Key` 一致。
    pub(crate) fn require_admin(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let Some(expected) = self.admin_key.as_deref() else {
            return Ok(());
        };
        let provided = headers
            .get(ADMIN_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if constant_time_eq(provided.as_bytes(), expected.as_bytes()) {
            Ok(())
        } else {
            Err(ApiError::forbidden())
        }
    }
}
