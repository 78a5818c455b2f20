//! API 请求/响应类型。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Account;

/// 管理接口密钥请求头。
pub(crate) const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// 注册 / 登录请求体；字段缺省按缺失处理。
#[derive(Debug, Deserialize)]
pub(crate) struct CredentialsRequest {
    #[serde(default)]
    pub(crate) email: Option<String>,
    #[serde(default)]
    pub(crate) password: Option<String>,
}

/// 注册 / 登录成功返回。
#[derive(Debug, Serialize)]
pub(crate) struct TokenData {
    pub(crate) token: String,
}

/// token 校验返回。
#[derive(Debug, Serialize)]
pub(crate) struct VerifyData {
    pub(crate) user: VerifiedUser,
}

#[derive(Debug, Serialize)]
pub(crate) struct VerifiedUser {
    pub(crate) email: String,
}

/// 账号公开字段。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PublicAccount {
    pub(crate) email: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<Account> for PublicAccount {
    fn from(account: Account) -> Self {
        Self {
            email: account.email,
            created_at: account.created_at,
        }
    }
}

/// 账号列表返回。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UsersData {
    pub(crate) user_count: usize,
    pub(crate) users: Vec<PublicAccount>,
}

/// 清空存储返回。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResetData {
    pub(crate) deleted_count: u64,
}
