//! 凭证存储：统一的 `CredentialStore` 接口与各后端实现。

mod file;
mod memory;
#[cfg(feature = "mongo")]
mod mongo;
#[cfg(feature = "sqlite")]
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::StoreConfig;

pub(crate) use file::FileStore;
pub(crate) use memory::MemoryStore;
#[cfg(feature = "mongo")]
pub(crate) use mongo::MongoStore;
#[cfg(feature = "sqlite")]
pub(crate) use sqlite::SqliteStore;

/// 账号记录；创建后不可变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Account {
    pub(crate) email: String,
    pub(crate) password_hash: String,
    pub(crate) salt: String,
    pub(crate) created_at: DateTime<Utc>,
}

/// 条件写入结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PutOutcome {
    Created,
    /// 同 email 已存在，未写入。
    Exists,
}

/// 存储层错误。
#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("store io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("corrupt account record: {0}")]
    Corrupt(String),
    #[cfg(feature = "sqlite")]
    #[error("sqlite failed: {0}")]
    Sqlite(#[from] sqlx::Error),
    #[cfg(feature = "mongo")]
    #[error("mongodb failed: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

/// 凭证存储能力接口，必须支持并发访问。
#[async_trait]
pub(crate) trait CredentialStore: Send + Sync {
    /// 后端名称。
    fn backend(&self) -> &'static str;

    async fn get(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn exists(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.get(email).await?.is_some())
    }

    /// 原子条件写入：email 已存在时返回 `Exists`，不覆盖。
    async fn put(&self, account: Account) -> Result<PutOutcome, StoreError>;

    /// 全部账号，按 `created_at`、`email` 升序。
    async fn list(&self) -> Result<Vec<Account>, StoreError>;

    /// 清空存储，返回删除条数。
    async fn clear(&self) -> Result<u64, StoreError>;
}

/// 共享的存储句柄。
pub(crate) type SharedStore = Arc<dyn CredentialStore>;

/// 按配置打开存储后端。
pub(crate) async fn open_store(config: &StoreConfig) -> anyhow::Result<SharedStore> {
    let store: SharedStore = match config {
        StoreConfig::Memory => Arc::new(MemoryStore::default()),
        StoreConfig::File { path } => Arc::new(FileStore::open(path.clone())?),
        #[cfg(feature = "sqlite")]
        StoreConfig::Sqlite { url } => Arc::new(SqliteStore::connect(url).await?),
        #[cfg(feature = "mongo")]
        StoreConfig::Mongo { uri, database } => Arc::new(MongoStore::connect(uri, database).await?),
        #[allow(unreachable_patterns)]
        other => anyhow::bail!(
            "store backend `{}` is not compiled in; rebuild with `--features {}`",
            other.kind(),
            other.kind()
        ),
    };
    info!("credential store ready: {}", store.backend());
    Ok(store)
}

/// 列表统一排序。
pub(crate) fn sort_accounts(accounts: &mut [Account]) {
    accounts.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.email.cmp(&b.email))
    });
}

#[cfg(test)]
pub(crate) mod testing {
    use chrono::{TimeZone, Utc};

    use super::{Account, CredentialStore, PutOutcome};

    pub(crate) fn account(email: &str, secs: i64) -> Account {
        Account {
            email: email.to_string(),
            password_hash: format!("hash-{email}"),
            salt: format!("salt-{email}"),
            created_at: Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
        }
    }

    /// 各后端共用的行为检查。
    pub(crate) async fn exercise_store(store: &dyn CredentialStore) {
        assert!(!store.exists("a@b.com").await.unwrap());
        assert_eq!(store.get("a@b.com").await.unwrap(), None);

        let first = account("a@b.com", 10);
        assert_eq!(store.put(first.clone()).await.unwrap(), PutOutcome::Created);
        assert!(store.exists("a@b.com").await.unwrap());
        assert_eq!(store.get("a@b.com").await.unwrap(), Some(first.clone()));

        let mut duplicate = account("a@b.com", 20);
        duplicate.password_hash = "other".to_string();
        assert_eq!(store.put(duplicate).await.unwrap(), PutOutcome::Exists);
        assert_eq!(store.get("a@b.com").await.unwrap(), Some(first.clone()));

        let earlier = account("z@b.com", 0);
        store.put(earlier.clone()).await.unwrap();
        let listed = store.list().await.unwrap();
        assert_eq!(listed, vec![earlier, first]);

        assert_eq!(store.clear().await.unwrap(), 2);
        assert!(store.list().await.unwrap().is_empty());
        assert!(!store.exists("a@b.com").await.unwrap());
    }
}

#[cfg(test)]
mod tests {
    use super::{PutOutcome, open_store, testing::account};
    use crate::config::StoreConfig;

    #[tokio::test]
    async fn open_store_selects_backend() {
        let memory = open_store(&StoreConfig::Memory).await.unwrap();
        assert_eq!(memory.backend(), "memory");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("users.json");
        let file = open_store(&StoreConfig::File { path: path.clone() })
            .await
            .unwrap();
        assert_eq!(file.backend(), "file");
        assert_eq!(
            file.put(account("a@b.com", 0)).await.unwrap(),
            PutOutcome::Created
        );
        assert!(path.exists());
    }
}
