//! 文件存储：整份账号表序列化为单个 JSON 文件（键值形态）。
//!
//! 启动时加载到内存，每次写操作在写锁内落盘（先写临时文件再 rename）。

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use super::{Account, CredentialStore, PutOutcome, StoreError, sort_accounts};

/// 持久化文件结构。
#[derive(Debug, Deserialize)]
struct AccountsFile {
    #[serde(default)]
    accounts: BTreeMap<String, Account>,
}

#[derive(Debug)]
pub(crate) struct FileStore {
    path: PathBuf,
    accounts: RwLock<BTreeMap<String, Account>>,
}

impl FileStore {
    /// 打开（或新建）存储文件。
    pub(crate) fn open(path: PathBuf) -> Result<Self, StoreError> {
        let accounts = load_accounts(&path)?;
        debug!(
            "file store loaded {} accounts from {}",
            accounts.len(),
            path.display()
        );
        Ok(Self {
            path,
            accounts: RwLock::new(accounts),
        })
    }
}

fn load_accounts(path: &Path) -> Result<BTreeMap<String, Account>, StoreError> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let raw = fs::read(path)?;
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(BTreeMap::new());
    }
    let parsed: AccountsFile = serde_json::from_slice(&raw)?;
    for (key, account) in &parsed.accounts {
        if key != &account.email {
            return Err(StoreError::Corrupt(format!(
                "key `{key}` holds account `{}`",
                account.email
            )));
        }
    }
    Ok(parsed.accounts)
}

fn persist_accounts(path: &Path, accounts: &BTreeMap<String, Account>) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let encoded = serde_json::to_vec_pretty(&AccountsFileRef { accounts })?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, encoded)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[derive(Serialize)]
struct AccountsFileRef<'a> {
    accounts: &'a BTreeMap<String, Account>,
}

#[async_trait]
impl CredentialStore for FileStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    async fn get(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.read().await.get(email).cloned())
    }

    async fn exists(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.accounts.read().await.contains_key(email))
    }

    async fn put(&self, account: Account) -> Result<PutOutcome, StoreError> {
        let mut guard = self.accounts.write().await;
        if guard.contains_key(&account.email) {
            return Ok(PutOutcome::Exists);
        }
        let email = account.email.clone();
        guard.insert(email.clone(), account);
        if let Err(err) = persist_accounts(&self.path, &guard) {
            guard.remove(&email);
            return Err(err);
        }
        Ok(PutOutcome::Created)
    }

    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        let mut accounts = self
            .accounts
            .read()
            .await
            .values()
            .cloned()
            .collect::<Vec<_>>();
        sort_accounts(&mut accounts);
        Ok(accounts)
    }

    async fn clear(&self) -> Result<u64, StoreError> {
        let mut guard = self.accounts.write().await;
        let removed = guard.len() as u64;
        persist_accounts(&self.path, &BTreeMap::new())?;
        guard.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::FileStore;
    use crate::store::{CredentialStore, StoreError, testing};

    #[tokio::test]
    async fn file_store_contract() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("accounts.json")).unwrap();
        testing::exercise_store(&store).await;
    }

    #[tokio::test]
    async fn accounts_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("accounts.json");

        let store = FileStore::open(path.clone()).unwrap();
        let account = testing::account("a@b.com", 0);
        store.put(account.clone()).await.unwrap();
        drop(store);

        let reopened = FileStore::open(path).unwrap();
        assert_eq!(reopened.get("a@b.com").await.unwrap(), Some(account));
    }

    #[test]
    fn mismatched_key_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.json");
        let account = testing::account("a@b.com", 0);
        let body = serde_json::json!({ "accounts": { "x@b.com": account } });
        std::fs::write(&path, serde_json::to_vec(&body).unwrap()).unwrap();

        assert!(matches!(FileStore::open(path), Err(StoreError::Corrupt(_))));
    }
}
