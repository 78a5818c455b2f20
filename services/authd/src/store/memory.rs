//! 内存存储：进程内 `HashMap`，由读写锁保护。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Account, CredentialStore, PutOutcome, StoreError, sort_accounts};

#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    accounts: RwLock<HashMap<String, Account>>,
}

#[async_trait]
impl CredentialStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
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
        guard.insert(account.email.clone(), account);
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
        guard.clear();
        Ok(removed)
    }
}
