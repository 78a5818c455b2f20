//! SQLite 存储（sqlx 连接池），email 为主键，冲突时不写入。

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::info;

use super::{Account, CredentialStore, PutOutcome, StoreError};

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    email: String,
    password_hash: String,
    salt: String,
    created_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            email: row.email,
            password_hash: row.password_hash,
            salt: row.salt,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// 连接数据库并建表。
    pub(crate) async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // 内存库每个连接各自独立，只能单连接。
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                email TEXT PRIMARY KEY NOT NULL,
                password_hash TEXT NOT NULL,
                salt TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        info!("sqlite store connected: {url}");
        Ok(Self { pool })
    }
}

#[async_trait]
impl CredentialStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn get(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT email, password_hash, salt, created_at
            FROM accounts
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Account::from))
    }

    async fn exists(&self, email: &str) -> Result<bool, StoreError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM accounts WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn put(&self, account: Account) -> Result<PutOutcome, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO accounts (email, password_hash, salt, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(email) DO NOTHING
            "#,
        )
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.salt)
        .bind(account.created_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            Ok(PutOutcome::Exists)
        } else {
            Ok(PutOutcome::Created)
        }
    }

    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT email, password_hash, salt, created_at
            FROM accounts
            ORDER BY created_at ASC, email ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Account::from).collect())
    }

    async fn clear(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM accounts")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteStore;
    use crate::store::testing;

    #[tokio::test]
    async fn sqlite_store_contract() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        testing::exercise_store(&store).await;
    }
}
