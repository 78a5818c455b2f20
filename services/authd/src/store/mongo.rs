//! MongoDB 文档存储：`users` 集合，email 唯一索引。
//!
//! 文档字段沿用既有集合的格式：`password` 存摘要，`createdAt` 为 RFC3339 字符串。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::{
    Client, Collection, IndexModel,
    bson::doc,
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Account, CredentialStore, PutOutcome, StoreError, sort_accounts};

/// MongoDB 重复键错误码。
const DUPLICATE_KEY_CODE: i32 = 11000;
const COLLECTION_NAME: &str = "users";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDocument {
    email: String,
    salt: String,
    password: String,
    created_at: String,
}

impl From<&Account> for UserDocument {
    fn from(account: &Account) -> Self {
        Self {
            email: account.email.clone(),
            salt: account.salt.clone(),
            password: account.password_hash.clone(),
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

impl TryFrom<UserDocument> for Account {
    type Error = StoreError;

    fn try_from(doc: UserDocument) -> Result<Self, Self::Error> {
        let created_at = DateTime::parse_from_rfc3339(&doc.created_at)
            .map_err(|err| {
                StoreError::Corrupt(format!("createdAt of {} is invalid: {err}", doc.email))
            })?
            .with_timezone(&Utc);
        Ok(Self {
            email: doc.email,
            password_hash: doc.password,
            salt: doc.salt,
            created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct MongoStore {
    users: Collection<UserDocument>,
}

impl MongoStore {
    /// 连接并确保 email 唯一索引存在。
    pub(crate) async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 }).await?;

        let users = db.collection::<UserDocument>(COLLECTION_NAME);
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        users.create_index(index).await?;

        info!("mongodb store connected: database={database}");
        Ok(Self { users })
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        _ => false,
    }
}

#[async_trait]
impl CredentialStore for MongoStore {
    fn backend(&self) -> &'static str {
        "mongo"
    }

    async fn get(&self, email: &str) -> Result<Option<Account>, StoreError> {
        self.users
            .find_one(doc! { "email": email })
            .await?
            .map(Account::try_from)
            .transpose()
    }

    async fn put(&self, account: Account) -> Result<PutOutcome, StoreError> {
        match self.users.insert_one(UserDocument::from(&account)).await {
            Ok(_) => Ok(PutOutcome::Created),
            Err(err) if is_duplicate_key(&err) => Ok(PutOutcome::Exists),
            Err(err) => Err(err.into()),
        }
    }

    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        let docs: Vec<UserDocument> = self.users.find(doc! {}).await?.try_collect().await?;
        let mut accounts = docs
            .into_iter()
            .map(Account::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        sort_accounts(&mut accounts);
        Ok(accounts)
    }

    async fn clear(&self) -> Result<u64, StoreError> {
        let result = self.users.delete_many(doc! {}).await?;
        Ok(result.deleted_count)
    }
}
