//! 配置模块职责：
//! 1. 从环境变量读取 authd 运行配置并提供默认值。
//! 2. 选择凭证存储后端（memory / file / sqlite / mongo）。
//! 3. 提供布尔值解析等通用能力；读取函数可注入，便于测试。

use std::path::PathBuf;

use anyhow::{Context, anyhow, bail};
use tracing::warn;

use crate::auth::password::random_hex;

/// 默认监听地址。
pub(crate) const DEFAULT_ADDR: &str = "0.0.0.0:18090";
/// 默认接口前缀。
pub(crate) const DEFAULT_ROUTE_PREFIX: &str = "/api/auth";
/// 默认 SQLite 连接串。
const DEFAULT_DATABASE_URL: &str = "sqlite://authd.db";
/// 默认 MongoDB 数据库名。
const DEFAULT_MONGODB_DB: &str = "auth-db";

/// 凭证存储后端配置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreConfig {
    /// 进程内内存表，重启即丢失。
    Memory,
    /// 单个 JSON 文件作为键值存储。
    File { path: PathBuf },
    /// SQLite（sqlx 连接池）。
    Sqlite { url: String },
    /// MongoDB 文档库。
    Mongo { uri: String, database: String },
}

impl StoreConfig {
    /// 后端名称，用于日志与 doctor 输出。
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File { .. } => "file",
            Self::Sqlite { .. } => "sqlite",
            Self::Mongo { .. } => "mongo",
        }
    }
}

/// authd 运行时配置。
#[derive(Debug, Clone)]
pub(crate) struct Config {
    /// HTTP 监听地址。
    pub(crate) addr: String,
    /// 接口前缀（如 `/api/auth`）。
    pub(crate) route_prefix: String,
    /// token HMAC 密钥。
    pub(crate) token_secret: String,
    /// 密钥是否为本进程临时生成。
    pub(crate) token_secret_generated: bool,
    /// 凭证存储后端。
    pub(crate) store: StoreConfig,
    /// 管理接口密钥；未设置时 users 列表不做校验。
    pub(crate) admin_key: Option<String>,
    /// 测试模式，开启后允许清空存储。
    pub(crate) testing_mode: bool,
}

impl Config {
    /// 从进程环境变量构建配置。
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        if config.token_secret_generated {
            warn!("AUTH_TOKEN_SECRET not set; tokens will not survive a restart");
        }
        Ok(config)
    }

    /// 从任意键值来源构建配置。
    pub(crate) fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let addr = read("AUTH_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let route_prefix = normalize_prefix(
            &read("AUTH_ROUTE_PREFIX").unwrap_or_else(|| DEFAULT_ROUTE_PREFIX.to_string()),
        );

        let (token_secret, token_secret_generated) = match read("AUTH_TOKEN_SECRET") {
            Some(secret) => (secret, false),
            None => (generate_token_secret(), true),
        };

        let store = match read("AUTH_STORE").as_deref().unwrap_or("memory") {
            "memory" => StoreConfig::Memory,
            "file" => StoreConfig::File {
                path: read("AUTH_STORE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| default_store_path(read("HOME"))),
            },
            "sqlite" => StoreConfig::Sqlite {
                url: read("AUTH_DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            },
            "mongo" => StoreConfig::Mongo {
                uri: read("AUTH_MONGODB_URI")
                    .ok_or_else(|| anyhow!("AUTH_MONGODB_URI is required when AUTH_STORE=mongo"))?,
                database: read("AUTH_MONGODB_DB").unwrap_or_else(|| DEFAULT_MONGODB_DB.to_string()),
            },
            other => bail!("unsupported AUTH_STORE: {other} (expected memory|file|sqlite|mongo)"),
        };

        let testing_mode = match read("AUTH_TESTING_MODE") {
            Some(raw) => parse_bool(&raw).with_context(|| "parse AUTH_TESTING_MODE")?,
            None => false,
        };

        Ok(Self {
            addr,
            route_prefix,
            token_secret,
            token_secret_generated,
            store,
            admin_key: read("AUTH_ADMIN_KEY"),
            testing_mode,
        })
    }
}

/// 解析布尔配置。
pub(crate) fn parse_bool(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("invalid boolean value: {other}")),
    }
}

/// 前缀统一为 `/xxx` 形式，去掉末尾 `/`；空前缀表示挂在根路径。
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// 文件存储默认路径。
fn default_store_path(home: Option<String>) -> PathBuf {
    PathBuf::from(home.unwrap_or_else(|| ".".to_string()))
        .join(".config")
        .join("yourconnector")
        .join("authd")
        .join("accounts.json")
}

/// 生成进程级临时签名密钥。
fn generate_token_secret() -> String {
    format!("authd_sk_{}", random_hex(32))
}
