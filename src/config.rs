use anyhow::Context;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::core::synthesizer::SpliceMode;

/// 数据库连接相关设置
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub database_url: String,
    pub max_connections: u32,
    /// 建立连接和从连接池取连接的等待上限
    pub connect_timeout: Duration,
    /// 每个新连接上执行 `SET SESSION group_concat_max_len`，避免多值聚合被截断
    pub group_concat_max_len: u64,
    /// 轨道天体候选列表的缓存时长
    pub orbiting_body_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub splice_mode: SpliceMode,
    pub store: StoreSettings,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            database_url: "mysql://root@localhost:3306/project_1".to_string(),
            max_connections: 5,
            connect_timeout: Duration::from_secs(5),
            group_concat_max_len: 100_000,
            orbiting_body_ttl: Duration::from_secs(3600),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            splice_mode: SpliceMode::Compatible,
            store: StoreSettings::default(),
        }
    }
}

impl AppConfig {
    /// 从环境变量 (以及可选的 .env) 读取配置
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let database_url = match env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => assemble_mysql_url(
                &env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
                parse_var("DB_PORT", 3306u16)?,
                &env::var("DB_USER").unwrap_or_else(|_| "root".to_string()),
                env::var("DB_PASSWORD").ok().as_deref(),
                &env::var("DB_NAME").unwrap_or_else(|_| "project_1".to_string()),
            ),
        };

        Ok(Self {
            bind_addr: parse_var("BIND_ADDR", defaults.bind_addr)?,
            splice_mode: parse_var("SPLICE_MODE", defaults.splice_mode)?,
            store: StoreSettings {
                database_url,
                max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.store.max_connections)?,
                connect_timeout: Duration::from_secs(parse_var(
                    "DB_CONNECT_TIMEOUT_SECS",
                    defaults.store.connect_timeout.as_secs(),
                )?),
                group_concat_max_len: parse_var(
                    "GROUP_CONCAT_MAX_LEN",
                    defaults.store.group_concat_max_len,
                )?,
                orbiting_body_ttl: Duration::from_secs(parse_var(
                    "ORBITING_BODY_TTL_SECS",
                    defaults.store.orbiting_body_ttl.as_secs(),
                )?),
            },
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("invalid value for {name}: {raw:?}")),
        Err(_) => Ok(default),
    }
}

fn assemble_mysql_url(
    host: &str,
    port: u16,
    user: &str,
    password: Option<&str>,
    database: &str,
) -> String {
    match password {
        Some(pw) if !pw.is_empty() => format!("mysql://{user}:{pw}@{host}:{port}/{database}"),
        _ => format!("mysql://{user}@{host}:{port}/{database}"),
    }
}
