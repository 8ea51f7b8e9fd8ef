use sqlx::{
    mysql::{MySqlConnectOptions, MySqlConnection, MySqlPoolOptions},
    Connection, Executor, MySqlPool,
};
use std::str::FromStr;
use std::time::Instant;
use tokio::sync::{OnceCell, RwLock};
use tracing::{info, instrument, warn};

use crate::config::StoreSettings;
use crate::core::catalog::ORBITING_BODIES_QUERY;
use crate::error::AppError;
use crate::infra::utils::mysql_rows_to_table;
use crate::models::session::ResultTable;

/// 近地小行星数据库。连接池在首次使用时建立，整个进程共享。
pub struct AsteroidStore {
    settings: StoreSettings,
    pool: OnceCell<MySqlPool>,
    orbiting_bodies: RwLock<Option<(Instant, Vec<String>)>>,
}

impl AsteroidStore {
    pub fn new(settings: StoreSettings) -> Self {
        Self {
            settings,
            pool: OnceCell::new(),
            orbiting_bodies: RwLock::new(None),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.pool.initialized()
    }

    /// 取得连接池，必要时建立连接。失败不重试，直接作为连接错误返回。
    pub async fn pool(&self) -> Result<&MySqlPool, AppError> {
        self.pool
            .get_or_try_init(|| async {
                let options = MySqlConnectOptions::from_str(&self.settings.database_url)
                    .map_err(|e| AppError::Connectivity(e.to_string()))?;
                let timeout = self.settings.connect_timeout;

                // 连接池在 acquire_timeout 内会静默重试，先直连一次拿到驱动的原始错误
                let first = tokio::time::timeout(timeout, MySqlConnection::connect_with(&options))
                    .await
                    .map_err(|_| {
                        AppError::Connectivity(format!("connection attempt timed out after {timeout:?}"))
                    })?
                    .map_err(|e| AppError::Connectivity(e.to_string()))?;
                if let Err(e) = first.close().await {
                    warn!("关闭初始连接失败: {}", e);
                }

                let concat_len = self.settings.group_concat_max_len;
                let pool = MySqlPoolOptions::new()
                    .max_connections(self.settings.max_connections)
                    .acquire_timeout(timeout)
                    .after_connect(move |conn, _meta| {
                        Box::pin(async move {
                            let stmt = format!("SET SESSION group_concat_max_len = {concat_len}");
                            conn.execute(stmt.as_str()).await?;
                            Ok(())
                        })
                    })
                    .connect_with(options)
                    .await
                    .map_err(|e| AppError::Connectivity(e.to_string()))?;
                info!(
                    "MySQL 连接池已建立: max_connections={}, group_concat_max_len={}",
                    self.settings.max_connections, concat_len
                );
                Ok::<_, AppError>(pool)
            })
            .await
    }

    /// 原样执行生成的 SQL，返回有序结果表
    #[instrument(skip(self, sql), fields(sql_len = sql.len()))]
    pub async fn fetch_table(&self, sql: &str) -> Result<ResultTable, AppError> {
        let pool = self.pool().await?;
        let rows = sqlx::query(sql)
            .persistent(false)
            .fetch_all(pool)
            .await
            .map_err(|e| execution_error(e, sql))?;
        info!("查询完成，返回 {} 行", rows.len());
        Ok(mysql_rows_to_table(&rows))
    }

    /// 单值计数查询 (过滤摘要)
    #[instrument(skip(self, sql))]
    pub async fn fetch_count(&self, sql: &str) -> Result<i64, AppError> {
        let pool = self.pool().await?;
        sqlx::query_scalar::<_, i64>(sql)
            .persistent(false)
            .fetch_one(pool)
            .await
            .map_err(|e| execution_error(e, sql))
    }

    /// 轨道天体候选值，带 TTL 缓存。查询失败时记录日志并返回空列表。
    pub async fn orbiting_bodies(&self) -> Vec<String> {
        {
            let cache = self.orbiting_bodies.read().await;
            if let Some((fetched_at, bodies)) = cache.as_ref() {
                if fetched_at.elapsed() < self.settings.orbiting_body_ttl {
                    return bodies.clone();
                }
            }
        }

        match self.load_orbiting_bodies().await {
            Ok(bodies) => {
                let mut cache = self.orbiting_bodies.write().await;
                *cache = Some((Instant::now(), bodies.clone()));
                info!("轨道天体列表已刷新: {} 项", bodies.len());
                bodies
            }
            Err(e) => {
                warn!("获取轨道天体失败: {}", e);
                Vec::new()
            }
        }
    }

    async fn load_orbiting_bodies(&self) -> Result<Vec<String>, AppError> {
        let pool = self.pool().await?;
        sqlx::query_scalar::<_, String>(ORBITING_BODIES_QUERY)
            .fetch_all(pool)
            .await
            .map_err(|e| execution_error(e, ORBITING_BODIES_QUERY))
    }
}

fn execution_error(err: sqlx::Error, sql: &str) -> AppError {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            AppError::Connectivity(err.to_string())
        }
        other => {
            warn!("SQL 执行失败: {}\n{}", other, sql);
            AppError::Execution {
                message: other.to_string(),
                sql: sql.to_string(),
            }
        }
    }
}
