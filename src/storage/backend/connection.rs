use std::str::FromStr;
use std::time::Duration;

use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::errors::{Result, ScanlinkerError};
use migration::{Migrator, MigratorTrait};

/// SQLite 等待写锁的时间，超过后返回 `database is locked` 并交给重试逻辑
const SQLITE_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

fn sqlite_options(database_url: &str) -> Result<SqliteConnectOptions> {
    let opt = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| ScanlinkerError::database_config(format!("SQLite URL 解析失败: {}", e)))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(SQLITE_BUSY_TIMEOUT)
        .foreign_keys(true)
        .pragma("cache_size", "-16000")
        .pragma("temp_store", "memory");
    Ok(opt)
}

/// 连接 SQLite 数据库（文件不存在时自动创建）
pub async fn connect_sqlite(database_url: &str) -> Result<DatabaseConnection> {
    use sea_orm::SqlxSqliteConnector;
    use sea_orm::sqlx::SqlitePool;

    let pool = SqlitePool::connect_with(sqlite_options(database_url)?)
        .await
        .map_err(|e| {
            ScanlinkerError::database_connection(format!("无法连接到 SQLite 数据库: {}", e))
        })?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// 连接通用数据库（MySQL/PostgreSQL）
pub async fn connect_generic(database_url: &str, backend_name: &str) -> Result<DatabaseConnection> {
    let config = crate::config::get_config();
    let pool_size = config.database.pool_size.max(1);
    let timeout = Duration::from_secs(config.database.timeout.max(1));

    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(pool_size)
        .min_connections(pool_size.min(2))
        .connect_timeout(timeout)
        .acquire_timeout(timeout)
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(3600))
        .sqlx_logging(false);

    Database::connect(opt).await.map_err(|e| {
        ScanlinkerError::database_connection(format!(
            "无法连接到 {} 数据库: {}",
            backend_name.to_uppercase(),
            e
        ))
    })
}

/// 运行数据库迁移
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .map_err(|e| ScanlinkerError::database_operation(format!("迁移失败: {}", e)))?;

    info!("Database migrations completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_options_accept_plain_path_and_url() {
        assert!(sqlite_options("scanlinker.db").is_ok());
        assert!(sqlite_options("sqlite://data/scans.db?mode=rwc").is_ok());
    }

    #[tokio::test]
    async fn test_connect_sqlite_creates_file_and_migrates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("connect.db");
        let url = format!("sqlite://{}", path.display());

        let db = connect_sqlite(&url).await.unwrap();
        run_migrations(&db).await.unwrap();

        assert!(path.exists());
        // 重复执行迁移应为空操作
        run_migrations(&db).await.unwrap();
    }
}
