//! 题库数据库管理模块
//!
//! 提供题库的 SQLite 数据库初始化和连接池管理。
//!
//! ## 设计原则
//! - **连接池管理**：使用 r2d2 管理连接池，进程启动时创建、退出时释放
//! - **软关联**：`questions.category` 不加外键，允许指向不存在的分类
//! - **id 稳定**：`AUTOINCREMENT` 保证删除后的 id 不会被复用
//! - **统一匹配规则**：每个连接注册 `contains_ci` 标量函数，搜索走 `search::matches`

pub mod seed;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{TriviaError, TriviaResult};
use crate::search;

/// SQLite 连接池类型
pub type TriviaPool = Pool<SqliteConnectionManager>;

/// SQLite 池化连接类型
pub type TriviaPooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id   INTEGER PRIMARY KEY,
    type TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS questions (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    question   TEXT NOT NULL,
    answer     TEXT NOT NULL,
    category   INTEGER NOT NULL,
    difficulty INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_questions_category ON questions(category);
"#;

/// 题库数据库
pub struct TriviaDatabase {
    pool: TriviaPool,
    /// `None` 表示内存数据库
    db_path: Option<PathBuf>,
}

impl TriviaDatabase {
    /// 打开（必要时创建）磁盘数据库并执行 schema 初始化
    pub fn new(db_path: &Path) -> TriviaResult<Self> {
        info!(
            "[Trivia::Database] Opening database: {}",
            db_path.display()
        );

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                TriviaError::storage(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            // 写锁等待上限，避免无界阻塞
            conn.pragma_update(None, "busy_timeout", 5000i64)?;
            register_functions(conn)
        });

        let pool = Pool::builder()
            .max_size(8)
            .min_idle(Some(1))
            .connection_timeout(Duration::from_secs(5))
            .build(manager)
            .map_err(|e| TriviaError::storage(format!("Failed to create connection pool: {}", e)))?;

        let db = Self {
            pool,
            db_path: Some(db_path.to_path_buf()),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// 内存数据库：单连接池，所有请求共享同一个库
    pub fn new_in_memory() -> TriviaResult<Self> {
        let manager = SqliteConnectionManager::memory().with_init(|conn| register_functions(conn));
        let pool = Pool::builder()
            .max_size(1)
            .connection_timeout(Duration::from_secs(5))
            .build(manager)
            .map_err(|e| TriviaError::storage(format!("Failed to create memory pool: {}", e)))?;

        let db = Self {
            pool,
            db_path: None,
        };
        db.init_schema()?;
        Ok(db)
    }

    /// 获取数据库连接
    pub fn get_conn(&self) -> TriviaResult<TriviaPooledConnection> {
        Ok(self.pool.get()?)
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn init_schema(&self) -> TriviaResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(SCHEMA)?;
        debug!("[Trivia::Database] Schema ready");
        Ok(())
    }
}

/// 注册应用自定义 SQL 函数
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "contains_ci",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let haystack = ctx.get::<String>(0)?;
            let needle = ctx.get::<String>(1)?;
            Ok(search::matches(&haystack, &needle))
        },
    )
}
