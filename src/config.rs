//! 服务配置
//!
//! 加载顺序（后者覆盖前者）：内置默认值 → `config/trivia.toml`（可选）→
//! 环境变量 `TRIVIA__*`（如 `TRIVIA__BIND_ADDR=0.0.0.0:8080`）。
//! `.env` 文件在读取环境变量前加载。

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "config/trivia.toml";

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// SQLite（`database_path = ":memory:"` 时使用内存库）
    Sqlite,
    /// 进程内存，不落盘
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub storage: StorageBackend,
    pub database_path: PathBuf,
    pub seed_default_categories: bool,
    pub seed_sample_questions: bool,
    pub allowed_origin: String,
    pub max_body_bytes: usize,
    pub log_level: String,
    /// 设置后问答抽题序列可复现
    pub quiz_seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
            storage: StorageBackend::Sqlite,
            database_path: PathBuf::from("data/trivia.db"),
            seed_default_categories: true,
            seed_sample_questions: false,
            allowed_origin: "*".to_string(),
            max_body_bytes: 64 * 1024,
            log_level: "info".to_string(),
            quiz_seed: None,
        }
    }
}

impl AppConfig {
    /// 从 `.env`、默认配置文件和环境变量加载
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// 从指定配置文件（不存在则跳过）和环境变量加载
    pub fn load_from(file: &Path) -> Result<Self> {
        Self::load_with_env(file, None)
    }

    /// `env` 为 `None` 时读取进程环境变量
    fn load_with_env(file: &Path, env: Option<config::Map<String, String>>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if file.exists() {
            builder = builder.add_source(config::File::from(file));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("TRIVIA")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let loaded = builder
            .build()
            .with_context(|| format!("加载配置失败: {}", file.display()))?;
        let config: AppConfig = loaded
            .try_deserialize()
            .context("配置格式错误")?;
        config.validate()?;
        Ok(config)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_addr
            .parse()
            .with_context(|| format!("解析 bind_addr 失败: {}", self.bind_addr))
    }

    pub fn uses_memory_database(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }

    fn validate(&self) -> Result<()> {
        self.socket_addr()?;
        if self.max_body_bytes == 0 {
            anyhow::bail!("max_body_bytes must be greater than 0");
        }
        Ok(())
    }
}
