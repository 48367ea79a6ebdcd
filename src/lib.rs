// Trivia API library entry
// 提供 run() 供 bin 目标调用；存储、随机源在这里装配后注入 TriviaApi。

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod http;
pub mod models;
pub mod pagination;
pub mod quiz;
pub mod search;
pub mod storage;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::config::{AppConfig, StorageBackend};
use crate::database::seed::{seed_store, SeedConfig};
use crate::database::TriviaDatabase;
use crate::handlers::TriviaApi;
use crate::http::ServerState;
use crate::quiz::{RandomSource, SeededRandom, ThreadRandom};
use crate::storage::{MemoryQuestionStore, QuestionStore, SqliteQuestionStore};

/// 按配置创建存储并执行播种
pub fn build_store(config: &AppConfig) -> Result<Arc<dyn QuestionStore>> {
    let seed_config = SeedConfig {
        create_default_categories: config.seed_default_categories,
        create_sample_questions: config.seed_sample_questions,
    };

    let store: Arc<dyn QuestionStore> = match config.storage {
        StorageBackend::Sqlite => {
            let db = if config.uses_memory_database() {
                TriviaDatabase::new_in_memory()
            } else {
                TriviaDatabase::new(&config.database_path)
            }
            .context("初始化题库数据库失败")?;
            let store = SqliteQuestionStore::new(Arc::new(db));
            seed_store(&store, &seed_config).context("题库播种失败")?;
            Arc::new(store)
        }
        StorageBackend::Memory => {
            let store = MemoryQuestionStore::new();
            seed_store(&store, &seed_config).context("题库播种失败")?;
            Arc::new(store)
        }
    };

    info!("[Trivia] Storage backend ready: {:?}", config.storage);
    Ok(store)
}

pub fn build_api(config: &AppConfig) -> Result<TriviaApi> {
    let store = build_store(config)?;
    let random: Arc<dyn RandomSource> = match config.quiz_seed {
        Some(seed) => Arc::new(SeededRandom::new(seed)),
        None => Arc::new(ThreadRandom),
    };
    Ok(TriviaApi::new(store, random))
}

/// 启动 HTTP 服务，Ctrl-C 后优雅退出并释放存储
pub async fn run(config: AppConfig) -> Result<()> {
    let addr = config.socket_addr()?;
    let api = Arc::new(build_api(&config)?);
    let state = Arc::new(ServerState::new(
        api,
        &config.allowed_origin,
        config.max_body_bytes,
    ));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("[Trivia] Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("[Trivia] Shutdown signal received");
    };

    http::serve(addr, state, shutdown).await
}
