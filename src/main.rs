use tracing_subscriber::EnvFilter;
use trivia_api_lib::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    // RUST_LOG 优先；否则使用配置中的级别，并压低 hyper 的日志
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},hyper=warn", config.log_level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    trivia_api_lib::run(config).await
}
