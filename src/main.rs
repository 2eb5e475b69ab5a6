use quickdb::{server, CommandContext, Dispatcher, Engine, ServerConfig};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging (RUST_LOG overrides the default INFO level)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("quickdb starting...");

    let config = ServerConfig::load()?;
    info!(
        "Config: bind={}, list node capacity={}, reply style={:?}, aof={}",
        config.bind_addr,
        config.list_node_capacity,
        config.reply_style,
        if config.aof.enabled { config.aof.path.display().to_string() } else { "off".to_string() },
    );

    let engine = Arc::new(Engine::with_list_node_capacity(config.list_node_capacity));
    let context = CommandContext::with_engine(engine.clone()).with_reply_style(config.reply_style);
    let dispatcher = Arc::new(Dispatcher::with_aof(context, &config.aof)?);

    let stats = engine.stats();
    info!(
        "Tables ready: {} strings, {} hashes, {} lists",
        stats.strings, stats.hashes, stats.lists
    );

    server::run(&config.bind_addr, dispatcher).await
}
