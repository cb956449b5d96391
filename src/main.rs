use anyhow::Context;
use suggestor::config::AppConfig;
use suggestor::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = AppConfig::config_path();
    let config = AppConfig::load_from(&config_path)?;

    if std::env::args().skip(1).any(|a| a == "--print-config") {
        println!("{}", config.to_toml().context("failed to render configuration")?);
        return Ok(());
    }

    let _log_guards = suggestor::core::logging::init(&config.logging);
    log::info!("{} v{} starting", suggestor::NAME, suggestor::VERSION);
    log::info!("Loaded {}", AppConfig::describe_source(&config_path));

    let state = server::build_state(&config).context("failed to initialize service")?;

    let addr = config.service.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    server::serve(listener, state, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
