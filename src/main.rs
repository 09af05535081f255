use std::sync::Arc;
use tokio::sync::Notify;

mod config;
mod handler;
mod http;
mod logger;
mod registry;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;

    logger::init(&cfg)?;
    logger::log_banner();

    // The registry is built before any listener exists; a bad mock file ends
    // the process here
    let registry = registry::load_from_file(&cfg.mock.file, cfg.mock.empty_response_is_absent)
        .inspect_err(|e| logger::log_error(&e.to_string()))?;
    logger::log_mock_loaded(&cfg.mock.file, &registry);

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg, registry))
}

async fn async_main(
    cfg: config::Config,
    registry: registry::ResponseRegistry,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr).inspect_err(|e| {
        logger::log_error(&format!("Failed to bind {addr}: {e}"));
    })?;

    logger::log_server_start(&addr, &cfg);

    let state = Arc::new(config::AppState::new(cfg, registry));
    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown));

    server::start_server_loop(listener, state, shutdown).await;
    Ok(())
}
