use anyhow::Context;
use clap::Parser;
use log::{info, LevelFilter};
use postrender::config::Args;
use postrender::server::{self, AppState};
use postrender::store::FileStore;
use postrender::RenderPool;
use simple_logger::SimpleLogger;

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down gracefully..."),
        _ = terminate => info!("Received SIGTERM, shutting down gracefully..."),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .with_module_level("postrender", args.log_level)
        .init()
        .context("Failed to install logger")?;

    let server_config = args.server_config()?;
    let render_config = args.render_config()?;

    let store = FileStore::open(&server_config.public_dir).await?;
    let renderer = postrender::new_renderer(render_config.clone())?;
    let pool = RenderPool::new(renderer, &render_config)?;

    let app = server::router(AppState::new(store, pool, &server_config));

    let listener = tokio::net::TcpListener::bind(server_config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", server_config.bind))?;
    info!(
        "Server is running on {} (public dir {}, {} render workers)",
        listener.local_addr()?,
        server_config.public_dir.display(),
        render_config.workers
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
