use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::info;

use portstream::config::Settings;
use portstream::server;
use portstream::store::PortStore;
use portstream::store::memory::MemoryStore;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::from_env()?;
    portstream::logging::init(&settings);

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            signal.cancel();
        }
    });

    let store: Arc<dyn PortStore> = Arc::new(MemoryStore::new());

    info!(app = %settings.app_name, "starting http server");
    server::serve(&settings.server.bind_addr(), store, shutdown).await?;

    Ok(())
}
