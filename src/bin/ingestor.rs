use std::sync::Arc;

use anyhow::{Result, bail};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use portstream::config::Settings;
use portstream::ingest::{Ingestor, PipelineResult};
use portstream::store::http::HttpPortClient;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::from_env()?;

    let Some(filepath) = settings.ingestor.filepath.clone() else {
        bail!("missing name of the file to process (INGESTOR_FILEPATH)");
    };

    portstream::logging::init(&settings);

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal.cancel();
        }
    });

    let store = Arc::new(HttpPortClient::new(settings.server.base_url()));
    let ingestor = Ingestor::new(store).with_batch_size(settings.ingestor.batch_size);

    info!(app = %settings.app_name, "running ingestor");

    match ingestor.run(&filepath, shutdown).await {
        PipelineResult::Completed => {
            info!("done importing ports data");
            Ok(())
        }
        PipelineResult::Failed(e) => {
            error!(error = %e, "error importing ports data");
            Err(e.into())
        }
        PipelineResult::Cancelled { error: Some(e) } => {
            error!(error = %e, "import cancelled after a failure");
            Err(e.into())
        }
        PipelineResult::Cancelled { error: None } => {
            warn!("import cancelled");
            Ok(())
        }
    }
}
