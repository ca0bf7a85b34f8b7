use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::watch;

use vitalstream::core::PipelineConfig;
use vitalstream::engine::IngestEngine;
use vitalstream::gateway::Gateway;
use vitalstream::snapshot;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => PipelineConfig::from_json_file(&path)?,
        None => PipelineConfig::default(),
    };

    // Connect and authenticate. Handshake failure is fatal: there is no
    // retry and no automatic reconnect.
    let mut gateway = Gateway::connect(
        &config.host,
        config.port,
        Duration::from_millis(config.read_timeout_ms),
    )
    .await
    .context("failed to reach the data collection server")?;
    gateway
        .authenticate(&config.user_id)
        .await
        .context("authentication handshake failed")?;
    let stream = gateway.into_stream()?;
    log::info!("Successfully connected to the server!");

    let (publisher, mut reader) = snapshot::channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let render_interval = Duration::from_millis(config.render_interval_ms);
    let engine = IngestEngine::new(config, publisher);
    let ingest = tokio::spawn(engine.run(stream, shutdown_rx));

    // Periodic consumer: reads the latest complete snapshot on a fixed
    // cadence, standing in for the plotting surface.
    let mut ticker = tokio::time::interval(render_interval);
    let mut last_rendered = 0u64;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("User interrupt. Quitting...");
                let _ = shutdown_tx.send(true);
                break;
            }
            _ = ticker.tick() => {
                let snap = reader.borrow_and_update().clone();
                if snap.window_index > last_rendered {
                    last_rendered = snap.window_index;
                    log::debug!(
                        "render window {} @ t={:.2}: {} events {:?}",
                        snap.window_index,
                        snap.timestamp,
                        snap.events.len(),
                        snap.events
                    );
                }
            }
        }
    }

    ingest.await.context("ingestion task panicked")??;
    Ok(())
}
