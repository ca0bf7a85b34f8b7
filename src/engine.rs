use std::collections::HashMap;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::watch;
use tokio::time::timeout;

use crate::core::{PipelineConfig, Sample, SignalVariant};
use crate::decoder::FrameDecoder;
use crate::dsp::{apply_filter, detect_beats, detect_steps, heart_rate_bpm};
use crate::dsp::{SlidingWindow, WindowTrigger};
use crate::snapshot::{SnapshotPublisher, WindowSnapshot};

/// The single-writer ingestion activity.
///
/// Owns the decoder, the per-channel sliding windows, and the trigger;
/// reads the socket with a bounded timeout, pushes decoded samples into
/// the windows, and runs filter + detection synchronously once per
/// triggered window. Per-record and per-window errors are logged and
/// swallowed at this boundary so a malformed frame or a filter edge
/// case never stops the stream. A read timeout is a no-op retry; a
/// closed connection is terminal.
pub struct IngestEngine {
    config: PipelineConfig,
    decoder: FrameDecoder,
    windows: HashMap<String, SlidingWindow>,
    trigger: WindowTrigger,
    publisher: SnapshotPublisher,
    window_index: u64,
    latest_timestamp: f64,
    dropped_seen: u64,
}

impl IngestEngine {
    pub fn new(config: PipelineConfig, publisher: SnapshotPublisher) -> Self {
        let windows = config
            .variant
            .channel_names()
            .iter()
            .map(|name| (name.to_string(), SlidingWindow::new(config.window_size)))
            .collect();

        Self {
            trigger: WindowTrigger::new(config.window_size),
            decoder: FrameDecoder::new(),
            windows,
            publisher,
            window_index: 0,
            latest_timestamp: 0.0,
            dropped_seen: 0,
            config,
        }
    }

    /// Ingest until the stream closes or the shutdown signal fires.
    pub async fn run<R>(mut self, mut stream: R, mut shutdown: watch::Receiver<bool>) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        let read_timeout = Duration::from_millis(self.config.read_timeout_ms);
        let mut buf = [0u8; 1024];

        log::info!(
            "Waiting for incoming data ({:?} variant, window size {})...",
            self.config.variant,
            self.config.window_size
        );

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    log::info!("Shutdown requested. Stopping ingestion.");
                    break;
                }
                read = timeout(read_timeout, stream.read(&mut buf)) => {
                    match read {
                        // No data this tick; retry the same loop iteration.
                        Err(_elapsed) => continue,
                        Ok(Ok(0)) => {
                            log::error!("Server closed the connection. Restart to reconnect.");
                            break;
                        }
                        Ok(Ok(n)) => self.ingest_chunk(&buf[..n]),
                        Ok(Err(e)) => {
                            log::warn!("Socket read error: {}", e);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn ingest_chunk(&mut self, chunk: &[u8]) {
        let samples = self.decoder.feed(chunk);

        let dropped = self.decoder.dropped();
        if dropped > self.dropped_seen {
            log::debug!("{} malformed records dropped so far", dropped);
            self.dropped_seen = dropped;
        }

        for sample in samples {
            if sample.kind != self.config.variant.sensor_kind() {
                continue;
            }
            self.absorb(&sample);
            if self.trigger.tick() {
                if let Err(e) = self.analyze_window() {
                    log::warn!("Window analysis failed: {}", e);
                }
            }
        }
    }

    fn absorb(&mut self, sample: &Sample) {
        self.latest_timestamp = sample.timestamp;
        for (name, window) in self.windows.iter_mut() {
            // Decoded samples of the right kind always carry every
            // channel; a missing one shifts in the zero pad value.
            window.push(sample.channel(name).unwrap_or(0.0));
        }
    }

    fn analyze_window(&mut self) -> Result<()> {
        let raw: HashMap<String, Vec<f64>> = self
            .windows
            .iter()
            .map(|(name, window)| (name.clone(), window.snapshot()))
            .collect();

        let signal = self.derive_signal(&raw)?;
        let filtered = apply_filter(
            &signal,
            self.config.variant.filter_mode(),
            self.config.cutoff_hz(),
            self.config.sample_rate_hz,
            self.config.filter_order,
        )?;

        let (filtered, events, heart_rate) = match self.config.variant {
            SignalVariant::AccelMagnitude => {
                let events = detect_steps(&filtered, self.config.threshold());
                (filtered, events, None)
            }
            SignalVariant::PpgPulse => {
                // High-pass leaves the mean near zero; subtract the
                // residual so the detector's zero baseline is exact.
                let mean = filtered.iter().sum::<f64>() / filtered.len() as f64;
                let centered: Vec<f64> = filtered.iter().map(|v| v - mean).collect();
                let events = detect_beats(&centered, self.config.threshold());
                let bpm = heart_rate_bpm(events.len());
                (centered, events, Some(bpm))
            }
        };

        self.window_index += 1;
        match heart_rate {
            Some(bpm) => log::info!(
                "Window {}: {} beats, heart rate {} BPM",
                self.window_index,
                events.len(),
                bpm
            ),
            None => log::info!("Window {}: {} steps", self.window_index, events.len()),
        }

        self.publisher.publish(WindowSnapshot {
            window_index: self.window_index,
            timestamp: self.latest_timestamp,
            raw,
            filtered,
            events,
            heart_rate_bpm: heart_rate,
        });
        Ok(())
    }

    fn derive_signal(&self, raw: &HashMap<String, Vec<f64>>) -> Result<Vec<f64>> {
        match self.config.variant {
            SignalVariant::AccelMagnitude => {
                let x = raw.get("x").ok_or_else(|| anyhow!("missing x channel"))?;
                let y = raw.get("y").ok_or_else(|| anyhow!("missing y channel"))?;
                let z = raw.get("z").ok_or_else(|| anyhow!("missing z channel"))?;
                Ok(x.iter()
                    .zip(y)
                    .zip(z)
                    .map(|((x, y), z)| (x * x + y * y + z * z).sqrt())
                    .collect())
            }
            SignalVariant::PpgPulse => raw
                .get("value")
                .cloned()
                .ok_or_else(|| anyhow!("missing value channel")),
        }
    }
}
