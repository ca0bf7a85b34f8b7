use crate::core::SensorKind;
use crate::dsp::filter::FilterMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Which physiological signal the pipeline extracts events from.
///
/// One pipeline serves both variants; only the signal derivation,
/// filter parameterization, and detector polarity differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalVariant {
    /// Accelerometer magnitude sqrt(x² + y² + z²), low-pass filtered to
    /// isolate the step cadence band. Events are footstrikes.
    AccelMagnitude,
    /// PPG waveform, high-pass filtered to remove baseline drift.
    /// Events are heartbeats.
    PpgPulse,
}

impl SignalVariant {
    pub fn sensor_kind(&self) -> SensorKind {
        match self {
            Self::AccelMagnitude => SensorKind::Accel,
            Self::PpgPulse => SensorKind::Ppg,
        }
    }

    pub fn channel_names(&self) -> &'static [&'static str] {
        match self {
            Self::AccelMagnitude => &["x", "y", "z"],
            Self::PpgPulse => &["value"],
        }
    }

    pub fn filter_mode(&self) -> FilterMode {
        match self {
            Self::AccelMagnitude => FilterMode::Lowpass,
            Self::PpgPulse => FilterMode::Highpass,
        }
    }
}

/// Pipeline tuning knobs. Defaults match the data collection server:
/// 50 Hz sensors streamed into 250-sample (10 s) analysis windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Data collection server address.
    pub host: String,
    pub port: u16,

    /// Credential sent during the handshake.
    pub user_id: String,

    pub variant: SignalVariant,

    /// Analysis window size K in samples.
    pub window_size: usize,

    /// Sensor sample rate in Hz.
    pub sample_rate_hz: f64,

    /// Butterworth filter order.
    pub filter_order: usize,

    /// Low-pass cutoff for the step cadence band (AccelMagnitude).
    pub lowpass_cutoff_hz: f64,

    /// High-pass cutoff for baseline drift removal (PpgPulse).
    pub highpass_cutoff_hz: f64,

    /// A maximum counts as a step only at mean + this amplitude.
    pub step_threshold: f64,

    /// A minimum counts as a beat only below this amplitude (mean is
    /// zero after high-pass filtering).
    pub pulse_threshold: f64,

    /// Socket read timeout; expiry is a no-op retry, not an error.
    pub read_timeout_ms: u64,

    /// Cadence of the periodic snapshot consumer.
    pub render_interval_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            host: "none.cs.umass.edu".to_string(),
            port: 8888,
            user_id: "Potassium".to_string(),
            variant: SignalVariant::AccelMagnitude,
            window_size: 250,
            sample_rate_hz: 50.0,
            filter_order: 5,
            lowpass_cutoff_hz: 2.2,
            highpass_cutoff_hz: 3.0,
            step_threshold: 1.0,
            pulse_threshold: -0.1,
            read_timeout_ms: 1000,
            render_interval_ms: 20,
        }
    }
}

impl PipelineConfig {
    pub fn from_json(config: Value) -> Result<Self> {
        serde_json::from_value(config).context("invalid pipeline config")
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("failed to read config file {}", path.as_ref().display())
        })?;
        Self::from_json(serde_json::from_str(&text)?)
    }

    /// Cutoff frequency for the active variant's filter.
    pub fn cutoff_hz(&self) -> f64 {
        match self.variant {
            SignalVariant::AccelMagnitude => self.lowpass_cutoff_hz,
            SignalVariant::PpgPulse => self.highpass_cutoff_hz,
        }
    }

    /// Amplitude threshold for the active variant's detector.
    pub fn threshold(&self) -> f64 {
        match self.variant {
            SignalVariant::AccelMagnitude => self.step_threshold,
            SignalVariant::PpgPulse => self.pulse_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_server_parameters() {
        let config = PipelineConfig::default();
        assert_eq!(config.window_size, 250);
        assert_eq!(config.sample_rate_hz, 50.0);
        assert_eq!(config.filter_order, 5);
        assert_eq!(config.cutoff_hz(), 2.2);
    }

    #[test]
    fn test_partial_json_overrides_defaults() {
        let config = PipelineConfig::from_json(serde_json::json!({
            "user_id": "alice",
            "variant": "PpgPulse",
            "window_size": 100
        }))
        .unwrap();

        assert_eq!(config.user_id, "alice");
        assert_eq!(config.window_size, 100);
        assert_eq!(config.cutoff_hz(), 3.0);
        assert_eq!(config.threshold(), -0.1);
        // untouched defaults survive
        assert_eq!(config.port, 8888);
    }
}
