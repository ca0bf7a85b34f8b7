use anyhow::{bail, Result};
use sci_rs::signal::filter::design::{
    butter_dyn, DigitalFilter, FilterBandType, FilterOutputType, SosFormatFilter,
};
use sci_rs::signal::filter::sosfiltfilt_dyn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Lowpass,
    Highpass,
}

impl FilterMode {
    fn band_type(&self) -> FilterBandType {
        match self {
            Self::Lowpass => FilterBandType::Lowpass,
            Self::Highpass => FilterBandType::Highpass,
        }
    }
}

/// Zero-phase Butterworth filter over one window snapshot.
///
/// The filter is designed fresh per call (cheap at K = 250) and applied
/// forward-backward so peak positions stay time-aligned with the raw
/// signal. Startup windows that are still partially zero-padded go
/// through unchanged semantics: zeros in, near-zeros out.
pub fn apply_filter(
    signal: &[f64],
    mode: FilterMode,
    cutoff_hz: f64,
    sample_rate_hz: f64,
    order: usize,
) -> Result<Vec<f64>> {
    let nyquist = 0.5 * sample_rate_hz;
    if cutoff_hz <= 0.0 || cutoff_hz >= nyquist {
        bail!(
            "cutoff {} Hz outside (0, {}) for sample rate {} Hz",
            cutoff_hz,
            nyquist,
            sample_rate_hz
        );
    }

    // Forward-backward filtering pads the signal at both ends; windows
    // shorter than the pad cannot be filtered and pass through raw.
    if signal.len() < 4 * (order + 1) {
        return Ok(signal.to_vec());
    }

    let filter = butter_dyn(
        order,
        vec![cutoff_hz],
        Some(mode.band_type()),
        Some(false),
        Some(FilterOutputType::Sos),
        Some(sample_rate_hz),
    );
    let DigitalFilter::Sos(SosFormatFilter { sos }) = filter else {
        bail!("Butterworth design did not produce second-order sections");
    };

    Ok(sosfiltfilt_dyn(signal.iter(), &sos))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq_hz: f64, sample_rate_hz: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * freq_hz * i as f64 / sample_rate_hz).sin())
            .collect()
    }

    #[test]
    fn test_zero_padded_window_stays_zero() {
        let zeros = vec![0.0; 250];
        let filtered = apply_filter(&zeros, FilterMode::Lowpass, 2.2, 50.0, 5).unwrap();
        assert_eq!(filtered.len(), 250);
        assert!(filtered.iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn test_lowpass_passes_slow_component() {
        // 0.5 Hz is far below the 2.2 Hz cutoff: amplitude survives.
        let signal = sine(0.5, 50.0, 250);
        let filtered = apply_filter(&signal, FilterMode::Lowpass, 2.2, 50.0, 5).unwrap();
        let peak = filtered.iter().cloned().fold(f64::MIN, f64::max);
        assert!(peak > 0.9, "passband peak was {}", peak);
    }

    #[test]
    fn test_lowpass_attenuates_fast_component() {
        // 10 Hz is far above the 2.2 Hz cutoff: amplitude collapses.
        let signal = sine(10.0, 50.0, 250);
        let filtered = apply_filter(&signal, FilterMode::Lowpass, 2.2, 50.0, 5).unwrap();
        let peak = filtered.iter().cloned().fold(f64::MIN, f64::max);
        assert!(peak < 0.05, "stopband peak was {}", peak);
    }

    #[test]
    fn test_highpass_removes_dc_bias() {
        let signal: Vec<f64> = sine(8.0, 50.0, 250).iter().map(|v| v + 240.0).collect();
        let filtered = apply_filter(&signal, FilterMode::Highpass, 3.0, 50.0, 5).unwrap();
        let interior = &filtered[25..225];
        let mean = interior.iter().sum::<f64>() / interior.len() as f64;
        assert!(mean.abs() < 0.1, "residual bias was {}", mean);
    }

    #[test]
    fn test_short_window_passes_through() {
        let short = vec![1.0; 10];
        let filtered = apply_filter(&short, FilterMode::Lowpass, 2.2, 50.0, 5).unwrap();
        assert_eq!(filtered, short);
    }

    #[test]
    fn test_rejects_cutoff_beyond_nyquist() {
        let signal = vec![0.0; 250];
        assert!(apply_filter(&signal, FilterMode::Lowpass, 30.0, 50.0, 5).is_err());
    }
}
