//! Peak/valley event detection over a filtered window.
//!
//! Both variants walk one extrema list with a lookahead pointer into
//! the opposite list: a candidate extremum only counts as an event when
//! its amplitude clears the threshold AND the upcoming opposite
//! extremum sits on the expected side of the baseline. The alternation
//! check suppresses noise peaks riding on an elevated baseline and
//! double-counting of noisy sub-peaks within one gait/pulse cycle. The
//! pointer advances only on rejection; the walk stops as soon as the
//! lookahead extremum does not exist.

/// Indices of strict local maxima (greater than both neighbors),
/// interior points only, ascending.
pub fn local_maxima(signal: &[f64]) -> Vec<usize> {
    local_extrema(signal, |a, b| a > b)
}

/// Indices of strict local minima, interior points only, ascending.
pub fn local_minima(signal: &[f64]) -> Vec<usize> {
    local_extrema(signal, |a, b| a < b)
}

fn local_extrema(signal: &[f64], beats: impl Fn(f64, f64) -> bool) -> Vec<usize> {
    if signal.len() < 3 {
        return Vec::new();
    }
    (1..signal.len() - 1)
        .filter(|&i| beats(signal[i], signal[i - 1]) && beats(signal[i], signal[i + 1]))
        .collect()
}

/// Step detection on a low-pass filtered magnitude signal.
///
/// A maximum at `i` is a step only if `signal[i] >= mean + threshold`
/// and the lookahead minimum does not exceed the mean (a valley above
/// the mean means the "peak" is noise on an elevated baseline, not a
/// footstrike). Returns indices into `signal`, ascending.
pub fn detect_steps(signal: &[f64], threshold: f64) -> Vec<usize> {
    if signal.is_empty() {
        return Vec::new();
    }
    let mean = signal.iter().sum::<f64>() / signal.len() as f64;
    let maxima = local_maxima(signal);
    let minima = local_minima(signal);

    let mut events = Vec::new();
    let mut j = 0usize;
    for &i in &maxima {
        let Some(&ahead) = minima.get(j + 1) else {
            break;
        };
        if signal[i] < mean + threshold || signal[ahead] > mean {
            j += 1;
        } else {
            events.push(i);
        }
    }
    events
}

/// Beat detection on a high-pass filtered pulse waveform (zero mean).
///
/// Symmetric to step detection with the polarity flipped: a minimum at
/// `i` is a beat only if `signal[i] <= threshold` (threshold is
/// negative) and the lookahead maximum is not below zero. Returns
/// indices into `signal`, ascending.
pub fn detect_beats(signal: &[f64], threshold: f64) -> Vec<usize> {
    if signal.is_empty() {
        return Vec::new();
    }
    let maxima = local_maxima(signal);
    let minima = local_minima(signal);

    let mut events = Vec::new();
    let mut j = 0usize;
    for &i in &minima {
        let Some(&ahead) = maxima.get(j + 1) else {
            break;
        };
        if signal[i] > threshold || signal[ahead] < 0.0 {
            j += 1;
        } else {
            events.push(i);
        }
    }
    events
}

/// Extrapolate a 10-second window's beat count to beats per minute.
pub fn heart_rate_bpm(beat_count: usize) -> f64 {
    beat_count as f64 * 6.0
}
