/// Fixed-capacity, time-ordered window of the most recent K values for
/// one channel. Zero-padded at startup so its length is always exactly
/// K; a push shifts every older value one position toward eviction and
/// drops the oldest. Index 0 is always the newest value.
///
/// The live buffer is never handed out: consumers get copies via
/// `snapshot`, so a concurrent reader can never observe a mid-shift
/// state through this type.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    values: Vec<f64>,
}

impl SlidingWindow {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be non-zero");
        Self {
            values: vec![0.0; capacity],
        }
    }

    /// Shift-in at the head, dropping the tail. O(K), acceptable for
    /// the small window sizes used here (K = 250).
    pub fn push(&mut self, value: f64) {
        self.values.rotate_right(1);
        self.values[0] = value;
    }

    /// Copy of the window, newest first.
    pub fn snapshot(&self) -> Vec<f64> {
        self.values.clone()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Countdown that fires exactly once every K ingested samples,
/// decoupling high-frequency ingestion from batch analysis. Cadence is
/// sample-count based, not time based, so analysis tracks the actual
/// sensor rate.
#[derive(Debug)]
pub struct WindowTrigger {
    remaining: usize,
    window_size: usize,
}

impl WindowTrigger {
    pub fn new(window_size: usize) -> Self {
        assert!(window_size > 0, "window size must be non-zero");
        Self {
            remaining: window_size,
            window_size,
        }
    }

    /// Count one sample. Returns true when a full window has arrived.
    pub fn tick(&mut self) -> bool {
        self.remaining -= 1;
        if self.remaining == 0 {
            self.remaining = self.window_size;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_invariant_under_pushes() {
        let mut window = SlidingWindow::new(8);
        assert_eq!(window.len(), 8);
        for i in 0..100 {
            window.push(i as f64);
            assert_eq!(window.len(), 8);
        }
    }

    #[test]
    fn test_zero_padded_at_startup() {
        let window = SlidingWindow::new(4);
        assert_eq!(window.snapshot(), vec![0.0; 4]);
    }

    #[test]
    fn test_snapshot_is_reverse_chronological() {
        let mut window = SlidingWindow::new(4);
        for v in [1.0, 2.0, 3.0, 4.0] {
            window.push(v);
        }
        assert_eq!(window.snapshot(), vec![4.0, 3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_oldest_value_evicted_after_k_pushes() {
        let mut window = SlidingWindow::new(3);
        window.push(99.0);
        for v in [1.0, 2.0, 3.0] {
            window.push(v);
        }
        assert!(!window.snapshot().contains(&99.0));
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut window = SlidingWindow::new(2);
        window.push(5.0);
        let snap = window.snapshot();
        window.push(6.0);
        assert_eq!(snap, vec![5.0, 0.0]);
    }

    #[test]
    fn test_trigger_fires_once_per_window() {
        let mut trigger = WindowTrigger::new(250);
        let mut fires = 0;
        for _ in 0..750 {
            if trigger.tick() {
                fires += 1;
            }
        }
        assert_eq!(fires, 3);
    }

    #[test]
    fn test_trigger_fires_on_the_kth_sample() {
        let mut trigger = WindowTrigger::new(3);
        assert!(!trigger.tick());
        assert!(!trigger.tick());
        assert!(trigger.tick());
        assert!(!trigger.tick());
    }
}
