use std::collections::HashMap;
use tokio::sync::watch;

/// Everything the periodic renderer needs from one analyzed window,
/// published as a single immutable value so a reader can never observe
/// a raw buffer from one window paired with events from another.
#[derive(Debug, Clone, Default)]
pub struct WindowSnapshot {
    /// Monotonic count of analyzed windows; 0 means "nothing yet".
    pub window_index: u64,

    /// Timestamp of the newest sample in the window.
    pub timestamp: f64,

    /// Raw window per channel, newest first.
    pub raw: HashMap<String, Vec<f64>>,

    /// Zero-phase filtered analysis signal, newest first.
    pub filtered: Vec<f64>,

    /// Detected event indices into `filtered`, ascending.
    pub events: Vec<usize>,

    /// Extrapolated heart rate; only set by the pulse variant.
    pub heart_rate_bpm: Option<f64>,
}

/// Write half, owned by the ingestion loop (the sole writer).
pub struct SnapshotPublisher {
    tx: watch::Sender<WindowSnapshot>,
}

/// Read half for the periodic consumer. `watch` hands out the latest
/// complete value; a borrow never tears across a publish.
pub type SnapshotReader = watch::Receiver<WindowSnapshot>;

/// Create a publisher/reader pair seeded with an empty snapshot so the
/// consumer has something coherent to read before the first window
/// fires.
pub fn channel() -> (SnapshotPublisher, SnapshotReader) {
    let (tx, rx) = watch::channel(WindowSnapshot::default());
    (SnapshotPublisher { tx }, rx)
}

impl SnapshotPublisher {
    pub fn publish(&self, snapshot: WindowSnapshot) {
        // Ignore the error case: all readers gone just means nobody is
        // rendering right now, which must not stop ingestion.
        let _ = self.tx.send(snapshot);
    }
}
