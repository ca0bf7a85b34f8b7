pub mod detector;
pub mod filter;
pub mod window;

pub use detector::{detect_beats, detect_steps, heart_rate_bpm};
pub use filter::{apply_filter, FilterMode};
pub use window::{SlidingWindow, WindowTrigger};
