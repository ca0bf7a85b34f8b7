pub mod config;
pub mod sample;

pub use config::{PipelineConfig, SignalVariant};
pub use sample::{Sample, SensorKind};
