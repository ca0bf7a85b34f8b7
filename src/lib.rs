pub mod core;
pub mod decoder;
pub mod dsp;
pub mod engine;
pub mod gateway;
pub mod snapshot;

pub use crate::core::{PipelineConfig, Sample, SensorKind, SignalVariant};
