use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sensor kinds recognized on the wire. Records carrying any other
/// `sensor_type` string parse fine but are never dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    Accel,
    Ppg,
}

impl SensorKind {
    /// Wire name as sent by the data collection server.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Accel => "SENSOR_ACCEL",
            Self::Ppg => "SENSOR_PPG",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Self> {
        match name {
            "SENSOR_ACCEL" => Some(Self::Accel),
            "SENSOR_PPG" => Some(Self::Ppg),
            _ => None,
        }
    }
}

/// One decoded sensor reading: timestamp plus named channel values.
/// Immutable once created; consumed by the sliding window buffers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    /// Timestamp in seconds as reported by the sensor.
    pub timestamp: f64,

    pub kind: SensorKind,

    /// Channel values keyed by channel name ("x"/"y"/"z" or "value").
    pub channels: HashMap<String, f64>,
}

impl Sample {
    pub fn new(timestamp: f64, kind: SensorKind) -> Self {
        Self {
            timestamp,
            kind,
            channels: HashMap::new(),
        }
    }

    pub fn with_channel(mut self, name: &str, value: f64) -> Self {
        self.channels.insert(name.to_string(), value);
        self
    }

    pub fn channel(&self, name: &str) -> Option<f64> {
        self.channels.get(name).copied()
    }
}
