use crate::core::{Sample, SensorKind};
use serde::Deserialize;
use serde_json::Value;

/// One wire record: newline-delimited JSON with a sensor type tag and a
/// kind-specific data object.
#[derive(Debug, Deserialize)]
struct WireRecord {
    sensor_type: String,
    data: Value,
}

#[derive(Debug, Deserialize)]
struct AccelData {
    t: f64,
    x: f64,
    y: f64,
    z: f64,
}

#[derive(Debug, Deserialize)]
struct PpgData {
    t: f64,
    value: f64,
}

/// Splits raw byte chunks into newline-delimited records and parses
/// them into typed samples.
///
/// A chunk may end mid-record, so the decoder keeps the unparsed tail
/// and prepends it to the first piece of the next chunk. Each piece is
/// parsed independently; a piece that fails to parse becomes the new
/// remainder on the assumption that it is an incomplete tail. This
/// means a malformed record in the middle of a chunk is dropped without
/// being reported — a known weakness of the wire protocol handling,
/// kept as-is. Drops are counted so the ingestion loop can surface them.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    remainder: String,
    dropped: u64,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Malformed records dropped so far (middle-of-chunk parse failures).
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Sample> {
        let text = String::from_utf8_lossy(chunk);
        let pieces: Vec<&str> = text.split('\n').collect();
        let last = pieces.len() - 1;

        let mut samples = Vec::new();
        for (idx, piece) in pieces.into_iter().enumerate() {
            let record = if idx == 0 {
                let mut joined = std::mem::take(&mut self.remainder);
                joined.push_str(piece);
                joined
            } else {
                piece.to_string()
            };

            match serde_json::from_str::<WireRecord>(record.trim()) {
                Ok(wire) => {
                    self.remainder.clear();
                    if let Some(sample) = Self::dispatch(wire) {
                        samples.push(sample);
                    }
                }
                Err(_) => {
                    // Assume an incomplete tail and wait for the rest.
                    // A failed piece that is not the final piece of the
                    // chunk was a whole record and is silently lost.
                    if idx != last && !record.trim().is_empty() {
                        self.dropped += 1;
                    }
                    self.remainder = record;
                }
            }
        }
        samples
    }

    fn dispatch(wire: WireRecord) -> Option<Sample> {
        let kind = SensorKind::from_wire_name(&wire.sensor_type)?;
        match kind {
            SensorKind::Accel => {
                let data: AccelData = serde_json::from_value(wire.data).ok()?;
                Some(
                    Sample::new(data.t, kind)
                        .with_channel("x", data.x)
                        .with_channel("y", data.y)
                        .with_channel("z", data.z),
                )
            }
            SensorKind::Ppg => {
                let data: PpgData = serde_json::from_value(wire.data).ok()?;
                Some(Sample::new(data.t, kind).with_channel("value", data.value))
            }
        }
    }
}
