//! Telemetry record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::controller::direction::Direction;
use crate::sensor::{ButtonStates, InputPort};

/// One polled tick, as written to a JSONL line.
///
/// # Examples
///
/// ```
/// use funkin_ctrl::sensor::InputPort;
/// use funkin_ctrl::telemetry::types::SensorSample;
///
/// let line = r#"{"timestamp":"2021-03-06T17:28:00Z","ports":{"one":0.0,"four":24.0}}"#;
/// let sample: SensorSample = serde_json::from_str(line)?;
/// assert_eq!(sample.port(InputPort::Four), Some(24.0));
/// assert_eq!(sample.direction, None);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub ports: BTreeMap<InputPort, f32>,

    #[serde(default)]
    pub buttons: ButtonStates,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

impl SensorSample {
    /// Empty sample stamped with the current time.
    #[must_use]
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now(),
            ports: BTreeMap::new(),
            buttons: ButtonStates::default(),
            direction: None,
        }
    }

    /// Reading recorded for a port, if any.
    #[must_use]
    pub fn port(&self, port: InputPort) -> Option<f32> {
        self.ports.get(&port).copied()
    }

    /// Serializes as a single JSON line (no trailing newline).
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
