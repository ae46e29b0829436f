//! # Replay Source
//!
//! A [`SensorSource`] that plays back samples recorded by the telemetry
//! recorder, one sample per tick.
//!
//! Blank lines are skipped. Ports missing from a sample read as 0.0 and
//! missing buttons read as released.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::{BrickButton, InputPort, SensorSource, SourceStatus};
use crate::error::{FunkinCtrlError, Result};
use crate::telemetry::types::SensorSample;

/// Plays back a recorded JSONL sample file.
///
/// # Examples
///
/// ```
/// use funkin_ctrl::sensor::replay::ReplaySource;
/// use funkin_ctrl::sensor::{BrickButton, InputPort, SensorSource, SourceStatus};
///
/// let jsonl = r#"{"timestamp":"2021-03-06T17:28:00Z","ports":{"four":36.0},"buttons":{"enter":true}}"#;
/// let mut source = ReplaySource::parse(jsonl)?;
///
/// assert_eq!(source.refresh()?, SourceStatus::Live);
/// assert_eq!(source.read_scalar(InputPort::Four)?, 36.0);
/// assert!(source.read_button(BrickButton::Enter)?);
/// assert_eq!(source.refresh()?, SourceStatus::Ended);
/// # Ok::<(), funkin_ctrl::error::FunkinCtrlError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ReplaySource {
    samples: Vec<SensorSample>,
    cursor: Option<usize>,
}

impl ReplaySource {
    /// Loads every sample from a JSONL file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let source = Self::parse(&contents)?;
        info!(
            "Loaded {} samples for replay from {}",
            source.samples.len(),
            path.display()
        );
        Ok(source)
    }

    /// Parses JSONL text into a replay source.
    pub fn parse(contents: &str) -> Result<Self> {
        let samples = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str::<SensorSample>)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self::from_samples(samples))
    }

    #[must_use]
    pub fn from_samples(samples: Vec<SensorSample>) -> Self {
        Self {
            samples,
            cursor: None,
        }
    }

    /// Number of samples loaded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn current(&self) -> Result<&SensorSample> {
        self.cursor
            .and_then(|i| self.samples.get(i))
            .ok_or_else(|| FunkinCtrlError::Sensor("replay has no current sample".to_string()))
    }
}

impl SensorSource for ReplaySource {
    fn refresh(&mut self) -> Result<SourceStatus> {
        let next = self.cursor.map_or(0, |i| i + 1);
        if next >= self.samples.len() {
            self.cursor = None;
            debug!("Replay finished after {} samples", self.samples.len());
            return Ok(SourceStatus::Ended);
        }
        self.cursor = Some(next);
        Ok(SourceStatus::Live)
    }

    fn read_scalar(&mut self, port: InputPort) -> Result<f32> {
        Ok(self.current()?.port(port).unwrap_or(0.0))
    }

    fn read_button(&mut self, button: BrickButton) -> Result<bool> {
        Ok(self.current()?.buttons.get(button))
    }
}
