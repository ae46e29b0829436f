//! # Telemetry Module
//!
//! Records polled sensor samples to JSONL files with rotation.
//!
//! This module handles:
//! - The per-tick [`types::SensorSample`] record
//! - Writing records to rotating files (max N records per file)
//! - Retaining only the last M files
//!
//! Recorded files can be fed back through the polling loop with
//! [`crate::sensor::replay::ReplaySource`].

pub mod recorder;
pub mod types;
