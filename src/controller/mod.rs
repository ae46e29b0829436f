//! # Controller Module
//!
//! Sensor-to-keyboard mapping for the emulated directional controller.
//!
//! This module handles:
//! - Tracking held keys so each press/release is injected once
//! - Bucketing the infrared proximity reading into four directions
//! - Mirroring brick buttons onto confirm/cancel keys

pub mod direction;
pub mod gamepad;
pub mod keys;
pub mod toggle;
