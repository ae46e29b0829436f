//! # FunkinCTRL Library
//!
//! Play arrow-key rhythm games with a robotics brick's sensors.
//!
//! This library provides the core functionality for turning a touch sensor
//! and an infrared proximity sensor into four directional key presses, plus
//! two auxiliary keys mirrored from the brick's buttons.

pub mod config;
pub mod error;
pub mod controller;
pub mod inject;
pub mod sensor;
pub mod session;
pub mod telemetry;
