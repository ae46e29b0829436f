//! # Sensor Module
//!
//! Trait abstraction over the brick's sensor ports and buttons.
//!
//! This module handles:
//! - Naming brick input ports and buttons
//! - The [`SensorSource`] seam the polling loop reads from
//! - Interpreting the touch sensor sample ([`TouchSense`])
//! - Replaying recorded samples ([`replay::ReplaySource`])
//!
//! ## Reference Layout
//!
//! | Port | Device | Use |
//! |------|--------|-----|
//! | 1 | Touch sensor | Directional keys live |
//! | 4 | Infrared sensor (proximity) | Direction zone |
//! | D | Medium motor | Recorded only |

pub mod replay;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// A brick input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputPort {
    One,
    Two,
    Three,
    Four,
    A,
    B,
    C,
    D,
}

impl fmt::Display for InputPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InputPort::One => "1",
            InputPort::Two => "2",
            InputPort::Three => "3",
            InputPort::Four => "4",
            InputPort::A => "A",
            InputPort::B => "B",
            InputPort::C => "C",
            InputPort::D => "D",
        };
        write!(f, "port {}", label)
    }
}

/// A physical button on the brick face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrickButton {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Back,
}

impl BrickButton {
    /// Every button on the brick face.
    pub const ALL: [BrickButton; 6] = [
        BrickButton::Up,
        BrickButton::Down,
        BrickButton::Left,
        BrickButton::Right,
        BrickButton::Enter,
        BrickButton::Back,
    ];
}

/// Snapshot of every brick button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonStates {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub enter: bool,
    pub back: bool,
}

impl ButtonStates {
    /// State of a single button.
    #[must_use]
    pub fn get(&self, button: BrickButton) -> bool {
        match button {
            BrickButton::Up => self.up,
            BrickButton::Down => self.down,
            BrickButton::Left => self.left,
            BrickButton::Right => self.right,
            BrickButton::Enter => self.enter,
            BrickButton::Back => self.back,
        }
    }

    /// Sets a single button.
    pub fn set(&mut self, button: BrickButton, pressed: bool) {
        match button {
            BrickButton::Up => self.up = pressed,
            BrickButton::Down => self.down = pressed,
            BrickButton::Left => self.left = pressed,
            BrickButton::Right => self.right = pressed,
            BrickButton::Enter => self.enter = pressed,
            BrickButton::Back => self.back = pressed,
        }
    }
}

/// Whether a source still has data after a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    /// Reads reflect the current tick.
    Live,
    /// No further data; the polling loop should stop.
    Ended,
}

/// How the touch sensor sample turns into "directional keys live".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchSense {
    /// Live while the sample is exactly 0.0 (sensor released).
    #[default]
    ActiveAtZero,
    /// Live while the sample is anything other than 0.0 (sensor held).
    ActiveNonZero,
}

impl TouchSense {
    /// Interprets a raw touch sample.
    ///
    /// # Examples
    ///
    /// ```
    /// use funkin_ctrl::sensor::TouchSense;
    ///
    /// assert!(TouchSense::ActiveAtZero.is_active(0.0));
    /// assert!(!TouchSense::ActiveAtZero.is_active(1.0));
    /// assert!(TouchSense::ActiveNonZero.is_active(1.0));
    /// ```
    #[must_use]
    pub fn is_active(self, sample: f32) -> bool {
        let released = sample == 0.0;
        match self {
            TouchSense::ActiveAtZero => released,
            TouchSense::ActiveNonZero => !released,
        }
    }
}

/// Trait for reading brick sensors and buttons.
///
/// `refresh` is called once at the start of every tick; reads within the
/// same tick must return before the next tick needs them.
#[cfg_attr(test, mockall::automock)]
pub trait SensorSource {
    /// Advance to the current tick's data.
    fn refresh(&mut self) -> Result<SourceStatus>;

    /// Most recent SI-unit sample from a port.
    fn read_scalar(&mut self, port: InputPort) -> Result<f32>;

    /// Current state of a brick button.
    fn read_button(&mut self, button: BrickButton) -> Result<bool>;
}
