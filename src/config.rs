//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and field is optional; omitted values fall back to the
//! reference brick layout (touch on port 1, infrared on port 4, motor on
//! port D, arrow keys, Enter/Escape on the brick's Enter/Up buttons).

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::controller::direction::{DirectionMapper, MappingParams};
use crate::controller::gamepad::GamePad;
use crate::controller::keys::KeyCode;
use crate::error::{FunkinCtrlError, Result};
use crate::sensor::{BrickButton, InputPort, TouchSense};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub mapping: MappingConfig,
    pub keys: KeysConfig,
    pub sensors: SensorsConfig,
    pub buttons: ButtonsConfig,
    pub poll: PollConfig,
    pub telemetry: TelemetryConfig,
    pub logging: LoggingConfig,
}

/// Proximity-to-direction calibration
#[derive(Debug, Deserialize, Clone)]
pub struct MappingConfig {
    #[serde(default = "default_saturation_threshold")]
    pub saturation_threshold: f32,

    #[serde(default = "default_zero_offset")]
    pub zero_offset: f32,

    #[serde(default = "default_bucket_width")]
    pub bucket_width: u32,
}

/// Injected key bindings
#[derive(Debug, Deserialize, Clone)]
pub struct KeysConfig {
    #[serde(default = "default_key_right")]
    pub right: KeyCode,

    #[serde(default = "default_key_up")]
    pub up: KeyCode,

    #[serde(default = "default_key_down")]
    pub down: KeyCode,

    #[serde(default = "default_key_left")]
    pub left: KeyCode,

    #[serde(default = "default_key_confirm")]
    pub confirm: KeyCode,

    #[serde(default = "default_key_cancel")]
    pub cancel: KeyCode,

    #[serde(default = "default_device_name")]
    pub device_name: String,
}

/// Sensor port layout
#[derive(Debug, Deserialize, Clone)]
pub struct SensorsConfig {
    #[serde(default = "default_touch_port")]
    pub touch_port: InputPort,

    #[serde(default = "default_proximity_port")]
    pub proximity_port: InputPort,

    #[serde(default = "default_motor_port")]
    pub motor_port: InputPort,

    #[serde(default)]
    pub touch_sense: TouchSense,

    #[serde(default)]
    pub replay_file: String,
}

/// Brick button roles
#[derive(Debug, Deserialize, Clone)]
pub struct ButtonsConfig {
    #[serde(default = "default_start_button")]
    pub start: BrickButton,

    #[serde(default = "default_exit_button")]
    pub exit: BrickButton,

    #[serde(default = "default_confirm_button")]
    pub confirm: BrickButton,

    #[serde(default = "default_cancel_button")]
    pub cancel: BrickButton,
}

/// Polling loop configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    #[serde(default = "default_rate_hz")]
    pub rate_hz: u32,
}

/// Telemetry configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,

    #[serde(default = "default_log_interval_ms")]
    pub log_interval_ms: u64,
}

/// Diagnostic logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily log files. Empty logs to stdout.
    #[serde(default)]
    pub log_dir: String,
}

// Default value functions
fn default_saturation_threshold() -> f32 { 60.0 }
fn default_zero_offset() -> f32 { 12.0 }
fn default_bucket_width() -> u32 { 12 }

fn default_key_right() -> KeyCode { KeyCode::Right }
fn default_key_up() -> KeyCode { KeyCode::Up }
fn default_key_down() -> KeyCode { KeyCode::Down }
fn default_key_left() -> KeyCode { KeyCode::Left }
fn default_key_confirm() -> KeyCode { KeyCode::Enter }
fn default_key_cancel() -> KeyCode { KeyCode::Escape }
fn default_device_name() -> String { "funkin-ctrl".to_string() }

fn default_touch_port() -> InputPort { InputPort::One }
fn default_proximity_port() -> InputPort { InputPort::Four }
fn default_motor_port() -> InputPort { InputPort::D }

fn default_start_button() -> BrickButton { BrickButton::Enter }
fn default_exit_button() -> BrickButton { BrickButton::Down }
fn default_confirm_button() -> BrickButton { BrickButton::Enter }
fn default_cancel_button() -> BrickButton { BrickButton::Up }

fn default_rate_hz() -> u32 { 1000 }

fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }
fn default_log_interval_ms() -> u64 { 100 }

fn default_log_level() -> String { "info".to_string() }

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            saturation_threshold: default_saturation_threshold(),
            zero_offset: default_zero_offset(),
            bucket_width: default_bucket_width(),
        }
    }
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            right: default_key_right(),
            up: default_key_up(),
            down: default_key_down(),
            left: default_key_left(),
            confirm: default_key_confirm(),
            cancel: default_key_cancel(),
            device_name: default_device_name(),
        }
    }
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            touch_port: default_touch_port(),
            proximity_port: default_proximity_port(),
            motor_port: default_motor_port(),
            touch_sense: TouchSense::default(),
            replay_file: String::new(),
        }
    }
}

impl Default for ButtonsConfig {
    fn default() -> Self {
        Self {
            start: default_start_button(),
            exit: default_exit_button(),
            confirm: default_confirm_button(),
            cancel: default_cancel_button(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { rate_hz: default_rate_hz() }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
            log_interval_ms: default_log_interval_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

impl MappingConfig {
    /// Mapping parameters for the [`DirectionMapper`].
    #[must_use]
    pub fn params(&self) -> MappingParams {
        MappingParams::new(self.saturation_threshold, self.zero_offset, self.bucket_width)
    }
}

impl KeysConfig {
    /// Directional keys in `[right, up, down, left]` order.
    #[must_use]
    pub fn directions(&self) -> [KeyCode; 4] {
        [self.right, self.up, self.down, self.left]
    }
}

fn invalid(message: impl std::fmt::Display) -> FunkinCtrlError {
    FunkinCtrlError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use funkin_ctrl::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Build the emulated controller described by this configuration
    #[must_use]
    pub fn gamepad(&self) -> GamePad {
        let directions = DirectionMapper::new(self.mapping.params(), self.keys.directions());
        GamePad::new(directions, self.keys.confirm, self.keys.cancel)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Validate mapping calibration
        if !self.mapping.saturation_threshold.is_finite() {
            return Err(invalid("saturation_threshold must be a finite number"));
        }

        if !self.mapping.zero_offset.is_finite() {
            return Err(invalid("zero_offset must be a finite number"));
        }

        if self.mapping.bucket_width == 0 || self.mapping.bucket_width > 1000 {
            return Err(invalid("bucket_width must be between 1 and 1000"));
        }

        // Validate key bindings
        let directions = self.keys.directions();
        for (i, key) in directions.iter().enumerate() {
            if directions[..i].contains(key) {
                return Err(invalid(format!("key '{}' is bound to two directions", key)));
            }
        }

        for (name, key) in [("confirm", self.keys.confirm), ("cancel", self.keys.cancel)] {
            if directions.contains(&key) {
                return Err(invalid(format!("{} key '{}' is already a direction key", name, key)));
            }
        }

        if self.keys.confirm == self.keys.cancel {
            return Err(invalid("confirm and cancel keys must differ"));
        }

        if self.keys.device_name.trim().is_empty() {
            return Err(invalid("keys.device_name cannot be empty"));
        }

        // Validate sensor layout
        if self.sensors.touch_port == self.sensors.proximity_port {
            return Err(invalid("touch_port and proximity_port must differ"));
        }

        // Validate button roles
        if self.buttons.start == self.buttons.exit {
            return Err(invalid("start and exit buttons must differ"));
        }

        // Validate poll rate
        if self.poll.rate_hz == 0 || self.poll.rate_hz > 1000 {
            return Err(invalid("rate_hz must be between 1 and 1000"));
        }

        // Validate telemetry configuration
        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(invalid("telemetry log_dir cannot be empty when enabled"));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(invalid("max_records_per_file must be greater than 0"));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(invalid("max_files_to_keep must be greater than 0"));
        }

        if self.telemetry.log_interval_ms == 0 || self.telemetry.log_interval_ms > 60000 {
            return Err(invalid("log_interval_ms must be between 1 and 60000"));
        }

        // Validate log level
        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(invalid("logging level must be one of: trace, debug, info, warn, error"));
        }

        Ok(())
    }
}
