//! # Polling Session Module
//!
//! Runs the sensor polling loop that drives the emulated controller.
//!
//! ## Control Flow
//!
//! 1. **Wait for start**
//!    - Poll until the start button (brick Enter by default) is pressed
//!
//! 2. **Main loop** (one tick per `poll.rate_hz` period)
//!    - Refresh the sensor source; stop if it has ended
//!    - Stop if the exit button (brick Down by default) is pressed
//!    - Read touch, proximity and motor ports
//!    - Apply touch + proximity to the directional keys
//!    - Mirror the confirm/cancel buttons onto their keys
//!    - Record a telemetry sample if enabled
//!
//! 3. **Shutdown**
//!    - Release every held key, also when a tick fails
//!    - Flush telemetry

use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::controller::direction::Direction;
use crate::controller::gamepad::{GamePad, PadInput};
use crate::error::Result;
use crate::inject::KeyInjector;
use crate::sensor::{BrickButton, ButtonStates, InputPort, SensorSource, SourceStatus, TouchSense};
use crate::telemetry::recorder::TelemetryRecorder;
use crate::telemetry::types::SensorSample;

/// Number of ticks between status log messages
const LOG_INTERVAL_TICKS: u64 = 5000;

/// Port and button assignments plus loop timing.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub touch_port: InputPort,
    pub proximity_port: InputPort,
    pub motor_port: InputPort,
    pub touch_sense: TouchSense,
    pub start_button: BrickButton,
    pub exit_button: BrickButton,
    pub confirm_button: BrickButton,
    pub cancel_button: BrickButton,
    pub period: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl SessionSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            touch_port: config.sensors.touch_port,
            proximity_port: config.sensors.proximity_port,
            motor_port: config.sensors.motor_port,
            touch_sense: config.sensors.touch_sense,
            start_button: config.buttons.start,
            exit_button: config.buttons.exit,
            confirm_button: config.buttons.confirm,
            cancel_button: config.buttons.cancel,
            period: tick_period(config.poll.rate_hz),
        }
    }
}

/// Period between ticks for a poll rate (rates of 0 are treated as 1 Hz).
#[must_use]
pub fn tick_period(rate_hz: u32) -> Duration {
    Duration::from_micros(1_000_000 / u64::from(rate_hz.max(1)))
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The configured exit button was pressed.
    ExitButton,
    /// The sensor source has no more data.
    SourceEnded,
    /// Ctrl+C.
    Interrupted,
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Exit(ExitReason),
}

/// Result of waiting for the start button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Started,
    Stopped(ExitReason),
}

/// Totals reported when a session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub ticks: u64,
    pub presses: u64,
    pub releases: u64,
    pub records: u64,
    pub exit: ExitReason,
}

/// Polling loop over a sensor source and a key injector.
pub struct Session<S, K> {
    source: S,
    injector: K,
    pad: GamePad,
    settings: SessionSettings,
    recorder: Option<TelemetryRecorder>,
    ticks: u64,
}

impl<S: SensorSource, K: KeyInjector> Session<S, K> {
    #[must_use]
    pub fn new(source: S, injector: K, pad: GamePad, settings: SessionSettings) -> Self {
        Self {
            source,
            injector,
            pad,
            settings,
            recorder: None,
            ticks: 0,
        }
    }

    /// Records a telemetry sample on every tick (subject to the recorder's interval).
    #[must_use]
    pub fn with_recorder(mut self, recorder: TelemetryRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    #[must_use]
    pub fn pad(&self) -> &GamePad {
        &self.pad
    }

    #[must_use]
    pub fn injector(&self) -> &K {
        &self.injector
    }

    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Polls until the start button is pressed.
    ///
    /// No keys are injected while waiting. The tick that sees the start
    /// button is recorded, so a replay of the recording starts on it.
    pub async fn wait_for_start(&mut self) -> Result<Readiness> {
        let mut ticker = interval(self.settings.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        info!("Press {:?} on the brick to start", self.settings.start_button);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.source.refresh()? == SourceStatus::Ended {
                        return Ok(Readiness::Stopped(ExitReason::SourceEnded));
                    }
                    if self.source.read_button(self.settings.start_button)? {
                        info!("Controls engaged");
                        if self.recorder.is_some() {
                            let buttons = self.read_buttons()?;
                            let ports = self.read_ports()?;
                            self.record(ports, buttons, None);
                        }
                        return Ok(Readiness::Started);
                    }
                }

                _ = &mut ctrl_c => {
                    info!("Received Ctrl+C before start");
                    return Ok(Readiness::Stopped(ExitReason::Interrupted));
                }
            }
        }
    }

    /// Runs one polling iteration.
    ///
    /// # Errors
    ///
    /// Sensor and injection failures are returned unmodified; the caller
    /// should treat them as fatal.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        if self.source.refresh()? == SourceStatus::Ended {
            return Ok(TickOutcome::Exit(ExitReason::SourceEnded));
        }

        let buttons = self.read_buttons()?;
        if buttons.get(self.settings.exit_button) {
            return Ok(TickOutcome::Exit(ExitReason::ExitButton));
        }

        let ports = self.read_ports()?;
        let Ports {
            touch,
            proximity,
            motor,
        } = ports;

        let input = PadInput {
            touch_active: self.settings.touch_sense.is_active(touch),
            proximity,
            confirm: buttons.get(self.settings.confirm_button),
            cancel: buttons.get(self.settings.cancel_button),
        };
        let direction = self.pad.apply(input, &mut self.injector)?;
        self.ticks += 1;

        self.record(ports, buttons, direction);

        if self.ticks % LOG_INTERVAL_TICKS == 0 {
            let counts = self.pad.counts();
            info!(
                "{} ticks, {} presses, {} releases (touch {}, proximity {}, motor {})",
                self.ticks, counts.presses, counts.releases, touch, proximity, motor
            );
        }

        Ok(TickOutcome::Continue)
    }

    /// Drives [`tick`](Self::tick) at the configured rate until an exit
    /// condition, then releases every key.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use funkin_ctrl::config::Config;
    /// use funkin_ctrl::inject::uinput::UinputKeyboard;
    /// use funkin_ctrl::sensor::replay::ReplaySource;
    /// use funkin_ctrl::session::{Session, SessionSettings};
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let config = Config::default();
    ///     let pad = config.gamepad();
    ///     let keyboard = UinputKeyboard::create(&config.keys.device_name, &pad.keys())?;
    ///     let source = ReplaySource::open("samples.jsonl")?;
    ///
    ///     let mut session = Session::new(source, keyboard, pad, SessionSettings::from_config(&config));
    ///     let summary = session.run().await?;
    ///     println!("{} ticks", summary.ticks);
    ///     Ok(())
    /// }
    /// ```
    pub async fn run(&mut self) -> Result<SessionSummary> {
        let mut ticker = interval(self.settings.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "Polling sensors every {}us",
            self.settings.period.as_micros()
        );
        info!("Press {:?} on the brick to exit", self.settings.exit_button);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let exit = loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.tick() {
                        Ok(TickOutcome::Continue) => {}
                        Ok(TickOutcome::Exit(reason)) => break reason,
                        Err(e) => {
                            warn!("Polling failed after {} ticks: {}", self.ticks, e);
                            if let Err(release_err) = self.shutdown() {
                                warn!("Failed to release keys: {}", release_err);
                            }
                            return Err(e);
                        }
                    }
                }

                _ = &mut ctrl_c => {
                    info!("Received Ctrl+C, shutting down...");
                    break ExitReason::Interrupted;
                }
            }
        };

        self.shutdown()?;
        let summary = self.summary(exit);
        info!(
            "Session ended ({:?}): {} ticks, {} presses, {} releases",
            summary.exit, summary.ticks, summary.presses, summary.releases
        );
        Ok(summary)
    }

    /// Releases every held key and flushes telemetry.
    pub fn shutdown(&mut self) -> Result<()> {
        self.pad.release_all(&mut self.injector)?;
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.flush()?;
        }
        debug!("All keys released");
        Ok(())
    }

    fn read_buttons(&mut self) -> Result<ButtonStates> {
        let mut buttons = ButtonStates::default();
        for button in BrickButton::ALL {
            buttons.set(button, self.source.read_button(button)?);
        }
        Ok(buttons)
    }

    fn read_ports(&mut self) -> Result<Ports> {
        Ok(Ports {
            touch: self.source.read_scalar(self.settings.touch_port)?,
            proximity: self.source.read_scalar(self.settings.proximity_port)?,
            motor: self.source.read_scalar(self.settings.motor_port)?,
        })
    }

    fn record(&mut self, ports: Ports, buttons: ButtonStates, direction: Option<Direction>) {
        let Some(recorder) = self.recorder.as_mut() else {
            return;
        };
        let sample = self.settings.sample(ports, buttons, direction);
        if let Err(e) = recorder.record(&sample) {
            warn!("Failed to record telemetry sample: {}", e);
        }
    }

    fn summary(&self, exit: ExitReason) -> SessionSummary {
        let counts = self.pad.counts();
        SessionSummary {
            ticks: self.ticks,
            presses: counts.presses,
            releases: counts.releases,
            records: self.recorder.as_ref().map_or(0, TelemetryRecorder::total_records),
            exit,
        }
    }
}

/// Port readings for one tick.
#[derive(Debug, Clone, Copy)]
struct Ports {
    touch: f32,
    proximity: f32,
    motor: f32,
}

impl SessionSettings {
    fn sample(
        &self,
        ports: Ports,
        buttons: ButtonStates,
        direction: Option<Direction>,
    ) -> SensorSample {
        let mut sample = SensorSample::now();
        sample.ports.insert(self.touch_port, ports.touch);
        sample.ports.insert(self.proximity_port, ports.proximity);
        sample.ports.insert(self.motor_port, ports.motor);
        sample.buttons = buttons;
        sample.direction = direction;
        sample
    }
}
