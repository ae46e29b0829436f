//! # Game Pad Module
//!
//! The complete set of emulated keys: four directions driven by the
//! [`DirectionMapper`] plus two auxiliary keys that mirror brick buttons.

use super::direction::{Direction, DirectionMapper, DIRECTION_COUNT};
use super::keys::KeyCode;
use super::toggle::{KeyToggle, Transition};
use crate::error::Result;
use crate::inject::KeyInjector;

/// Inputs for one tick, already reduced to booleans and a raw reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PadInput {
    /// Directional keys are live.
    pub touch_active: bool,
    /// Raw infrared proximity reading.
    pub proximity: f32,
    /// Brick button mirrored onto the confirm key.
    pub confirm: bool,
    /// Brick button mirrored onto the cancel key.
    pub cancel: bool,
}

/// Counts of injected events over the pad's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventCounts {
    pub presses: u64,
    pub releases: u64,
}

impl EventCounts {
    fn record(&mut self, step: Transition) {
        match step {
            Transition::Press => self.presses += 1,
            Transition::Release => self.releases += 1,
            Transition::NoOp => {}
        }
    }
}

/// Emulated directional controller.
///
/// # Examples
///
/// ```
/// use funkin_ctrl::controller::gamepad::GamePad;
/// use funkin_ctrl::controller::keys::KeyCode;
///
/// let pad = GamePad::default();
/// assert_eq!(pad.confirm().key(), KeyCode::Enter);
/// assert_eq!(pad.cancel().key(), KeyCode::Escape);
/// ```
#[derive(Debug, Clone)]
pub struct GamePad {
    directions: DirectionMapper,
    confirm: KeyToggle,
    cancel: KeyToggle,
    counts: EventCounts,
}

impl Default for GamePad {
    fn default() -> Self {
        Self::new(DirectionMapper::default(), KeyCode::Enter, KeyCode::Escape)
    }
}

impl GamePad {
    #[must_use]
    pub fn new(directions: DirectionMapper, confirm: KeyCode, cancel: KeyCode) -> Self {
        Self {
            directions,
            confirm: KeyToggle::new(confirm),
            cancel: KeyToggle::new(cancel),
            counts: EventCounts::default(),
        }
    }

    #[must_use]
    pub fn directions(&self) -> &DirectionMapper {
        &self.directions
    }

    #[must_use]
    pub fn confirm(&self) -> &KeyToggle {
        &self.confirm
    }

    #[must_use]
    pub fn cancel(&self) -> &KeyToggle {
        &self.cancel
    }

    #[must_use]
    pub fn counts(&self) -> EventCounts {
        self.counts
    }

    /// Every key this pad can inject, for registering with a backend.
    #[must_use]
    pub fn keys(&self) -> Vec<KeyCode> {
        let mut keys: Vec<KeyCode> = Vec::with_capacity(6);
        let all = self.directions.toggles().iter().chain([&self.confirm, &self.cancel]);
        for key in all.map(KeyToggle::key) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    /// Applies one tick of input and returns the selected direction.
    pub fn apply<I: KeyInjector + ?Sized>(
        &mut self,
        input: PadInput,
        injector: &mut I,
    ) -> Result<Option<Direction>> {
        let before = self.held_flags();
        let selected = self
            .directions
            .update(input.touch_active, input.proximity, injector);
        self.account_directions(before);
        let selected = selected?;

        let step = self.cancel.set_down(input.cancel, injector)?;
        self.counts.record(step);
        let step = self.confirm.set_down(input.confirm, injector)?;
        self.counts.record(step);

        Ok(selected)
    }

    /// Releases every held key.
    ///
    /// Call before exiting so that no key is left stuck down.
    pub fn release_all<I: KeyInjector + ?Sized>(&mut self, injector: &mut I) -> Result<()> {
        let before = self.held_flags();
        let released = self.directions.release_all(injector);
        self.account_directions(before);
        released?;

        let step = self.cancel.set_down(false, injector)?;
        self.counts.record(step);
        let step = self.confirm.set_down(false, injector)?;
        self.counts.record(step);
        Ok(())
    }

    fn held_flags(&self) -> [bool; DIRECTION_COUNT] {
        let toggles = self.directions.toggles();
        std::array::from_fn(|i| toggles[i].is_down())
    }

    fn account_directions(&mut self, before: [bool; DIRECTION_COUNT]) {
        let after = self.held_flags();
        for (was, is) in before.into_iter().zip(after) {
            self.counts.record(super::toggle::transition(was, is));
        }
    }
}
