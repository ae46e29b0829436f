//! # Key Toggle Module
//!
//! Tracks the down/up state of one injectable key and emits an injection
//! event only when that state actually changes.
//!
//! The decision is split from the effect: [`transition`] is a pure function
//! of `(is_down, requested)` returning a [`Transition`], and
//! [`KeyToggle::set_down`] applies it through a [`KeyInjector`].
//!
//! ## Usage
//!
//! ```
//! use funkin_ctrl::controller::keys::KeyCode;
//! use funkin_ctrl::controller::toggle::{transition, Transition};
//!
//! assert_eq!(transition(false, true), Transition::Press);
//! assert_eq!(transition(true, true), Transition::NoOp);
//! assert_eq!(transition(true, false), Transition::Release);
//! ```

use tracing::debug;

use super::keys::KeyCode;
use crate::error::Result;
use crate::inject::KeyInjector;

/// Outcome of writing a requested state to a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// State unchanged, nothing to emit.
    NoOp,
    /// Key goes down.
    Press,
    /// Key goes up.
    Release,
}

/// Computes the transition from `is_down` to `requested`.
#[must_use]
pub fn transition(is_down: bool, requested: bool) -> Transition {
    match (is_down, requested) {
        (false, true) => Transition::Press,
        (true, false) => Transition::Release,
        _ => Transition::NoOp,
    }
}

/// One key and whether it is currently held down.
///
/// # Examples
///
/// ```
/// use funkin_ctrl::controller::keys::KeyCode;
/// use funkin_ctrl::controller::toggle::KeyToggle;
///
/// let toggle = KeyToggle::new(KeyCode::Enter);
/// assert_eq!(toggle.key(), KeyCode::Enter);
/// assert!(!toggle.is_down());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyToggle {
    key: KeyCode,
    is_down: bool,
}

impl KeyToggle {
    /// Creates a released toggle bound to `key`.
    #[must_use]
    pub fn new(key: KeyCode) -> Self {
        Self { key, is_down: false }
    }

    /// Key this toggle injects.
    #[must_use]
    pub fn key(&self) -> KeyCode {
        self.key
    }

    /// Whether the bound key is currently held down.
    #[must_use]
    pub fn is_down(&self) -> bool {
        self.is_down
    }

    /// Binds a different key and marks the toggle released.
    ///
    /// No release is emitted for the previous key. Call
    /// `set_down(false, ..)` first if it may still be held.
    pub fn rebind(&mut self, key: KeyCode) {
        self.is_down = false;
        self.key = key;
    }

    /// Requests the key be held (`true`) or released (`false`).
    ///
    /// Emits at most one event, and only when the state changes. If the
    /// injector fails, the error is returned and the state is left as it was.
    ///
    /// # Examples
    ///
    /// ```
    /// # use funkin_ctrl::controller::keys::KeyCode;
    /// # use funkin_ctrl::controller::toggle::{KeyToggle, Transition};
    /// # use funkin_ctrl::inject::KeyInjector;
    /// # struct Null;
    /// # impl KeyInjector for Null {
    /// #     fn press_key(&mut self, _: KeyCode) -> funkin_ctrl::error::Result<()> { Ok(()) }
    /// #     fn release_key(&mut self, _: KeyCode) -> funkin_ctrl::error::Result<()> { Ok(()) }
    /// # }
    /// let mut injector = Null;
    /// let mut toggle = KeyToggle::new(KeyCode::Up);
    /// assert_eq!(toggle.set_down(true, &mut injector)?, Transition::Press);
    /// assert_eq!(toggle.set_down(true, &mut injector)?, Transition::NoOp);
    /// # Ok::<(), funkin_ctrl::error::FunkinCtrlError>(())
    /// ```
    pub fn set_down<I: KeyInjector + ?Sized>(
        &mut self,
        down: bool,
        injector: &mut I,
    ) -> Result<Transition> {
        let step = transition(self.is_down, down);
        match step {
            Transition::Press => injector.press_key(self.key)?,
            Transition::Release => injector.release_key(self.key)?,
            Transition::NoOp => return Ok(step),
        }
        self.is_down = down;
        debug!("{} {:?}", self.key, step);
        Ok(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inject::mocks::{KeyEvent, RecordingInjector};
    use crate::inject::MockKeyInjector;
    use mockall::predicate::eq;
    use mockall::Sequence;

    #[test]
    fn test_transition_table() {
        assert_eq!(transition(false, false), Transition::NoOp);
        assert_eq!(transition(false, true), Transition::Press);
        assert_eq!(transition(true, true), Transition::NoOp);
        assert_eq!(transition(true, false), Transition::Release);
    }

    #[test]
    fn test_new_toggle_is_released() {
        let toggle = KeyToggle::new(KeyCode::Left);
        assert!(!toggle.is_down());
        assert_eq!(toggle.key(), KeyCode::Left);
    }

    #[test]
    fn test_press_press_release_emits_one_of_each_in_order() {
        let mut injector = MockKeyInjector::new();
        let mut seq = Sequence::new();
        injector
            .expect_press_key()
            .with(eq(KeyCode::Up))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        injector
            .expect_release_key()
            .with(eq(KeyCode::Up))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let mut toggle = KeyToggle::new(KeyCode::Up);
        assert_eq!(toggle.set_down(true, &mut injector).unwrap(), Transition::Press);
        assert_eq!(toggle.set_down(true, &mut injector).unwrap(), Transition::NoOp);
        assert_eq!(toggle.set_down(false, &mut injector).unwrap(), Transition::Release);
    }

    #[test]
    fn test_release_when_already_released_is_silent() {
        let mut injector = RecordingInjector::new();
        let mut toggle = KeyToggle::new(KeyCode::Down);

        assert_eq!(toggle.set_down(false, &mut injector).unwrap(), Transition::NoOp);
        assert!(injector.events.is_empty());
        assert!(!toggle.is_down());
    }

    #[test]
    fn test_rebind_forces_released_without_event() {
        let mut injector = RecordingInjector::new();
        let mut toggle = KeyToggle::new(KeyCode::Enter);
        toggle.set_down(true, &mut injector).unwrap();
        injector.take();

        toggle.rebind(KeyCode::Space);
        assert!(!toggle.is_down());
        assert_eq!(toggle.key(), KeyCode::Space);
        assert!(injector.events.is_empty(), "rebind must not synthesize a release");

        // Next press goes to the new key
        toggle.set_down(true, &mut injector).unwrap();
        assert_eq!(injector.events, vec![KeyEvent::Press(KeyCode::Space)]);
    }

    #[test]
    fn test_injection_failure_propagates_and_keeps_state() {
        let mut injector = RecordingInjector::new();
        injector.fail_next = true;
        let mut toggle = KeyToggle::new(KeyCode::Right);

        let result = toggle.set_down(true, &mut injector);
        assert!(result.is_err());
        assert!(!toggle.is_down());

        // A retry on the next tick presses normally
        assert_eq!(toggle.set_down(true, &mut injector).unwrap(), Transition::Press);
        assert!(toggle.is_down());
    }
}
