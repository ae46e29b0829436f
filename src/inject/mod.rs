//! # Key Injection Module
//!
//! Trait abstraction over the keyboard-simulation backend.
//!
//! This module handles:
//! - The [`KeyInjector`] seam the controller drives
//! - A Linux uinput virtual keyboard backend ([`uinput::UinputKeyboard`])

pub mod uinput;

use crate::controller::keys::KeyCode;
use crate::error::Result;

/// Trait for key press/release injection.
///
/// Implementations are driven from the single polling task and never
/// shared across threads.
#[cfg_attr(test, mockall::automock)]
pub trait KeyInjector {
    /// Emit a key-down event.
    fn press_key(&mut self, key: KeyCode) -> Result<()>;

    /// Emit a key-up event.
    fn release_key(&mut self, key: KeyCode) -> Result<()>;
}

impl<T: KeyInjector + ?Sized> KeyInjector for &mut T {
    fn press_key(&mut self, key: KeyCode) -> Result<()> {
        (**self).press_key(key)
    }

    fn release_key(&mut self, key: KeyCode) -> Result<()> {
        (**self).release_key(key)
    }
}


#[cfg(test)]
mod tests {
    use super::mocks::{KeyEvent, RecordingInjector};
    use super::*;

    fn tap<I: KeyInjector>(mut injector: I, key: KeyCode) {
        injector.press_key(key).unwrap();
        injector.release_key(key).unwrap();
    }

    #[test]
    fn test_mut_ref_forwards_to_inner_injector() {
        let mut recorder = RecordingInjector::new();
        tap(&mut recorder, KeyCode::Up);
        assert_eq!(
            recorder.events,
            vec![KeyEvent::Press(KeyCode::Up), KeyEvent::Release(KeyCode::Up)]
        );
    }

    #[test]
    fn test_recording_injector_tracks_held_keys() {
        let mut recorder = RecordingInjector::new();
        recorder.press_key(KeyCode::Left).unwrap();
        recorder.press_key(KeyCode::Enter).unwrap();
        recorder.release_key(KeyCode::Left).unwrap();
        assert_eq!(recorder.held(), vec![KeyCode::Enter]);
    }

    #[test]
    fn test_recording_injector_failure_is_one_shot() {
        let mut recorder = RecordingInjector::new();
        recorder.fail_next = true;
        assert!(recorder.press_key(KeyCode::Down).is_err());
        assert!(recorder.press_key(KeyCode::Down).is_ok());
        assert_eq!(recorder.events, vec![KeyEvent::Press(KeyCode::Down)]);
    }
}
