//! # Uinput Keyboard Backend
//!
//! Injects key events through a Linux uinput virtual keyboard using evdev.
//!
//! The virtual device only advertises the keys it was created with, so the
//! desktop sees a small keyboard named after `keys.device_name` in the
//! configuration. Writing to `/dev/uinput` usually requires membership of the
//! `input` group or a udev rule.

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, EventType, InputEvent, Key};
use tracing::{debug, info};

use super::KeyInjector;
use crate::controller::keys::KeyCode;
use crate::error::{FunkinCtrlError, Result};

/// evdev key value for a key-down event.
const KEY_VALUE_DOWN: i32 = 1;

/// evdev key value for a key-up event.
const KEY_VALUE_UP: i32 = 0;

/// Virtual keyboard backed by `/dev/uinput`.
pub struct UinputKeyboard {
    device: VirtualDevice,
    name: String,
}

impl std::fmt::Debug for UinputKeyboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UinputKeyboard")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl UinputKeyboard {
    /// Create a virtual keyboard advertising `keys`.
    ///
    /// # Errors
    ///
    /// Returns `Injection` if `/dev/uinput` cannot be opened or the device
    /// cannot be registered.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use funkin_ctrl::controller::keys::KeyCode;
    /// use funkin_ctrl::inject::uinput::UinputKeyboard;
    ///
    /// let keyboard = UinputKeyboard::create("funkin-ctrl", &[KeyCode::Left, KeyCode::Right])?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn create(name: &str, keys: &[KeyCode]) -> Result<Self> {
        let mut key_set = AttributeSet::<Key>::new();
        for key in keys {
            key_set.insert(key.evdev_key());
        }

        let device = VirtualDeviceBuilder::new()
            .map_err(|e| FunkinCtrlError::Injection(format!("Failed to open /dev/uinput: {}", e)))?
            .name(name)
            .with_keys(&key_set)
            .map_err(|e| FunkinCtrlError::Injection(format!("Failed to register keys: {}", e)))?
            .build()
            .map_err(|e| {
                FunkinCtrlError::Injection(format!("Failed to create virtual keyboard: {}", e))
            })?;

        info!("Created virtual keyboard '{}' with {} keys", name, keys.len());

        Ok(Self {
            device,
            name: name.to_string(),
        })
    }

    /// Name the virtual device was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn emit_key(&mut self, key: KeyCode, value: i32) -> Result<()> {
        let event = key_event(key, value);
        self.device
            .emit(&[event])
            .map_err(|e| FunkinCtrlError::Injection(format!("Failed to emit {}: {}", key, e)))?;
        debug!("Injected {} = {}", key, value);
        Ok(())
    }
}

/// Build the evdev event for a key transition.
fn key_event(key: KeyCode, value: i32) -> InputEvent {
    InputEvent::new(EventType::KEY, key.evdev_key().code(), value)
}

impl KeyInjector for UinputKeyboard {
    fn press_key(&mut self, key: KeyCode) -> Result<()> {
        self.emit_key(key, KEY_VALUE_DOWN)
    }

    fn release_key(&mut self, key: KeyCode) -> Result<()> {
        self.emit_key(key, KEY_VALUE_UP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_event_down() {
        let event = key_event(KeyCode::Left, KEY_VALUE_DOWN);
        assert_eq!(event.event_type(), EventType::KEY);
        assert_eq!(event.code(), Key::KEY_LEFT.code());
        assert_eq!(event.value(), 1);
    }

    #[test]
    fn test_key_event_up() {
        let event = key_event(KeyCode::Escape, KEY_VALUE_UP);
        assert_eq!(event.code(), Key::KEY_ESC.code());
        assert_eq!(event.value(), 0);
    }

    // Integration test - requires write access to /dev/uinput
    #[test]
    #[ignore] // Run with: cargo test -- --ignored
    fn test_create_with_real_uinput() {
        let mut keyboard = UinputKeyboard::create("funkin-ctrl-test", &[KeyCode::Space])
            .expect("uinput not available");
        assert_eq!(keyboard.name(), "funkin-ctrl-test");
        keyboard.press_key(KeyCode::Space).unwrap();
        keyboard.release_key(KeyCode::Space).unwrap();
    }
}
