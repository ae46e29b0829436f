//! # Key Codes
//!
//! The closed set of keyboard keys the controller can inject.
//!
//! Keys are named in configuration files by their lowercase name
//! (`"right"`, `"enter"`, `"d"`, ...) and converted to Linux evdev key
//! codes at the injection boundary.
//!
//! | Name | evdev Code |
//! |------|------------|
//! | right / up / down / left | KEY_RIGHT / KEY_UP / KEY_DOWN / KEY_LEFT |
//! | enter | KEY_ENTER |
//! | escape | KEY_ESC |
//! | space | KEY_SPACE |
//! | w / a / s / d | KEY_W / KEY_A / KEY_S / KEY_D |
//! | j / k / f | KEY_J / KEY_K / KEY_F |

use evdev::Key;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A key that can be bound to a [`KeyToggle`](super::toggle::KeyToggle).
///
/// # Examples
///
/// ```
/// use funkin_ctrl::controller::keys::KeyCode;
///
/// assert_eq!(KeyCode::Right.to_string(), "right");
/// assert_eq!(KeyCode::Escape.evdev_key(), evdev::Key::KEY_ESC);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyCode {
    Right,
    Up,
    Down,
    Left,
    Enter,
    Escape,
    Space,
    W,
    A,
    S,
    D,
    F,
    J,
    K,
}

impl KeyCode {
    /// Every injectable key, in declaration order.
    pub const ALL: [KeyCode; 14] = [
        KeyCode::Right,
        KeyCode::Up,
        KeyCode::Down,
        KeyCode::Left,
        KeyCode::Enter,
        KeyCode::Escape,
        KeyCode::Space,
        KeyCode::W,
        KeyCode::A,
        KeyCode::S,
        KeyCode::D,
        KeyCode::F,
        KeyCode::J,
        KeyCode::K,
    ];

    /// Returns the Linux evdev key code for this key.
    #[must_use]
    pub fn evdev_key(self) -> Key {
        match self {
            KeyCode::Right => Key::KEY_RIGHT,
            KeyCode::Up => Key::KEY_UP,
            KeyCode::Down => Key::KEY_DOWN,
            KeyCode::Left => Key::KEY_LEFT,
            KeyCode::Enter => Key::KEY_ENTER,
            KeyCode::Escape => Key::KEY_ESC,
            KeyCode::Space => Key::KEY_SPACE,
            KeyCode::W => Key::KEY_W,
            KeyCode::A => Key::KEY_A,
            KeyCode::S => Key::KEY_S,
            KeyCode::D => Key::KEY_D,
            KeyCode::F => Key::KEY_F,
            KeyCode::J => Key::KEY_J,
            KeyCode::K => Key::KEY_K,
        }
    }

    /// Lowercase name, as written in configuration files.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            KeyCode::Right => "right",
            KeyCode::Up => "up",
            KeyCode::Down => "down",
            KeyCode::Left => "left",
            KeyCode::Enter => "enter",
            KeyCode::Escape => "escape",
            KeyCode::Space => "space",
            KeyCode::W => "w",
            KeyCode::A => "a",
            KeyCode::S => "s",
            KeyCode::D => "d",
            KeyCode::F => "f",
            KeyCode::J => "j",
            KeyCode::K => "k",
        }
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
