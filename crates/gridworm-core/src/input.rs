//! Input types for pointer, wheel and keyboard events.
//!
//! The host converts platform events into these types. Positions are screen
//! points relative to the canvas element's top-left corner; timestamps are
//! supplied by the host so click detection stays deterministic.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A pointer press, move or release.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    /// Screen position relative to the canvas origin.
    pub position: Point,
    #[serde(default)]
    pub button: MouseButton,
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Host timestamp in milliseconds.
    #[serde(default)]
    pub timestamp_ms: u64,
}

impl PointerInput {
    pub fn new(position: Point) -> Self {
        Self {
            position,
            button: MouseButton::Left,
            modifiers: Modifiers::NONE,
            timestamp_ms: 0,
        }
    }

    pub fn at(x: f64, y: f64) -> Self {
        Self::new(Point::new(x, y))
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_timestamp(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }
}

/// A wheel notch or trackpad scroll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelInput {
    pub position: Point,
    pub delta: Vec2,
    #[serde(default)]
    pub modifiers: Modifiers,
}

/// Keys the canvas reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    Enter,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// A printable character, lowercased by the host.
    Char(char),
}

impl Key {
    /// Unit direction for arrow keys.
    pub fn arrow_direction(self) -> Option<Vec2> {
        match self {
            Key::ArrowUp => Some(Vec2::new(0.0, -1.0)),
            Key::ArrowDown => Some(Vec2::new(0.0, 1.0)),
            Key::ArrowLeft => Some(Vec2::new(-1.0, 0.0)),
            Key::ArrowRight => Some(Vec2::new(1.0, 0.0)),
            _ => None,
        }
    }
}

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyInput {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Double-click detection over host timestamps.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    window_ms: u64,
    max_distance: f64,
    last_click: Option<(u64, Point)>,
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::new(500, 5.0)
    }
}

impl ClickTracker {
    pub fn new(window_ms: u64, max_distance: f64) -> Self {
        Self {
            window_ms,
            max_distance,
            last_click: None,
        }
    }

    /// Register a primary press. Returns true when it completes a double-click.
    pub fn register(&mut self, input: &PointerInput) -> bool {
        if let Some((time, position)) = self.last_click {
            let elapsed = input.timestamp_ms.saturating_sub(time);
            if elapsed < self.window_ms && position.distance(input.position) < self.max_distance {
                // Reset so a triple-click is not a second double-click
                self.last_click = None;
                return true;
            }
        }
        self.last_click = Some((input.timestamp_ms, input.position));
        false
    }

    pub fn reset(&mut self) {
        self.last_click = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_click_detection() {
        let mut clicks = ClickTracker::default();
        assert!(!clicks.register(&PointerInput::at(100.0, 100.0).with_timestamp(1000)));
        assert!(clicks.register(&PointerInput::at(101.0, 100.0).with_timestamp(1200)));
        // Third click starts over
        assert!(!clicks.register(&PointerInput::at(101.0, 100.0).with_timestamp(1300)));
    }

    #[test]
    fn test_double_click_too_slow() {
        let mut clicks = ClickTracker::default();
        clicks.register(&PointerInput::at(100.0, 100.0).with_timestamp(1000));
        assert!(!clicks.register(&PointerInput::at(100.0, 100.0).with_timestamp(1600)));
    }

    #[test]
    fn test_double_click_too_far() {
        let mut clicks = ClickTracker::default();
        clicks.register(&PointerInput::at(100.0, 100.0).with_timestamp(1000));
        assert!(!clicks.register(&PointerInput::at(200.0, 200.0).with_timestamp(1100)));
    }

    #[test]
    fn test_command_modifier() {
        assert!(Modifiers::ctrl().command());
        assert!(Modifiers { meta: true, ..Modifiers::NONE }.command());
        assert!(!Modifiers::shift().command());
    }

    #[test]
    fn test_arrow_direction() {
        assert_eq!(Key::ArrowLeft.arrow_direction(), Some(Vec2::new(-1.0, 0.0)));
        assert_eq!(Key::Char('a').arrow_direction(), None);
    }

    #[test]
    fn test_key_input_deserializes() {
        let input: KeyInput = serde_json::from_str(r#"{ "key": { "char": "d" }, "modifiers": { "ctrl": true } }"#).unwrap();
        assert_eq!(input.key, Key::Char('d'));
        assert!(input.modifiers.ctrl);
    }
}
