//! Backend-independent window events

use bitflags::bitflags;

/// Keyboard keys the viewer distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Escape key
    Escape,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Space bar
    Space,
    /// Enter key
    Enter,
    /// Left shift
    LeftShift,
    /// Right shift
    RightShift,
    /// Left control
    LeftControl,
    /// Right control
    RightControl,
    /// A letter key, upper case
    Letter(char),
    /// A digit key
    Digit(u8),
    /// Any other key, by backend key code
    Other(i32),
}

impl KeyCode {
    /// Whether this is either shift key
    pub const fn is_shift(self) -> bool {
        matches!(self, Self::LeftShift | Self::RightShift)
    }

    /// Whether this is either control key
    pub const fn is_control(self) -> bool {
        matches!(self, Self::LeftControl | Self::RightControl)
    }
}

/// Key or button transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Pressed down
    Press,
    /// Released
    Release,
    /// Held long enough to auto-repeat
    Repeat,
}

impl KeyAction {
    /// Press or repeat
    pub const fn is_down(self) -> bool {
        matches!(self, Self::Press | Self::Repeat)
    }
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button
    Left,
    /// Secondary button
    Right,
    /// Wheel button
    Middle,
    /// Any other button, by backend index
    Other(i32),
}

bitflags! {
    /// Modifier keys held during an event
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Shift
        const SHIFT = 1;
        /// Control
        const CONTROL = 1 << 1;
        /// Alt
        const ALT = 1 << 2;
        /// Super / command
        const SUPER = 1 << 3;
    }
}

/// A window event delivered by [`super::WindowController::handle_events`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowEvent {
    /// Keyboard input
    Key {
        /// Key
        key: KeyCode,
        /// Transition
        action: KeyAction,
        /// Held modifiers
        modifiers: Modifiers,
    },

    /// Mouse button input
    MouseButton {
        /// Button
        button: MouseButton,
        /// Transition
        action: KeyAction,
        /// Held modifiers
        modifiers: Modifiers,
    },

    /// Cursor moved, in window coordinates
    CursorMoved {
        /// X position
        x: f64,
        /// Y position
        y: f64,
    },

    /// Wheel or touchpad scroll
    Scroll {
        /// Horizontal offset
        dx: f64,
        /// Vertical offset
        dy: f64,
    },

    /// Window client area changed size
    Resized {
        /// New width
        width: u32,
        /// New height
        height: u32,
    },

    /// Window contents need to be redrawn
    Refresh,

    /// User asked to close the window
    CloseRequested,
}

impl WindowEvent {
    /// Shorthand for a key press without modifiers
    pub const fn key_press(key: KeyCode) -> Self {
        Self::Key {
            key,
            action: KeyAction::Press,
            modifiers: Modifiers::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_helpers() {
        assert!(KeyCode::RightShift.is_shift());
        assert!(!KeyCode::Letter('S').is_shift());
        assert!(KeyCode::LeftControl.is_control());
        assert!(KeyAction::Repeat.is_down());
        assert!(!KeyAction::Release.is_down());
    }

    #[test]
    fn test_key_press_shorthand() {
        let event = WindowEvent::key_press(KeyCode::Escape);
        assert!(matches!(
            event,
            WindowEvent::Key { key: KeyCode::Escape, action: KeyAction::Press, modifiers } if modifiers.is_empty()
        ));
    }
}
