//! Windowing toolkit interface
//!
//! The toolkit is consumed two ways:
//! - discrete occurrences arrive as a per-frame batch of `InputEvent`s that
//!   the host hands to the backend one by one
//! - continuous state (focus, pointer, buttons, touch, joysticks) is polled
//!   through the `Platform` trait during `update`
//!
//! Cursor shapes are loaded and owned through `Platform` as opaque
//! `CursorHandle`s.

pub mod keyboard;

#[cfg(feature = "glfw")]
pub mod glfw_platform;

pub use keyboard::Key;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gui::MouseCursor;

/// Number of joystick slots the toolkit exposes
pub const JOYSTICK_COUNT: u32 = 16;

/// Number of buttons per joystick the toolkit exposes
pub const JOYSTICK_BUTTON_COUNT: u32 = 32;

/// Magnitude of a fully deflected joystick axis
pub const JOYSTICK_AXIS_RANGE: f32 = 100.0;

/// Windowing toolkit errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Toolkit could not be initialized
    #[error("Windowing toolkit initialization failed: {0}")]
    InitializationFailed(String),

    /// Window could not be created
    #[error("Window creation failed")]
    WindowCreationFailed,
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
    /// First extra button
    XButton1,
    /// Second extra button
    XButton2,
}

impl MouseButton {
    /// Buttons in `Io::mouse_down` order
    pub const ALL: [Self; 5] = [
        Self::Left,
        Self::Right,
        Self::Middle,
        Self::XButton1,
        Self::XButton2,
    ];

    /// Index into `Io::mouse_down`
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Scroll wheels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseWheel {
    /// Ordinary vertical wheel
    Vertical,
    /// Horizontal wheel or trackpad sideways scroll
    Horizontal,
}

/// Joystick axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoystickAxis {
    /// Left stick horizontal
    X,
    /// Left stick vertical
    Y,
    /// Third axis, usually a trigger
    Z,
    /// Fourth axis, usually right stick vertical
    R,
    /// Fifth axis, usually right stick horizontal
    U,
    /// Sixth axis
    V,
    /// D-pad horizontal
    PovX,
    /// D-pad vertical
    PovY,
}

/// Opaque cursor handle issued by `Platform::load_cursor`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CursorHandle(pub usize);

/// Discrete input occurrences collected by the host each frame
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer moved to window coordinates
    MouseMoved {
        /// Horizontal position
        x: i32,
        /// Vertical position
        y: i32,
    },
    /// Mouse button went down
    MouseButtonPressed(MouseButton),
    /// Mouse button went up
    MouseButtonReleased(MouseButton),
    /// Wheel scrolled
    MouseWheelScrolled {
        /// Which wheel
        wheel: MouseWheel,
        /// Scroll amount in wheel notches
        delta: f32,
    },
    /// A finger touched the surface
    TouchBegan {
        /// Finger index
        finger: u32,
    },
    /// A finger left the surface
    TouchEnded {
        /// Finger index
        finger: u32,
    },
    /// Key went down
    KeyPressed(Key),
    /// Key went up
    KeyReleased(Key),
    /// Text was typed
    TextEntered(char),
    /// A joystick was plugged in
    JoystickConnected(u32),
    /// A joystick was unplugged
    JoystickDisconnected(u32),
    /// Window gained input focus
    FocusGained,
    /// Window lost input focus
    FocusLost,
}

/// Live windowing toolkit state
pub trait Platform {
    /// Whether the window holds input focus
    fn has_focus(&self) -> bool;

    /// Pointer position in window coordinates
    fn pointer_position(&self) -> [i32; 2];

    /// Warp the OS pointer to window coordinates
    fn set_pointer_position(&mut self, position: [i32; 2]);

    /// Whether a mouse button is physically held
    fn is_mouse_button_pressed(&self, button: MouseButton) -> bool;

    /// Whether a finger is on the surface
    fn is_touch_down(&self, finger: u32) -> bool;

    /// Position of a finger in window coordinates
    fn touch_position(&self, finger: u32) -> [i32; 2];

    /// Whether a joystick slot has a device
    fn is_joystick_connected(&self, id: u32) -> bool;

    /// Whether a joystick button is held
    fn is_joystick_button_pressed(&self, id: u32, button: u32) -> bool;

    /// Axis position in `-100.0..=100.0`
    fn joystick_axis_position(&self, id: u32, axis: JoystickAxis) -> f32;

    /// Create a system cursor for a shape, `None` if the toolkit has no match
    fn load_cursor(&mut self, shape: MouseCursor) -> Option<CursorHandle>;

    /// Make a loaded cursor current
    fn set_cursor(&mut self, cursor: CursorHandle);

    /// Destroy a loaded cursor
    fn release_cursor(&mut self, cursor: CursorHandle);

    /// Show or hide the OS cursor
    fn set_cursor_visible(&mut self, visible: bool);
}

/// Lowest-indexed connected joystick
pub fn first_connected_joystick(platform: &impl Platform) -> Option<u32> {
    (0..JOYSTICK_COUNT).find(|&id| platform.is_joystick_connected(id))
}
