//! Per-frame IO state shared with the GUI library
//!
//! `Io` mirrors the fields an immediate-mode GUI library reads at the start of
//! every frame. The backend writes them in `update` and the library consumes
//! them in `new_frame`.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Size of the per-key pressed table, indexed by toolkit key code
pub const KEYS_DOWN_COUNT: usize = 512;

/// Number of mouse buttons tracked by the IO structure
pub const MOUSE_BUTTON_COUNT: usize = 5;

bitflags! {
    /// Configuration flags set by the application
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ConfigFlags: u32 {
        /// Keyboard navigation is enabled
        const NAV_ENABLE_KEYBOARD = 1 << 0;
        /// Gamepad navigation is enabled, the backend fills `nav_inputs`
        const NAV_ENABLE_GAMEPAD = 1 << 1;
        /// Navigation may move the mouse cursor
        const NAV_ENABLE_SET_MOUSE_POS = 1 << 2;
        /// Do not set `want_capture_keyboard` when navigation is active
        const NAV_NO_CAPTURE_KEYBOARD = 1 << 3;
        /// Ignore mouse input entirely
        const NO_MOUSE = 1 << 4;
        /// The backend must not touch the OS cursor shape or visibility
        const NO_MOUSE_CURSOR_CHANGE = 1 << 5;
    }
}

bitflags! {
    /// Capabilities advertised by the backend
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BackendFlags: u32 {
        /// A gamepad is wired into `nav_inputs`
        const HAS_GAMEPAD = 1 << 0;
        /// The backend honors `GuiContext::mouse_cursor`
        const HAS_MOUSE_CURSORS = 1 << 1;
        /// The backend honors `want_set_mouse_pos`
        const HAS_SET_MOUSE_POS = 1 << 2;
    }
}

/// Abstract gamepad navigation inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NavInput {
    /// Activate / open / toggle
    Activate,
    /// Cancel / close / exit
    Cancel,
    /// Text input / on-screen keyboard
    Input,
    /// Context menu / window tweaks
    Menu,
    /// D-pad left
    DpadLeft,
    /// D-pad right
    DpadRight,
    /// D-pad up
    DpadUp,
    /// D-pad down
    DpadDown,
    /// Left stick left
    LStickLeft,
    /// Left stick right
    LStickRight,
    /// Left stick up
    LStickUp,
    /// Left stick down
    LStickDown,
    /// Focus previous window
    FocusPrev,
    /// Focus next window
    FocusNext,
    /// Slower tweaks
    TweakSlow,
    /// Faster tweaks
    TweakFast,
}

impl NavInput {
    /// Number of navigation inputs
    pub const COUNT: usize = 16;

    /// Every navigation input in index order
    pub const ALL: [Self; Self::COUNT] = [
        Self::Activate,
        Self::Cancel,
        Self::Input,
        Self::Menu,
        Self::DpadLeft,
        Self::DpadRight,
        Self::DpadUp,
        Self::DpadDown,
        Self::LStickLeft,
        Self::LStickRight,
        Self::LStickUp,
        Self::LStickDown,
        Self::FocusPrev,
        Self::FocusNext,
        Self::TweakSlow,
        Self::TweakFast,
    ];

    /// Index into `Io::nav_inputs`
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Keys the GUI library needs mapped to toolkit key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuiKey {
    /// Tab
    Tab,
    /// Left arrow
    LeftArrow,
    /// Right arrow
    RightArrow,
    /// Up arrow
    UpArrow,
    /// Down arrow
    DownArrow,
    /// Page up
    PageUp,
    /// Page down
    PageDown,
    /// Home
    Home,
    /// End
    End,
    /// Insert
    Insert,
    /// Delete
    Delete,
    /// Backspace
    Backspace,
    /// Space
    Space,
    /// Enter
    Enter,
    /// Escape
    Escape,
    /// A, for select-all
    A,
    /// C, for copy
    C,
    /// V, for paste
    V,
    /// X, for cut
    X,
    /// Y, for redo
    Y,
    /// Z, for undo
    Z,
}

impl GuiKey {
    /// Number of mapped keys
    pub const COUNT: usize = 21;

    /// Index into `Io::key_map`
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Cursor shapes the GUI library may request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseCursor {
    /// Default arrow
    Arrow,
    /// Text input I-beam
    TextInput,
    /// Move in every direction
    ResizeAll,
    /// Vertical resize
    ResizeNS,
    /// Horizontal resize
    ResizeEW,
    /// Resize along the bottom-left / top-right diagonal
    ResizeNESW,
    /// Resize along the top-left / bottom-right diagonal
    ResizeNWSE,
    /// Pointing hand
    Hand,
    /// Operation not allowed
    NotAllowed,
}

impl MouseCursor {
    /// Number of cursor shapes
    pub const COUNT: usize = 9;

    /// Every cursor shape in index order
    pub const ALL: [Self; Self::COUNT] = [
        Self::Arrow,
        Self::TextInput,
        Self::ResizeAll,
        Self::ResizeNS,
        Self::ResizeEW,
        Self::ResizeNESW,
        Self::ResizeNWSE,
        Self::Hand,
        Self::NotAllowed,
    ];

    /// Index into cursor tables
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Input/output state exchanged with the GUI library once per frame
#[derive(Debug, Clone)]
pub struct Io {
    /// Flags set by the application
    pub config_flags: ConfigFlags,
    /// Flags set by the backend
    pub backend_flags: BackendFlags,
    /// Logical display size in pixels
    pub display_size: [f32; 2],
    /// Framebuffer pixels per logical pixel
    pub display_framebuffer_scale: [f32; 2],
    /// Seconds elapsed since the previous frame
    pub delta_time: f32,
    /// Pointer position in window coordinates
    pub mouse_pos: [f32; 2],
    /// Mouse button states: left, right, middle, extra 1, extra 2
    pub mouse_down: [bool; MOUSE_BUTTON_COUNT],
    /// Vertical scroll for this frame
    pub mouse_wheel: f32,
    /// Horizontal scroll for this frame
    pub mouse_wheel_h: f32,
    /// Either control key is held
    pub key_ctrl: bool,
    /// Either shift key is held
    pub key_shift: bool,
    /// Either alt key is held
    pub key_alt: bool,
    /// Either system/super key is held
    pub key_super: bool,
    /// Pressed state per toolkit key code
    pub keys_down: [bool; KEYS_DOWN_COUNT],
    /// Toolkit key code for each `GuiKey`
    pub key_map: [Option<usize>; GuiKey::COUNT],
    /// Analog navigation values in `0.0..=1.0`
    pub nav_inputs: [f32; NavInput::COUNT],
    /// The library asks the backend to move the OS pointer to `mouse_pos`
    pub want_set_mouse_pos: bool,
    /// The library renders its own cursor
    pub mouse_draw_cursor: bool,
    input_characters: Vec<char>,
}

impl Default for Io {
    fn default() -> Self {
        Self {
            config_flags: ConfigFlags::empty(),
            backend_flags: BackendFlags::empty(),
            display_size: [0.0, 0.0],
            display_framebuffer_scale: [1.0, 1.0],
            delta_time: 1.0 / 60.0,
            mouse_pos: [f32::MIN, f32::MIN],
            mouse_down: [false; MOUSE_BUTTON_COUNT],
            mouse_wheel: 0.0,
            mouse_wheel_h: 0.0,
            key_ctrl: false,
            key_shift: false,
            key_alt: false,
            key_super: false,
            keys_down: [false; KEYS_DOWN_COUNT],
            key_map: [None; GuiKey::COUNT],
            nav_inputs: [0.0; NavInput::COUNT],
            want_set_mouse_pos: false,
            mouse_draw_cursor: false,
            input_characters: Vec::new(),
        }
    }
}

impl Io {
    /// Queue a character for text input
    pub fn add_input_character(&mut self, character: char) {
        self.input_characters.push(character);
    }

    /// Characters queued since the last `take_input_characters`
    pub fn input_characters(&self) -> &[char] {
        &self.input_characters
    }

    /// Drain the queued characters (done by the library in `new_frame`)
    pub fn take_input_characters(&mut self) -> Vec<char> {
        std::mem::take(&mut self.input_characters)
    }

    /// Whether the toolkit key with this code is held
    pub fn is_key_down(&self, code: usize) -> bool {
        self.keys_down.get(code).copied().unwrap_or(false)
    }

    /// Record a toolkit key state; codes outside the table are ignored
    pub fn set_key_down(&mut self, code: usize, down: bool) {
        if let Some(slot) = self.keys_down.get_mut(code) {
            *slot = down;
        }
    }

    /// Current value of a navigation input
    pub fn nav_input(&self, input: NavInput) -> f32 {
        self.nav_inputs[input.index()]
    }

    /// Set a navigation input value
    pub fn set_nav_input(&mut self, input: NavInput, value: f32) {
        self.nav_inputs[input.index()] = value;
    }

    /// Map a GUI key to a toolkit key code
    pub fn map_key(&mut self, key: GuiKey, code: usize) {
        self.key_map[key.index()] = Some(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nav_input_indices_are_dense() {
        for (i, input) in NavInput::ALL.iter().enumerate() {
            assert_eq!(input.index(), i);
        }
    }

    #[test]
    fn test_key_codes_outside_table_are_ignored() {
        let mut io = Io::default();
        io.set_key_down(KEYS_DOWN_COUNT + 3, true);
        assert!(!io.is_key_down(KEYS_DOWN_COUNT + 3));

        io.set_key_down(10, true);
        assert!(io.is_key_down(10));
    }

    #[test]
    fn test_take_input_characters_drains_queue() {
        let mut io = Io::default();
        io.add_input_character('a');
        io.add_input_character('é');
        assert_eq!(io.take_input_characters(), vec!['a', 'é']);
        assert!(io.input_characters().is_empty());
    }
}
