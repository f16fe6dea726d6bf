//! Input adapter
//!
//! Turns the toolkit's event batch and live device state into the GUI
//! library's per-frame `Io`. Events are only applied while the window holds
//! focus; the focus flag itself follows `FocusGained`/`FocusLost` in batch
//! order, so events queued before a focus loss still count.
//!
//! Short clicks are latched: a press seen between two updates reports the
//! button down on the next update even if it was released in between.

pub mod cursor;
pub mod joystick;

pub use cursor::CursorSet;
pub use joystick::{JoystickBinding, JoystickState, StickInfo};

use std::time::Duration;

use crate::gui::{BackendFlags, ConfigFlags, GuiContext, GuiKey, Io, NavInput};
use crate::platform::{
    InputEvent, JoystickAxis, Key, MouseButton, MouseWheel, Platform,
};

/// Buttons with press/touch latches
const LATCHED_BUTTONS: usize = 3;

/// Where the pointer position comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PointerSource {
    Mouse,
    Touch,
}

/// Per-window input state
#[derive(Debug, Clone)]
pub struct InputAdapter {
    window_has_focus: bool,
    mouse_pressed: [bool; LATCHED_BUTTONS],
    touch_down: [bool; LATCHED_BUTTONS],
    pointer_source: PointerSource,
    touch_pos: [i32; 2],
    wheel: f32,
    wheel_h: f32,
    joystick: JoystickState,
    cursors: CursorSet,
    frame_count: u64,
}

impl InputAdapter {
    /// Create the adapter and configure `Io` for this backend
    pub fn new(
        ctx: &mut impl GuiContext,
        platform: &mut impl Platform,
        display_size: [f32; 2],
        binding: JoystickBinding,
    ) -> Self {
        let io = ctx.io_mut();
        io.backend_flags |= BackendFlags::HAS_GAMEPAD
            | BackendFlags::HAS_MOUSE_CURSORS
            | BackendFlags::HAS_SET_MOUSE_POS;
        install_key_map(io);
        io.display_size = display_size;

        let mut joystick = JoystickState::new(binding);
        joystick.scan(&*platform);
        if let Some(id) = joystick.active() {
            log::info!("Using joystick {} for navigation", id);
        }

        let mut cursors = CursorSet::default();
        cursors.load_all(platform);

        Self {
            window_has_focus: platform.has_focus(),
            mouse_pressed: [false; LATCHED_BUTTONS],
            touch_down: [false; LATCHED_BUTTONS],
            pointer_source: PointerSource::Mouse,
            touch_pos: [0, 0],
            wheel: 0.0,
            wheel_h: 0.0,
            joystick,
            cursors,
            frame_count: 0,
        }
    }

    /// Apply one event from the frame's batch
    pub fn handle_event(
        &mut self,
        ctx: &mut impl GuiContext,
        platform: &impl Platform,
        event: &InputEvent,
    ) {
        match *event {
            InputEvent::FocusGained => {
                self.window_has_focus = true;
                return;
            }
            InputEvent::FocusLost => {
                self.window_has_focus = false;
                return;
            }
            // Hot-plug is hardware state, not user input
            InputEvent::JoystickConnected(id) => {
                self.joystick.on_connected(id);
                return;
            }
            InputEvent::JoystickDisconnected(id) => {
                self.joystick.on_disconnected(id, platform);
                return;
            }
            _ => {}
        }

        if !self.window_has_focus {
            return;
        }

        let io = ctx.io_mut();
        match *event {
            InputEvent::MouseMoved { .. } => self.pointer_source = PointerSource::Mouse,
            InputEvent::MouseButtonPressed(button) => {
                if let Some(latch) = self.mouse_pressed.get_mut(button.index()) {
                    *latch = true;
                }
            }
            InputEvent::TouchBegan { finger } => {
                self.pointer_source = PointerSource::Touch;
                if let Some(latch) = self.touch_down.get_mut(finger as usize) {
                    *latch = true;
                }
            }
            InputEvent::TouchEnded { .. } => self.pointer_source = PointerSource::Touch,
            InputEvent::MouseWheelScrolled { wheel, delta } => {
                let shift = is_either_down(io, Key::SHIFT);
                match wheel {
                    MouseWheel::Vertical => self.wheel += delta,
                    MouseWheel::Horizontal if shift => self.wheel += delta,
                    MouseWheel::Horizontal => self.wheel_h += delta,
                }
            }
            InputEvent::KeyPressed(key) => io.set_key_down(key.code(), true),
            InputEvent::KeyReleased(key) => io.set_key_down(key.code(), false),
            InputEvent::TextEntered(character) => {
                if accepts_character(character) {
                    io.add_input_character(character);
                }
            }
            _ => {}
        }
    }

    /// Window-level update: cursor shape, pointer source, then `update_with_pointer`
    pub fn update(
        &mut self,
        ctx: &mut impl GuiContext,
        platform: &mut impl Platform,
        display_size: [f32; 2],
        delta_time: Duration,
    ) {
        self.update_mouse_cursor(&*ctx, platform);

        let pointer = if platform.is_touch_down(0) {
            self.touch_pos = platform.touch_position(0);
            self.touch_pos
        } else if self.pointer_source == PointerSource::Touch {
            self.touch_pos
        } else {
            platform.pointer_position()
        };

        self.update_with_pointer(ctx, platform, pointer, display_size, delta_time);

        if ctx.io().mouse_draw_cursor {
            platform.set_cursor_visible(false);
        }
    }

    /// Write this frame's `Io` from an explicit pointer position and start a GUI frame
    pub fn update_with_pointer(
        &mut self,
        ctx: &mut impl GuiContext,
        platform: &mut impl Platform,
        pointer: [i32; 2],
        display_size: [f32; 2],
        delta_time: Duration,
    ) {
        let io = ctx.io_mut();
        io.display_size = display_size;
        io.delta_time = delta_time.as_secs_f32();

        if self.window_has_focus {
            if io.want_set_mouse_pos {
                platform.set_pointer_position([io.mouse_pos[0] as i32, io.mouse_pos[1] as i32]);
            } else {
                io.mouse_pos = [pointer[0] as f32, pointer[1] as f32];
            }

            for (i, button) in MouseButton::ALL.iter().take(LATCHED_BUTTONS).enumerate() {
                io.mouse_down[i] = self.touch_down[i]
                    || platform.is_touch_down(i as u32)
                    || self.mouse_pressed[i]
                    || platform.is_mouse_button_pressed(*button);
                self.mouse_pressed[i] = false;
                self.touch_down[i] = false;
            }
        }

        io.key_ctrl = is_either_down(io, Key::CONTROL);
        io.key_alt = is_either_down(io, Key::ALT);
        io.key_shift = is_either_down(io, Key::SHIFT);
        io.key_super = is_either_down(io, Key::SYSTEM);

        if io.config_flags.contains(ConfigFlags::NAV_ENABLE_GAMEPAD) {
            self.joystick.update_nav_inputs(io, &*platform);
        }

        io.mouse_wheel = std::mem::take(&mut self.wheel);
        io.mouse_wheel_h = std::mem::take(&mut self.wheel_h);

        ctx.new_frame();
        self.frame_count += 1;
        log::trace!("Input frame {} ({:?})", self.frame_count, delta_time);
    }

    fn update_mouse_cursor(&self, ctx: &impl GuiContext, platform: &mut impl Platform) {
        let io = ctx.io();
        if io.config_flags.contains(ConfigFlags::NO_MOUSE_CURSOR_CHANGE) {
            return;
        }

        match ctx.mouse_cursor() {
            Some(shape) if !io.mouse_draw_cursor => {
                platform.set_cursor_visible(true);
                if let Some(cursor) = self.cursors.resolve(shape) {
                    platform.set_cursor(cursor);
                }
            }
            _ => platform.set_cursor_visible(false),
        }
    }

    /// Release the cursor set
    pub fn shutdown(&mut self, platform: &mut impl Platform) {
        self.cursors.release_all(platform);
    }

    /// Whether events are currently applied
    pub const fn has_focus(&self) -> bool {
        self.window_has_focus
    }

    /// Number of completed updates
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Loaded cursors
    pub const fn cursors(&self) -> &CursorSet {
        &self.cursors
    }

    /// Joystick state
    pub const fn joystick(&self) -> &JoystickState {
        &self.joystick
    }

    /// Force the active joystick, `None` to disable gamepad navigation
    pub fn set_active_joystick_id(&mut self, id: Option<u32>) {
        self.joystick.set_active(id);
    }

    /// Dead zone for d-pad emulation
    pub fn set_joystick_dpad_threshold(&mut self, threshold: f32) {
        self.joystick.binding.dpad.threshold = threshold;
    }

    /// Dead zone for left-stick emulation
    pub fn set_joystick_lstick_threshold(&mut self, threshold: f32) {
        self.joystick.binding.left_stick.threshold = threshold;
    }

    /// Map a navigation action to a joystick button
    pub fn set_joystick_mapping(&mut self, action: NavInput, button: u32) {
        self.joystick.binding.set_button(action, button);
    }

    /// Axis emulating the d-pad horizontally
    pub fn set_dpad_x_axis(&mut self, axis: JoystickAxis, inverted: bool) {
        self.joystick.binding.dpad.x_axis = axis;
        self.joystick.binding.dpad.x_inverted = inverted;
    }

    /// Axis emulating the d-pad vertically
    pub fn set_dpad_y_axis(&mut self, axis: JoystickAxis, inverted: bool) {
        self.joystick.binding.dpad.y_axis = axis;
        self.joystick.binding.dpad.y_inverted = inverted;
    }

    /// Axis emulating the left stick horizontally
    pub fn set_lstick_x_axis(&mut self, axis: JoystickAxis, inverted: bool) {
        self.joystick.binding.left_stick.x_axis = axis;
        self.joystick.binding.left_stick.x_inverted = inverted;
    }

    /// Axis emulating the left stick vertically
    pub fn set_lstick_y_axis(&mut self, axis: JoystickAxis, inverted: bool) {
        self.joystick.binding.left_stick.y_axis = axis;
        self.joystick.binding.left_stick.y_inverted = inverted;
    }
}

/// Control characters and DEL never reach text widgets
pub fn accepts_character(character: char) -> bool {
    !(character < ' ' || character == '\u{7f}')
}

fn is_either_down(io: &Io, pair: [Key; 2]) -> bool {
    io.is_key_down(pair[0].code()) || io.is_key_down(pair[1].code())
}

fn install_key_map(io: &mut Io) {
    io.map_key(GuiKey::Tab, Key::Tab.code());
    io.map_key(GuiKey::LeftArrow, Key::Left.code());
    io.map_key(GuiKey::RightArrow, Key::Right.code());
    io.map_key(GuiKey::UpArrow, Key::Up.code());
    io.map_key(GuiKey::DownArrow, Key::Down.code());
    io.map_key(GuiKey::PageUp, Key::PageUp.code());
    io.map_key(GuiKey::PageDown, Key::PageDown.code());
    io.map_key(GuiKey::Home, Key::Home.code());
    io.map_key(GuiKey::End, Key::End.code());
    io.map_key(GuiKey::Insert, Key::Insert.code());
    io.map_key(GuiKey::Delete, Key::Delete.code());
    io.map_key(GuiKey::Backspace, Key::Backspace.code());
    io.map_key(GuiKey::Space, Key::Space.code());
    io.map_key(GuiKey::Enter, Key::Enter.code());
    io.map_key(GuiKey::Escape, Key::Escape.code());
    io.map_key(GuiKey::A, Key::A.code());
    io.map_key(GuiKey::C, Key::C.code());
    io.map_key(GuiKey::V, Key::V.code());
    io.map_key(GuiKey::X, Key::X.code());
    io.map_key(GuiKey::Y, Key::Y.code());
    io.map_key(GuiKey::Z, Key::Z.code());
}
