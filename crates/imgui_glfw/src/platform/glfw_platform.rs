//! GLFW-backed `Platform`
//!
//! Owns the GLFW handle, the window and its event receiver. `poll_events`
//! pumps GLFW and returns the frame's `InputEvent` batch; GLFW has no
//! joystick event queue on the window, so hot-plug is detected by diffing
//! slot presence between polls.
//!
//! GLFW reports axes in `-1.0..=1.0`; they are scaled to the
//! `-100.0..=100.0` range the navigation mapping expects. D-pad hats are
//! exposed as the `PovX` / `PovY` axes.

use glfw::{Action, Context, JoystickHats, JoystickId, StandardCursor, WindowEvent};

use super::{
    CursorHandle, InputEvent, JoystickAxis, Key, MouseButton, MouseWheel, Platform, PlatformError,
    JOYSTICK_AXIS_RANGE, JOYSTICK_COUNT,
};
use crate::gui::MouseCursor;

/// GLFW window wrapper implementing `Platform`
pub struct GlfwPlatform {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, WindowEvent)>,
    cursors: Vec<Option<glfw::Cursor>>,
    current_cursor: Option<CursorHandle>,
    joystick_present: [bool; JOYSTICK_COUNT as usize],
}

impl GlfwPlatform {
    /// Initialize GLFW and open a window with input polling enabled
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, PlatformError> {
        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|e| PlatformError::InitializationFailed(format!("{:?}", e)))?;

        glfw.window_hint(glfw::WindowHint::Resizable(true));

        let (mut window, events) = glfw
            .create_window(width, height, title, glfw::WindowMode::Windowed)
            .ok_or(PlatformError::WindowCreationFailed)?;

        window.set_all_polling(true);
        window.make_current();

        let mut platform = Self {
            glfw,
            window,
            events,
            cursors: Vec::new(),
            current_cursor: None,
            joystick_present: [false; JOYSTICK_COUNT as usize],
        };
        for id in 0..JOYSTICK_COUNT {
            platform.joystick_present[id as usize] = platform.is_joystick_connected(id);
        }

        log::info!("Opened GLFW window '{}' ({}x{})", title, width, height);
        Ok(platform)
    }

    /// Pump GLFW and translate this frame's events
    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        self.glfw.poll_events();

        let mut batch = Vec::new();
        for (_, event) in glfw::flush_messages(&self.events) {
            translate_event(&event, &mut batch);
        }
        self.poll_joystick_presence(&mut batch);
        batch
    }

    /// Whether the user asked to close the window
    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// Logical window size
    pub fn display_size(&self) -> [f32; 2] {
        let (width, height) = self.window.get_size();
        [width as f32, height as f32]
    }

    /// Framebuffer pixels per logical pixel
    pub fn framebuffer_scale(&self) -> [f32; 2] {
        let (width, height) = self.window.get_size();
        let (fb_width, fb_height) = self.window.get_framebuffer_size();
        if width <= 0 || height <= 0 {
            return [1.0, 1.0];
        }
        [fb_width as f32 / width as f32, fb_height as f32 / height as f32]
    }

    /// Present the back buffer
    pub fn swap_buffers(&mut self) {
        self.window.swap_buffers();
    }

    /// Underlying window
    pub fn window(&self) -> &glfw::PWindow {
        &self.window
    }

    /// Underlying window, mutably
    pub fn window_mut(&mut self) -> &mut glfw::PWindow {
        &mut self.window
    }

    fn poll_joystick_presence(&mut self, batch: &mut Vec<InputEvent>) {
        for id in 0..JOYSTICK_COUNT {
            let present = self.is_joystick_connected(id);
            let was_present = std::mem::replace(&mut self.joystick_present[id as usize], present);
            match (was_present, present) {
                (false, true) => batch.push(InputEvent::JoystickConnected(id)),
                (true, false) => batch.push(InputEvent::JoystickDisconnected(id)),
                _ => {}
            }
        }
    }

    fn joystick(&self, id: u32) -> Option<glfw::Joystick> {
        let id = i32::try_from(id).ok().and_then(JoystickId::from_i32)?;
        Some(self.glfw.get_joystick(id))
    }
}

impl Platform for GlfwPlatform {
    fn has_focus(&self) -> bool {
        self.window.is_focused()
    }

    fn pointer_position(&self) -> [i32; 2] {
        let (x, y) = self.window.get_cursor_pos();
        [x as i32, y as i32]
    }

    fn set_pointer_position(&mut self, position: [i32; 2]) {
        self.window
            .set_cursor_pos(f64::from(position[0]), f64::from(position[1]));
    }

    fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.window.get_mouse_button(to_glfw_button(button)) == Action::Press
    }

    fn is_touch_down(&self, _finger: u32) -> bool {
        false
    }

    fn touch_position(&self, _finger: u32) -> [i32; 2] {
        [0, 0]
    }

    fn is_joystick_connected(&self, id: u32) -> bool {
        self.joystick(id).is_some_and(|j| j.is_present())
    }

    fn is_joystick_button_pressed(&self, id: u32, button: u32) -> bool {
        let Some(joystick) = self.joystick(id) else {
            return false;
        };
        joystick
            .get_buttons()
            .get(button as usize)
            .is_some_and(|&state| state != 0)
    }

    fn joystick_axis_position(&self, id: u32, axis: JoystickAxis) -> f32 {
        let Some(joystick) = self.joystick(id) else {
            return 0.0;
        };

        let axis_index = match axis {
            JoystickAxis::X => 0,
            JoystickAxis::Y => 1,
            JoystickAxis::Z => 2,
            JoystickAxis::R => 3,
            JoystickAxis::U => 4,
            JoystickAxis::V => 5,
            JoystickAxis::PovX | JoystickAxis::PovY => {
                return joystick
                    .get_hats()
                    .first()
                    .map_or(0.0, |&hat| hat_axis_position(hat, axis));
            }
        };

        joystick
            .get_axes()
            .get(axis_index)
            .map_or(0.0, |value| value * JOYSTICK_AXIS_RANGE)
    }

    fn load_cursor(&mut self, shape: MouseCursor) -> Option<CursorHandle> {
        let standard = match shape {
            MouseCursor::Arrow => StandardCursor::Arrow,
            MouseCursor::TextInput => StandardCursor::IBeam,
            MouseCursor::ResizeNS => StandardCursor::VResize,
            MouseCursor::ResizeEW => StandardCursor::HResize,
            MouseCursor::Hand => StandardCursor::Hand,
            // GLFW 3.3 has no diagonal, move-all or not-allowed shapes
            MouseCursor::ResizeAll
            | MouseCursor::ResizeNESW
            | MouseCursor::ResizeNWSE
            | MouseCursor::NotAllowed => return None,
        };

        self.cursors.push(Some(glfw::Cursor::standard(standard)));
        Some(CursorHandle(self.cursors.len() - 1))
    }

    fn set_cursor(&mut self, cursor: CursorHandle) {
        if self.current_cursor == Some(cursor) {
            return;
        }
        let Some(next) = self.cursors.get_mut(cursor.0).and_then(Option::take) else {
            return;
        };

        // GLFW hands back the cursor it was using, which belongs to the
        // previously current slot.
        let previous = self.window.set_cursor(Some(next));
        if let Some(slot) = self.current_cursor.and_then(|h| self.cursors.get_mut(h.0)) {
            *slot = previous;
        }
        self.current_cursor = Some(cursor);
    }

    fn release_cursor(&mut self, cursor: CursorHandle) {
        if self.current_cursor == Some(cursor) {
            drop(self.window.set_cursor(None));
            self.current_cursor = None;
        }
        if let Some(slot) = self.cursors.get_mut(cursor.0) {
            *slot = None;
        }
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        let mode = if visible {
            glfw::CursorMode::Normal
        } else {
            glfw::CursorMode::Hidden
        };
        self.window.set_cursor_mode(mode);
    }
}

fn translate_event(event: &WindowEvent, batch: &mut Vec<InputEvent>) {
    match *event {
        WindowEvent::CursorPos(x, y) => batch.push(InputEvent::MouseMoved {
            x: x as i32,
            y: y as i32,
        }),
        WindowEvent::MouseButton(button, action, _) => {
            let Some(button) = from_glfw_button(button) else {
                return;
            };
            match action {
                Action::Press => batch.push(InputEvent::MouseButtonPressed(button)),
                Action::Release => batch.push(InputEvent::MouseButtonReleased(button)),
                Action::Repeat => {}
            }
        }
        WindowEvent::Scroll(x, y) => {
            if y != 0.0 {
                batch.push(InputEvent::MouseWheelScrolled {
                    wheel: MouseWheel::Vertical,
                    delta: y as f32,
                });
            }
            if x != 0.0 {
                batch.push(InputEvent::MouseWheelScrolled {
                    wheel: MouseWheel::Horizontal,
                    delta: x as f32,
                });
            }
        }
        WindowEvent::Key(key, _, action, _) => {
            let Some(key) = from_glfw_key(key) else {
                return;
            };
            match action {
                Action::Press => batch.push(InputEvent::KeyPressed(key)),
                Action::Release => batch.push(InputEvent::KeyReleased(key)),
                Action::Repeat => {}
            }
        }
        WindowEvent::Char(character) => batch.push(InputEvent::TextEntered(character)),
        WindowEvent::Focus(true) => batch.push(InputEvent::FocusGained),
        WindowEvent::Focus(false) => batch.push(InputEvent::FocusLost),
        _ => {}
    }
}

fn hat_axis_position(hat: JoystickHats, axis: JoystickAxis) -> f32 {
    if axis == JoystickAxis::PovX {
        if hat.contains(JoystickHats::Right) {
            return JOYSTICK_AXIS_RANGE;
        }
        if hat.contains(JoystickHats::Left) {
            return -JOYSTICK_AXIS_RANGE;
        }
        return 0.0;
    }

    // PovY keeps the per-OS sign the default binding compensates for:
    // up is positive on Windows and negative elsewhere.
    let up = if cfg!(windows) {
        JOYSTICK_AXIS_RANGE
    } else {
        -JOYSTICK_AXIS_RANGE
    };
    if hat.contains(JoystickHats::Up) {
        up
    } else if hat.contains(JoystickHats::Down) {
        -up
    } else {
        0.0
    }
}

const fn to_glfw_button(button: MouseButton) -> glfw::MouseButton {
    match button {
        MouseButton::Left => glfw::MouseButton::Button1,
        MouseButton::Right => glfw::MouseButton::Button2,
        MouseButton::Middle => glfw::MouseButton::Button3,
        MouseButton::XButton1 => glfw::MouseButton::Button4,
        MouseButton::XButton2 => glfw::MouseButton::Button5,
    }
}

const fn from_glfw_button(button: glfw::MouseButton) -> Option<MouseButton> {
    match button {
        glfw::MouseButton::Button1 => Some(MouseButton::Left),
        glfw::MouseButton::Button2 => Some(MouseButton::Right),
        glfw::MouseButton::Button3 => Some(MouseButton::Middle),
        glfw::MouseButton::Button4 => Some(MouseButton::XButton1),
        glfw::MouseButton::Button5 => Some(MouseButton::XButton2),
        _ => None,
    }
}

#[allow(clippy::too_many_lines)]
const fn from_glfw_key(key: glfw::Key) -> Option<Key> {
    use glfw::Key as G;

    let key = match key {
        G::A => Key::A,
        G::B => Key::B,
        G::C => Key::C,
        G::D => Key::D,
        G::E => Key::E,
        G::F => Key::F,
        G::G => Key::G,
        G::H => Key::H,
        G::I => Key::I,
        G::J => Key::J,
        G::K => Key::K,
        G::L => Key::L,
        G::M => Key::M,
        G::N => Key::N,
        G::O => Key::O,
        G::P => Key::P,
        G::Q => Key::Q,
        G::R => Key::R,
        G::S => Key::S,
        G::T => Key::T,
        G::U => Key::U,
        G::V => Key::V,
        G::W => Key::W,
        G::X => Key::X,
        G::Y => Key::Y,
        G::Z => Key::Z,
        G::Num0 => Key::Num0,
        G::Num1 => Key::Num1,
        G::Num2 => Key::Num2,
        G::Num3 => Key::Num3,
        G::Num4 => Key::Num4,
        G::Num5 => Key::Num5,
        G::Num6 => Key::Num6,
        G::Num7 => Key::Num7,
        G::Num8 => Key::Num8,
        G::Num9 => Key::Num9,
        G::Escape => Key::Escape,
        G::LeftControl => Key::LControl,
        G::LeftShift => Key::LShift,
        G::LeftAlt => Key::LAlt,
        G::LeftSuper => Key::LSystem,
        G::RightControl => Key::RControl,
        G::RightShift => Key::RShift,
        G::RightAlt => Key::RAlt,
        G::RightSuper => Key::RSystem,
        G::Menu => Key::Menu,
        G::LeftBracket => Key::LBracket,
        G::RightBracket => Key::RBracket,
        G::Semicolon => Key::Semicolon,
        G::Comma => Key::Comma,
        G::Period => Key::Period,
        G::Apostrophe => Key::Quote,
        G::Slash => Key::Slash,
        G::Backslash => Key::Backslash,
        G::GraveAccent => Key::Tilde,
        G::Equal => Key::Equal,
        G::Minus => Key::Hyphen,
        G::Space => Key::Space,
        G::Enter | G::KpEnter => Key::Enter,
        G::Backspace => Key::Backspace,
        G::Tab => Key::Tab,
        G::PageUp => Key::PageUp,
        G::PageDown => Key::PageDown,
        G::End => Key::End,
        G::Home => Key::Home,
        G::Insert => Key::Insert,
        G::Delete => Key::Delete,
        G::KpAdd => Key::Add,
        G::KpSubtract => Key::Subtract,
        G::KpMultiply => Key::Multiply,
        G::KpDivide => Key::Divide,
        G::Left => Key::Left,
        G::Right => Key::Right,
        G::Up => Key::Up,
        G::Down => Key::Down,
        G::Kp0 => Key::Numpad0,
        G::Kp1 => Key::Numpad1,
        G::Kp2 => Key::Numpad2,
        G::Kp3 => Key::Numpad3,
        G::Kp4 => Key::Numpad4,
        G::Kp5 => Key::Numpad5,
        G::Kp6 => Key::Numpad6,
        G::Kp7 => Key::Numpad7,
        G::Kp8 => Key::Numpad8,
        G::Kp9 => Key::Numpad9,
        G::F1 => Key::F1,
        G::F2 => Key::F2,
        G::F3 => Key::F3,
        G::F4 => Key::F4,
        G::F5 => Key::F5,
        G::F6 => Key::F6,
        G::F7 => Key::F7,
        G::F8 => Key::F8,
        G::F9 => Key::F9,
        G::F10 => Key::F10,
        G::F11 => Key::F11,
        G::F12 => Key::F12,
        G::F13 => Key::F13,
        G::F14 => Key::F14,
        G::F15 => Key::F15,
        G::Pause => Key::Pause,
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_splits_into_wheels() {
        let mut batch = Vec::new();
        translate_event(&WindowEvent::Scroll(0.5, -1.0), &mut batch);
        assert_eq!(
            batch,
            vec![
                InputEvent::MouseWheelScrolled {
                    wheel: MouseWheel::Vertical,
                    delta: -1.0
                },
                InputEvent::MouseWheelScrolled {
                    wheel: MouseWheel::Horizontal,
                    delta: 0.5
                },
            ]
        );
    }

    #[test]
    fn test_key_repeat_is_not_a_press() {
        let mut batch = Vec::new();
        translate_event(
            &WindowEvent::Key(glfw::Key::A, 0, Action::Repeat, glfw::Modifiers::empty()),
            &mut batch,
        );
        assert!(batch.is_empty());
    }

    #[test]
    fn test_focus_events() {
        let mut batch = Vec::new();
        translate_event(&WindowEvent::Focus(false), &mut batch);
        translate_event(&WindowEvent::Focus(true), &mut batch);
        assert_eq!(batch, vec![InputEvent::FocusLost, InputEvent::FocusGained]);
    }

    #[test]
    fn test_hat_maps_to_pov_axes() {
        let hat = JoystickHats::Up | JoystickHats::Left;
        assert_eq!(hat_axis_position(hat, JoystickAxis::PovX), -JOYSTICK_AXIS_RANGE);
        let expected_up = (if cfg!(windows) { 1.0 } else { -1.0 }) * JOYSTICK_AXIS_RANGE;
        assert_eq!(hat_axis_position(hat, JoystickAxis::PovY), expected_up);
        assert_eq!(hat_axis_position(JoystickHats::Centered, JoystickAxis::PovY), 0.0);
    }
}
