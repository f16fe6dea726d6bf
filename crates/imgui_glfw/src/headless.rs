//! In-memory `Platform` and `GuiContext`
//!
//! No window, no GUI library. `HeadlessPlatform` holds device state the
//! caller sets directly; `HeadlessContext` keeps an `Io`, hands back
//! whatever `DrawData` it was given and counts frames. Used by the test
//! suites and by hosts that drive the backend offscreen.

use std::collections::HashSet;

use crate::clipboard::{ClipboardBackend, MemoryClipboard};
use crate::gui::{DrawData, FontAtlasTexture, GuiContext, Io, LayoutCursor, MouseCursor, TextureId};
use crate::platform::{
    CursorHandle, JoystickAxis, MouseButton, Platform, JOYSTICK_BUTTON_COUNT, JOYSTICK_COUNT,
};

const AXIS_COUNT: usize = 8;
const TOUCH_FINGERS: usize = 5;

#[derive(Debug, Clone, Default)]
struct HeadlessJoystick {
    connected: bool,
    buttons: u32,
    axes: [f32; AXIS_COUNT],
}

/// Scriptable windowing toolkit
#[derive(Debug, Clone)]
pub struct HeadlessPlatform {
    focused: bool,
    pointer: [i32; 2],
    mouse_buttons: [bool; MouseButton::ALL.len()],
    touches: [Option<[i32; 2]>; TOUCH_FINGERS],
    joysticks: Vec<HeadlessJoystick>,
    unsupported_cursors: HashSet<MouseCursor>,
    live_cursors: HashSet<CursorHandle>,
    next_cursor: usize,
    loaded_cursors: usize,
    current_cursor: Option<CursorHandle>,
    cursor_visible: bool,
}

impl HeadlessPlatform {
    /// Focused window, pointer at the origin, nothing pressed or connected
    pub fn new() -> Self {
        Self {
            focused: true,
            pointer: [0, 0],
            mouse_buttons: [false; MouseButton::ALL.len()],
            touches: [None; TOUCH_FINGERS],
            joysticks: vec![HeadlessJoystick::default(); JOYSTICK_COUNT as usize],
            unsupported_cursors: HashSet::new(),
            live_cursors: HashSet::new(),
            next_cursor: 1,
            loaded_cursors: 0,
            current_cursor: None,
            cursor_visible: true,
        }
    }

    /// Set the toolkit's focus state
    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Move the pointer
    pub fn set_pointer(&mut self, position: [i32; 2]) {
        self.pointer = position;
    }

    /// Hold or release a mouse button
    pub fn set_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        self.mouse_buttons[button.index()] = pressed;
    }

    /// Put a finger down at a position, or lift it with `None`
    pub fn set_touch(&mut self, finger: u32, position: Option<[i32; 2]>) {
        if let Some(slot) = self.touches.get_mut(finger as usize) {
            *slot = position;
        }
    }

    /// Plug a joystick into a slot
    pub fn connect_joystick(&mut self, id: u32) {
        if let Some(joystick) = self.joysticks.get_mut(id as usize) {
            joystick.connected = true;
        }
    }

    /// Unplug a joystick and clear its state
    pub fn disconnect_joystick(&mut self, id: u32) {
        if let Some(joystick) = self.joysticks.get_mut(id as usize) {
            *joystick = HeadlessJoystick::default();
        }
    }

    /// Hold or release a joystick button
    pub fn set_joystick_button(&mut self, id: u32, button: u32, pressed: bool) {
        if button >= JOYSTICK_BUTTON_COUNT {
            return;
        }
        if let Some(joystick) = self.joysticks.get_mut(id as usize) {
            if pressed {
                joystick.buttons |= 1 << button;
            } else {
                joystick.buttons &= !(1 << button);
            }
        }
    }

    /// Deflect a joystick axis, in `-100.0..=100.0`
    pub fn set_joystick_axis(&mut self, id: u32, axis: JoystickAxis, position: f32) {
        if let Some(joystick) = self.joysticks.get_mut(id as usize) {
            joystick.axes[axis as usize] = position;
        }
    }

    /// Make `load_cursor` fail for a shape
    pub fn set_unsupported_cursor(&mut self, shape: MouseCursor) {
        self.unsupported_cursors.insert(shape);
    }

    /// Total successful `load_cursor` calls
    pub const fn loaded_cursor_count(&self) -> usize {
        self.loaded_cursors
    }

    /// Cursors loaded and not yet released
    pub fn live_cursor_count(&self) -> usize {
        self.live_cursors.len()
    }

    /// Cursor last made current
    pub const fn current_cursor(&self) -> Option<CursorHandle> {
        self.current_cursor
    }

    /// Whether the OS cursor is shown
    pub const fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    fn joystick(&self, id: u32) -> Option<&HeadlessJoystick> {
        self.joysticks.get(id as usize).filter(|j| j.connected)
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for HeadlessPlatform {
    fn has_focus(&self) -> bool {
        self.focused
    }

    fn pointer_position(&self) -> [i32; 2] {
        self.pointer
    }

    fn set_pointer_position(&mut self, position: [i32; 2]) {
        self.pointer = position;
    }

    fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons[button.index()]
    }

    fn is_touch_down(&self, finger: u32) -> bool {
        self.touches
            .get(finger as usize)
            .is_some_and(Option::is_some)
    }

    fn touch_position(&self, finger: u32) -> [i32; 2] {
        self.touches
            .get(finger as usize)
            .copied()
            .flatten()
            .unwrap_or(self.pointer)
    }

    fn is_joystick_connected(&self, id: u32) -> bool {
        self.joystick(id).is_some()
    }

    fn is_joystick_button_pressed(&self, id: u32, button: u32) -> bool {
        button < JOYSTICK_BUTTON_COUNT
            && self
                .joystick(id)
                .is_some_and(|j| j.buttons & (1 << button) != 0)
    }

    fn joystick_axis_position(&self, id: u32, axis: JoystickAxis) -> f32 {
        self.joystick(id).map_or(0.0, |j| j.axes[axis as usize])
    }

    fn load_cursor(&mut self, shape: MouseCursor) -> Option<CursorHandle> {
        if self.unsupported_cursors.contains(&shape) {
            return None;
        }
        let handle = CursorHandle(self.next_cursor);
        self.next_cursor += 1;
        self.loaded_cursors += 1;
        self.live_cursors.insert(handle);
        Some(handle)
    }

    fn set_cursor(&mut self, cursor: CursorHandle) {
        if self.live_cursors.contains(&cursor) {
            self.current_cursor = Some(cursor);
        } else {
            log::warn!("Ignoring unknown cursor {:?}", cursor);
        }
    }

    fn release_cursor(&mut self, cursor: CursorHandle) {
        self.live_cursors.remove(&cursor);
        if self.current_cursor == Some(cursor) {
            self.current_cursor = None;
        }
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }
}

/// GUI context stand-in that replays caller-provided draw data
pub struct HeadlessContext {
    io: Io,
    draw_data: DrawData,
    mouse_cursor: Option<MouseCursor>,
    cursor_screen_pos: [f32; 2],
    atlas_size: [u32; 2],
    atlas_pixels: Vec<u8>,
    font_texture_id: Option<TextureId>,
    clipboard: Box<dyn ClipboardBackend>,
    frame_count: u64,
    render_count: u64,
}

impl HeadlessContext {
    /// Context with an 8x8 white font atlas and an in-memory clipboard
    pub fn new() -> Self {
        Self::with_font_atlas(8, 8, vec![0xFF; 8 * 8 * 4])
    }

    /// Context whose font atlas is `pixels`, `width * height * 4` bytes of RGBA
    pub fn with_font_atlas(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            io: Io::default(),
            draw_data: DrawData::default(),
            mouse_cursor: Some(MouseCursor::Arrow),
            cursor_screen_pos: [0.0, 0.0],
            atlas_size: [width, height],
            atlas_pixels: pixels,
            font_texture_id: None,
            clipboard: Box::new(MemoryClipboard::default()),
            frame_count: 0,
            render_count: 0,
        }
    }

    /// Draw data returned by the next `render`
    pub fn set_draw_data(&mut self, draw_data: DrawData) {
        self.draw_data = draw_data;
    }

    /// Cursor shape reported to the backend
    pub fn set_mouse_cursor(&mut self, cursor: Option<MouseCursor>) {
        self.mouse_cursor = cursor;
    }

    /// Layout cursor reported to the backend
    pub fn set_cursor_screen_pos(&mut self, position: [f32; 2]) {
        self.cursor_screen_pos = position;
    }

    /// Texture id installed for the font atlas
    pub const fn font_texture_id(&self) -> Option<TextureId> {
        self.font_texture_id
    }

    /// Read through the installed clipboard
    pub fn clipboard_text(&mut self) -> Option<String> {
        self.clipboard.get()
    }

    /// Write through the installed clipboard
    pub fn set_clipboard_text(&mut self, text: &str) {
        self.clipboard.set(text);
    }

    /// Number of `new_frame` calls
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Number of `render` calls
    pub const fn render_count(&self) -> u64 {
        self.render_count
    }
}

impl Default for HeadlessContext {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCursor for HeadlessContext {
    fn cursor_screen_pos(&self) -> [f32; 2] {
        self.cursor_screen_pos
    }
}

impl GuiContext for HeadlessContext {
    fn io(&self) -> &Io {
        &self.io
    }

    fn io_mut(&mut self) -> &mut Io {
        &mut self.io
    }

    fn new_frame(&mut self) {
        // Text queued for the previous frame has been consumed by widgets
        self.io.take_input_characters();
        self.frame_count += 1;
    }

    fn render(&mut self) -> &DrawData {
        self.render_count += 1;
        self.draw_data.display_size = self.io.display_size;
        self.draw_data.framebuffer_scale = self.io.display_framebuffer_scale;
        &self.draw_data
    }

    fn mouse_cursor(&self) -> Option<MouseCursor> {
        if self.io.mouse_draw_cursor {
            None
        } else {
            self.mouse_cursor
        }
    }

    fn font_atlas_rgba32(&mut self) -> FontAtlasTexture<'_> {
        FontAtlasTexture {
            width: self.atlas_size[0],
            height: self.atlas_size[1],
            data: &self.atlas_pixels,
        }
    }

    fn set_font_texture_id(&mut self, id: Option<TextureId>) {
        self.font_texture_id = id;
    }

    fn set_clipboard_backend(&mut self, backend: Box<dyn ClipboardBackend>) {
        self.clipboard = backend;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_joystick_reads_neutral() {
        let mut platform = HeadlessPlatform::new();
        platform.connect_joystick(3);
        platform.set_joystick_button(3, 7, true);
        platform.set_joystick_axis(3, JoystickAxis::Z, 50.0);
        assert!(platform.is_joystick_button_pressed(3, 7));

        platform.disconnect_joystick(3);
        assert!(!platform.is_joystick_connected(3));
        assert!(!platform.is_joystick_button_pressed(3, 7));
        assert_eq!(platform.joystick_axis_position(3, JoystickAxis::Z), 0.0);
    }

    #[test]
    fn test_render_reports_io_display() {
        let mut ctx = HeadlessContext::new();
        ctx.io_mut().display_size = [320.0, 200.0];
        ctx.io_mut().display_framebuffer_scale = [2.0, 2.0];

        let draw_data = ctx.render();
        assert_eq!(draw_data.display_size, [320.0, 200.0]);
        assert_eq!(draw_data.framebuffer_scale, [2.0, 2.0]);
        assert_eq!(ctx.render_count(), 1);
    }
}
