//! Dear ImGui through the `imgui` crate
//!
//! `ImguiContext` owns an `imgui::Context` and an `Io`. The backend writes
//! the `Io` as usual; `new_frame` forwards whatever changed into Dear ImGui's
//! input queue, and `render` converts Dear ImGui's draw data into `DrawData`.
//!
//! Widgets are built inside `frame`, which opens the Dear ImGui frame and
//! hands out its `Ui`:
//!
//! ```text
//! backend.update(&mut gui, ..)    // Io written, input queued
//! gui.frame(|ui| { .. })          // NewFrame + widgets
//! backend.render(&mut gui, ..)    // Render + draw
//! ```

use crate::clipboard::ClipboardBackend;

use super::io::MOUSE_BUTTON_COUNT;
use super::{
    BackendFlags, ConfigFlags, DrawCmd, DrawData, DrawList, DrawVert, FontAtlasTexture, GuiContext,
    GuiKey, Io, MouseCursor, NavInput, TextureId,
};

/// Dear ImGui rejects a zero frame time
const MIN_DELTA_TIME: f32 = 1.0e-5;

/// Gamepad keys fed from `Io::nav_inputs`
const GAMEPAD_KEY_COUNT: usize = 14;

const GUI_KEYS: [(GuiKey, imgui::Key); GuiKey::COUNT] = [
    (GuiKey::Tab, imgui::Key::Tab),
    (GuiKey::LeftArrow, imgui::Key::LeftArrow),
    (GuiKey::RightArrow, imgui::Key::RightArrow),
    (GuiKey::UpArrow, imgui::Key::UpArrow),
    (GuiKey::DownArrow, imgui::Key::DownArrow),
    (GuiKey::PageUp, imgui::Key::PageUp),
    (GuiKey::PageDown, imgui::Key::PageDown),
    (GuiKey::Home, imgui::Key::Home),
    (GuiKey::End, imgui::Key::End),
    (GuiKey::Insert, imgui::Key::Insert),
    (GuiKey::Delete, imgui::Key::Delete),
    (GuiKey::Backspace, imgui::Key::Backspace),
    (GuiKey::Space, imgui::Key::Space),
    (GuiKey::Enter, imgui::Key::Enter),
    (GuiKey::Escape, imgui::Key::Escape),
    (GuiKey::A, imgui::Key::A),
    (GuiKey::C, imgui::Key::C),
    (GuiKey::V, imgui::Key::V),
    (GuiKey::X, imgui::Key::X),
    (GuiKey::Y, imgui::Key::Y),
    (GuiKey::Z, imgui::Key::Z),
];

const MODIFIER_KEYS: [imgui::Key; 4] = [
    imgui::Key::ModCtrl,
    imgui::Key::ModShift,
    imgui::Key::ModAlt,
    imgui::Key::ModSuper,
];

const GAMEPAD_KEYS: [imgui::Key; GAMEPAD_KEY_COUNT] = [
    imgui::Key::GamepadFaceDown,
    imgui::Key::GamepadFaceRight,
    imgui::Key::GamepadFaceUp,
    imgui::Key::GamepadFaceLeft,
    imgui::Key::GamepadDpadLeft,
    imgui::Key::GamepadDpadRight,
    imgui::Key::GamepadDpadUp,
    imgui::Key::GamepadDpadDown,
    imgui::Key::GamepadLStickLeft,
    imgui::Key::GamepadLStickRight,
    imgui::Key::GamepadLStickUp,
    imgui::Key::GamepadLStickDown,
    imgui::Key::GamepadL1,
    imgui::Key::GamepadR1,
];

const MOUSE_BUTTONS: [imgui::MouseButton; MOUSE_BUTTON_COUNT] = [
    imgui::MouseButton::Left,
    imgui::MouseButton::Right,
    imgui::MouseButton::Middle,
    imgui::MouseButton::Extra1,
    imgui::MouseButton::Extra2,
];

/// Slot in `GAMEPAD_KEYS` a navigation input drives; the shoulder buttons
/// serve both window focus and tweak speed
const fn gamepad_slot(input: NavInput) -> usize {
    match input {
        NavInput::TweakSlow => NavInput::FocusPrev.index(),
        NavInput::TweakFast => NavInput::FocusNext.index(),
        other => other.index(),
    }
}

fn config_flag_pairs() -> [(ConfigFlags, imgui::ConfigFlags); 6] {
    [
        (ConfigFlags::NAV_ENABLE_KEYBOARD, imgui::ConfigFlags::NAV_ENABLE_KEYBOARD),
        (ConfigFlags::NAV_ENABLE_GAMEPAD, imgui::ConfigFlags::NAV_ENABLE_GAMEPAD),
        (ConfigFlags::NAV_ENABLE_SET_MOUSE_POS, imgui::ConfigFlags::NAV_ENABLE_SET_MOUSE_POS),
        (ConfigFlags::NAV_NO_CAPTURE_KEYBOARD, imgui::ConfigFlags::NAV_NO_CAPTURE_KEYBOARD),
        (ConfigFlags::NO_MOUSE, imgui::ConfigFlags::NO_MOUSE),
        (ConfigFlags::NO_MOUSE_CURSOR_CHANGE, imgui::ConfigFlags::NO_MOUSE_CURSOR_CHANGE),
    ]
}

fn backend_flag_pairs() -> [(BackendFlags, imgui::BackendFlags); 3] {
    [
        (BackendFlags::HAS_GAMEPAD, imgui::BackendFlags::HAS_GAMEPAD),
        (BackendFlags::HAS_MOUSE_CURSORS, imgui::BackendFlags::HAS_MOUSE_CURSORS),
        (BackendFlags::HAS_SET_MOUSE_POS, imgui::BackendFlags::HAS_SET_MOUSE_POS),
    ]
}

/// Cursor shape for a Dear ImGui cursor
pub const fn mouse_cursor_from_imgui(cursor: imgui::MouseCursor) -> MouseCursor {
    match cursor {
        imgui::MouseCursor::Arrow => MouseCursor::Arrow,
        imgui::MouseCursor::TextInput => MouseCursor::TextInput,
        imgui::MouseCursor::ResizeAll => MouseCursor::ResizeAll,
        imgui::MouseCursor::ResizeNS => MouseCursor::ResizeNS,
        imgui::MouseCursor::ResizeEW => MouseCursor::ResizeEW,
        imgui::MouseCursor::ResizeNESW => MouseCursor::ResizeNESW,
        imgui::MouseCursor::ResizeNWSE => MouseCursor::ResizeNWSE,
        imgui::MouseCursor::Hand => MouseCursor::Hand,
        imgui::MouseCursor::NotAllowed => MouseCursor::NotAllowed,
    }
}

/// Input already queued into Dear ImGui, so only changes are sent
#[derive(Debug, Clone, PartialEq)]
struct QueuedInput {
    mouse_pos: [f32; 2],
    mouse_down: [bool; MOUSE_BUTTON_COUNT],
    modifiers: [bool; 4],
    keys: [bool; GuiKey::COUNT],
    gamepad: [f32; GAMEPAD_KEY_COUNT],
}

impl Default for QueuedInput {
    fn default() -> Self {
        Self {
            mouse_pos: [f32::MIN, f32::MIN],
            mouse_down: [false; MOUSE_BUTTON_COUNT],
            modifiers: [false; 4],
            keys: [false; GuiKey::COUNT],
            gamepad: [0.0; GAMEPAD_KEY_COUNT],
        }
    }
}

struct ClipboardBridge(Box<dyn ClipboardBackend>);

impl imgui::ClipboardBackend for ClipboardBridge {
    fn get(&mut self) -> Option<String> {
        self.0.get()
    }

    fn set(&mut self, value: &str) {
        self.0.set(value);
    }
}

/// `GuiContext` backed by Dear ImGui
pub struct ImguiContext {
    context: imgui::Context,
    io: Io,
    queued: QueuedInput,
    draw_data: DrawData,
    mouse_cursor: Option<MouseCursor>,
    frame_open: bool,
}

impl std::fmt::Debug for ImguiContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImguiContext")
            .field("io", &self.io)
            .field("mouse_cursor", &self.mouse_cursor)
            .field("frame_open", &self.frame_open)
            .finish_non_exhaustive()
    }
}

impl ImguiContext {
    /// Wrap a configured Dear ImGui context
    ///
    /// Config flags and `mouse_draw_cursor` are read from `context` once; from
    /// then on `io_mut` is where they are changed.
    pub fn new(mut context: imgui::Context) -> Self {
        let mut io = Io::default();
        {
            let raw = context.io();
            for (ours, theirs) in config_flag_pairs() {
                io.config_flags.set(ours, raw.config_flags.contains(theirs));
            }
            io.mouse_draw_cursor = raw.mouse_draw_cursor;
            io.display_framebuffer_scale = raw.display_framebuffer_scale;
        }
        // NewFrame refuses to run before the atlas is built
        context.fonts().build_rgba32_texture();

        Self {
            context,
            io,
            queued: QueuedInput::default(),
            draw_data: DrawData::default(),
            mouse_cursor: Some(MouseCursor::Arrow),
            frame_open: false,
        }
    }

    /// Fresh Dear ImGui context without an ini file
    pub fn create() -> Self {
        let mut context = imgui::Context::create();
        context.set_ini_filename(None);
        Self::new(context)
    }

    /// Wrapped context
    pub const fn imgui(&self) -> &imgui::Context {
        &self.context
    }

    /// Wrapped context, for fonts and style
    pub fn imgui_mut(&mut self) -> &mut imgui::Context {
        &mut self.context
    }

    /// Open the Dear ImGui frame and build widgets in it
    pub fn frame(&mut self, build: impl FnOnce(&mut imgui::Ui)) {
        if self.frame_open {
            log::warn!("Previous GUI frame was never rendered; discarding it");
            self.context.render();
        }

        let ui = self.context.new_frame();
        build(&mut *ui);
        self.mouse_cursor = ui.mouse_cursor().map(mouse_cursor_from_imgui);
        self.frame_open = true;
    }

    /// Give back the wrapped context
    pub fn into_inner(self) -> imgui::Context {
        self.context
    }

    fn queue_input(&mut self) {
        let io = &mut self.io;
        let queued = &mut self.queued;
        let raw = self.context.io_mut();

        for (ours, theirs) in config_flag_pairs() {
            raw.config_flags.set(theirs, io.config_flags.contains(ours));
        }
        for (ours, theirs) in backend_flag_pairs() {
            raw.backend_flags.set(theirs, io.backend_flags.contains(ours));
        }
        raw.display_size = io.display_size;
        raw.display_framebuffer_scale = io.display_framebuffer_scale;
        raw.delta_time = io.delta_time.max(MIN_DELTA_TIME);
        raw.mouse_draw_cursor = io.mouse_draw_cursor;

        if io.mouse_pos != queued.mouse_pos {
            raw.add_mouse_pos_event(io.mouse_pos);
            queued.mouse_pos = io.mouse_pos;
        }
        for (i, button) in MOUSE_BUTTONS.iter().enumerate() {
            if io.mouse_down[i] != queued.mouse_down[i] {
                raw.add_mouse_button_event(*button, io.mouse_down[i]);
                queued.mouse_down[i] = io.mouse_down[i];
            }
        }
        if io.mouse_wheel != 0.0 || io.mouse_wheel_h != 0.0 {
            raw.add_mouse_wheel_event([io.mouse_wheel_h, io.mouse_wheel]);
        }

        let modifiers = [io.key_ctrl, io.key_shift, io.key_alt, io.key_super];
        for (i, key) in MODIFIER_KEYS.iter().enumerate() {
            if modifiers[i] != queued.modifiers[i] {
                raw.add_key_event(*key, modifiers[i]);
                queued.modifiers[i] = modifiers[i];
            }
        }

        for (gui_key, key) in GUI_KEYS {
            let down = io.key_map[gui_key.index()].is_some_and(|code| io.is_key_down(code));
            let slot = &mut queued.keys[gui_key.index()];
            if down != *slot {
                raw.add_key_event(key, down);
                *slot = down;
            }
        }

        for character in io.take_input_characters() {
            raw.add_input_character(character);
        }

        let mut gamepad = [0.0_f32; GAMEPAD_KEY_COUNT];
        if io.config_flags.contains(ConfigFlags::NAV_ENABLE_GAMEPAD) {
            for input in NavInput::ALL {
                let slot = &mut gamepad[gamepad_slot(input)];
                *slot = slot.max(io.nav_input(input));
            }
        }
        for (i, key) in GAMEPAD_KEYS.iter().enumerate() {
            if gamepad[i] != queued.gamepad[i] {
                raw.add_key_analog_event(*key, gamepad[i] > 0.0, gamepad[i]);
                queued.gamepad[i] = gamepad[i];
            }
        }
    }

    fn read_back_io(&mut self) {
        let raw = self.context.io();
        self.io.want_set_mouse_pos = raw.want_set_mouse_pos;
        if raw.want_set_mouse_pos {
            self.io.mouse_pos = raw.mouse_pos;
        }
    }
}

/// Copy Dear ImGui draw data into `out`, reusing its allocations
fn convert_draw_data(raw: &imgui::DrawData, out: &mut DrawData) {
    out.display_pos = raw.display_pos;
    out.display_size = raw.display_size;
    out.framebuffer_scale = raw.framebuffer_scale;
    out.draw_lists.clear();

    for list in raw.draw_lists() {
        let vtx_buffer = list
            .vtx_buffer()
            .iter()
            .map(|v| DrawVert {
                pos: v.pos,
                uv: v.uv,
                col: u32::from_le_bytes(v.col),
            })
            .collect();

        let mut commands = Vec::new();
        for cmd in list.commands() {
            match cmd {
                imgui::DrawCmd::Elements {
                    count,
                    cmd_params:
                        imgui::DrawCmdParams {
                            clip_rect,
                            texture_id,
                            idx_offset,
                            ..
                        },
                } => commands.push(DrawCmd::elements(
                    count,
                    idx_offset,
                    clip_rect,
                    TextureId(texture_id.id()),
                )),
                // State is set up once per frame and never changed by commands
                imgui::DrawCmd::ResetRenderState => {}
                imgui::DrawCmd::RawCallback { .. } => {
                    log::warn!("Skipping raw draw callback; use DrawCmd::callback instead");
                }
            }
        }

        out.draw_lists
            .push(DrawList::new(vtx_buffer, list.idx_buffer().to_vec(), commands));
    }
}

impl GuiContext for ImguiContext {
    fn io(&self) -> &Io {
        &self.io
    }

    fn io_mut(&mut self) -> &mut Io {
        &mut self.io
    }

    fn new_frame(&mut self) {
        self.queue_input();
        if self.frame_open {
            log::warn!("Input written while a GUI frame is open; it applies to the next frame");
        }
    }

    fn render(&mut self) -> &DrawData {
        if !self.frame_open {
            self.context.new_frame();
        }
        self.frame_open = false;

        let raw = self.context.render();
        convert_draw_data(raw, &mut self.draw_data);
        self.read_back_io();
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
        let texture = self.context.fonts().build_rgba32_texture();
        FontAtlasTexture {
            width: texture.width,
            height: texture.height,
            data: texture.data,
        }
    }

    fn set_font_texture_id(&mut self, id: Option<TextureId>) {
        self.context.fonts().tex_id = imgui::TextureId::new(id.map_or(0, |id| id.0));
    }

    fn set_clipboard_backend(&mut self, backend: Box<dyn ClipboardBackend>) {
        self.context.set_clipboard_backend(ClipboardBridge(backend));
    }
}
