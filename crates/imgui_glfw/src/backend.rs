//! Backend context
//!
//! `ImguiGlfw` owns everything the binding keeps between frames: input
//! latches and accumulators, the active joystick, the cursor set and the font
//! texture. The GUI context, the windowing toolkit and the graphics API stay
//! with the host and are passed into each call.
//!
//! ```text
//! initialize
//!   loop: handle_event* -> update -> (widgets) -> render
//! shutdown
//! ```

use std::time::Duration;

use thiserror::Error;

use crate::clipboard::ClipboardBackend;
use crate::config::{BackendConfig, ConfigError};
use crate::gui::{GuiContext, NavInput};
use crate::input::{InputAdapter, JoystickState};
use crate::platform::{InputEvent, JoystickAxis, Platform, PlatformError};
use crate::render::{DrawSubmitter, FontTexture, GraphicsApi, GraphicsError};

/// Backend errors
#[derive(Error, Debug)]
pub enum BackendError {
    /// Texture creation failed
    #[error("Graphics error: {0}")]
    Graphics(#[from] GraphicsError),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Windowing toolkit failed
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

/// Input/render binding between a GUI context, a window and a graphics API
#[derive(Debug)]
pub struct ImguiGlfw {
    input: InputAdapter,
    submitter: DrawSubmitter,
}

impl ImguiGlfw {
    /// Configure the GUI context for this window and create the font texture
    pub fn initialize(
        ctx: &mut impl GuiContext,
        platform: &mut impl Platform,
        graphics: &mut impl GraphicsApi,
        display_size: [f32; 2],
        config: BackendConfig,
        clipboard: Box<dyn ClipboardBackend>,
    ) -> Result<Self, BackendError> {
        let display_size = config.display_size.unwrap_or(display_size);
        let input = InputAdapter::new(ctx, platform, display_size, config.joystick);
        ctx.io_mut().display_framebuffer_scale = config.framebuffer_scale;
        ctx.set_clipboard_backend(clipboard);

        let mut submitter = DrawSubmitter::new();
        submitter.create_placeholder(ctx, graphics)?;
        if config.load_default_font {
            submitter.load_font_atlas(ctx, graphics)?;
        }

        log::info!(
            "GUI backend initialized ({}x{}, scale {:?})",
            display_size[0],
            display_size[1],
            config.framebuffer_scale
        );
        Ok(Self { input, submitter })
    }

    /// Apply one event from the frame's batch
    pub fn handle_event(
        &mut self,
        ctx: &mut impl GuiContext,
        platform: &impl Platform,
        event: &InputEvent,
    ) {
        self.input.handle_event(ctx, platform, event);
    }

    /// Apply a whole batch in order
    pub fn handle_events<'a>(
        &mut self,
        ctx: &mut impl GuiContext,
        platform: &impl Platform,
        events: impl IntoIterator<Item = &'a InputEvent>,
    ) {
        for event in events {
            self.input.handle_event(ctx, platform, event);
        }
    }

    /// Write the frame's input and start a GUI frame
    pub fn update(
        &mut self,
        ctx: &mut impl GuiContext,
        platform: &mut impl Platform,
        display_size: [f32; 2],
        delta_time: Duration,
    ) {
        self.input.update(ctx, platform, display_size, delta_time);
    }

    /// Like `update`, with the pointer position supplied by the caller
    pub fn update_with_pointer(
        &mut self,
        ctx: &mut impl GuiContext,
        platform: &mut impl Platform,
        pointer: [i32; 2],
        display_size: [f32; 2],
        delta_time: Duration,
    ) {
        self.input
            .update_with_pointer(ctx, platform, pointer, display_size, delta_time);
    }

    /// Finish the GUI frame and draw it
    pub fn render(&self, ctx: &mut impl GuiContext, graphics: &mut impl GraphicsApi) {
        self.submitter.render(ctx, graphics);
    }

    /// Re-upload the font atlas after fonts were added or rebuilt
    pub fn load_font_atlas(&mut self, ctx: &mut impl GuiContext, graphics: &mut impl GraphicsApi) {
        if let Err(e) = self.submitter.load_font_atlas(ctx, graphics) {
            log::error!("Font atlas upload failed: {}", e);
        }
    }

    /// Current font texture
    pub const fn font_texture(&self) -> Option<FontTexture> {
        self.submitter.font_texture()
    }

    /// Whether events are currently applied
    pub const fn has_focus(&self) -> bool {
        self.input.has_focus()
    }

    /// Number of completed updates
    pub const fn frame_count(&self) -> u64 {
        self.input.frame_count()
    }

    /// Joystick state
    pub const fn joystick(&self) -> &JoystickState {
        self.input.joystick()
    }

    /// Force the active joystick, `None` to disable gamepad navigation
    pub fn set_active_joystick_id(&mut self, id: Option<u32>) {
        self.input.set_active_joystick_id(id);
    }

    /// Dead zone for d-pad emulation
    pub fn set_joystick_dpad_threshold(&mut self, threshold: f32) {
        self.input.set_joystick_dpad_threshold(threshold);
    }

    /// Dead zone for left-stick emulation
    pub fn set_joystick_lstick_threshold(&mut self, threshold: f32) {
        self.input.set_joystick_lstick_threshold(threshold);
    }

    /// Map a navigation action to a joystick button
    pub fn set_joystick_mapping(&mut self, action: NavInput, button: u32) {
        self.input.set_joystick_mapping(action, button);
    }

    /// Axis emulating the d-pad horizontally
    pub fn set_dpad_x_axis(&mut self, axis: JoystickAxis, inverted: bool) {
        self.input.set_dpad_x_axis(axis, inverted);
    }

    /// Axis emulating the d-pad vertically
    pub fn set_dpad_y_axis(&mut self, axis: JoystickAxis, inverted: bool) {
        self.input.set_dpad_y_axis(axis, inverted);
    }

    /// Axis emulating the left stick horizontally
    pub fn set_lstick_x_axis(&mut self, axis: JoystickAxis, inverted: bool) {
        self.input.set_lstick_x_axis(axis, inverted);
    }

    /// Axis emulating the left stick vertically
    pub fn set_lstick_y_axis(&mut self, axis: JoystickAxis, inverted: bool) {
        self.input.set_lstick_y_axis(axis, inverted);
    }

    /// Delete the font texture, release cursors and drop the GUI context
    pub fn shutdown<C: GuiContext>(
        mut self,
        mut ctx: C,
        platform: &mut impl Platform,
        graphics: &mut impl GraphicsApi,
    ) {
        self.submitter.release(&mut ctx, graphics);
        self.input.shutdown(platform);
        drop(ctx);
        log::info!("GUI backend shut down after {} frames", self.input.frame_count());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::headless::{HeadlessContext, HeadlessPlatform};
    use crate::render::{texture_id_from_handle, CommandRecorder};

    fn init(
        config: BackendConfig,
    ) -> (ImguiGlfw, HeadlessContext, HeadlessPlatform, CommandRecorder) {
        let mut ctx = HeadlessContext::with_font_atlas(16, 8, vec![0xAA; 16 * 8 * 4]);
        let mut platform = HeadlessPlatform::new();
        let mut graphics = CommandRecorder::new();
        let backend = ImguiGlfw::initialize(
            &mut ctx,
            &mut platform,
            &mut graphics,
            [640.0, 480.0],
            config,
            Box::new(MemoryClipboard::with_text("hello")),
        )
        .unwrap();
        (backend, ctx, platform, graphics)
    }

    #[test]
    fn test_initialize_uploads_atlas() {
        let (backend, ctx, _, graphics) = init(BackendConfig::default());
        let texture = backend.font_texture().unwrap();

        assert_eq!((texture.width, texture.height), (16, 8));
        assert_eq!(ctx.font_texture_id(), Some(texture_id_from_handle(texture.handle)));
        assert_eq!(graphics.live_textures(), vec![texture.handle]);
    }

    #[test]
    fn test_initialize_without_font_keeps_placeholder() {
        let (backend, _, _, _) = init(BackendConfig::default().with_default_font(false));
        let texture = backend.font_texture().unwrap();
        assert_eq!((texture.width, texture.height), (1, 1));
    }

    #[test]
    fn test_config_overrides_display() {
        let (_, ctx, _, _) = init(
            BackendConfig::default()
                .with_display_size(1024.0, 768.0)
                .with_framebuffer_scale(2.0, 2.0),
        );
        assert_eq!(ctx.io().display_size, [1024.0, 768.0]);
        assert_eq!(ctx.io().display_framebuffer_scale, [2.0, 2.0]);
    }

    #[test]
    fn test_clipboard_is_installed() {
        let (_, mut ctx, _, _) = init(BackendConfig::default());
        assert_eq!(ctx.clipboard_text().as_deref(), Some("hello"));

        ctx.set_clipboard_text("ünïcode ✓");
        assert_eq!(ctx.clipboard_text().as_deref(), Some("ünïcode ✓"));
    }

    #[test]
    fn test_shutdown_releases_resources() {
        let (backend, ctx, mut platform, mut graphics) = init(BackendConfig::default());
        backend.shutdown(ctx, &mut platform, &mut graphics);

        assert!(graphics.live_textures().is_empty());
        assert_eq!(platform.live_cursor_count(), 0);
    }

    #[test]
    fn test_failed_reload_is_logged_not_raised() {
        let (mut backend, _, _, mut graphics) = init(BackendConfig::default());
        let mut broken = HeadlessContext::with_font_atlas(0, 0, Vec::new());

        backend.load_font_atlas(&mut broken, &mut graphics);
        assert_eq!(backend.font_texture(), None);
        assert_eq!(broken.font_texture_id(), None);
    }
}
