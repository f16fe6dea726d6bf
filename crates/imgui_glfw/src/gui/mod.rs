//! GUI library interface
//!
//! The immediate-mode GUI library is an external collaborator. The backend
//! only touches it through `GuiContext`: it writes `Io` every frame, reads
//! `DrawData` after `render`, uploads the font atlas and installs a
//! clipboard capability. Widgets and layout stay on the library's side.
//!
//! With the `imgui` feature, `ImguiContext` implements the seam on top of a
//! Dear ImGui context from the `imgui` crate.

pub mod draw;
#[cfg(feature = "imgui")]
pub mod imgui_context;
pub mod io;

pub use draw::{DrawCallback, DrawCmd, DrawData, DrawIdx, DrawList, DrawVert, TextureId};
#[cfg(feature = "imgui")]
pub use imgui_context::ImguiContext;
pub use io::{BackendFlags, ConfigFlags, GuiKey, Io, MouseCursor, NavInput};

use crate::clipboard::ClipboardBackend;

/// Rasterized font atlas handed out by the GUI library
#[derive(Debug, Clone, Copy)]
pub struct FontAtlasTexture<'a> {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// RGBA32 pixel data, `width * height * 4` bytes
    pub data: &'a [u8],
}

/// The slice of an immediate-mode GUI context the backend drives
pub trait GuiContext {
    /// Per-frame IO state
    fn io(&self) -> &Io;

    /// Mutable per-frame IO state
    fn io_mut(&mut self) -> &mut Io;

    /// Start a new frame using the current `Io`
    fn new_frame(&mut self);

    /// Finish the frame and return its draw data
    fn render(&mut self) -> &DrawData;

    /// Cursor shape the library wants, `None` to hide the cursor
    fn mouse_cursor(&self) -> Option<MouseCursor>;

    /// Build (if needed) and return the font atlas as RGBA32
    fn font_atlas_rgba32(&mut self) -> FontAtlasTexture<'_>;

    /// Register the texture draw commands should use for fonts
    fn set_font_texture_id(&mut self, id: Option<TextureId>);

    /// Install the clipboard used by text widgets
    fn set_clipboard_backend(&mut self, backend: Box<dyn ClipboardBackend>);
}

/// Whatever tracks the widget layout cursor while a frame is built
pub trait LayoutCursor {
    /// Layout cursor position in screen coordinates
    fn cursor_screen_pos(&self) -> [f32; 2];
}

#[cfg(feature = "imgui")]
impl LayoutCursor for imgui::Ui {
    fn cursor_screen_pos(&self) -> [f32; 2] {
        Self::cursor_screen_pos(self)
    }
}

/// Rectangle in widget-local coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocalRect {
    /// Left edge
    pub left: f32,
    /// Top edge
    pub top: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

/// Top-left corner of `rect` relative to the current layout cursor
pub fn top_left_absolute(layout: &impl LayoutCursor, rect: LocalRect) -> [f32; 2] {
    let [x, y] = layout.cursor_screen_pos();
    [rect.left + x, rect.top + y]
}

/// Bottom-right corner of `rect` relative to the current layout cursor
pub fn bottom_right_absolute(layout: &impl LayoutCursor, rect: LocalRect) -> [f32; 2] {
    let [x, y] = layout.cursor_screen_pos();
    [rect.left + rect.width + x, rect.top + rect.height + y]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessContext;

    #[test]
    fn test_absolute_corners_follow_layout_cursor() {
        let mut ctx = HeadlessContext::new();
        ctx.set_cursor_screen_pos([100.0, 50.0]);
        let rect = LocalRect {
            left: 4.0,
            top: 6.0,
            width: 32.0,
            height: 16.0,
        };

        assert_eq!(top_left_absolute(&ctx, rect), [104.0, 56.0]);
        assert_eq!(bottom_right_absolute(&ctx, rect), [136.0, 72.0]);
    }
}
