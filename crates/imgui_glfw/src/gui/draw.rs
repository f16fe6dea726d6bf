//! Draw data produced by the GUI library after `render`
//!
//! Read-only to the backend and valid for one frame. A `DrawData` holds one
//! `DrawList` per layer; each list owns a vertex and an index array which its
//! `DrawCmd`s partition by clip rectangle and texture.

use std::fmt;
use std::rc::Rc;

use bytemuck::{Pod, Zeroable};

/// Index type used by draw lists
pub type DrawIdx = u16;

/// Opaque texture identifier understood by the GUI library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureId(pub usize);

impl TextureId {
    /// Wrap a raw id
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    /// Raw id value
    pub const fn id(self) -> usize {
        self.0
    }
}

/// Vertex as laid out in GUI draw lists
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct DrawVert {
    /// Position in display coordinates
    pub pos: [f32; 2],
    /// Texture coordinates
    pub uv: [f32; 2],
    /// Packed RGBA color, red in the lowest byte
    pub col: u32,
}

impl DrawVert {
    /// Size of one vertex in bytes
    pub const STRIDE: usize = std::mem::size_of::<Self>();
    /// Byte offset of `pos`
    pub const POS_OFFSET: usize = 0;
    /// Byte offset of `uv`
    pub const UV_OFFSET: usize = 8;
    /// Byte offset of `col`
    pub const COL_OFFSET: usize = 16;

    /// Unpack the color into `[r, g, b, a]`
    pub const fn color_rgba(&self) -> [u8; 4] {
        [
            (self.col & 0xFF) as u8,
            ((self.col >> 8) & 0xFF) as u8,
            ((self.col >> 16) & 0xFF) as u8,
            ((self.col >> 24) & 0xFF) as u8,
        ]
    }
}

/// Custom rendering hook carried by a draw command
pub type DrawCallback = Rc<dyn Fn(&DrawList, &DrawCmd)>;

/// One draw call worth of indices
#[derive(Clone, Default)]
pub struct DrawCmd {
    /// Number of indices to draw
    pub elem_count: usize,
    /// Clip rectangle `[x1, y1, x2, y2]` in display coordinates
    pub clip_rect: [f32; 4],
    /// Texture to sample
    pub texture_id: TextureId,
    /// First index into the list's index buffer
    pub idx_offset: usize,
    /// When set, the backend calls this instead of drawing
    pub user_callback: Option<DrawCallback>,
}

impl fmt::Debug for DrawCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawCmd")
            .field("elem_count", &self.elem_count)
            .field("clip_rect", &self.clip_rect)
            .field("texture_id", &self.texture_id)
            .field("idx_offset", &self.idx_offset)
            .field("user_callback", &self.user_callback.is_some())
            .finish()
    }
}

impl DrawCmd {
    /// Indexed draw over `elem_count` indices starting at `idx_offset`
    pub fn elements(
        elem_count: usize,
        idx_offset: usize,
        clip_rect: [f32; 4],
        texture_id: TextureId,
    ) -> Self {
        Self {
            elem_count,
            clip_rect,
            texture_id,
            idx_offset,
            user_callback: None,
        }
    }

    /// Command that hands control to `callback`
    pub fn callback(callback: impl Fn(&DrawList, &Self) + 'static) -> Self {
        Self {
            user_callback: Some(Rc::new(callback)),
            ..Self::default()
        }
    }

    /// Clip rectangle relative to `origin`, multiplied by a framebuffer scale
    pub fn framebuffer_clip_rect(&self, origin: [f32; 2], scale: [f32; 2]) -> [f32; 4] {
        [
            (self.clip_rect[0] - origin[0]) * scale[0],
            (self.clip_rect[1] - origin[1]) * scale[1],
            (self.clip_rect[2] - origin[0]) * scale[0],
            (self.clip_rect[3] - origin[1]) * scale[1],
        ]
    }
}

/// Vertices, indices and commands for one layer
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    /// Vertex buffer
    pub vtx_buffer: Vec<DrawVert>,
    /// Index buffer
    pub idx_buffer: Vec<DrawIdx>,
    /// Commands partitioning `idx_buffer`
    pub commands: Vec<DrawCmd>,
}

impl DrawList {
    /// Build a list from its buffers
    pub fn new(vtx_buffer: Vec<DrawVert>, idx_buffer: Vec<DrawIdx>, commands: Vec<DrawCmd>) -> Self {
        Self {
            vtx_buffer,
            idx_buffer,
            commands,
        }
    }

    /// Index slice a command covers, or `None` when it runs past the buffer
    pub fn command_indices(&self, cmd: &DrawCmd) -> Option<&[DrawIdx]> {
        let end = cmd.idx_offset.checked_add(cmd.elem_count)?;
        self.idx_buffer.get(cmd.idx_offset..end)
    }
}

/// All draw lists for a frame
#[derive(Debug, Clone, Default)]
pub struct DrawData {
    /// Lists in back-to-front order
    pub draw_lists: Vec<DrawList>,
    /// Top-left of the displayed area; clip rects and vertices are relative to it
    pub display_pos: [f32; 2],
    /// Size of the displayed area
    pub display_size: [f32; 2],
    /// Framebuffer pixels per display unit
    pub framebuffer_scale: [f32; 2],
}

impl DrawData {
    /// Number of draw lists
    pub fn draw_lists_count(&self) -> usize {
        self.draw_lists.len()
    }

    /// Total vertices across all lists
    pub fn total_vtx_count(&self) -> usize {
        self.draw_lists.iter().map(|l| l.vtx_buffer.len()).sum()
    }

    /// Total indices across all lists
    pub fn total_idx_count(&self) -> usize {
        self.draw_lists.iter().map(|l| l.idx_buffer.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_matches_offsets() {
        assert_eq!(DrawVert::STRIDE, 20);
        let vert = DrawVert {
            pos: [1.0, 2.0],
            uv: [0.25, 0.75],
            col: 0xFF00_80FF,
        };
        let bytes = bytemuck::bytes_of(&vert);
        assert_eq!(&bytes[DrawVert::UV_OFFSET..DrawVert::UV_OFFSET + 4], &0.25f32.to_ne_bytes());
        assert_eq!(&bytes[DrawVert::COL_OFFSET..], &0xFF00_80FFu32.to_ne_bytes());
    }

    #[test]
    fn test_color_unpacks_red_first() {
        let vert = DrawVert {
            col: 0x4433_2211,
            ..DrawVert::default()
        };
        assert_eq!(vert.color_rgba(), [0x11, 0x22, 0x33, 0x44]);
    }

    #[test]
    fn test_command_indices_rejects_overrun() {
        let list = DrawList::new(Vec::new(), vec![0, 1, 2, 2, 3, 0], Vec::new());
        let ok = DrawCmd::elements(3, 3, [0.0; 4], TextureId::default());
        let overrun = DrawCmd::elements(4, 3, [0.0; 4], TextureId::default());

        assert_eq!(list.command_indices(&ok), Some(&[2, 3, 0][..]));
        assert_eq!(list.command_indices(&overrun), None);
    }

    #[test]
    fn test_framebuffer_clip_rect() {
        let cmd = DrawCmd::elements(0, 0, [10.0, 20.0, 30.0, 40.0], TextureId::default());
        assert_eq!(cmd.framebuffer_clip_rect([0.0, 0.0], [2.0, 0.5]), [20.0, 10.0, 60.0, 20.0]);
        assert_eq!(cmd.framebuffer_clip_rect([10.0, 10.0], [2.0, 2.0]), [0.0, 20.0, 40.0, 60.0]);
    }
}
