//! Draw submission
//!
//! The graphics API is reached only through `GraphicsApi`, a fixed-function
//! immediate-mode interface. `DrawSubmitter` walks the GUI draw data and
//! issues state setup, scissor, bind and indexed draw calls against it.
//!
//! - `submitter`: per-frame draw loop and font texture lifecycle
//! - `recorder`: a `GraphicsApi` that records calls instead of executing them
//! - `glow_api`: an OpenGL `GraphicsApi` (feature `glow`)

#[cfg(feature = "glow")]
pub mod glow_api;
pub mod recorder;
pub mod submitter;

#[cfg(feature = "glow")]
pub use glow_api::GlowGraphics;
pub use recorder::{CommandRecorder, GraphicsCall};
pub use submitter::{DrawSubmitter, FontTexture};

use bitflags::bitflags;
use nalgebra::Matrix4;
use thiserror::Error;

use crate::gui::{DrawIdx, DrawVert, TextureId};

/// Graphics API errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphicsError {
    /// Texture dimensions were zero
    #[error("Invalid texture size {width}x{height}")]
    InvalidTextureSize {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// Pixel buffer length does not match the dimensions
    #[error("Pixel data is {actual} bytes, expected {expected}")]
    PixelDataMismatch {
        /// Bytes required by the dimensions
        expected: usize,
        /// Bytes supplied
        actual: usize,
    },

    /// The API reported a failure
    #[error("Graphics API error: {0}")]
    Api(String),
}

/// Native texture handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Reinterpret a native texture handle as a GUI texture id
pub const fn texture_id_from_handle(handle: TextureHandle) -> TextureId {
    TextureId(handle.0 as usize)
}

/// Reinterpret a GUI texture id as a native texture handle
pub const fn handle_from_texture_id(id: TextureId) -> TextureHandle {
    TextureHandle(id.0 as u32)
}

/// Server-side capabilities toggled around GUI rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Color blending
    Blend,
    /// Back/front face culling
    CullFace,
    /// Depth testing
    DepthTest,
    /// Scissor testing
    ScissorTest,
    /// 2D texturing
    Texture2D,
    /// Fixed-function lighting
    Lighting,
}

/// Client-side vertex arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientArray {
    /// Positions
    Vertex,
    /// Colors
    Color,
    /// Texture coordinates
    TexCoord,
}

/// Blend factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// Source alpha
    SrcAlpha,
    /// One minus source alpha
    OneMinusSrcAlpha,
}

/// Matrix stacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixMode {
    /// Projection matrix
    Projection,
    /// Texture coordinate matrix
    Texture,
}

bitflags! {
    /// Attribute groups saved by `GraphicsApi::push_state`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StateMask: u32 {
        /// Enable/disable flags
        const ENABLE = 1 << 0;
        /// Blend and color buffer state
        const COLOR_BUFFER = 1 << 1;
        /// Viewport and matrix mode
        const TRANSFORM = 1 << 2;
    }
}

/// Integer rectangle in framebuffer pixels, origin bottom-left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IntRect {
    /// Left edge
    pub x: i32,
    /// Bottom edge
    pub y: i32,
    /// Width
    pub width: i32,
    /// Height
    pub height: i32,
}

impl IntRect {
    /// Build a rectangle
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Fixed-function immediate-mode graphics API
pub trait GraphicsApi {
    /// Reset transient state left by other renderers
    fn reset_states(&mut self);

    /// Save attribute groups
    fn push_state(&mut self, mask: StateMask);

    /// Restore the last saved attribute groups
    fn pop_state(&mut self);

    /// Turn on a capability
    fn enable(&mut self, capability: Capability);

    /// Turn off a capability
    fn disable(&mut self, capability: Capability);

    /// Turn on a client-side vertex array
    fn enable_client_array(&mut self, array: ClientArray);

    /// Set the blend equation factors
    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor);

    /// Set the viewport
    fn viewport(&mut self, rect: IntRect);

    /// Replace the matrix on a stack
    fn load_matrix(&mut self, mode: MatrixMode, matrix: &Matrix4<f32>);

    /// Create an RGBA8 texture
    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<TextureHandle, GraphicsError>;

    /// Destroy a texture
    fn delete_texture(&mut self, texture: TextureHandle);

    /// Bind a texture for drawing
    fn bind_texture(&mut self, texture: TextureHandle);

    /// Point the client arrays at a vertex buffer laid out as `DrawVert`
    fn bind_vertices(&mut self, vertices: &[DrawVert]);

    /// Set the scissor rectangle
    fn scissor(&mut self, rect: IntRect);

    /// Draw `count` indices as triangles starting at `offset`
    fn draw_elements(&mut self, indices: &[DrawIdx], offset: usize, count: usize);
}

/// Check that `rgba` holds exactly `width * height` RGBA8 pixels
pub fn validate_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<(), GraphicsError> {
    if width == 0 || height == 0 {
        return Err(GraphicsError::InvalidTextureSize { width, height });
    }
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(GraphicsError::PixelDataMismatch {
            expected,
            actual: rgba.len(),
        });
    }
    Ok(())
}

/// Orthographic projection mapping `origin..origin + size` with y down
pub fn ortho_projection(origin: [f32; 2], size: [f32; 2]) -> Matrix4<f32> {
    let [left, top] = origin;
    Matrix4::new_orthographic(left, left + size[0], top + size[1], top, -1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector4;

    #[test]
    fn test_projection_maps_corners_to_clip_space() {
        let projection = ortho_projection([0.0, 0.0], [800.0, 600.0]);

        let top_left = projection * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(top_left.x, -1.0);
        assert_relative_eq!(top_left.y, 1.0);

        let bottom_right = projection * Vector4::new(800.0, 600.0, 0.0, 1.0);
        assert_relative_eq!(bottom_right.x, 1.0);
        assert_relative_eq!(bottom_right.y, -1.0);
    }

    #[test]
    fn test_projection_follows_display_origin() {
        let projection = ortho_projection([100.0, 50.0], [200.0, 100.0]);

        let top_left = projection * Vector4::new(100.0, 50.0, 0.0, 1.0);
        assert_relative_eq!(top_left.x, -1.0);
        assert_relative_eq!(top_left.y, 1.0);

        let center = projection * Vector4::new(200.0, 100.0, 0.0, 1.0);
        assert_relative_eq!(center.x, 0.0);
        assert_relative_eq!(center.y, 0.0);
    }

    #[test]
    fn test_validate_rgba() {
        assert_eq!(validate_rgba(2, 2, &[0; 16]), Ok(()));
        assert_eq!(
            validate_rgba(0, 4, &[]),
            Err(GraphicsError::InvalidTextureSize { width: 0, height: 4 })
        );
        assert_eq!(
            validate_rgba(2, 2, &[0; 12]),
            Err(GraphicsError::PixelDataMismatch {
                expected: 16,
                actual: 12
            })
        );
    }

    #[test]
    fn test_texture_id_round_trip() {
        let handle = TextureHandle(42);
        assert_eq!(texture_id_from_handle(handle), TextureId(42));
        assert_eq!(handle_from_texture_id(TextureId(42)), handle);
    }
}
