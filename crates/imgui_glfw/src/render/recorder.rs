//! Recording graphics API
//!
//! Implements `GraphicsApi` by appending every call to a list instead of
//! touching a GPU. Textures get sequential handles and are tracked until
//! deleted, so leaks and double frees show up in `live_textures`.

use std::collections::BTreeSet;

use nalgebra::Matrix4;

use super::{
    validate_rgba, BlendFactor, Capability, ClientArray, GraphicsApi, GraphicsError, IntRect,
    MatrixMode, StateMask, TextureHandle,
};
use crate::gui::{DrawIdx, DrawVert};

/// One recorded call
#[derive(Debug, Clone, PartialEq)]
pub enum GraphicsCall {
    /// `reset_states`
    ResetStates,
    /// `push_state`
    PushState(StateMask),
    /// `pop_state`
    PopState,
    /// `enable`
    Enable(Capability),
    /// `disable`
    Disable(Capability),
    /// `enable_client_array`
    EnableClientArray(ClientArray),
    /// `blend_func`
    BlendFunc(BlendFactor, BlendFactor),
    /// `viewport`
    Viewport(IntRect),
    /// `load_matrix`
    LoadMatrix(MatrixMode, Matrix4<f32>),
    /// `create_texture`
    CreateTexture {
        /// Handle issued
        handle: TextureHandle,
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },
    /// `delete_texture`
    DeleteTexture(TextureHandle),
    /// `bind_texture`
    BindTexture(TextureHandle),
    /// `bind_vertices` with the vertex count
    BindVertices(usize),
    /// `scissor`
    Scissor(IntRect),
    /// `draw_elements`
    DrawElements {
        /// First index drawn
        offset: usize,
        /// Number of indices drawn
        count: usize,
    },
}

/// `GraphicsApi` that records calls
#[derive(Debug, Default)]
pub struct CommandRecorder {
    calls: Vec<GraphicsCall>,
    live_textures: BTreeSet<u32>,
    next_texture: u32,
    state_depth: usize,
}

impl CommandRecorder {
    /// Empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call recorded so far
    pub fn calls(&self) -> &[GraphicsCall] {
        &self.calls
    }

    /// Drop recorded calls, keeping texture bookkeeping
    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Textures created and not yet deleted
    pub fn live_textures(&self) -> Vec<TextureHandle> {
        self.live_textures.iter().copied().map(TextureHandle).collect()
    }

    /// Number of unmatched `push_state` calls
    pub const fn state_depth(&self) -> usize {
        self.state_depth
    }

    /// Recorded draws as `(offset, count)`
    pub fn draws(&self) -> Vec<(usize, usize)> {
        self.calls
            .iter()
            .filter_map(|call| match *call {
                GraphicsCall::DrawElements { offset, count } => Some((offset, count)),
                _ => None,
            })
            .collect()
    }

    /// Recorded scissor rectangles
    pub fn scissors(&self) -> Vec<IntRect> {
        self.calls
            .iter()
            .filter_map(|call| match *call {
                GraphicsCall::Scissor(rect) => Some(rect),
                _ => None,
            })
            .collect()
    }

    /// Recorded texture binds
    pub fn texture_binds(&self) -> Vec<TextureHandle> {
        self.calls
            .iter()
            .filter_map(|call| match *call {
                GraphicsCall::BindTexture(handle) => Some(handle),
                _ => None,
            })
            .collect()
    }
}

impl GraphicsApi for CommandRecorder {
    fn reset_states(&mut self) {
        self.calls.push(GraphicsCall::ResetStates);
    }

    fn push_state(&mut self, mask: StateMask) {
        self.state_depth += 1;
        self.calls.push(GraphicsCall::PushState(mask));
    }

    fn pop_state(&mut self) {
        if self.state_depth == 0 {
            log::warn!("pop_state without matching push_state");
        }
        self.state_depth = self.state_depth.saturating_sub(1);
        self.calls.push(GraphicsCall::PopState);
    }

    fn enable(&mut self, capability: Capability) {
        self.calls.push(GraphicsCall::Enable(capability));
    }

    fn disable(&mut self, capability: Capability) {
        self.calls.push(GraphicsCall::Disable(capability));
    }

    fn enable_client_array(&mut self, array: ClientArray) {
        self.calls.push(GraphicsCall::EnableClientArray(array));
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.calls.push(GraphicsCall::BlendFunc(src, dst));
    }

    fn viewport(&mut self, rect: IntRect) {
        self.calls.push(GraphicsCall::Viewport(rect));
    }

    fn load_matrix(&mut self, mode: MatrixMode, matrix: &Matrix4<f32>) {
        self.calls.push(GraphicsCall::LoadMatrix(mode, *matrix));
    }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<TextureHandle, GraphicsError> {
        validate_rgba(width, height, rgba)?;

        // Zero is reserved for "no texture"
        self.next_texture += 1;
        let handle = TextureHandle(self.next_texture);
        self.live_textures.insert(handle.0);
        self.calls.push(GraphicsCall::CreateTexture {
            handle,
            width,
            height,
        });
        Ok(handle)
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        if !self.live_textures.remove(&texture.0) {
            log::warn!("Deleting unknown texture {:?}", texture);
        }
        self.calls.push(GraphicsCall::DeleteTexture(texture));
    }

    fn bind_texture(&mut self, texture: TextureHandle) {
        self.calls.push(GraphicsCall::BindTexture(texture));
    }

    fn bind_vertices(&mut self, vertices: &[DrawVert]) {
        self.calls.push(GraphicsCall::BindVertices(vertices.len()));
    }

    fn scissor(&mut self, rect: IntRect) {
        self.calls.push(GraphicsCall::Scissor(rect));
    }

    fn draw_elements(&mut self, indices: &[DrawIdx], offset: usize, count: usize) {
        if offset + count > indices.len() {
            log::warn!(
                "draw_elements range {}..{} exceeds {} indices",
                offset,
                offset + count,
                indices.len()
            );
        }
        self.calls.push(GraphicsCall::DrawElements { offset, count });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_validation() {
        let mut recorder = CommandRecorder::new();
        assert_eq!(
            recorder.create_texture(0, 4, &[]),
            Err(GraphicsError::InvalidTextureSize {
                width: 0,
                height: 4
            })
        );
        assert_eq!(
            recorder.create_texture(2, 2, &[0; 15]),
            Err(GraphicsError::PixelDataMismatch {
                expected: 16,
                actual: 15
            })
        );
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn test_texture_lifecycle_is_tracked() {
        let mut recorder = CommandRecorder::new();
        let a = recorder.create_texture(1, 1, &[0; 4]).unwrap();
        let b = recorder.create_texture(1, 1, &[0; 4]).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, TextureHandle(0));

        recorder.delete_texture(a);
        assert_eq!(recorder.live_textures(), vec![b]);
    }

    #[test]
    fn test_state_depth() {
        let mut recorder = CommandRecorder::new();
        recorder.push_state(StateMask::all());
        assert_eq!(recorder.state_depth(), 1);
        recorder.pop_state();
        recorder.pop_state();
        assert_eq!(recorder.state_depth(), 0);
    }
}
