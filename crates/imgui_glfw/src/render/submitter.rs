//! Per-frame draw submission and font texture lifecycle

use nalgebra::Matrix4;

use super::{
    handle_from_texture_id, ortho_projection, texture_id_from_handle, BlendFactor, Capability,
    ClientArray, GraphicsApi, GraphicsError, IntRect, MatrixMode, StateMask, TextureHandle,
};
use crate::gui::{DrawData, DrawList, GuiContext};

/// Placeholder pixel uploaded before the real atlas exists
const PLACEHOLDER_PIXEL: [u8; 4] = [0xFF; 4];

/// Font atlas texture owned by the submitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontTexture {
    /// Native handle
    pub handle: TextureHandle,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Issues GUI draw data against a `GraphicsApi`
#[derive(Debug, Default)]
pub struct DrawSubmitter {
    font_texture: Option<FontTexture>,
}

impl DrawSubmitter {
    /// Submitter with no font texture
    pub fn new() -> Self {
        Self::default()
    }

    /// Current font texture
    pub const fn font_texture(&self) -> Option<FontTexture> {
        self.font_texture
    }

    /// Install a 1x1 white texture so draw commands have something to bind
    pub fn create_placeholder(
        &mut self,
        ctx: &mut impl GuiContext,
        graphics: &mut impl GraphicsApi,
    ) -> Result<FontTexture, GraphicsError> {
        self.replace_font_texture(ctx, graphics, 1, 1, &PLACEHOLDER_PIXEL)
    }

    /// Upload the GUI's font atlas, deleting the previous texture first
    pub fn load_font_atlas(
        &mut self,
        ctx: &mut impl GuiContext,
        graphics: &mut impl GraphicsApi,
    ) -> Result<FontTexture, GraphicsError> {
        let atlas = ctx.font_atlas_rgba32();
        let (width, height) = (atlas.width, atlas.height);
        // The atlas borrows the context, so copy it out before registering the id
        let pixels = atlas.data.to_vec();

        let texture = self.replace_font_texture(ctx, graphics, width, height, &pixels)?;
        log::debug!(
            "Uploaded {}x{} font atlas as texture {}",
            width,
            height,
            texture.handle.0
        );
        Ok(texture)
    }

    fn replace_font_texture(
        &mut self,
        ctx: &mut impl GuiContext,
        graphics: &mut impl GraphicsApi,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<FontTexture, GraphicsError> {
        if let Some(previous) = self.font_texture.take() {
            graphics.delete_texture(previous.handle);
        }

        match graphics.create_texture(width, height, rgba) {
            Ok(handle) => {
                let texture = FontTexture {
                    handle,
                    width,
                    height,
                };
                self.font_texture = Some(texture);
                ctx.set_font_texture_id(Some(texture_id_from_handle(handle)));
                Ok(texture)
            }
            Err(err) => {
                ctx.set_font_texture_id(None);
                Err(err)
            }
        }
    }

    /// Unregister and delete the font texture
    pub fn release(&mut self, ctx: &mut impl GuiContext, graphics: &mut impl GraphicsApi) {
        ctx.set_font_texture_id(None);
        if let Some(texture) = self.font_texture.take() {
            graphics.delete_texture(texture.handle);
        }
    }

    /// Finish the GUI frame and draw it
    pub fn render(&self, ctx: &mut impl GuiContext, graphics: &mut impl GraphicsApi) {
        graphics.reset_states();
        let draw_data = ctx.render();
        Self::submit(graphics, draw_data);
    }

    /// Draw already finalized draw data
    pub fn submit(graphics: &mut impl GraphicsApi, draw_data: &DrawData) {
        if draw_data.draw_lists.is_empty() {
            return;
        }

        let scale = draw_data.framebuffer_scale;
        let fb_width = (draw_data.display_size[0] * scale[0]) as i32;
        let fb_height = (draw_data.display_size[1] * scale[1]) as i32;
        if fb_width <= 0 || fb_height <= 0 {
            return;
        }

        graphics.push_state(StateMask::ENABLE | StateMask::COLOR_BUFFER | StateMask::TRANSFORM);
        Self::setup_state(graphics, fb_width, fb_height, draw_data);

        for list in &draw_data.draw_lists {
            Self::submit_list(graphics, list, draw_data.display_pos, scale, fb_height);
        }

        graphics.pop_state();
        log::trace!(
            "Submitted {} draw lists ({} vertices, {} indices)",
            draw_data.draw_lists_count(),
            draw_data.total_vtx_count(),
            draw_data.total_idx_count()
        );
    }

    fn setup_state(
        graphics: &mut impl GraphicsApi,
        fb_width: i32,
        fb_height: i32,
        draw_data: &DrawData,
    ) {
        graphics.enable(Capability::Blend);
        graphics.blend_func(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
        graphics.disable(Capability::CullFace);
        graphics.disable(Capability::DepthTest);
        graphics.disable(Capability::Lighting);
        graphics.enable(Capability::ScissorTest);
        graphics.enable(Capability::Texture2D);
        graphics.enable_client_array(ClientArray::Vertex);
        graphics.enable_client_array(ClientArray::Color);
        graphics.enable_client_array(ClientArray::TexCoord);

        graphics.viewport(IntRect::new(0, 0, fb_width, fb_height));
        graphics.load_matrix(MatrixMode::Texture, &Matrix4::identity());
        graphics.load_matrix(
            MatrixMode::Projection,
            &ortho_projection(draw_data.display_pos, draw_data.display_size),
        );
    }

    fn submit_list(
        graphics: &mut impl GraphicsApi,
        list: &DrawList,
        origin: [f32; 2],
        scale: [f32; 2],
        fb_height: i32,
    ) {
        graphics.bind_vertices(&list.vtx_buffer);

        for cmd in &list.commands {
            if let Some(callback) = &cmd.user_callback {
                callback(list, cmd);
                continue;
            }

            if list.command_indices(cmd).is_none() {
                log::warn!(
                    "Skipping draw command: indices {}..{} exceed buffer of {}",
                    cmd.idx_offset,
                    cmd.idx_offset.saturating_add(cmd.elem_count),
                    list.idx_buffer.len()
                );
                continue;
            }

            let [x1, y1, x2, y2] = cmd.framebuffer_clip_rect(origin, scale);
            graphics.bind_texture(handle_from_texture_id(cmd.texture_id));
            graphics.scissor(IntRect::new(
                x1 as i32,
                (fb_height as f32 - y2) as i32,
                (x2 - x1) as i32,
                (y2 - y1) as i32,
            ));
            graphics.draw_elements(&list.idx_buffer, cmd.idx_offset, cmd.elem_count);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::gui::{DrawCmd, DrawVert, TextureId};
    use crate::headless::HeadlessContext;
    use crate::render::{CommandRecorder, GraphicsCall};

    fn quad_list(texture: TextureId, clip: [f32; 4]) -> DrawList {
        DrawList::new(
            vec![DrawVert::default(); 6],
            vec![0, 1, 2, 3, 4, 5],
            vec![DrawCmd::elements(6, 0, clip, texture)],
        )
    }

    fn draw_data(lists: Vec<DrawList>, size: [f32; 2], scale: [f32; 2]) -> DrawData {
        DrawData {
            draw_lists: lists,
            display_pos: [0.0, 0.0],
            display_size: size,
            framebuffer_scale: scale,
        }
    }

    #[test]
    fn test_single_command_draws_once_with_full_scissor() {
        let mut recorder = CommandRecorder::new();
        let data = draw_data(
            vec![quad_list(TextureId(7), [0.0, 0.0, 800.0, 600.0])],
            [800.0, 600.0],
            [1.0, 1.0],
        );

        DrawSubmitter::submit(&mut recorder, &data);

        assert_eq!(recorder.texture_binds(), vec![TextureHandle(7)]);
        assert_eq!(recorder.scissors(), vec![IntRect::new(0, 0, 800, 600)]);
        assert_eq!(recorder.draws(), vec![(0, 6)]);
        assert_eq!(recorder.state_depth(), 0);
    }

    #[test]
    fn test_empty_draw_data_issues_nothing() {
        let mut recorder = CommandRecorder::new();
        DrawSubmitter::submit(&mut recorder, &draw_data(Vec::new(), [800.0, 600.0], [1.0, 1.0]));
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn test_state_setup_order() {
        let mut recorder = CommandRecorder::new();
        let data = draw_data(
            vec![quad_list(TextureId(1), [0.0, 0.0, 100.0, 100.0])],
            [100.0, 50.0],
            [1.0, 1.0],
        );
        DrawSubmitter::submit(&mut recorder, &data);

        let calls = recorder.calls();
        assert!(matches!(calls.first(), Some(GraphicsCall::PushState(_))));
        assert_eq!(calls.last(), Some(&GraphicsCall::PopState));
        assert!(calls.contains(&GraphicsCall::BlendFunc(
            BlendFactor::SrcAlpha,
            BlendFactor::OneMinusSrcAlpha
        )));
        assert!(calls.contains(&GraphicsCall::Disable(Capability::DepthTest)));
        assert!(calls.contains(&GraphicsCall::Enable(Capability::ScissorTest)));
        assert!(calls.contains(&GraphicsCall::Viewport(IntRect::new(0, 0, 100, 50))));
        assert!(calls.contains(&GraphicsCall::LoadMatrix(
            MatrixMode::Projection,
            ortho_projection([0.0, 0.0], [100.0, 50.0])
        )));
    }

    #[test]
    fn test_framebuffer_scale_applies_to_viewport_and_scissor() {
        let mut recorder = CommandRecorder::new();
        let data = draw_data(
            vec![quad_list(TextureId(1), [10.0, 20.0, 110.0, 70.0])],
            [400.0, 300.0],
            [2.0, 2.0],
        );
        DrawSubmitter::submit(&mut recorder, &data);

        assert!(recorder
            .calls()
            .contains(&GraphicsCall::Viewport(IntRect::new(0, 0, 800, 600))));
        // y flipped: 600 - 140
        assert_eq!(recorder.scissors(), vec![IntRect::new(20, 460, 200, 100)]);
    }

    #[test]
    fn test_fractional_clip_flips_before_truncating() {
        let mut recorder = CommandRecorder::new();
        let data = draw_data(
            vec![quad_list(TextureId(1), [0.0, 10.25, 100.0, 100.5])],
            [800.0, 600.0],
            [1.0, 1.0],
        );
        DrawSubmitter::submit(&mut recorder, &data);

        // 600 - 100.5 = 499.5, truncated once
        assert_eq!(recorder.scissors(), vec![IntRect::new(0, 499, 100, 90)]);
    }

    #[test]
    fn test_display_origin_offsets_clip_and_projection() {
        let mut recorder = CommandRecorder::new();
        let mut data = draw_data(
            vec![quad_list(TextureId(1), [110.0, 70.0, 210.0, 120.0])],
            [400.0, 300.0],
            [2.0, 2.0],
        );
        data.display_pos = [100.0, 50.0];
        DrawSubmitter::submit(&mut recorder, &data);

        // clip relative to origin: [10, 20, 110, 70] at scale 2
        assert_eq!(recorder.scissors(), vec![IntRect::new(20, 460, 200, 100)]);
        assert!(recorder.calls().contains(&GraphicsCall::LoadMatrix(
            MatrixMode::Projection,
            ortho_projection([100.0, 50.0], [400.0, 300.0])
        )));
    }

    #[test]
    fn test_callback_replaces_draw() {
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let list = DrawList::new(
            vec![DrawVert::default(); 3],
            vec![0, 1, 2],
            vec![
                DrawCmd::callback(move |_, _| seen.set(seen.get() + 1)),
                DrawCmd::elements(3, 0, [0.0, 0.0, 10.0, 10.0], TextureId(2)),
            ],
        );
        let mut recorder = CommandRecorder::new();
        DrawSubmitter::submit(&mut recorder, &draw_data(vec![list], [10.0, 10.0], [1.0, 1.0]));

        assert_eq!(calls.get(), 1);
        assert_eq!(recorder.draws(), vec![(0, 3)]);
    }

    #[test]
    fn test_out_of_range_command_is_skipped() {
        let list = DrawList::new(
            vec![DrawVert::default(); 3],
            vec![0, 1, 2],
            vec![
                DrawCmd::elements(6, 0, [0.0, 0.0, 10.0, 10.0], TextureId(2)),
                DrawCmd::elements(3, 0, [0.0, 0.0, 10.0, 10.0], TextureId(2)),
            ],
        );
        let mut recorder = CommandRecorder::new();
        DrawSubmitter::submit(&mut recorder, &draw_data(vec![list], [10.0, 10.0], [1.0, 1.0]));

        assert_eq!(recorder.draws(), vec![(0, 3)]);
    }

    #[test]
    fn test_font_atlas_replaces_previous_texture() {
        let mut ctx = HeadlessContext::with_font_atlas(4, 2, vec![0x80; 4 * 2 * 4]);
        let mut recorder = CommandRecorder::new();
        let mut submitter = DrawSubmitter::new();

        let placeholder = submitter.create_placeholder(&mut ctx, &mut recorder).unwrap();
        let atlas = submitter.load_font_atlas(&mut ctx, &mut recorder).unwrap();

        assert_eq!((atlas.width, atlas.height), (4, 2));
        assert_eq!(recorder.live_textures(), vec![atlas.handle]);
        assert_eq!(ctx.font_texture_id(), Some(texture_id_from_handle(atlas.handle)));

        let delete_at = recorder
            .calls()
            .iter()
            .position(|c| *c == GraphicsCall::DeleteTexture(placeholder.handle))
            .unwrap();
        let create_at = recorder
            .calls()
            .iter()
            .position(|c| matches!(c, GraphicsCall::CreateTexture { handle, .. } if *handle == atlas.handle))
            .unwrap();
        assert!(delete_at < create_at);
    }

    #[test]
    fn test_failed_upload_clears_font_texture() {
        let mut ctx = HeadlessContext::with_font_atlas(4, 4, vec![0; 3]);
        let mut recorder = CommandRecorder::new();
        let mut submitter = DrawSubmitter::new();
        submitter.create_placeholder(&mut ctx, &mut recorder).unwrap();

        assert!(submitter.load_font_atlas(&mut ctx, &mut recorder).is_err());
        assert_eq!(submitter.font_texture(), None);
        assert_eq!(ctx.font_texture_id(), None);
        assert!(recorder.live_textures().is_empty());
    }

    #[test]
    fn test_release_deletes_texture() {
        let mut ctx = HeadlessContext::new();
        let mut recorder = CommandRecorder::new();
        let mut submitter = DrawSubmitter::new();
        submitter.load_font_atlas(&mut ctx, &mut recorder).unwrap();

        submitter.release(&mut ctx, &mut recorder);
        assert!(recorder.live_textures().is_empty());
        assert_eq!(ctx.font_texture_id(), None);
    }
}
