//! OpenGL graphics API over `glow`
//!
//! Core-profile GL has no attribute stack, matrix stacks or client arrays, so
//! `GlowGraphics` keeps them itself: a saved-state stack read back with
//! `glGet*`, projection and texture matrices uploaded as shader uniforms, and
//! a vertex array object whose attributes stand in for the client arrays.
//!
//! # Safety
//!
//! Every method issues raw GL calls. The GL context the `glow::Context` was
//! loaded from must be current on the calling thread (`GlfwPlatform::new`
//! makes its window current).

#![allow(unsafe_code)]

use std::num::NonZeroU32;

use glow::HasContext;
use nalgebra::Matrix4;

use super::{
    validate_rgba, BlendFactor, Capability, ClientArray, GraphicsApi, GraphicsError, IntRect,
    MatrixMode, StateMask, TextureHandle,
};
use crate::gui::{DrawIdx, DrawVert};

const VERTEX_SHADER: &str = r#"
uniform mat4 ProjMtx;
uniform mat4 TexMtx;
in vec2 Position;
in vec2 UV;
in vec4 Color;
out vec2 Frag_UV;
out vec4 Frag_Color;
void main() {
    Frag_UV = (TexMtx * vec4(UV, 0.0, 1.0)).xy;
    Frag_Color = Color;
    gl_Position = ProjMtx * vec4(Position, 0.0, 1.0);
}
"#;

const FRAGMENT_SHADER: &str = r#"
uniform sampler2D Texture;
in vec2 Frag_UV;
in vec4 Frag_Color;
out vec4 Out_Color;
void main() {
    Out_Color = Frag_Color * texture(Texture, Frag_UV);
}
"#;

/// GLSL header prepended to both shaders unless overridden
pub const DEFAULT_GLSL_VERSION: &str = "#version 330 core";

/// Capabilities toggled with `glEnable`; the rest have no core-profile switch
const TOGGLED_CAPABILITIES: [u32; 4] = [glow::BLEND, glow::CULL_FACE, glow::DEPTH_TEST, glow::SCISSOR_TEST];

/// GL enum for a capability, `None` when core profile has no switch for it
pub const fn gl_capability(capability: Capability) -> Option<u32> {
    match capability {
        Capability::Blend => Some(glow::BLEND),
        Capability::CullFace => Some(glow::CULL_FACE),
        Capability::DepthTest => Some(glow::DEPTH_TEST),
        Capability::ScissorTest => Some(glow::SCISSOR_TEST),
        // Sampling happens in the fragment shader and lighting does not exist
        Capability::Texture2D | Capability::Lighting => None,
    }
}

/// GL enum for a blend factor
pub const fn gl_blend_factor(factor: BlendFactor) -> u32 {
    match factor {
        BlendFactor::SrcAlpha => glow::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => glow::ONE_MINUS_SRC_ALPHA,
    }
}

/// Native GL texture for a handle, `None` for the zero handle
pub fn native_texture(handle: TextureHandle) -> Option<glow::NativeTexture> {
    NonZeroU32::new(handle.0).map(glow::NativeTexture)
}

/// Handle for a native GL texture
pub const fn texture_handle(texture: glow::NativeTexture) -> TextureHandle {
    TextureHandle(texture.0.get())
}

fn to_gl_u32(value: i32) -> u32 {
    u32::try_from(value).unwrap_or_default()
}

/// Blend factors and equations saved by `StateMask::COLOR_BUFFER`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BlendState {
    src_rgb: i32,
    dst_rgb: i32,
    src_alpha: i32,
    dst_alpha: i32,
    equation_rgb: i32,
    equation_alpha: i32,
}

/// One `push_state` entry
#[derive(Debug, Clone, PartialEq)]
struct SavedState {
    enabled: Option<[bool; TOGGLED_CAPABILITIES.len()]>,
    blend: Option<BlendState>,
    viewport: Option<[i32; 4]>,
    projection: Option<Matrix4<f32>>,
    texture_matrix: Option<Matrix4<f32>>,
    program: i32,
    texture: i32,
    vertex_array: i32,
    array_buffer: i32,
}

/// Attribute locations resolved from the linked program
#[derive(Debug, Clone, Copy)]
struct Attributes {
    position: u32,
    uv: u32,
    color: u32,
}

impl Attributes {
    const fn location(&self, array: ClientArray) -> u32 {
        match array {
            ClientArray::Vertex => self.position,
            ClientArray::TexCoord => self.uv,
            ClientArray::Color => self.color,
        }
    }
}

/// `GraphicsApi` issuing OpenGL 3.3 core calls through `glow`
pub struct GlowGraphics {
    gl: glow::Context,
    program: glow::NativeProgram,
    vertex_array: glow::NativeVertexArray,
    vertex_buffer: glow::NativeBuffer,
    index_buffer: glow::NativeBuffer,
    attributes: Attributes,
    projection_location: Option<glow::NativeUniformLocation>,
    texture_matrix_location: Option<glow::NativeUniformLocation>,
    sampler_location: Option<glow::NativeUniformLocation>,
    projection: Matrix4<f32>,
    texture_matrix: Matrix4<f32>,
    saved: Vec<SavedState>,
}

impl std::fmt::Debug for GlowGraphics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlowGraphics")
            .field("program", &self.program)
            .field("state_depth", &self.saved.len())
            .finish_non_exhaustive()
    }
}

impl GlowGraphics {
    /// Compile the GUI shaders and create buffers on a current GL context
    pub fn new(gl: glow::Context) -> Result<Self, GraphicsError> {
        Self::with_glsl_version(gl, DEFAULT_GLSL_VERSION)
    }

    /// Like `new` with a custom `#version` line
    pub fn with_glsl_version(gl: glow::Context, version: &str) -> Result<Self, GraphicsError> {
        unsafe {
            let program = link_program(&gl, version)?;
            let attribute = |name: &str| {
                gl.get_attrib_location(program, name)
                    .ok_or_else(|| GraphicsError::Api(format!("Attribute {name} not found")))
            };
            let attributes = Attributes {
                position: attribute("Position")?,
                uv: attribute("UV")?,
                color: attribute("Color")?,
            };
            let projection_location = gl.get_uniform_location(program, "ProjMtx");
            let texture_matrix_location = gl.get_uniform_location(program, "TexMtx");
            let sampler_location = gl.get_uniform_location(program, "Texture");

            let vertex_array = gl.create_vertex_array().map_err(GraphicsError::Api)?;
            let vertex_buffer = gl.create_buffer().map_err(GraphicsError::Api)?;
            let index_buffer = gl.create_buffer().map_err(GraphicsError::Api)?;

            log::info!("GL graphics ready ({})", gl.get_parameter_string(glow::VERSION));
            Ok(Self {
                gl,
                program,
                vertex_array,
                vertex_buffer,
                index_buffer,
                attributes,
                projection_location,
                texture_matrix_location,
                sampler_location,
                projection: Matrix4::identity(),
                texture_matrix: Matrix4::identity(),
                saved: Vec::new(),
            })
        }
    }

    /// Underlying GL context
    pub const fn gl(&self) -> &glow::Context {
        &self.gl
    }

    /// Number of unmatched `push_state` calls
    pub fn state_depth(&self) -> usize {
        self.saved.len()
    }

    /// Delete the program and buffers and hand the context back
    pub fn destroy(self) -> glow::Context {
        unsafe {
            self.gl.delete_program(self.program);
            self.gl.delete_vertex_array(self.vertex_array);
            self.gl.delete_buffer(self.vertex_buffer);
            self.gl.delete_buffer(self.index_buffer);
        }
        self.gl
    }

    fn upload_matrix(&self, location: Option<&glow::NativeUniformLocation>, matrix: &Matrix4<f32>) {
        unsafe {
            self.gl.use_program(Some(self.program));
            self.gl
                .uniform_matrix_4_f32_slice(location, false, matrix.as_slice());
        }
    }

    fn save(&self, mask: StateMask) -> SavedState {
        unsafe {
            let gl = &self.gl;
            let enabled = mask
                .contains(StateMask::ENABLE)
                .then(|| TOGGLED_CAPABILITIES.map(|cap| gl.is_enabled(cap)));
            let blend = mask.contains(StateMask::COLOR_BUFFER).then(|| BlendState {
                src_rgb: gl.get_parameter_i32(glow::BLEND_SRC_RGB),
                dst_rgb: gl.get_parameter_i32(glow::BLEND_DST_RGB),
                src_alpha: gl.get_parameter_i32(glow::BLEND_SRC_ALPHA),
                dst_alpha: gl.get_parameter_i32(glow::BLEND_DST_ALPHA),
                equation_rgb: gl.get_parameter_i32(glow::BLEND_EQUATION_RGB),
                equation_alpha: gl.get_parameter_i32(glow::BLEND_EQUATION_ALPHA),
            });
            let transform = mask.contains(StateMask::TRANSFORM);
            let viewport = transform.then(|| {
                let mut viewport = [0; 4];
                gl.get_parameter_i32_slice(glow::VIEWPORT, &mut viewport);
                viewport
            });

            SavedState {
                enabled,
                blend,
                viewport,
                projection: transform.then_some(self.projection),
                texture_matrix: transform.then_some(self.texture_matrix),
                program: gl.get_parameter_i32(glow::CURRENT_PROGRAM),
                texture: gl.get_parameter_i32(glow::TEXTURE_BINDING_2D),
                vertex_array: gl.get_parameter_i32(glow::VERTEX_ARRAY_BINDING),
                array_buffer: gl.get_parameter_i32(glow::ARRAY_BUFFER_BINDING),
            }
        }
    }

    fn restore(&mut self, state: SavedState) {
        if let Some(matrix) = state.projection {
            self.projection = matrix;
            self.upload_matrix(self.projection_location.as_ref(), &matrix);
        }
        if let Some(matrix) = state.texture_matrix {
            self.texture_matrix = matrix;
            self.upload_matrix(self.texture_matrix_location.as_ref(), &matrix);
        }

        unsafe {
            let gl = &self.gl;
            if let Some(enabled) = state.enabled {
                for (cap, on) in TOGGLED_CAPABILITIES.iter().zip(enabled) {
                    if on {
                        gl.enable(*cap);
                    } else {
                        gl.disable(*cap);
                    }
                }
            }
            if let Some(blend) = state.blend {
                gl.blend_equation_separate(to_gl_u32(blend.equation_rgb), to_gl_u32(blend.equation_alpha));
                gl.blend_func_separate(
                    to_gl_u32(blend.src_rgb),
                    to_gl_u32(blend.dst_rgb),
                    to_gl_u32(blend.src_alpha),
                    to_gl_u32(blend.dst_alpha),
                );
            }
            if let Some([x, y, width, height]) = state.viewport {
                gl.viewport(x, y, width, height);
            }

            let name = |raw: i32| NonZeroU32::new(to_gl_u32(raw));
            gl.use_program(name(state.program).map(glow::NativeProgram));
            gl.bind_texture(glow::TEXTURE_2D, name(state.texture).map(glow::NativeTexture));
            gl.bind_vertex_array(name(state.vertex_array).map(glow::NativeVertexArray));
            gl.bind_buffer(glow::ARRAY_BUFFER, name(state.array_buffer).map(glow::NativeBuffer));
        }
    }
}

unsafe fn compile_shader(
    gl: &glow::Context,
    kind: u32,
    version: &str,
    source: &str,
) -> Result<glow::NativeShader, GraphicsError> {
    let shader = gl.create_shader(kind).map_err(GraphicsError::Api)?;
    gl.shader_source(shader, &format!("{version}\n{source}"));
    gl.compile_shader(shader);
    if gl.get_shader_compile_status(shader) {
        Ok(shader)
    } else {
        let message = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        Err(GraphicsError::Api(format!("Shader compilation failed: {message}")))
    }
}

unsafe fn link_program(gl: &glow::Context, version: &str) -> Result<glow::NativeProgram, GraphicsError> {
    let vertex = compile_shader(gl, glow::VERTEX_SHADER, version, VERTEX_SHADER)?;
    let fragment = match compile_shader(gl, glow::FRAGMENT_SHADER, version, FRAGMENT_SHADER) {
        Ok(shader) => shader,
        Err(e) => {
            gl.delete_shader(vertex);
            return Err(e);
        }
    };

    let program = gl.create_program().map_err(GraphicsError::Api)?;
    gl.attach_shader(program, vertex);
    gl.attach_shader(program, fragment);
    gl.link_program(program);
    gl.detach_shader(program, vertex);
    gl.detach_shader(program, fragment);
    gl.delete_shader(vertex);
    gl.delete_shader(fragment);

    if gl.get_program_link_status(program) {
        Ok(program)
    } else {
        let message = gl.get_program_info_log(program);
        gl.delete_program(program);
        Err(GraphicsError::Api(format!("Program link failed: {message}")))
    }
}

impl GraphicsApi for GlowGraphics {
    fn reset_states(&mut self) {
        unsafe {
            self.gl.use_program(None);
            self.gl.bind_vertex_array(None);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
            self.gl.active_texture(glow::TEXTURE0);
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }

    fn push_state(&mut self, mask: StateMask) {
        let state = self.save(mask);
        self.saved.push(state);
    }

    fn pop_state(&mut self) {
        match self.saved.pop() {
            Some(state) => self.restore(state),
            None => log::warn!("pop_state without matching push_state"),
        }
    }

    fn enable(&mut self, capability: Capability) {
        if let Some(cap) = gl_capability(capability) {
            unsafe { self.gl.enable(cap) };
        }
    }

    fn disable(&mut self, capability: Capability) {
        if let Some(cap) = gl_capability(capability) {
            unsafe { self.gl.disable(cap) };
        }
    }

    fn enable_client_array(&mut self, array: ClientArray) {
        unsafe {
            self.gl.bind_vertex_array(Some(self.vertex_array));
            self.gl
                .enable_vertex_attrib_array(self.attributes.location(array));
        }
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        unsafe {
            self.gl.blend_equation(glow::FUNC_ADD);
            self.gl.blend_func(gl_blend_factor(src), gl_blend_factor(dst));
        }
    }

    fn viewport(&mut self, rect: IntRect) {
        unsafe { self.gl.viewport(rect.x, rect.y, rect.width, rect.height) };
    }

    fn load_matrix(&mut self, mode: MatrixMode, matrix: &Matrix4<f32>) {
        match mode {
            MatrixMode::Projection => {
                self.projection = *matrix;
                self.upload_matrix(self.projection_location.as_ref(), matrix);
            }
            MatrixMode::Texture => {
                self.texture_matrix = *matrix;
                self.upload_matrix(self.texture_matrix_location.as_ref(), matrix);
            }
        }
    }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<TextureHandle, GraphicsError> {
        validate_rgba(width, height, rgba)?;
        let (w, h) = (
            i32::try_from(width).map_err(|_| GraphicsError::InvalidTextureSize { width, height })?,
            i32::try_from(height).map_err(|_| GraphicsError::InvalidTextureSize { width, height })?,
        );

        unsafe {
            let gl = &self.gl;
            let texture = gl.create_texture().map_err(GraphicsError::Api)?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                w,
                h,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                Some(rgba),
            );
            gl.bind_texture(glow::TEXTURE_2D, None);

            let handle = texture_handle(texture);
            log::debug!("Created {}x{} GL texture {}", width, height, handle.0);
            Ok(handle)
        }
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        match native_texture(texture) {
            Some(native) => unsafe { self.gl.delete_texture(native) },
            None => log::warn!("Ignoring delete of the null texture"),
        }
    }

    fn bind_texture(&mut self, texture: TextureHandle) {
        unsafe {
            self.gl.use_program(Some(self.program));
            self.gl.uniform_1_i32(self.sampler_location.as_ref(), 0);
            self.gl.active_texture(glow::TEXTURE0);
            self.gl.bind_texture(glow::TEXTURE_2D, native_texture(texture));
        }
    }

    fn bind_vertices(&mut self, vertices: &[DrawVert]) {
        let stride = DrawVert::STRIDE as i32;
        let attributes = self.attributes;
        unsafe {
            let gl = &self.gl;
            gl.use_program(Some(self.program));
            gl.bind_vertex_array(Some(self.vertex_array));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vertex_buffer));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(vertices),
                glow::STREAM_DRAW,
            );
            gl.vertex_attrib_pointer_f32(
                attributes.position,
                2,
                glow::FLOAT,
                false,
                stride,
                DrawVert::POS_OFFSET as i32,
            );
            gl.vertex_attrib_pointer_f32(attributes.uv, 2, glow::FLOAT, false, stride, DrawVert::UV_OFFSET as i32);
            gl.vertex_attrib_pointer_f32(
                attributes.color,
                4,
                glow::UNSIGNED_BYTE,
                true,
                stride,
                DrawVert::COL_OFFSET as i32,
            );
        }
    }

    fn scissor(&mut self, rect: IntRect) {
        unsafe { self.gl.scissor(rect.x, rect.y, rect.width, rect.height) };
    }

    fn draw_elements(&mut self, indices: &[DrawIdx], offset: usize, count: usize) {
        let Some(range) = offset
            .checked_add(count)
            .and_then(|end| indices.get(offset..end))
        else {
            log::warn!(
                "draw_elements range {}..{} exceeds {} indices",
                offset,
                offset.saturating_add(count),
                indices.len()
            );
            return;
        };
        let Ok(count) = i32::try_from(count) else {
            log::warn!("draw_elements count {} exceeds GLsizei", count);
            return;
        };

        unsafe {
            let gl = &self.gl;
            gl.bind_vertex_array(Some(self.vertex_array));
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(self.index_buffer));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(range),
                glow::STREAM_DRAW,
            );
            gl.draw_elements(glow::TRIANGLES, count, glow::UNSIGNED_SHORT, 0);
        }
    }
}
