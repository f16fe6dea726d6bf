//! # imgui_glfw
//!
//! Input and render backend binding an immediate-mode GUI library to a GLFW
//! window and a fixed-function graphics API.
//!
//! ## Features
//!
//! - **Input**: mouse, keyboard, text, touch and gamepad navigation written
//!   into the GUI's per-frame IO, with focus gating and edge-latched clicks
//! - **Rendering**: draw lists submitted as scissored, indexed draws
//! - **Resources**: font atlas texture and system cursor lifecycle
//! - **Configuration**: joystick layout and setup options from TOML or RON
//!
//! The GUI library, the windowing toolkit and the graphics API are reached
//! through the `GuiContext`, `Platform` and `GraphicsApi` traits.
//!
//! | Feature | Implementation |
//! |---------|----------------|
//! | `imgui` | `gui::ImguiContext` over Dear ImGui (`imgui` crate) |
//! | `glfw`  | `platform::glfw_platform::GlfwPlatform` |
//! | `glow`  | `render::GlowGraphics`, OpenGL 3.3 core |
//!
//! `headless` provides in-memory implementations of the first two and
//! `render::CommandRecorder` records graphics calls.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use imgui_glfw::prelude::*;
//!
//! fn main() -> Result<(), BackendError> {
//!     let mut ctx = HeadlessContext::new();
//!     let mut platform = HeadlessPlatform::new();
//!     let mut graphics = CommandRecorder::new();
//!
//!     let mut backend = ImguiGlfw::initialize(
//!         &mut ctx,
//!         &mut platform,
//!         &mut graphics,
//!         [1280.0, 720.0],
//!         BackendConfig::default(),
//!         Box::new(MemoryClipboard::default()),
//!     )?;
//!
//!     let events = vec![InputEvent::KeyPressed(Key::Tab)];
//!     backend.handle_events(&mut ctx, &platform, &events);
//!     backend.update(&mut ctx, &mut platform, [1280.0, 720.0], Duration::from_millis(16));
//!     // widget calls go here
//!     backend.render(&mut ctx, &mut graphics);
//!
//!     backend.shutdown(ctx, &mut platform, &mut graphics);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod clipboard;
pub mod config;
pub mod gui;
pub mod headless;
pub mod input;
pub mod logging;
pub mod platform;
pub mod render;

mod backend;

pub use backend::{BackendError, ImguiGlfw};

/// Common imports for backend users
pub mod prelude {
    pub use crate::{
        clipboard::{ClipboardBackend, MemoryClipboard, SystemClipboard},
        config::{BackendConfig, Config, ConfigError},
        gui::{
            bottom_right_absolute, top_left_absolute, ConfigFlags, DrawData, GuiContext, Io,
            LayoutCursor, LocalRect, MouseCursor, NavInput, TextureId,
        },
        headless::{HeadlessContext, HeadlessPlatform},
        input::{JoystickBinding, StickInfo},
        platform::{InputEvent, JoystickAxis, Key, MouseButton, MouseWheel, Platform},
        render::{
            handle_from_texture_id, texture_id_from_handle, CommandRecorder, FontTexture,
            GraphicsApi, GraphicsError, TextureHandle,
        },
        BackendError, ImguiGlfw,
    };

    #[cfg(feature = "glfw")]
    pub use crate::platform::glfw_platform::GlfwPlatform;

    #[cfg(feature = "imgui")]
    pub use crate::gui::ImguiContext;

    #[cfg(feature = "glow")]
    pub use crate::render::GlowGraphics;
}
