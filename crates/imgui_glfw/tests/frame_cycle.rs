//! Full initialize -> events -> update -> render -> shutdown cycles

use std::time::Duration;

use approx::assert_relative_eq;
use imgui_glfw::gui::{DrawCmd, DrawList, DrawVert};
use imgui_glfw::prelude::*;
use imgui_glfw::render::{GraphicsCall, IntRect};

const DISPLAY: [f32; 2] = [800.0, 600.0];
const FRAME: Duration = Duration::from_millis(16);

struct Harness {
    backend: ImguiGlfw,
    ctx: HeadlessContext,
    platform: HeadlessPlatform,
    graphics: CommandRecorder,
}

impl Harness {
    fn new(config: BackendConfig) -> Self {
        imgui_glfw::logging::init_for_tests();
        let mut ctx = HeadlessContext::new();
        let mut platform = HeadlessPlatform::new();
        let mut graphics = CommandRecorder::new();
        let backend = ImguiGlfw::initialize(
            &mut ctx,
            &mut platform,
            &mut graphics,
            DISPLAY,
            config,
            Box::new(MemoryClipboard::default()),
        )
        .expect("initialize");
        Self {
            backend,
            ctx,
            platform,
            graphics,
        }
    }

    fn frame(&mut self, events: &[InputEvent]) {
        self.backend
            .handle_events(&mut self.ctx, &self.platform, events);
        self.backend
            .update(&mut self.ctx, &mut self.platform, DISPLAY, FRAME);
        self.graphics.clear();
        self.backend.render(&mut self.ctx, &mut self.graphics);
    }

    fn shutdown(self) -> (HeadlessPlatform, CommandRecorder) {
        let Self {
            backend,
            ctx,
            mut platform,
            mut graphics,
        } = self;
        backend.shutdown(ctx, &mut platform, &mut graphics);
        (platform, graphics)
    }
}

fn quad(texture: TextureId) -> DrawData {
    DrawData {
        draw_lists: vec![DrawList::new(
            vec![DrawVert::default(); 6],
            vec![0, 1, 2, 3, 4, 5],
            vec![DrawCmd::elements(
                6,
                0,
                [0.0, 0.0, DISPLAY[0], DISPLAY[1]],
                texture,
            )],
        )],
        ..DrawData::default()
    }
}

#[test]
fn single_quad_frame_issues_one_scissored_draw() {
    let mut harness = Harness::new(BackendConfig::default());
    let font = harness.ctx.font_texture_id().expect("font texture id");
    harness.ctx.set_draw_data(quad(font));

    harness.frame(&[]);

    assert_eq!(
        harness.graphics.texture_binds(),
        vec![handle_from_texture_id(font)]
    );
    assert_eq!(harness.graphics.scissors(), vec![IntRect::new(0, 0, 800, 600)]);
    assert_eq!(harness.graphics.draws(), vec![(0, 6)]);
    assert_eq!(harness.graphics.calls().first(), Some(&GraphicsCall::ResetStates));
    assert_eq!(harness.graphics.state_depth(), 0);
}

#[test]
fn empty_frame_only_resets_state() {
    let mut harness = Harness::new(BackendConfig::default());
    harness.frame(&[]);
    assert_eq!(harness.graphics.calls(), &[GraphicsCall::ResetStates]);
}

#[test]
fn typing_and_clicking_across_frames() {
    let mut harness = Harness::new(BackendConfig::default());
    harness.platform.set_pointer([40, 30]);

    harness.frame(&[
        InputEvent::MouseMoved { x: 40, y: 30 },
        InputEvent::MouseButtonPressed(MouseButton::Left),
        InputEvent::MouseButtonReleased(MouseButton::Left),
        InputEvent::KeyPressed(Key::LControl),
        InputEvent::MouseWheelScrolled {
            wheel: MouseWheel::Vertical,
            delta: -1.5,
        },
    ]);

    let io = harness.ctx.io();
    assert_eq!(io.mouse_pos, [40.0, 30.0]);
    assert!(io.mouse_down[0]);
    assert!(io.key_ctrl);
    assert_relative_eq!(io.mouse_wheel, -1.5);
    assert_relative_eq!(io.delta_time, FRAME.as_secs_f32());

    harness.frame(&[InputEvent::KeyReleased(Key::LControl)]);
    let io = harness.ctx.io();
    assert!(!io.mouse_down[0]);
    assert!(!io.key_ctrl);
    assert_eq!(io.mouse_wheel, 0.0);
    assert_eq!(harness.backend.frame_count(), 2);
}

#[test]
fn focus_loss_mid_batch_drops_later_events() {
    let mut harness = Harness::new(BackendConfig::default());
    harness.frame(&[
        InputEvent::KeyPressed(Key::A),
        InputEvent::FocusLost,
        InputEvent::KeyPressed(Key::B),
    ]);

    let io = harness.ctx.io();
    assert!(io.is_key_down(Key::A.code()));
    assert!(!io.is_key_down(Key::B.code()));
    assert!(!harness.backend.has_focus());
}

#[test]
fn gamepad_failover_keeps_navigation_alive() {
    let mut harness = Harness::new(BackendConfig::default());
    harness.ctx.io_mut().config_flags |= ConfigFlags::NAV_ENABLE_GAMEPAD;

    harness.platform.connect_joystick(2);
    harness.platform.connect_joystick(4);
    harness.frame(&[
        InputEvent::JoystickConnected(2),
        InputEvent::JoystickConnected(4),
    ]);
    assert_eq!(harness.backend.joystick().active(), Some(2));

    harness.platform.disconnect_joystick(2);
    harness.platform.set_joystick_button(4, 1, true);
    harness.frame(&[InputEvent::JoystickDisconnected(2)]);

    assert_eq!(harness.backend.joystick().active(), Some(4));
    assert_eq!(harness.ctx.io().nav_input(NavInput::Cancel), 1.0);
}

#[test]
fn font_reload_replaces_texture() {
    let mut harness = Harness::new(BackendConfig::default());
    let first = harness.backend.font_texture().expect("font texture");

    harness
        .backend
        .load_font_atlas(&mut harness.ctx, &mut harness.graphics);
    let second = harness.backend.font_texture().expect("font texture");

    assert_ne!(first.handle, second.handle);
    assert_eq!(harness.graphics.live_textures(), vec![second.handle]);
    assert_eq!(
        harness.ctx.font_texture_id(),
        Some(texture_id_from_handle(second.handle))
    );
}

#[test]
fn shutdown_leaves_nothing_alive() {
    let mut harness = Harness::new(BackendConfig::default());
    harness.frame(&[]);

    let (platform, graphics) = harness.shutdown();
    assert!(graphics.live_textures().is_empty());
    assert_eq!(platform.live_cursor_count(), 0);
}
