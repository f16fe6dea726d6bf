//! Joystick navigation mapping
//!
//! A `JoystickBinding` maps abstract navigation actions to physical button
//! indices and describes which axes emulate the d-pad and the left stick.
//! `JoystickState` tracks the single active device and writes
//! `Io::nav_inputs` from it each frame.

use serde::{Deserialize, Serialize};

use crate::gui::{Io, NavInput};
use crate::platform::{first_connected_joystick, JoystickAxis, Platform, JOYSTICK_AXIS_RANGE};

/// Navigation actions driven by a single button
pub const BUTTON_ACTIONS: [NavInput; 8] = [
    NavInput::Activate,
    NavInput::Cancel,
    NavInput::Input,
    NavInput::Menu,
    NavInput::FocusPrev,
    NavInput::FocusNext,
    NavInput::TweakSlow,
    NavInput::TweakFast,
];

/// Axes and threshold for a two-axis control
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StickInfo {
    /// Horizontal axis
    pub x_axis: JoystickAxis,
    /// Vertical axis
    pub y_axis: JoystickAxis,
    /// Negate the horizontal axis before thresholding
    #[serde(default)]
    pub x_inverted: bool,
    /// Negate the vertical axis before thresholding
    #[serde(default)]
    pub y_inverted: bool,
    /// Dead zone in axis units; values must strictly exceed it
    pub threshold: f32,
}

impl StickInfo {
    fn read(&self, platform: &impl Platform, joystick: u32) -> (f32, f32) {
        let mut x = platform.joystick_axis_position(joystick, self.x_axis);
        if self.x_inverted {
            x = -x;
        }
        let mut y = platform.joystick_axis_position(joystick, self.y_axis);
        if self.y_inverted {
            y = -y;
        }
        (x, y)
    }
}

/// Button entry in the serialized binding
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct ButtonMapping {
    action: NavInput,
    button: u32,
}

#[derive(Serialize, Deserialize)]
struct JoystickBindingRepr {
    #[serde(default)]
    buttons: Vec<ButtonMapping>,
    dpad: StickInfo,
    left_stick: StickInfo,
}

/// Physical layout of the navigation gamepad
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "JoystickBindingRepr", into = "JoystickBindingRepr")]
pub struct JoystickBinding {
    buttons: [Option<u32>; NavInput::COUNT],
    /// Axes emulating the d-pad
    pub dpad: StickInfo,
    /// Axes emulating the left stick
    pub left_stick: StickInfo,
}

impl Default for JoystickBinding {
    fn default() -> Self {
        let mut binding = Self {
            buttons: [None; NavInput::COUNT],
            dpad: StickInfo {
                x_axis: JoystickAxis::PovX,
                y_axis: JoystickAxis::PovY,
                x_inverted: false,
                y_inverted: cfg!(windows),
                threshold: 5.0,
            },
            left_stick: StickInfo {
                x_axis: JoystickAxis::X,
                y_axis: JoystickAxis::Y,
                x_inverted: false,
                y_inverted: false,
                threshold: 5.0,
            },
        };

        binding.set_button(NavInput::Activate, 0);
        binding.set_button(NavInput::Cancel, 1);
        binding.set_button(NavInput::Input, 3);
        binding.set_button(NavInput::Menu, 2);
        binding.set_button(NavInput::FocusPrev, 4);
        binding.set_button(NavInput::FocusNext, 5);
        binding.set_button(NavInput::TweakSlow, 4);
        binding.set_button(NavInput::TweakFast, 5);
        binding
    }
}

impl JoystickBinding {
    /// Binding with no buttons mapped and default sticks
    pub fn unmapped() -> Self {
        Self {
            buttons: [None; NavInput::COUNT],
            ..Self::default()
        }
    }

    /// Button mapped to an action
    pub fn button(&self, action: NavInput) -> Option<u32> {
        self.buttons[action.index()]
    }

    /// Map an action to a button index
    pub fn set_button(&mut self, action: NavInput, button: u32) {
        self.buttons[action.index()] = Some(button);
    }

    /// Remove an action's button
    pub fn clear_button(&mut self, action: NavInput) {
        self.buttons[action.index()] = None;
    }
}

impl From<JoystickBindingRepr> for JoystickBinding {
    fn from(repr: JoystickBindingRepr) -> Self {
        let mut buttons = [None; NavInput::COUNT];
        for mapping in repr.buttons {
            buttons[mapping.action.index()] = Some(mapping.button);
        }
        Self {
            buttons,
            dpad: repr.dpad,
            left_stick: repr.left_stick,
        }
    }
}

impl From<JoystickBinding> for JoystickBindingRepr {
    fn from(binding: JoystickBinding) -> Self {
        let buttons = NavInput::ALL
            .iter()
            .filter_map(|&action| {
                binding
                    .button(action)
                    .map(|button| ButtonMapping { action, button })
            })
            .collect();
        Self {
            buttons,
            dpad: binding.dpad,
            left_stick: binding.left_stick,
        }
    }
}

/// Active device plus its binding
#[derive(Debug, Clone, Default)]
pub struct JoystickState {
    active: Option<u32>,
    /// Current button and axis layout
    pub binding: JoystickBinding,
}

impl JoystickState {
    /// State with the given binding and no active device
    pub fn new(binding: JoystickBinding) -> Self {
        Self {
            active: None,
            binding,
        }
    }

    /// Currently active joystick
    pub const fn active(&self) -> Option<u32> {
        self.active
    }

    /// Force the active joystick
    pub fn set_active(&mut self, id: Option<u32>) {
        self.active = id;
    }

    /// Adopt the lowest connected joystick
    pub fn scan(&mut self, platform: &impl Platform) {
        self.active = first_connected_joystick(platform);
    }

    /// A device was plugged in; adopt it only when none is active
    pub fn on_connected(&mut self, id: u32) {
        if self.active.is_none() {
            log::info!("Joystick {} connected, using it for navigation", id);
            self.active = Some(id);
        }
    }

    /// A device was unplugged; fail over if it was the active one
    pub fn on_disconnected(&mut self, id: u32, platform: &impl Platform) {
        if self.active != Some(id) {
            return;
        }
        self.scan(platform);
        match self.active {
            Some(next) => log::info!("Joystick {} disconnected, switched to {}", id, next),
            None => log::info!("Joystick {} disconnected, no joystick left", id),
        }
    }

    /// Write every navigation input from the active device
    pub fn update_nav_inputs(&self, io: &mut Io, platform: &impl Platform) {
        let Some(joystick) = self.active else {
            return;
        };

        for action in BUTTON_ACTIONS {
            self.update_action_state(io, platform, joystick, action);
        }
        self.update_dpad_state(io, platform, joystick);
        self.update_lstick_state(io, platform, joystick);
    }

    fn update_action_state(
        &self,
        io: &mut Io,
        platform: &impl Platform,
        joystick: u32,
        action: NavInput,
    ) {
        let pressed = self
            .binding
            .button(action)
            .is_some_and(|button| platform.is_joystick_button_pressed(joystick, button));
        io.set_nav_input(action, if pressed { 1.0 } else { 0.0 });
    }

    fn update_dpad_state(&self, io: &mut Io, platform: &impl Platform, joystick: u32) {
        let dpad = &self.binding.dpad;
        let (x, y) = dpad.read(platform, joystick);
        let flag = |on: bool| if on { 1.0 } else { 0.0 };

        io.set_nav_input(NavInput::DpadLeft, flag(x < -dpad.threshold));
        io.set_nav_input(NavInput::DpadRight, flag(x > dpad.threshold));
        io.set_nav_input(NavInput::DpadUp, flag(y < -dpad.threshold));
        io.set_nav_input(NavInput::DpadDown, flag(y > dpad.threshold));
    }

    fn update_lstick_state(&self, io: &mut Io, platform: &impl Platform, joystick: u32) {
        let stick = &self.binding.left_stick;
        let (x, y) = stick.read(platform, joystick);

        let (left, right) = split_axis(x, stick.threshold);
        io.set_nav_input(NavInput::LStickLeft, left);
        io.set_nav_input(NavInput::LStickRight, right);

        let (up, down) = split_axis(y, stick.threshold);
        io.set_nav_input(NavInput::LStickUp, up);
        io.set_nav_input(NavInput::LStickDown, down);
    }
}

/// Split an axis into (negative, positive) magnitudes; at most one is non-zero
fn split_axis(value: f32, threshold: f32) -> (f32, f32) {
    if value < -threshold {
        ((value / JOYSTICK_AXIS_RANGE).abs(), 0.0)
    } else if value > threshold {
        (0.0, value / JOYSTICK_AXIS_RANGE)
    } else {
        (0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessPlatform;
    use approx::assert_relative_eq;

    fn platform_with_joystick(id: u32) -> HeadlessPlatform {
        let mut platform = HeadlessPlatform::new();
        platform.connect_joystick(id);
        platform
    }

    #[test]
    fn test_default_mapping() {
        let binding = JoystickBinding::default();
        assert_eq!(binding.button(NavInput::Activate), Some(0));
        assert_eq!(binding.button(NavInput::Cancel), Some(1));
        assert_eq!(binding.button(NavInput::Input), Some(3));
        assert_eq!(binding.button(NavInput::Menu), Some(2));
        assert_eq!(binding.button(NavInput::TweakSlow), Some(4));
        assert_eq!(binding.button(NavInput::TweakFast), Some(5));
        assert_eq!(binding.button(NavInput::DpadLeft), None);
        assert_eq!(binding.dpad.y_inverted, cfg!(windows));
        assert!(!binding.left_stick.y_inverted);
    }

    #[test]
    fn test_button_actions_are_binary() {
        let mut platform = platform_with_joystick(0);
        platform.set_joystick_button(0, 1, true);
        let state = JoystickState {
            active: Some(0),
            binding: JoystickBinding::default(),
        };
        let mut io = Io::default();

        state.update_nav_inputs(&mut io, &platform);

        assert_eq!(io.nav_input(NavInput::Cancel), 1.0);
        assert_eq!(io.nav_input(NavInput::Activate), 0.0);
    }

    #[test]
    fn test_unmapped_action_reads_zero() {
        let mut platform = platform_with_joystick(0);
        platform.set_joystick_button(0, 0, true);
        let state = JoystickState {
            active: Some(0),
            binding: JoystickBinding::unmapped(),
        };
        let mut io = Io::default();
        io.set_nav_input(NavInput::Activate, 1.0);

        state.update_nav_inputs(&mut io, &platform);

        assert_eq!(io.nav_input(NavInput::Activate), 0.0);
    }

    #[test]
    fn test_dpad_threshold_is_strict() {
        let mut platform = platform_with_joystick(0);
        let mut binding = JoystickBinding::default();
        binding.dpad.y_inverted = false;
        let state = JoystickState {
            active: Some(0),
            binding,
        };
        let mut io = Io::default();

        platform.set_joystick_axis(0, JoystickAxis::PovX, 5.0);
        platform.set_joystick_axis(0, JoystickAxis::PovY, -5.0);
        state.update_nav_inputs(&mut io, &platform);
        for input in [
            NavInput::DpadLeft,
            NavInput::DpadRight,
            NavInput::DpadUp,
            NavInput::DpadDown,
        ] {
            assert_eq!(io.nav_input(input), 0.0, "{:?} set at threshold", input);
        }

        platform.set_joystick_axis(0, JoystickAxis::PovX, 5.5);
        platform.set_joystick_axis(0, JoystickAxis::PovY, -5.5);
        state.update_nav_inputs(&mut io, &platform);
        assert_eq!(io.nav_input(NavInput::DpadRight), 1.0);
        assert_eq!(io.nav_input(NavInput::DpadLeft), 0.0);
        assert_eq!(io.nav_input(NavInput::DpadUp), 1.0);
        assert_eq!(io.nav_input(NavInput::DpadDown), 0.0);
    }

    #[test]
    fn test_dpad_inversion_flips_direction() {
        let mut platform = platform_with_joystick(0);
        let mut binding = JoystickBinding::default();
        binding.dpad.x_inverted = true;
        let state = JoystickState {
            active: Some(0),
            binding,
        };
        let mut io = Io::default();

        platform.set_joystick_axis(0, JoystickAxis::PovX, 100.0);
        state.update_nav_inputs(&mut io, &platform);

        assert_eq!(io.nav_input(NavInput::DpadLeft), 1.0);
        assert_eq!(io.nav_input(NavInput::DpadRight), 0.0);
    }

    #[test]
    fn test_lstick_reports_magnitude() {
        let mut platform = platform_with_joystick(0);
        let state = JoystickState {
            active: Some(0),
            binding: JoystickBinding::default(),
        };
        let mut io = Io::default();

        platform.set_joystick_axis(0, JoystickAxis::X, -40.0);
        platform.set_joystick_axis(0, JoystickAxis::Y, 75.0);
        state.update_nav_inputs(&mut io, &platform);

        assert_relative_eq!(io.nav_input(NavInput::LStickLeft), 0.4);
        assert_eq!(io.nav_input(NavInput::LStickRight), 0.0);
        assert_eq!(io.nav_input(NavInput::LStickUp), 0.0);
        assert_relative_eq!(io.nav_input(NavInput::LStickDown), 0.75);
    }

    #[test]
    fn test_lstick_opposite_directions_reset_each_other() {
        let mut platform = platform_with_joystick(0);
        let state = JoystickState {
            active: Some(0),
            binding: JoystickBinding::default(),
        };
        let mut io = Io::default();

        platform.set_joystick_axis(0, JoystickAxis::X, -60.0);
        state.update_nav_inputs(&mut io, &platform);
        platform.set_joystick_axis(0, JoystickAxis::X, 30.0);
        state.update_nav_inputs(&mut io, &platform);

        assert_eq!(io.nav_input(NavInput::LStickLeft), 0.0);
        assert_relative_eq!(io.nav_input(NavInput::LStickRight), 0.3);

        platform.set_joystick_axis(0, JoystickAxis::X, 2.0);
        state.update_nav_inputs(&mut io, &platform);
        assert_eq!(io.nav_input(NavInput::LStickRight), 0.0);
    }

    #[test]
    fn test_failover_picks_lowest_connected() {
        let mut platform = HeadlessPlatform::new();
        for id in [1, 2, 5] {
            platform.connect_joystick(id);
        }
        let mut state = JoystickState::default();
        state.scan(&platform);
        assert_eq!(state.active(), Some(1));

        platform.disconnect_joystick(1);
        state.on_disconnected(1, &platform);
        assert_eq!(state.active(), Some(2));

        platform.disconnect_joystick(2);
        platform.disconnect_joystick(5);
        state.on_disconnected(2, &platform);
        assert_eq!(state.active(), None);
    }

    #[test]
    fn test_connect_does_not_steal_active_device() {
        let mut state = JoystickState::default();
        state.on_connected(3);
        state.on_connected(1);
        assert_eq!(state.active(), Some(3));
    }

    #[test]
    fn test_disconnect_of_inactive_device_is_ignored() {
        let platform = platform_with_joystick(4);
        let mut state = JoystickState::default();
        state.set_active(Some(4));
        state.on_disconnected(7, &platform);
        assert_eq!(state.active(), Some(4));
    }

    #[test]
    fn test_binding_serializes_to_toml() {
        let mut binding = JoystickBinding::default();
        binding.clear_button(NavInput::Input);
        binding.left_stick.threshold = 12.5;

        let text = toml::to_string_pretty(&binding).unwrap();
        let parsed: JoystickBinding = toml::from_str(&text).unwrap();

        assert_eq!(parsed, binding);
        assert_eq!(parsed.button(NavInput::Input), None);
    }
}
