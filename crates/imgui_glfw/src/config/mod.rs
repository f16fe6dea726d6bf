//! Configuration system

use std::path::Path;

pub use serde::{Deserialize, Serialize};

use crate::input::JoystickBinding;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from a `.toml` or `.ron` file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => {
                toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            ConfigFormat::Ron => {
                ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
            }
        }
    }

    /// Save configuration to a `.toml` or `.ron` file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Ron,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Backend setup options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Upload the GUI's font atlas during initialization
    pub load_default_font: bool,
    /// Display size to use instead of the one passed to `initialize`
    pub display_size: Option<[f32; 2]>,
    /// Framebuffer pixels per display unit
    pub framebuffer_scale: [f32; 2],
    /// Gamepad navigation layout
    pub joystick: JoystickBinding,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            load_default_font: true,
            display_size: None,
            framebuffer_scale: [1.0, 1.0],
            joystick: JoystickBinding::default(),
        }
    }
}

impl BackendConfig {
    /// Set whether the font atlas is uploaded at initialization
    pub fn with_default_font(mut self, load: bool) -> Self {
        self.load_default_font = load;
        self
    }

    /// Override the display size
    pub fn with_display_size(mut self, width: f32, height: f32) -> Self {
        self.display_size = Some([width, height]);
        self
    }

    /// Set the framebuffer scale (e.g. 2.0 on high-DPI displays)
    pub fn with_framebuffer_scale(mut self, x: f32, y: f32) -> Self {
        self.framebuffer_scale = [x, y];
        self
    }

    /// Replace the joystick binding
    pub fn with_joystick(mut self, binding: JoystickBinding) -> Self {
        self.joystick = binding;
        self
    }
}

impl Config for BackendConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::NavInput;
    use crate::platform::JoystickAxis;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("imgui_glfw_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_defaults() {
        let config = BackendConfig::default();
        assert!(config.load_default_font);
        assert_eq!(config.display_size, None);
        assert_eq!(config.framebuffer_scale, [1.0, 1.0]);
        assert_eq!(config.joystick, JoystickBinding::default());
    }

    #[test]
    fn test_builder() {
        let config = BackendConfig::default()
            .with_default_font(false)
            .with_display_size(1280.0, 720.0)
            .with_framebuffer_scale(2.0, 2.0);
        assert!(!config.load_default_font);
        assert_eq!(config.display_size, Some([1280.0, 720.0]));
        assert_eq!(config.framebuffer_scale, [2.0, 2.0]);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut binding = JoystickBinding::default();
        binding.set_button(NavInput::Menu, 7);
        binding.dpad.x_axis = JoystickAxis::U;
        let config = BackendConfig::default()
            .with_display_size(800.0, 600.0)
            .with_joystick(binding);

        let path = temp_path("round_trip.toml");
        config.save_to_file(&path).unwrap();
        let loaded = BackendConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_ron_round_trip() {
        let config = BackendConfig::default().with_framebuffer_scale(1.5, 1.5);
        let path = temp_path("round_trip.ron");
        config.save_to_file(&path).unwrap();
        let loaded = BackendConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: BackendConfig = toml::from_str("load_default_font = false").unwrap();
        assert!(!config.load_default_font);
        assert_eq!(config.joystick, JoystickBinding::default());
    }

    #[test]
    fn test_unsupported_extension() {
        let result = BackendConfig::default().save_to_file(temp_path("config.json"));
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
