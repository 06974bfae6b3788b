//! Configuration system
//!
//! [`RuntimeConfig`] carries the runtime's tunables (default camera, default
//! material, fault retention). Any type implementing [`Config`] can be loaded
//! from and saved to `.toml` or `.ron` files.

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_str_with_format(&contents, path)
    }

    /// Parse configuration text, picking the format from the file name
    fn from_str_with_format(contents: &str, path: &str) -> Result<Self, ConfigError> {
        if path.ends_with(".toml") {
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Serialize configuration, picking the format from the file name
    fn to_string_with_format(&self, path: &str) -> Result<String, ConfigError> {
        if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = self.to_string_with_format(path)?;
        std::fs::write(path, contents).map_err(ConfigError::Io)
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

    /// A value is outside its valid range
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        /// Offending field name
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

/// Runtime configuration
///
/// The "options" half of `Runtime(surface, options)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Vertical field of view in degrees used by `Runtime::camera(None)`
    pub default_fov: f64,

    /// Near clipping plane distance
    pub near: f64,

    /// Far clipping plane distance
    pub far: f64,

    /// How far back along +Z the synthesized default camera sits
    pub default_camera_distance: f64,

    /// Color given to the material of every freshly built mesh
    pub default_material_color: [f64; 3],

    /// Background color the backend clears to
    pub clear_color: [f64; 3],

    /// Whether the backend should antialias
    pub antialias: bool,

    /// Number of recent frame faults kept for `Runtime::take_faults`
    pub max_retained_faults: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_fov: 75.0,
            near: 0.1,
            far: 1000.0,
            default_camera_distance: 5.0,
            // 0xf0f0f0
            default_material_color: [240.0 / 255.0; 3],
            clear_color: [0.0; 3],
            antialias: true,
            max_retained_faults: 64,
        }
    }
}

impl Config for RuntimeConfig {}

impl RuntimeConfig {
    /// Check that clipping planes and field of view are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.default_fov > 0.0 && self.default_fov < 180.0) {
            return Err(ConfigError::Invalid {
                field: "default_fov",
                reason: format!("{} is not within (0, 180)", self.default_fov),
            });
        }
        if !(self.near > 0.0) {
            return Err(ConfigError::Invalid {
                field: "near",
                reason: format!("{} must be positive", self.near),
            });
        }
        if !(self.far > self.near) {
            return Err(ConfigError::Invalid {
                field: "far",
                reason: format!("{} must exceed near plane {}", self.far, self.near),
            });
        }
        Ok(())
    }
}
