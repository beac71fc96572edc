//! Rune Motion configuration system
//!
//! This crate provides centralized configuration for the motion engine,
//! loading settings from `rune-motion.toml` with environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE: &str = "rune-motion.toml";

/// Errors that can occur while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    /// The file is not valid TOML for [`MotionConfig`].
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Main configuration structure for the motion engine
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MotionConfig {
    /// Time authority settings
    pub time: TimeConfig,
    /// Pulse propagation settings
    pub propagation: PropagationConfig,
    /// Reactive binding settings
    pub bindings: BindingsConfig,
    /// Headless driver settings
    pub driver: DriverConfig,
}

/// Time authority configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Largest raw frame delta accepted in one update, in seconds
    pub max_delta: f64,
    /// Initial time scale (1.0 = real time)
    pub time_scale: f64,
}

/// Pulse propagation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// Pulse travel speed in edges per second
    pub pulse_speed: f64,
    /// Seconds a passed node or edge takes to fade out
    pub glow_duration: f64,
    /// Breathing oscillation speed in cycles per second
    pub breathing_speed: f64,
}

/// Reactive binding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingsConfig {
    /// Default ramp duration for state changes, in seconds
    pub transition_duration: f64,
}

/// Headless driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Simulated frames per second
    pub frame_rate: u32,
    /// Number of frames to run before exiting
    pub frames: u32,
    /// Path to an animation definition (JSON); the built-in demo is used when unset
    pub definition: Option<PathBuf>,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            max_delta: 0.1,
            time_scale: 1.0,
        }
    }
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            pulse_speed: 2.0,
            glow_duration: 0.5,
            breathing_speed: 0.5,
        }
    }
}

impl Default for BindingsConfig {
    fn default() -> Self {
        Self {
            transition_duration: 0.3,
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            frames: 180,
            definition: None,
        }
    }
}

impl DriverConfig {
    /// Fixed frame delta in seconds derived from `frame_rate`.
    pub fn frame_delta(&self) -> f64 {
        1.0 / f64::from(self.frame_rate.max(1))
    }
}

impl MotionConfig {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from the default location ([`CONFIG_FILE`] in the current directory)
    /// or return default configuration if the file doesn't exist or can't be parsed
    pub fn load_or_default() -> Self {
        Self::load_from_file(CONFIG_FILE).unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    /// Values that fail to parse are ignored.
    pub fn merge_with_env(&mut self) {
        // Time settings
        if let Some(v) = env_f64("MOTION_MAX_DELTA") {
            self.time.max_delta = v;
        }
        if let Some(v) = env_f64("MOTION_TIME_SCALE") {
            self.time.time_scale = v;
        }

        // Propagation settings
        if let Some(v) = env_f64("MOTION_PULSE_SPEED") {
            self.propagation.pulse_speed = v;
        }
        if let Some(v) = env_f64("MOTION_GLOW_DURATION") {
            self.propagation.glow_duration = v;
        }
        if let Some(v) = env_f64("MOTION_BREATHING_SPEED") {
            self.propagation.breathing_speed = v;
        }

        // Binding settings
        if let Some(v) = env_f64("MOTION_BINDING_DURATION") {
            self.bindings.transition_duration = v;
        }

        // Driver settings
        if let Ok(val) = std::env::var("MOTION_FRAME_RATE") {
            if let Ok(rate) = val.parse::<u32>() {
                self.driver.frame_rate = rate;
            }
        }
        if let Ok(val) = std::env::var("MOTION_FRAMES") {
            if let Ok(frames) = val.parse::<u32>() {
                self.driver.frames = frames;
            }
        }
        if let Ok(path) = std::env::var("MOTION_DEFINITION") {
            self.driver.definition = Some(PathBuf::from(path));
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from [`CONFIG_FILE`] (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}

fn env_f64(key: &str) -> Option<f64> {
    std::env::var(key).ok()?.trim().parse::<f64>().ok()
}
