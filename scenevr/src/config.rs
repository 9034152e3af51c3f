//! Configuration for the locomotion controllers and session lifecycle.
//!
//! Every option is an explicit struct field with a documented default;
//! options are validated once, when a scene is constructed, instead of
//! being re-checked on each frame.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Continuous-walk options.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Master switch; a disabled controller never integrates.
    pub enabled: bool,
    /// Walking speed in meters per second. Default 1.2.
    pub speed: f32,
    /// When set, walking also requires the immersive session to be active.
    pub vr_only_gate: bool,
    /// When set, a pointer click toggles the armed state.
    pub toggle_on_click: bool,
}

impl Default for WalkConfig {
    fn default() -> Self {
        WalkConfig {
            enabled: true,
            speed: 1.2,
            vr_only_gate: false,
            toggle_on_click: true,
        }
    }
}

/// Discrete-turn options.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapTurnConfig {
    /// Rotation step in degrees. Default 30.
    pub snap_angle: f32,
    /// Minimum interval between applied turns in milliseconds. Default 180.
    pub cooldown_ms: u64,
}

impl SnapTurnConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

impl Default for SnapTurnConfig {
    fn default() -> Self {
        SnapTurnConfig {
            snap_angle: 30.0,
            cooldown_ms: 180,
        }
    }
}

/// Immersive-session entry options.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Whether automatic entry is attempted at all.
    pub enabled: bool,
    /// Delay before the automatic entry request, in milliseconds.
    /// Default 200.
    pub startup_delay_ms: u64,
    /// Grace period before the fallback overlay appears when the host has
    /// no asynchronous entry result. Default 1000.
    pub unsupported_grace_ms: u64,
}

impl SessionConfig {
    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    pub fn unsupported_grace(&self) -> Duration {
        Duration::from_millis(self.unsupported_grace_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            enabled: true,
            startup_delay_ms: 200,
            unsupported_grace_ms: 1000,
        }
    }
}

/// Render-quality ramp options.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Multiplier on the device pixel ratio for the target render scale.
    /// Default 1.0.
    pub pixel_ratio_multiplier: f32,
    /// Upper bound on the target render scale. Default 2.0.
    pub max_pixel_ratio: f32,
    /// Multiplier on the device pixel ratio for the deliberately reduced
    /// startup scale (fast first paint). Default 0.5.
    pub initial_multiplier: f32,
    /// Anisotropic filtering level applied to content textures once per
    /// session entry. Default 8.
    pub anisotropy: u8,
}

impl Default for QualityConfig {
    fn default() -> Self {
        QualityConfig {
            pixel_ratio_multiplier: 1.0,
            max_pixel_ratio: 2.0,
            initial_multiplier: 0.5,
            anisotropy: 8,
        }
    }
}

/// Aggregate options for one scene session.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneOptions {
    pub walk: WalkConfig,
    pub snap_turn: SnapTurnConfig,
    pub session: SessionConfig,
    pub quality: QualityConfig,
}

impl SceneOptions {
    pub fn from_json(json: &str) -> Result<SceneOptions, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Consume and sanity-check the options. Called once at construction;
    /// controllers can then trust their config without per-frame checks.
    pub fn validated(self) -> Result<SceneOptions, ConfigError> {
        if !self.walk.speed.is_finite() || self.walk.speed < 0.0 {
            return Err(ConfigError::InvalidWalkSpeed(self.walk.speed));
        }
        if !self.snap_turn.snap_angle.is_finite() {
            return Err(ConfigError::InvalidSnapAngle(self.snap_turn.snap_angle));
        }
        if !self.quality.max_pixel_ratio.is_finite() || self.quality.max_pixel_ratio <= 0.0 {
            return Err(ConfigError::InvalidPixelRatio(self.quality.max_pixel_ratio));
        }
        if !self.quality.pixel_ratio_multiplier.is_finite()
            || self.quality.pixel_ratio_multiplier <= 0.0
        {
            return Err(ConfigError::InvalidPixelRatio(
                self.quality.pixel_ratio_multiplier,
            ));
        }
        if !self.quality.initial_multiplier.is_finite() || self.quality.initial_multiplier <= 0.0 {
            return Err(ConfigError::InvalidPixelRatio(self.quality.initial_multiplier));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidWalkSpeed(f32),
    InvalidSnapAngle(f32),
    InvalidPixelRatio(f32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidWalkSpeed(speed) => {
                write!(f, "walk speed must be finite and non-negative, got {speed}")
            }
            ConfigError::InvalidSnapAngle(angle) => {
                write!(f, "snap angle must be finite, got {angle}")
            }
            ConfigError::InvalidPixelRatio(ratio) => {
                write!(f, "pixel ratio values must be finite and positive, got {ratio}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
