//! Reel bank configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::curve::MotionCurve;
use crate::error::{RbError, RbResult};

/// Layout and motion profile for a single reel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelConfig {
    /// Number of visual items in the reel's virtual band
    pub item_count: usize,
    /// Distance between neighbouring items
    pub item_height: f32,
    /// Offset the snap phase aligns an item onto
    pub center_line: f32,

    /// Full running speed (units per second)
    pub max_speed: f32,
    /// Spin-up duration (seconds)
    pub acceleration_time: f32,
    /// Spin-down duration before the snap (seconds)
    pub deceleration_time: f32,
    /// Speed reached at the end of deceleration
    pub deceleration_end_speed: f32,
    /// Final centering duration (seconds)
    pub snap_time: f32,
    /// Curve shaping the spin-up
    pub acceleration_curve: MotionCurve,
    /// Curve shaping the spin-down
    pub deceleration_curve: MotionCurve,

    /// Symbol catalog (face values drawn on recycle)
    pub symbols: Vec<String>,
}

impl ReelConfig {
    /// Standard cabinet timing
    pub fn standard() -> Self {
        Self {
            item_count: 5,
            item_height: 220.0,
            center_line: 0.0,
            max_speed: 980.0,
            acceleration_time: 0.9,
            deceleration_time: 0.85,
            deceleration_end_speed: 80.0,
            snap_time: 0.32,
            acceleration_curve: MotionCurve::EaseInOut,
            deceleration_curve: MotionCurve::EaseInOut,
            symbols: default_symbols(),
        }
    }

    /// Fast mode: shorter ramps, higher top speed
    pub fn turbo() -> Self {
        Self {
            max_speed: 1600.0,
            acceleration_time: 0.35,
            deceleration_time: 0.4,
            deceleration_end_speed: 120.0,
            snap_time: 0.18,
            ..Self::standard()
        }
    }

    /// Height of the virtual band covered by all items
    pub fn band_height(&self) -> f32 {
        self.item_height * self.item_count as f32
    }

    /// Validate timings, speeds and layout
    pub fn validate(&self) -> RbResult<()> {
        if !(self.item_height.is_finite() && self.item_height > 0.0) {
            return Err(RbError::InvalidConfig(format!(
                "item_height must be positive, got {}",
                self.item_height
            )));
        }
        if !self.center_line.is_finite() {
            return Err(RbError::InvalidConfig("center_line must be finite".into()));
        }

        let non_negative = [
            ("max_speed", self.max_speed),
            ("acceleration_time", self.acceleration_time),
            ("deceleration_time", self.deceleration_time),
            ("deceleration_end_speed", self.deceleration_end_speed),
            ("snap_time", self.snap_time),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(RbError::InvalidConfig(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }

        if self.deceleration_end_speed > self.max_speed {
            return Err(RbError::InvalidConfig(format!(
                "deceleration_end_speed ({}) exceeds max_speed ({})",
                self.deceleration_end_speed, self.max_speed
            )));
        }

        Ok(())
    }
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Standard face values: HP = high paying, LP = low paying
fn default_symbols() -> Vec<String> {
    [
        "HP1", "HP2", "HP3", "HP4", "LP1", "LP2", "LP3", "LP4", "LP5", "WILD", "SCATTER",
        "BONUS",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Session orchestration timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Time after a spin starts before stop is allowed (seconds)
    pub stop_unlock_delay: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stop_unlock_delay: 3.0,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> RbResult<()> {
        if !self.stop_unlock_delay.is_finite() || self.stop_unlock_delay < 0.0 {
            return Err(RbError::InvalidConfig(format!(
                "stop_unlock_delay must be finite and >= 0, got {}",
                self.stop_unlock_delay
            )));
        }
        Ok(())
    }
}

/// Complete machine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// One entry per physical reel
    pub reels: Vec<ReelConfig>,
    /// Orchestrator timing
    pub session: SessionConfig,
    /// Seed for reproducible symbol draws (None = OS entropy)
    pub seed: Option<u64>,
}

impl MachineConfig {
    /// Classic three reel cabinet
    pub fn three_reel() -> Self {
        Self::uniform(3, ReelConfig::standard())
    }

    /// `count` identical reels
    pub fn uniform(count: usize, reel: ReelConfig) -> Self {
        Self {
            reels: vec![reel; count],
            session: SessionConfig::default(),
            seed: None,
        }
    }

    /// Builder: fix the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reel count, never less than one
    pub fn reels_count(&self) -> usize {
        self.reels.len().max(1)
    }

    pub fn validate(&self) -> RbResult<()> {
        for (index, reel) in self.reels.iter().enumerate() {
            reel.validate()
                .map_err(|e| RbError::InvalidConfig(format!("reel {index}: {e}")))?;
        }
        self.session.validate()
    }

    /// Parse from a YAML document
    pub fn from_yaml_str(text: &str) -> RbResult<Self> {
        let config: Self = serde_yml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from a JSON document
    pub fn from_json_str(text: &str) -> RbResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from file, format picked by extension (`yaml`, `yml`, `json`)
    pub fn load(path: impl AsRef<Path>) -> RbResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        log::debug!("Loading machine config from {}", path.display());

        match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&text),
            "json" => Self::from_json_str(&text),
            other => Err(RbError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> RbResult<String> {
        Ok(serde_yml::to_string(self)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> RbResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
