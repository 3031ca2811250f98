// SPDX-License-Identifier: GPL-3.0-or-later
// src/config.rs
//
// Session and application configuration with TOML file support.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::constant::{
    DEFAULT_FRAME_INTERVAL_MS, DEFAULT_MIN_SIZE, DEFAULT_QUALITY, DEFAULT_TOUCH_TOLERANCE,
    LAYOUT_HEIGHT_FRACTION, LAYOUT_MAX_HEIGHT, LAYOUT_MAX_WIDTH, LAYOUT_WIDTH_FRACTION,
};

/// Per-session settings, fixed from session start to end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Minimum crop box edge in display pixels.
    pub min_size: f32,
    /// Locked width / height ratio, 0 for a free box.
    pub aspect_ratio: f32,
    /// Output encoding quality (0.0 - 1.0).
    pub quality: f32,
    /// Use the whole viewport for the preview.
    pub fullscreen: bool,
    /// Minimum time between two published geometry frames.
    pub frame_interval_ms: u64,
    /// Radius of the touch hot-zone around each corner.
    pub touch_tolerance: f32,
    /// Draw the rule-of-thirds grid inside the box.
    pub show_grid: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            aspect_ratio: 0.0,
            quality: DEFAULT_QUALITY,
            fullscreen: false,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            touch_tolerance: DEFAULT_TOUCH_TOLERANCE,
            show_grid: true,
        }
    }
}

impl SessionConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.min_size.is_finite() && self.min_size > 0.0) {
            return Err(format!("min_size must be positive, got {}", self.min_size));
        }
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio >= 0.0) {
            return Err(format!(
                "aspect_ratio must be 0 (free) or positive, got {}",
                self.aspect_ratio
            ));
        }
        if !(0.0..=1.0).contains(&self.quality) {
            return Err(format!("quality must be within 0..=1, got {}", self.quality));
        }
        if !(self.touch_tolerance.is_finite() && self.touch_tolerance >= 0.0) {
            return Err(format!(
                "touch_tolerance must not be negative, got {}",
                self.touch_tolerance
            ));
        }
        Ok(())
    }
}

/// How much of the viewport the preview canvas may occupy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub width_fraction: f32,
    pub max_width: f32,
    pub height_fraction: f32,
    pub max_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width_fraction: LAYOUT_WIDTH_FRACTION,
            max_width: LAYOUT_MAX_WIDTH,
            height_fraction: LAYOUT_HEIGHT_FRACTION,
            max_height: LAYOUT_MAX_HEIGHT,
        }
    }
}

/// Global configuration for the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub session: SessionConfig,
    pub layout: LayoutConfig,
    /// Directory for cropped artifacts.
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            layout: LayoutConfig::default(),
            output_dir: dirs::picture_dir().unwrap_or_else(std::env::temp_dir),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}
