// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner configuration.

use serde::{Deserialize, Serialize};

use crate::types::{CameraFacing, EnhancementMode, RectifyMethod};

/// Persistent scanner settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Preferred camera resolution width in pixels.
    pub preferred_width: u32,
    /// Preferred camera resolution height in pixels.
    pub preferred_height: u32,
    /// Which camera to ask for.
    pub facing: CameraFacing,
    /// Mode preselected for every new capture.
    pub default_mode: EnhancementMode,
    /// Quadrilateral → rectangle mapping.
    pub rectify_method: RectifyMethod,
    /// JPEG quality of the exported artifact (1-100).
    pub export_quality: u8,
    /// JPEG quality of the on-screen copy of a captured frame (1-100).
    pub display_quality: u8,
    /// Prefix of the exported filename.
    pub filename_prefix: String,
}

impl ScannerConfig {
    /// Export quality clamped into the range the JPEG encoder accepts.
    pub fn export_quality(&self) -> u8 {
        self.export_quality.clamp(1, 100)
    }

    pub fn display_quality(&self) -> u8 {
        self.display_quality.clamp(1, 100)
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            preferred_width: 1920,
            preferred_height: 1080,
            facing: CameraFacing::Environment,
            default_mode: EnhancementMode::Auto,
            rectify_method: RectifyMethod::Bilinear,
            export_quality: 90,
            display_quality: 85,
            filename_prefix: "scan".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let config: ScannerConfig =
            serde_json::from_str(r#"{ "default_mode": "bw", "export_quality": 0 }"#).unwrap();
        assert_eq!(config.default_mode, EnhancementMode::Bw);
        assert_eq!(config.preferred_width, 1920);
        assert_eq!(config.export_quality(), 1);
        assert_eq!(config.rectify_method, RectifyMethod::Bilinear);
    }
}
