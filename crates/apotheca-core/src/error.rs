// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the scanner.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ScanState;

/// Why a camera could not be acquired.
///
/// Every variant is non-fatal to the session. All but `Unsupported` come with
/// a gallery fallback offer in the UI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("no camera device found")]
    NotFound,

    #[error("camera capability unsupported on this platform")]
    Unsupported,

    #[error("camera acquisition failed: {0}")]
    Failed(String),
}

impl DeviceError {
    /// Whether the UI should offer "pick from gallery instead".
    ///
    /// The gallery stays reachable on unsupported hosts anyway, so no explicit
    /// fallback action is shown there.
    pub fn allows_gallery_fallback(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

/// Top-level error type for all scanner operations.
#[derive(Debug, Error)]
pub enum ScanError {
    // -- Capture --
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("camera is not ready for capture")]
    CameraNotReady,

    #[error("failed to decode image: {0}")]
    Decode(String),

    // -- Correction / processing --
    #[error("corner index {0} out of range (expected 0..4)")]
    InvalidCorner(usize),

    #[error("processing failed: {0}")]
    Processing(String),

    #[error("a scan is already being processed")]
    Busy,

    #[error("image encoding failed: {0}")]
    Encode(String),

    // -- Pipeline --
    #[error("cannot {action} while scanner is in the {from} state")]
    InvalidTransition { from: ScanState, action: &'static str },

    // -- Storage / persistence --
    #[error("failed to store scan at {}: {source}", .path.display())]
    Store {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unsupported_skips_gallery_fallback() {
        assert!(DeviceError::PermissionDenied.allows_gallery_fallback());
        assert!(DeviceError::NotFound.allows_gallery_fallback());
        assert!(DeviceError::Failed("x".into()).allows_gallery_fallback());
        assert!(!DeviceError::Unsupported.allows_gallery_fallback());
    }

    #[test]
    fn invalid_transition_message_names_state() {
        let err = ScanError::InvalidTransition {
            from: ScanState::Camera,
            action: "confirm",
        };
        assert_eq!(
            err.to_string(),
            "cannot confirm while scanner is in the camera state"
        );
    }

    #[test]
    fn store_error_names_the_target_path() {
        let err = ScanError::Store {
            path: PathBuf::from("/data/scans/invoice_1.jpg"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().contains("/data/scans/invoice_1.jpg"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
