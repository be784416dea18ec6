// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for pharmacy counter staff.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how the scanner overlay presents it.

use crate::error::{DeviceError, ScanError};

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Trying the same thing again will likely work.
    Transient,
    /// User must do something (grant permission, move corners, pick a file).
    ActionRequired,
    /// Cannot be fixed here; use another path.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone, PartialEq)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether retrying the same action makes sense.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
    /// Whether to show a "Choose from gallery" button next to the message.
    pub offer_gallery: bool,
}

/// Convert a `ScanError` into a `HumanError` for the scanner overlay.
pub fn humanize_error(err: &ScanError) -> HumanError {
    match err {
        ScanError::Device(device) => humanize_device_error(device),

        ScanError::CameraNotReady => HumanError {
            message: "The camera isn't ready yet.".into(),
            suggestion: "Wait for the preview to appear, then take the photo.".into(),
            retriable: true,
            severity: Severity::Transient,
            offer_gallery: false,
        },

        ScanError::Decode(_) => HumanError {
            message: "That file couldn't be opened as a picture.".into(),
            suggestion: "Choose a different photo of the invoice (JPEG or PNG).".into(),
            retriable: true,
            severity: Severity::ActionRequired,
            offer_gallery: true,
        },

        ScanError::InvalidCorner(_) | ScanError::Processing(_) => HumanError {
            message: "We couldn't straighten the invoice.".into(),
            suggestion: "Drag the four corners onto the edges of the page, then try again.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
            offer_gallery: false,
        },

        ScanError::Busy => HumanError {
            message: "Still working on the last scan.".into(),
            suggestion: "Please wait a moment.".into(),
            retriable: true,
            severity: Severity::Transient,
            offer_gallery: false,
        },

        ScanError::Encode(detail) => HumanError {
            message: "The scan couldn't be saved.".into(),
            suggestion: format!(
                "Tap Confirm again. If it keeps failing, retake the photo. ({detail})"
            ),
            retriable: true,
            severity: Severity::Transient,
            offer_gallery: false,
        },

        ScanError::InvalidTransition { .. } => HumanError {
            message: "That step isn't available right now.".into(),
            suggestion: "Close the scanner and start again.".into(),
            retriable: false,
            severity: Severity::Permanent,
            offer_gallery: false,
        },

        ScanError::Store { .. } => HumanError {
            message: "The scan couldn't be written to disk.".into(),
            suggestion: "It hasn't been lost. Free up some space or check the scans folder, then tap Save Again.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
            offer_gallery: false,
        },

        ScanError::Io(_) => HumanError {
            message: "A file couldn't be read or written.".into(),
            suggestion: "Check the file is still there and the disk isn't full, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
            offer_gallery: false,
        },

        ScanError::Serialization(_) => HumanError {
            message: "Scanner settings couldn't be saved.".into(),
            suggestion: "Default settings will be used for now.".into(),
            retriable: false,
            severity: Severity::Permanent,
            offer_gallery: false,
        },
    }
}

fn humanize_device_error(err: &DeviceError) -> HumanError {
    let offer_gallery = err.allows_gallery_fallback();
    match err {
        DeviceError::PermissionDenied => HumanError {
            message: "Camera access was blocked.".into(),
            suggestion: "Allow camera access in your browser settings, or choose a photo from the gallery.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
            offer_gallery,
        },
        DeviceError::NotFound => HumanError {
            message: "No camera was found.".into(),
            suggestion: "Connect a camera, or choose a photo from the gallery.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
            offer_gallery,
        },
        DeviceError::Unsupported => HumanError {
            message: "This device doesn't support the camera scanner.".into(),
            suggestion: "You can still choose a photo of the invoice from the gallery.".into(),
            retriable: false,
            severity: Severity::Permanent,
            offer_gallery,
        },
        DeviceError::Failed(detail) => HumanError {
            message: "The camera couldn't be started.".into(),
            suggestion: format!(
                "Close other apps using the camera and try again, or choose a photo from the gallery. ({detail})"
            ),
            retriable: true,
            severity: Severity::Transient,
            offer_gallery,
        },
    }
}
