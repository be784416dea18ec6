// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the capabilities the scanner needs.

use apotheca_core::error::{DeviceError, Result};
use apotheca_core::types::CameraFacing;
use async_trait::async_trait;

/// Image MIME types offered by the gallery picker.
pub const IMAGE_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/bmp",
    "image/tiff",
];

/// Unified bridge that groups all native capabilities the scanner uses.
pub trait PlatformBridge: NativeCamera + NativeFilePicker + Send + Sync {
    /// Human-readable platform name (e.g. "Desktop", "Android 14 WebView").
    fn platform_name(&self) -> &str;
}

/// What the scanner asks of a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraConstraints {
    pub facing: CameraFacing,
    /// Preferred ("ideal") width; the device may deliver something else.
    pub ideal_width: u32,
    pub ideal_height: u32,
}

/// Acquire live video streams from a camera.
#[async_trait]
pub trait NativeCamera: Send + Sync {
    /// Whether the host exposes any camera API at all.
    fn camera_supported(&self) -> bool;

    /// Request a stream. Resolves after the permission prompt and device
    /// negotiation, which may take arbitrarily long.
    async fn open_stream(
        &self,
        constraints: CameraConstraints,
    ) -> std::result::Result<Box<dyn MediaStream>, DeviceError>;
}

/// Lifecycle of one media track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    /// Producing frames; holds the device.
    Live,
    /// Stopped; the device handle is released.
    Ended,
}

/// One decoded video frame as tightly packed row-major RGBA bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// A granted camera stream.
///
/// Implementations must make [`MediaStream::stop`] idempotent: after the
/// first call every track reports [`TrackState::Ended`].
pub trait MediaStream: Send {
    /// Opaque stream identifier, for logs.
    fn id(&self) -> &str;

    /// Native resolution of the video track once metadata has loaded.
    fn resolution(&self) -> (u32, u32);

    /// Snapshot the current frame at native resolution.
    fn grab_frame(&mut self) -> Result<VideoFrame>;

    /// Current state of every track in the stream.
    fn track_states(&self) -> Vec<TrackState>;

    /// Stop every track and release the device.
    fn stop(&mut self);

    /// Whether any track is still live.
    fn is_live(&self) -> bool {
        self.track_states().contains(&TrackState::Live)
    }
}

/// Pick files from the device storage.
pub trait NativeFilePicker {
    /// Show a file picker filtered to the given MIME types.
    /// Returns the file path chosen, or None if cancelled.
    fn pick_file(&self, mime_types: &[&str]) -> Result<Option<String>>;

    /// Read the bytes of a previously picked file.
    fn read_picked_file(&self, path: &str) -> Result<Vec<u8>>;
}
