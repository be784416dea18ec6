// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture source manager — obtains one still image from the live camera or
// the gallery picker and releases the camera deterministically.
//
// Camera acquisition is asynchronous and may resolve long after the user has
// moved on. Every request carries a ticket (generation + cancellation flag);
// a stream arriving for a cancelled or superseded ticket is stopped on the
// spot and never attached as the preview.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use apotheca_bridge::traits::{
    CameraConstraints, IMAGE_MIME_TYPES, MediaStream, PlatformBridge, TrackState,
};
use apotheca_core::ScannerConfig;
use apotheca_core::error::{DeviceError, Result, ScanError};
use apotheca_core::types::FrameSource;
use apotheca_document::CapturedFrame;
use image::RgbaImage;
use tracing::{debug, info, instrument, warn};

/// Where the live camera currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraState {
    /// No stream and no request outstanding.
    Idle,
    /// Waiting for the permission prompt / device negotiation.
    Starting,
    /// Stream attached and playing at the given native resolution.
    Ready { width: u32, height: u32 },
    /// Acquisition failed; the gallery remains available.
    Failed(DeviceError),
}

/// An in-flight camera request.
///
/// Await [`PendingAcquisition::resolve`] without holding the manager, then
/// hand the outcome back through [`CaptureSourceManager::finish_camera`].
pub struct PendingAcquisition {
    generation: u64,
    cancelled: Arc<AtomicBool>,
    bridge: Arc<dyn PlatformBridge>,
    constraints: CameraConstraints,
}

impl PendingAcquisition {
    /// Whether the scanner has moved on since this request was issued.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Run the platform request to completion.
    pub async fn resolve(self) -> AcquisitionOutcome {
        let result = self.bridge.open_stream(self.constraints).await;
        AcquisitionOutcome {
            generation: self.generation,
            cancelled: self.cancelled,
            result,
        }
    }
}

/// A resolved camera request, not yet attached.
pub struct AcquisitionOutcome {
    generation: u64,
    cancelled: Arc<AtomicBool>,
    result: std::result::Result<Box<dyn MediaStream>, DeviceError>,
}

/// What [`CaptureSourceManager::finish_camera`] did with an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionResult {
    /// The stream is now the live preview.
    Attached,
    /// The request was stale; any stream it produced has been stopped.
    Discarded,
    /// The platform refused or failed.
    Failed(DeviceError),
}

/// Owns the camera stream (if any) and the gallery picker.
pub struct CaptureSourceManager {
    bridge: Arc<dyn PlatformBridge>,
    constraints: CameraConstraints,
    display_quality: u8,
    state: CameraState,
    preview: Option<Box<dyn MediaStream>>,
    generation: u64,
    in_flight: Option<Arc<AtomicBool>>,
}

impl CaptureSourceManager {
    pub fn new(bridge: Arc<dyn PlatformBridge>, config: &ScannerConfig) -> Self {
        Self {
            bridge,
            constraints: CameraConstraints {
                facing: config.facing,
                ideal_width: config.preferred_width,
                ideal_height: config.preferred_height,
            },
            display_quality: config.display_quality(),
            state: CameraState::Idle,
            preview: None,
            generation: 0,
            in_flight: None,
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn camera_state(&self) -> &CameraState {
        &self.state
    }

    pub fn camera_supported(&self) -> bool {
        self.bridge.camera_supported()
    }

    /// Identifier of the attached preview stream, if any.
    pub fn preview_stream_id(&self) -> Option<&str> {
        self.preview.as_deref().map(|s| s.id())
    }

    /// Track states of the attached preview (empty when nothing is attached).
    pub fn preview_track_states(&self) -> Vec<TrackState> {
        self.preview
            .as_deref()
            .map(|s| s.track_states())
            .unwrap_or_default()
    }

    // -- Camera ---------------------------------------------------------------

    /// Begin acquiring the camera.
    ///
    /// Any previous stream or outstanding request is torn down first. Fails
    /// immediately with [`DeviceError::Unsupported`] when the host has no
    /// camera API.
    #[instrument(skip(self), fields(generation = self.generation + 1))]
    pub fn start_camera(&mut self) -> std::result::Result<PendingAcquisition, DeviceError> {
        self.stop_camera();

        if !self.bridge.camera_supported() {
            warn!("Camera API unsupported on this host");
            self.state = CameraState::Failed(DeviceError::Unsupported);
            return Err(DeviceError::Unsupported);
        }

        self.generation += 1;
        let cancelled = Arc::new(AtomicBool::new(false));
        self.in_flight = Some(Arc::clone(&cancelled));
        self.state = CameraState::Starting;
        info!(
            width = self.constraints.ideal_width,
            height = self.constraints.ideal_height,
            facing = ?self.constraints.facing,
            "Camera requested"
        );

        Ok(PendingAcquisition {
            generation: self.generation,
            cancelled,
            bridge: Arc::clone(&self.bridge),
            constraints: self.constraints,
        })
    }

    /// Attach a resolved acquisition, or release it if it is stale.
    #[instrument(skip_all, fields(generation = outcome.generation))]
    pub fn finish_camera(&mut self, outcome: AcquisitionOutcome) -> AcquisitionResult {
        let stale = outcome.cancelled.load(Ordering::SeqCst) || outcome.generation != self.generation;
        if stale {
            if let Ok(mut stream) = outcome.result {
                stream.stop();
                info!(stream = stream.id(), "Late camera grant released");
            }
            return AcquisitionResult::Discarded;
        }

        self.in_flight = None;
        match outcome.result {
            Ok(stream) => {
                let (width, height) = stream.resolution();
                info!(stream = stream.id(), width, height, "Camera ready");
                self.preview = Some(stream);
                self.state = CameraState::Ready { width, height };
                AcquisitionResult::Attached
            }
            Err(err) => {
                warn!(error = %err, "Camera acquisition failed");
                self.state = CameraState::Failed(err.clone());
                AcquisitionResult::Failed(err)
            }
        }
    }

    /// Stop the camera. Idempotent; safe before, during and after acquisition.
    ///
    /// Cancels any outstanding request, stops every track of the attached
    /// stream and detaches the preview.
    pub fn stop_camera(&mut self) {
        if let Some(flag) = self.in_flight.take() {
            flag.store(true, Ordering::SeqCst);
            debug!(generation = self.generation, "Outstanding camera request cancelled");
        }
        if let Some(mut stream) = self.preview.take() {
            stream.stop();
            info!(stream = stream.id(), "Camera stopped");
        }
        self.state = CameraState::Idle;
    }

    /// Snapshot the current video frame at native resolution.
    ///
    /// Only valid while the camera is [`CameraState::Ready`]. A successful
    /// capture releases the camera.
    #[instrument(skip(self))]
    pub fn capture_frame(&mut self) -> Result<CapturedFrame> {
        let stream = match (&self.state, self.preview.as_deref_mut()) {
            (CameraState::Ready { .. }, Some(stream)) => stream,
            _ => return Err(ScanError::CameraNotReady),
        };
        // The device can end the tracks on its own (unplugged, revoked).
        if !stream.is_live() {
            warn!(stream = stream.id(), "Camera tracks ended outside the scanner");
            return Err(ScanError::CameraNotReady);
        }

        let video = stream.grab_frame()?;
        let (width, height) = (video.width, video.height);
        let image = RgbaImage::from_raw(width, height, video.rgba).ok_or_else(|| {
            ScanError::Decode(format!("video frame buffer does not match {width}x{height}"))
        })?;
        let frame = CapturedFrame::from_rgba(image, FrameSource::Camera, self.display_quality)?;

        info!(width, height, "Frame captured from camera");
        self.stop_camera();
        Ok(frame)
    }

    // -- Gallery --------------------------------------------------------------

    /// Let the user pick an image file and decode it at natural size.
    ///
    /// Returns `Ok(None)` when the picker is dismissed; nothing changes. A
    /// file that fails to decode is an error and also changes nothing, so the
    /// user can pick again. Only a successful pick tears down the camera.
    #[instrument(skip(self))]
    pub fn pick_from_gallery(&mut self) -> Result<Option<CapturedFrame>> {
        let Some(path) = self.bridge.pick_file(IMAGE_MIME_TYPES)? else {
            debug!("Gallery picker dismissed");
            return Ok(None);
        };

        let data = self.bridge.read_picked_file(&path)?;
        let frame = CapturedFrame::decode(&data, FrameSource::Gallery, self.display_quality)
            .inspect_err(|err| warn!(path = %path, error = %err, "Picked file could not be decoded"))?;

        info!(path = %path, width = frame.width(), height = frame.height(), "Frame picked from gallery");
        self.stop_camera();
        Ok(Some(frame))
    }
}

impl Drop for CaptureSourceManager {
    fn drop(&mut self) {
        self.stop_camera();
    }
}
