// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan pipeline controller — sequences camera → crop → preview for one scan
// session and hands the exported image to the caller.
//
//   camera --capture/pick--> crop --process--> preview --confirm--> closed
//             ^               |  ^               |
//             +----retake-----+  +----adjust-----+
//
// `close` is valid from every state and is a hard cancel.

use std::sync::Arc;

use apotheca_bridge::traits::PlatformBridge;
use apotheca_core::ScannerConfig;
use apotheca_core::error::{DeviceError, Result, ScanError};
use apotheca_core::types::{CornerSet, EnhancementMode, ScanIntent, ScanSessionId, ScanState};
use apotheca_document::{
    CapturedFrame, ExportedScan, PerspectiveRectifier, RectifiedFrame, ScanEnhancer,
};
use tracing::{error, info, instrument, warn};

use crate::capture::{
    AcquisitionOutcome, AcquisitionResult, CameraState, CaptureSourceManager, PendingAcquisition,
};
use crate::editor::{CornerEditor, DisplayRect, InputKind};

/// Result of [`ScanController::open`].
pub enum OpenOutcome {
    /// Camera requested; resolve the handle and pass it to
    /// [`ScanController::finish_camera`].
    Acquiring(PendingAcquisition),
    /// Scanner is open in the camera state but the camera cannot be used.
    CameraUnavailable(DeviceError),
    /// Gallery intent: an image was picked and the scanner is in `crop`.
    Picked,
    /// Gallery intent: the picker was dismissed and the scanner stayed closed.
    Cancelled,
}

/// Result of picking from the gallery while the scanner is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    Picked,
    Cancelled,
}

/// The scanner state machine and the session it owns.
pub struct ScanController {
    config: ScannerConfig,
    capture: CaptureSourceManager,
    rectifier: PerspectiveRectifier,
    state: ScanState,
    session_id: Option<ScanSessionId>,
    frame: Option<CapturedFrame>,
    editor: CornerEditor,
    mode: EnhancementMode,
    rectified: Option<RectifiedFrame>,
    processing: bool,
}

impl ScanController {
    pub fn new(bridge: Arc<dyn PlatformBridge>, config: ScannerConfig) -> Self {
        Self {
            capture: CaptureSourceManager::new(bridge, &config),
            rectifier: PerspectiveRectifier::new(config.rectify_method),
            state: ScanState::Closed,
            session_id: None,
            frame: None,
            editor: CornerEditor::new(),
            mode: config.default_mode,
            rectified: None,
            processing: false,
            config,
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn session_id(&self) -> Option<ScanSessionId> {
        self.session_id
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn camera_state(&self) -> &CameraState {
        self.capture.camera_state()
    }

    pub fn capture_source(&self) -> &CaptureSourceManager {
        &self.capture
    }

    pub fn captured_frame(&self) -> Option<&CapturedFrame> {
        self.frame.as_ref()
    }

    pub fn rectified_frame(&self) -> Option<&RectifiedFrame> {
        self.rectified.as_ref()
    }

    pub fn corners(&self) -> &CornerSet {
        self.editor.corners()
    }

    pub fn active_corner(&self) -> Option<usize> {
        self.editor.active()
    }

    pub fn mode(&self) -> EnhancementMode {
        self.mode
    }

    /// True while a rectify/enhance pass is running.
    pub fn is_processing(&self) -> bool {
        self.processing
    }

    // -- Opening --------------------------------------------------------------

    /// Open the scanner.
    ///
    /// A camera intent enters the camera state and starts acquisition. A
    /// gallery intent skips the live preview: the picker opens immediately
    /// and the scanner either lands in crop or stays closed.
    #[instrument(skip(self))]
    pub fn open(&mut self, intent: ScanIntent) -> Result<OpenOutcome> {
        self.require(&[ScanState::Closed], "open")?;
        let id = ScanSessionId::new();
        info!(session = %id, "Scanner opened");

        match intent {
            ScanIntent::Camera => {
                self.session_id = Some(id);
                self.state = ScanState::Camera;
                Ok(match self.capture.start_camera() {
                    Ok(pending) => OpenOutcome::Acquiring(pending),
                    Err(err) => OpenOutcome::CameraUnavailable(err),
                })
            }
            ScanIntent::Gallery => match self.capture.pick_from_gallery()? {
                Some(frame) => {
                    self.session_id = Some(id);
                    self.install_frame(frame);
                    Ok(OpenOutcome::Picked)
                }
                None => {
                    info!(session = %id, "Picker dismissed; scanner stays closed");
                    Ok(OpenOutcome::Cancelled)
                }
            },
        }
    }

    // -- Camera state -------------------------------------------------------

    /// (Re)start the camera, e.g. after a retake or to retry a failure.
    pub fn start_camera(&mut self) -> Result<PendingAcquisition> {
        self.require(&[ScanState::Camera], "start the camera")?;
        Ok(self.capture.start_camera()?)
    }

    /// Attach a resolved acquisition. Late grants for a session that has
    /// moved on are released here.
    pub fn finish_camera(&mut self, outcome: AcquisitionOutcome) -> AcquisitionResult {
        self.capture.finish_camera(outcome)
    }

    pub fn stop_camera(&mut self) {
        self.capture.stop_camera();
    }

    /// Take the photo. Camera state → crop.
    #[instrument(skip(self), fields(session = ?self.session_id))]
    pub fn capture(&mut self) -> Result<()> {
        self.require(&[ScanState::Camera], "capture")?;
        let frame = self.capture.capture_frame()?;
        self.install_frame(frame);
        Ok(())
    }

    /// Gallery fallback from the camera state. A dismissed picker or an
    /// unreadable file leaves the scanner (and the camera) as they were.
    #[instrument(skip(self), fields(session = ?self.session_id))]
    pub fn pick_from_gallery(&mut self) -> Result<PickOutcome> {
        self.require(&[ScanState::Camera], "pick from the gallery")?;
        match self.capture.pick_from_gallery()? {
            Some(frame) => {
                self.install_frame(frame);
                Ok(PickOutcome::Picked)
            }
            None => Ok(PickOutcome::Cancelled),
        }
    }

    fn install_frame(&mut self, frame: CapturedFrame) {
        info!(
            session = ?self.session_id,
            width = frame.width(),
            height = frame.height(),
            source = ?frame.source(),
            "Frame ready for cropping"
        );
        self.frame = Some(frame);
        self.editor.reset();
        self.mode = self.config.default_mode;
        self.rectified = None;
        self.state = ScanState::Crop;
    }

    // -- Crop state -----------------------------------------------------------

    pub fn begin_drag(&mut self, index: usize) -> Result<()> {
        self.require(&[ScanState::Crop], "drag a corner")?;
        self.editor.begin_drag(index)
    }

    /// Forward a move to the corner editor. Returns `Ok(false)` when the
    /// editor ignored it.
    pub fn move_drag(
        &mut self,
        index: usize,
        client_x: f64,
        client_y: f64,
        display: DisplayRect,
        input: InputKind,
    ) -> Result<bool> {
        self.require(&[ScanState::Crop], "drag a corner")?;
        Ok(self
            .editor
            .move_drag(index, client_x, client_y, display, input)
            .is_some())
    }

    pub fn end_drag(&mut self) {
        self.editor.end_drag();
    }

    pub fn set_mode(&mut self, mode: EnhancementMode) -> Result<()> {
        self.require(&[ScanState::Crop], "change the enhancement mode")?;
        info!(?mode, "Enhancement mode selected");
        self.mode = mode;
        Ok(())
    }

    /// Throw the photo away and go back to the camera.
    ///
    /// Any camera request still in flight is cancelled; the caller starts a
    /// fresh one with [`ScanController::start_camera`].
    #[instrument(skip(self), fields(session = ?self.session_id))]
    pub fn retake(&mut self) -> Result<()> {
        self.require(&[ScanState::Crop], "retake")?;
        self.capture.stop_camera();
        self.frame = None;
        self.rectified = None;
        self.editor.reset();
        self.mode = self.config.default_mode;
        self.state = ScanState::Camera;
        info!("Retake requested");
        Ok(())
    }

    /// Rectify the quadrilateral and apply the selected enhancement.
    ///
    /// On failure the scanner stays in crop so the corners can be adjusted.
    #[instrument(skip(self), fields(session = ?self.session_id, mode = ?self.mode))]
    pub fn process(&mut self) -> Result<()> {
        self.require(&[ScanState::Crop], "process")?;
        if self.processing {
            return Err(ScanError::Busy);
        }

        self.processing = true;
        let result = self.run_pipeline();
        self.processing = false;

        match result {
            Ok(rectified) => {
                info!(
                    width = rectified.width(),
                    height = rectified.height(),
                    "Scan processed"
                );
                self.rectified = Some(rectified);
                self.state = ScanState::Preview;
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "Scan processing failed; staying in crop");
                Err(err)
            }
        }
    }

    fn run_pipeline(&self) -> Result<RectifiedFrame> {
        let frame = self
            .frame
            .as_ref()
            .ok_or_else(|| ScanError::Processing("no captured frame".into()))?;
        let straightened = self.rectifier.rectify(frame.image(), self.editor.corners())?;
        Ok(ScanEnhancer::new(straightened).finish(self.mode))
    }

    // -- Preview state --------------------------------------------------------

    /// Back to crop with the same photo and corners.
    pub fn adjust(&mut self) -> Result<()> {
        self.require(&[ScanState::Preview], "adjust")?;
        self.rectified = None;
        self.state = ScanState::Crop;
        Ok(())
    }

    /// Encode the result and end the session.
    ///
    /// If encoding fails the scanner stays in preview and nothing is emitted.
    #[instrument(skip(self), fields(session = ?self.session_id))]
    pub fn confirm(&mut self) -> Result<ExportedScan> {
        self.require(&[ScanState::Preview], "confirm")?;
        let (Some(rectified), Some(frame)) = (self.rectified.as_ref(), self.frame.as_ref()) else {
            return Err(ScanError::Processing("no processed scan to export".into()));
        };

        let export = ExportedScan::encode(
            rectified,
            frame.captured_at(),
            &self.config.filename_prefix,
            self.config.export_quality(),
        )?;

        self.reset_session();
        Ok(export)
    }

    // -- Closing --------------------------------------------------------------

    /// Hard cancel from any state: camera stopped, frames dropped, nothing
    /// emitted. Idempotent.
    #[instrument(skip(self), fields(session = ?self.session_id, state = %self.state))]
    pub fn close(&mut self) {
        if self.state != ScanState::Closed {
            info!("Scanner closed");
        }
        self.reset_session();
    }

    fn reset_session(&mut self) {
        self.capture.stop_camera();
        self.frame = None;
        self.rectified = None;
        self.editor.reset();
        self.mode = self.config.default_mode;
        self.session_id = None;
        self.processing = false;
        self.state = ScanState::Closed;
    }

    fn require(&self, allowed: &[ScanState], action: &'static str) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            warn!(state = %self.state, action, "Rejected transition");
            Err(ScanError::InvalidTransition {
                from: self.state,
                action,
            })
        }
    }
}
