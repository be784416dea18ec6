// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// apotheca-scanner — The interactive side of the invoice scanner.
//
// The capture source manager owns the camera and gallery paths, the corner
// editor holds the user's quadrilateral, and the controller sequences
// camera → crop → preview and hands the exported scan to its caller.

pub mod capture;
pub mod editor;
pub mod session;

#[cfg(test)]
mod testing;

pub use capture::{AcquisitionOutcome, AcquisitionResult, CameraState, CaptureSourceManager, PendingAcquisition};
pub use editor::{CornerEditor, DisplayRect, InputKind};
pub use session::{OpenOutcome, PickOutcome, ScanController};
