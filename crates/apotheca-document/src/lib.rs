// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// apotheca-document — Pixel work for the invoice scanner.
//
// Provides owned frame types (decode, display encoding), the perspective
// rectifier that straightens the user's quadrilateral, the per-pixel
// enhancement filter, and JPEG export of the final scan.

pub mod image;
pub mod scan;

// Re-export the primary structs so callers can use `apotheca_document::CapturedFrame` etc.
pub use image::frame::{CapturedFrame, RectifiedFrame};
pub use scan::enhance::ScanEnhancer;
pub use scan::export::ExportedScan;
pub use scan::rectify::PerspectiveRectifier;
