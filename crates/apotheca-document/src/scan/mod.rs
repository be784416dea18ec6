// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline — quadrilateral rectification, tone enhancement, export.

pub mod enhance;
pub mod export;
pub mod rectify;

pub use enhance::ScanEnhancer;
pub use export::ExportedScan;
pub use rectify::PerspectiveRectifier;
