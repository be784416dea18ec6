// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Apotheca — platform capability bridges.
//!
//! Defines the traits the scanner uses to reach a camera and a file picker,
//! independent of whatever host (browser shell, desktop, mobile webview)
//! provides them.

pub mod desktop;
pub mod traits;

use std::sync::Arc;

/// Returns the bridge implementation for the running host.
///
/// Desktop builds get a file-dialog picker and report the camera as
/// unsupported; the scanner then stays usable through the gallery path.
pub fn platform_bridge() -> Arc<dyn traits::PlatformBridge> {
    Arc::new(desktop::DesktopBridge)
}
