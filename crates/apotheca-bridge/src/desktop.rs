// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Desktop bridge: native file dialog for the gallery path, no camera.

use apotheca_core::error::{DeviceError, Result};
use async_trait::async_trait;

use crate::traits::*;

/// Bridge used on desktop hosts.
pub struct DesktopBridge;

impl PlatformBridge for DesktopBridge {
    fn platform_name(&self) -> &str {
        "Desktop"
    }
}

#[async_trait]
impl NativeCamera for DesktopBridge {
    fn camera_supported(&self) -> bool {
        false
    }

    async fn open_stream(
        &self,
        _constraints: CameraConstraints,
    ) -> std::result::Result<Box<dyn MediaStream>, DeviceError> {
        tracing::warn!("NativeCamera::open_stream called on desktop bridge");
        Err(DeviceError::Unsupported)
    }
}

impl NativeFilePicker for DesktopBridge {
    fn pick_file(&self, mime_types: &[&str]) -> Result<Option<String>> {
        let extensions = extensions_for(mime_types);
        let picked = rfd::FileDialog::new()
            .add_filter("Images", &extensions)
            .pick_file();
        Ok(picked.map(|path| path.display().to_string()))
    }

    fn read_picked_file(&self, path: &str) -> Result<Vec<u8>> {
        Ok(std::fs::read(path)?)
    }
}

/// File extensions the dialog should accept for the given MIME types.
fn extensions_for(mime_types: &[&str]) -> Vec<&'static str> {
    let mut extensions = Vec::new();
    for mime in mime_types {
        let exts: &[&'static str] = match *mime {
            "image/jpeg" => &["jpg", "jpeg"],
            "image/png" => &["png"],
            "image/webp" => &["webp"],
            "image/bmp" => &["bmp"],
            "image/tiff" => &["tif", "tiff"],
            _ => &[],
        };
        extensions.extend_from_slice(exts);
    }
    extensions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_mimes_map_to_extensions() {
        let exts = extensions_for(IMAGE_MIME_TYPES);
        for ext in ["jpg", "jpeg", "png", "webp", "tiff"] {
            assert!(exts.contains(&ext), "missing {ext}");
        }
        assert!(extensions_for(&["application/pdf"]).is_empty());
    }

    #[test]
    fn desktop_reports_no_camera() {
        let bridge = DesktopBridge;
        assert!(!bridge.camera_supported());
        assert_eq!(bridge.platform_name(), "Desktop");
    }

    #[test]
    fn reading_missing_file_is_io_error() {
        let err = DesktopBridge
            .read_picked_file("/nonexistent/apotheca/invoice.jpg")
            .unwrap_err();
        assert!(matches!(err, apotheca_core::ScanError::Io(_)));
    }
}
