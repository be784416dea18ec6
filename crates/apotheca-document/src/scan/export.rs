// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export of a confirmed scan as a compressed, uniquely named JPEG artifact.

use apotheca_core::error::Result;
use apotheca_core::types::EnhancementMode;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::{info, instrument};

use crate::image::frame::{RectifiedFrame, encode_jpeg};

/// MIME type of every exported scan.
pub const EXPORT_MIME_TYPE: &str = "image/jpeg";

/// The file-like artifact handed to the invoice-import caller for upload.
#[derive(Clone)]
pub struct ExportedScan {
    /// Generated name embedding the capture timestamp.
    pub filename: String,
    pub mime_type: &'static str,
    /// Encoded JPEG bytes.
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Enhancement that was applied before encoding.
    pub mode: EnhancementMode,
    /// Hex SHA-256 of `bytes`.
    pub sha256: String,
    pub captured_at: DateTime<Utc>,
}

impl std::fmt::Debug for ExportedScan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportedScan")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.bytes.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("mode", &self.mode)
            .field("sha256", &self.sha256)
            .finish()
    }
}

impl ExportedScan {
    /// Encode `frame` as JPEG at `quality` and name it after `captured_at`.
    #[instrument(skip(frame), fields(width = frame.width(), height = frame.height(), mode = ?frame.mode()))]
    pub fn encode(
        frame: &RectifiedFrame,
        captured_at: DateTime<Utc>,
        prefix: &str,
        quality: u8,
    ) -> Result<Self> {
        let bytes = encode_jpeg(frame.image(), quality)?;
        let sha256 = hex::encode(Sha256::digest(&bytes));
        let filename = export_filename(prefix, captured_at);

        info!(
            filename = %filename,
            bytes = bytes.len(),
            sha256 = %sha256,
            "Scan exported"
        );

        Ok(Self {
            filename,
            mime_type: EXPORT_MIME_TYPE,
            bytes,
            width: frame.width(),
            height: frame.height(),
            mode: frame.mode(),
            sha256,
            captured_at,
        })
    }
}

/// Prefix used when the configured one has nothing usable in it.
pub const FALLBACK_PREFIX: &str = "scan";

/// `<prefix>_<YYYYMMDD>_<HHMMSS>_<millis>.jpg`, in UTC.
///
/// The prefix comes from user settings and the name is joined onto a storage
/// directory, so anything outside `[A-Za-z0-9_-]` becomes `_`.
pub fn export_filename(prefix: &str, captured_at: DateTime<Utc>) -> String {
    format!(
        "{}_{}.jpg",
        sanitize_prefix(prefix),
        captured_at.format("%Y%m%d_%H%M%S_%3f")
    )
}

fn sanitize_prefix(prefix: &str) -> String {
    let cleaned: String = prefix
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.chars().any(|c| c.is_ascii_alphanumeric()) {
        cleaned
    } else {
        FALLBACK_PREFIX.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use image::{Rgba, RgbaImage};

    #[test]
    fn filename_embeds_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 3, 9, 14, 5, 7).unwrap()
            + chrono::Duration::milliseconds(42);
        assert_eq!(export_filename("scan", at), "scan_20260309_140507_042.jpg");
    }

    #[test]
    fn prefix_cannot_escape_the_storage_directory() {
        let at = Utc.with_ymd_and_hms(2026, 3, 9, 14, 5, 7).unwrap();

        let parent = export_filename("../x", at);
        assert_eq!(parent, "___x_20260309_140507_000.jpg");

        let nested = export_filename("a/b", at);
        assert_eq!(nested, "a_b_20260309_140507_000.jpg");

        let windows = export_filename("..\\inv:oice", at);
        assert_eq!(windows, "___inv_oice_20260309_140507_000.jpg");

        for name in [parent, nested, windows] {
            assert!(!name.contains('/') && !name.contains('\\'));
            assert!(!name.contains(".."));
            assert_eq!(std::path::Path::new(&name).components().count(), 1);
        }
    }

    #[test]
    fn empty_or_symbol_only_prefix_falls_back() {
        let at = Utc.with_ymd_and_hms(2026, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(export_filename("", at), "scan_20260309_140507_000.jpg");
        assert_eq!(export_filename("..", at), "scan_20260309_140507_000.jpg");
        assert_eq!(export_filename("pharma-01", at), "pharma-01_20260309_140507_000.jpg");
    }

    #[test]
    fn encode_produces_jpeg_with_digest() {
        let frame = RectifiedFrame::new(
            RgbaImage::from_pixel(40, 30, Rgba([255, 255, 255, 255])),
            EnhancementMode::Bw,
        );
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let export = ExportedScan::encode(&frame, at, "invoice", 90).unwrap();

        assert_eq!(export.mime_type, "image/jpeg");
        assert_eq!(&export.bytes[..2], &[0xFF, 0xD8]);
        assert_eq!((export.width, export.height), (40, 30));
        assert_eq!(export.mode, EnhancementMode::Bw);
        assert_eq!(export.sha256.len(), 64);
        assert_eq!(export.sha256, hex::encode(Sha256::digest(&export.bytes)));
        assert!(export.filename.starts_with("invoice_20260101_000000"));

        let decoded = image::load_from_memory(&export.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 30));
    }
}
