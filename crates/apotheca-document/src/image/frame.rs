// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Owned frame types. A `CapturedFrame` is what the camera or gallery produced;
// a `RectifiedFrame` is the straightened (and possibly enhanced) result.
// Both hold a plain row-major RGBA buffer via `image::RgbaImage`.

use std::io::Cursor;

use apotheca_core::error::{Result, ScanError};
use apotheca_core::types::{EnhancementMode, FrameSource};
use chrono::{DateTime, Utc};
use image::{DynamicImage, ImageDecoder, ImageReader, RgbaImage};
use tracing::{debug, info, instrument};

/// The raw photographed or picked bitmap, before any correction.
///
/// Immutable once built; a retake replaces it wholesale.
#[derive(Clone)]
pub struct CapturedFrame {
    image: RgbaImage,
    /// JPEG copy used for on-screen display behind the corner handles.
    display_jpeg: Vec<u8>,
    source: FrameSource,
    captured_at: DateTime<Utc>,
}

impl std::fmt::Debug for CapturedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedFrame")
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .field("display_bytes", &self.display_jpeg.len())
            .field("source", &self.source)
            .field("captured_at", &self.captured_at)
            .finish()
    }
}

impl CapturedFrame {
    // -- Construction ---------------------------------------------------------

    /// Wrap a snapshot taken from a live video frame (or any decoded bitmap).
    #[instrument(skip(image), fields(width = image.width(), height = image.height()))]
    pub fn from_rgba(image: RgbaImage, source: FrameSource, display_quality: u8) -> Result<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ScanError::Decode("frame has zero width or height".into()));
        }
        let display_jpeg = encode_jpeg(&image, display_quality)?;
        debug!(display_bytes = display_jpeg.len(), "Display copy encoded");
        Ok(Self {
            image,
            display_jpeg,
            source,
            captured_at: Utc::now(),
        })
    }

    /// Decode a picked file (JPEG, PNG, WebP, ...) at its natural size.
    ///
    /// EXIF orientation is applied so the bitmap matches what the user saw in
    /// the picker.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn decode(data: &[u8], source: FrameSource, display_quality: u8) -> Result<Self> {
        let image = decode_oriented(data)?;
        info!(
            width = image.width(),
            height = image.height(),
            "Picked image decoded"
        );
        Self::from_rgba(image.to_rgba8(), source, display_quality)
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn display_jpeg(&self) -> &[u8] {
        &self.display_jpeg
    }

    pub fn source(&self) -> FrameSource {
        self.source
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}

/// The bitmap after perspective correction, tagged with the enhancement that
/// has been applied to it.
#[derive(Clone)]
pub struct RectifiedFrame {
    image: RgbaImage,
    mode: EnhancementMode,
}

impl std::fmt::Debug for RectifiedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RectifiedFrame")
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .field("mode", &self.mode)
            .finish()
    }
}

impl RectifiedFrame {
    pub fn new(image: RgbaImage, mode: EnhancementMode) -> Self {
        Self { image, mode }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn mode(&self) -> EnhancementMode {
        self.mode
    }

    /// JPEG copy for the preview screen.
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>> {
        encode_jpeg(&self.image, quality)
    }
}

// -- Codec helpers ------------------------------------------------------------

fn decode_oriented(data: &[u8]) -> Result<DynamicImage> {
    let decode_err = |err: &dyn std::fmt::Display| ScanError::Decode(err.to_string());

    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|err| decode_err(&err))?;
    let mut decoder = reader.into_decoder().map_err(|err| decode_err(&err))?;
    let orientation = decoder.orientation().map_err(|err| decode_err(&err))?;
    let mut image = DynamicImage::from_decoder(decoder).map_err(|err| decode_err(&err))?;
    image.apply_orientation(orientation);
    Ok(image)
}

/// Encode an RGBA buffer as JPEG, flattening alpha onto white.
///
/// Pixels left transparent by the rectifier (samples outside the source)
/// therefore come out as paper-white rather than black.
pub(crate) fn encode_jpeg(image: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = image::RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let image::Rgba([r, g, b, a]) = *image.get_pixel(x, y);
        let blend = |channel: u8| -> u8 {
            let alpha = a as u32;
            ((channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8
        };
        image::Rgb([blend(r), blend(g), blend(b)])
    });

    let mut buffer = Vec::new();
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)
        .map_err(|err| ScanError::Encode(format!("JPEG encoding failed: {}", err)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 200, 30, 255]));
        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn decode_keeps_natural_size() {
        let frame = CapturedFrame::decode(&png_bytes(64, 48), FrameSource::Gallery, 85).unwrap();
        assert_eq!((frame.width(), frame.height()), (64, 48));
        assert_eq!(frame.source(), FrameSource::Gallery);
        assert!(!frame.display_jpeg().is_empty());
        assert_eq!(frame.image().get_pixel(3, 3).0, [10, 200, 30, 255]);
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = CapturedFrame::decode(b"definitely not an image", FrameSource::Gallery, 85)
            .unwrap_err();
        assert!(matches!(err, ScanError::Decode(_)));
    }

    #[test]
    fn zero_sized_frame_is_rejected() {
        let err = CapturedFrame::from_rgba(RgbaImage::new(0, 10), FrameSource::Camera, 85)
            .unwrap_err();
        assert!(matches!(err, ScanError::Decode(_)));
    }

    #[test]
    fn jpeg_flattens_transparency_to_white() {
        let img = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 0]));
        let bytes = encode_jpeg(&img, 90).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        let image::Rgb([r, g, b]) = *decoded.get_pixel(8, 8);
        assert!(r > 245 && g > 245 && b > 245, "expected white, got {r},{g},{b}");
    }
}
