// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan enhancement — global per-pixel tone transforms applied to a rectified
// invoice before export: plain grayscale, contrast-boosted grayscale tuned
// for printed pages, and a hard black/white threshold.

use apotheca_core::types::EnhancementMode;
use image::{Rgba, RgbaImage};
use tracing::{debug, instrument};

use crate::image::frame::RectifiedFrame;

/// Gain applied around the pivot in `auto` mode.
const AUTO_CONTRAST_GAIN: f64 = 1.3;
/// Luminance the `auto` contrast stretch pivots around.
const AUTO_PIVOT: f64 = 128.0;
/// Where the pivot lands after `auto`; slightly brighter than mid-grey so
/// paper reads as white.
const AUTO_TARGET: f64 = 140.0;
/// Luminance above which a pixel becomes white in `bw` mode.
const BW_THRESHOLD: f64 = 140.0;

/// Rec. 601 luma of an RGB triple.
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
}

/// Applies an [`EnhancementMode`] to a rectified scan.
///
/// Like the other pipeline stages, methods consume `self` and return the
/// transformed enhancer so calls chain. Alpha is never touched.
pub struct ScanEnhancer {
    /// The working image.
    image: RgbaImage,
}

impl ScanEnhancer {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Consume the enhancer and return the underlying image.
    pub fn into_rgba(self) -> RgbaImage {
        self.image
    }

    /// Apply `mode` and wrap the result as a [`RectifiedFrame`].
    pub fn finish(self, mode: EnhancementMode) -> RectifiedFrame {
        RectifiedFrame::new(self.apply(mode).into_rgba(), mode)
    }

    /// Apply the tone transform selected by `mode` in a single pass.
    ///
    /// `Color` leaves the image untouched without visiting any pixel.
    #[instrument(skip(self), fields(width = self.image.width(), height = self.image.height()))]
    pub fn apply(self, mode: EnhancementMode) -> Self {
        match mode {
            EnhancementMode::Color => {
                debug!("Color mode selected; no filter applied");
                self
            }
            EnhancementMode::Grayscale => self.map_luma(|gray| gray),
            EnhancementMode::Auto => self.map_luma(|gray| {
                ((gray - AUTO_PIVOT) * AUTO_CONTRAST_GAIN + AUTO_TARGET).clamp(0.0, 255.0)
            }),
            EnhancementMode::Bw => {
                self.map_luma(|gray| if gray > BW_THRESHOLD { 255.0 } else { 0.0 })
            }
        }
    }

    /// Replace every pixel's RGB with `f(luminance)`, rounded and clamped.
    fn map_luma(mut self, f: impl Fn(f64) -> f64) -> Self {
        for pixel in self.image.pixels_mut() {
            let Rgba([r, g, b, a]) = *pixel;
            let value = f(luminance(r, g, b)).round().clamp(0.0, 255.0) as u8;
            *pixel = Rgba([value, value, value, a]);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A deterministic colourful test image with varying alpha.
    fn sample_image() -> RgbaImage {
        RgbaImage::from_fn(37, 23, |x, y| {
            Rgba([
                (x * 7 + y * 3) as u8,
                (x * 11 ^ y * 5) as u8,
                (255 - x * 4 - y) as u8,
                (200 + x % 50) as u8,
            ])
        })
    }

    fn apply(image: &RgbaImage, mode: EnhancementMode) -> RgbaImage {
        ScanEnhancer::new(image.clone()).apply(mode).into_rgba()
    }

    #[test]
    fn color_mode_is_identity() {
        let img = sample_image();
        assert_eq!(apply(&img, EnhancementMode::Color), img);
    }

    #[test]
    fn grayscale_uses_rec601_weights() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([100, 150, 200, 77]));
        let out = apply(&img, EnhancementMode::Grayscale);
        // 0.299*100 + 0.587*150 + 0.114*200 = 140.75
        assert_eq!(out.get_pixel(0, 0).0, [141, 141, 141, 77]);
    }

    #[test]
    fn auto_boosts_contrast_and_clamps() {
        let img = RgbaImage::from_fn(3, 1, |x, _| match x {
            0 => Rgba([128, 128, 128, 255]),
            1 => Rgba([0, 0, 0, 255]),
            _ => Rgba([255, 255, 255, 255]),
        });
        let out = apply(&img, EnhancementMode::Auto);
        assert_eq!(out.get_pixel(0, 0).0, [140, 140, 140, 255]);
        // (0 - 128) * 1.3 + 140 = -26.4 → 0
        assert_eq!(out.get_pixel(1, 0).0, [0, 0, 0, 255]);
        // (255 - 128) * 1.3 + 140 = 305.1 → 255
        assert_eq!(out.get_pixel(2, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn bw_threshold_is_strictly_greater_than_140() {
        let img = RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 { Rgba([140, 140, 140, 9]) } else { Rgba([141, 141, 141, 9]) }
        });
        let out = apply(&img, EnhancementMode::Bw);
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0, 9]);
        assert_eq!(out.get_pixel(1, 0).0, [255, 255, 255, 9]);
    }

    #[test]
    fn bw_output_is_binary_and_idempotent() {
        let once = apply(&sample_image(), EnhancementMode::Bw);
        assert!(once.pixels().all(|p| {
            let [r, g, b, _] = p.0;
            (r, g, b) == (0, 0, 0) || (r, g, b) == (255, 255, 255)
        }));
        let twice = apply(&once, EnhancementMode::Bw);
        assert_eq!(once, twice);
    }

    #[test]
    fn every_mode_is_deterministic_and_keeps_alpha() {
        let img = sample_image();
        for mode in EnhancementMode::ALL {
            let a = apply(&img, mode);
            let b = apply(&img, mode);
            assert_eq!(a.as_raw(), b.as_raw(), "{mode:?} not deterministic");
            for (src, dst) in img.pixels().zip(a.pixels()) {
                assert_eq!(src.0[3], dst.0[3], "{mode:?} changed alpha");
            }
        }
    }

    #[test]
    fn finish_tags_the_frame_with_its_mode() {
        let frame = ScanEnhancer::new(sample_image()).finish(EnhancementMode::Grayscale);
        assert_eq!(frame.mode(), EnhancementMode::Grayscale);
        assert_eq!((frame.width(), frame.height()), (37, 23));
    }
}
