// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification — straightens the user-traced quadrilateral into
// an upright rectangle whose size follows the quadrilateral's edge lengths.

use apotheca_core::error::{Result, ScanError};
use apotheca_core::types::{CornerSet, RectifyMethod};
use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use tracing::{debug, info, instrument, warn};

/// Quadrilaterals smaller than this (in source pixels²) cannot be rectified.
const MIN_QUAD_AREA: f64 = 1.0;

/// Value of destination pixels whose source sample falls outside the frame.
const UNSET_PIXEL: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Maps a quadrilateral region of a frame onto a new rectangular bitmap.
///
/// The default [`RectifyMethod::Bilinear`] mapping interpolates along the top
/// and bottom edges and then between them. It is not a homography: straight
/// lines inside a strongly skewed quad may come out slightly curved. For
/// photos of a page lying roughly flat that is indistinguishable from a true
/// projective warp, which remains available as [`RectifyMethod::Projective`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PerspectiveRectifier {
    method: RectifyMethod,
}

impl PerspectiveRectifier {
    pub fn new(method: RectifyMethod) -> Self {
        Self { method }
    }

    /// Rectify the region of `frame` bounded by `corners`.
    ///
    /// Corners are normalized to the frame and are scaled to its native
    /// resolution first. Fails only for a degenerate (zero-area) quadrilateral
    /// or when the projective solve has no solution.
    #[instrument(skip_all, fields(method = ?self.method, width = frame.width(), height = frame.height()))]
    pub fn rectify(&self, frame: &RgbaImage, corners: &CornerSet) -> Result<RgbaImage> {
        let quad = corners.to_absolute(frame.width(), frame.height());

        let area = shoelace_area(&quad);
        if area < MIN_QUAD_AREA {
            warn!(area, "Quadrilateral is degenerate or crossed; refusing to rectify");
            return Err(ScanError::Processing(format!(
                "corners are degenerate or crossed (area {area:.2}px²); drag them onto the page edges"
            )));
        }

        let (out_w, out_h) = output_dimensions(&quad);
        debug!(
            top_left = ?quad[0],
            top_right = ?quad[1],
            bottom_right = ?quad[2],
            bottom_left = ?quad[3],
            out_w,
            out_h,
            "Quadrilateral resolved"
        );

        let output = match self.method {
            RectifyMethod::Bilinear => rectify_bilinear(frame, &quad, out_w, out_h),
            RectifyMethod::Projective => rectify_projective(frame, &quad, out_w, out_h)?,
        };

        info!(out_w, out_h, "Rectification applied");
        Ok(output)
    }
}

/// Output size for a quadrilateral in absolute pixel coordinates
/// (`[TL, TR, BR, BL]`).
///
/// Width is the longer of the top and bottom edges; height the longer of the
/// left and right edges. Both are rounded and at least 1.
pub fn output_dimensions(quad: &[(f64, f64); 4]) -> (u32, u32) {
    let [tl, tr, br, bl] = *quad;
    let width = distance(tl, tr).max(distance(bl, br));
    let height = distance(tl, bl).max(distance(tr, br));
    (to_dimension(width), to_dimension(height))
}

fn to_dimension(length: f64) -> u32 {
    let rounded = length.round();
    if rounded.is_finite() && rounded >= 1.0 {
        rounded.min(u32::MAX as f64) as u32
    } else {
        1
    }
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (b.0 - a.0).hypot(b.1 - a.1)
}

fn lerp(a: (f64, f64), b: (f64, f64), t: f64) -> (f64, f64) {
    (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
}

/// Bilinear edge interpolation with nearest-neighbour sampling.
///
/// For destination `(dx, dy)` the source point is found by walking `tx` along
/// the top and bottom edges, then `ty` between those two edge points.
fn rectify_bilinear(src: &RgbaImage, quad: &[(f64, f64); 4], out_w: u32, out_h: u32) -> RgbaImage {
    let [tl, tr, br, bl] = *quad;
    let (src_w, src_h) = (src.width() as f64, src.height() as f64);
    let mut output = RgbaImage::from_pixel(out_w, out_h, UNSET_PIXEL);
    let mut skipped: u64 = 0;

    for dy in 0..out_h {
        let ty = dy as f64 / out_h as f64;
        for dx in 0..out_w {
            let tx = dx as f64 / out_w as f64;
            let top = lerp(tl, tr, tx);
            let bottom = lerp(bl, br, tx);
            let (sx, sy) = lerp(top, bottom, ty);
            let (sx, sy) = (sx.round(), sy.round());

            if sx < 0.0 || sy < 0.0 || sx >= src_w || sy >= src_h {
                skipped += 1;
                continue;
            }

            let Rgba([r, g, b, _]) = *src.get_pixel(sx as u32, sy as u32);
            output.put_pixel(dx, dy, Rgba([r, g, b, 255]));
        }
    }

    if skipped > 0 {
        debug!(skipped, "Samples fell outside the source frame");
    }
    output
}

/// True homography from the quadrilateral onto the output rectangle.
fn rectify_projective(
    src: &RgbaImage,
    quad: &[(f64, f64); 4],
    out_w: u32,
    out_h: u32,
) -> Result<RgbaImage> {
    let from = quad.map(|(x, y)| (x as f32, y as f32));
    let to: [(f32, f32); 4] = [
        (0.0, 0.0),
        (out_w as f32, 0.0),
        (out_w as f32, out_h as f32),
        (0.0, out_h as f32),
    ];

    let projection = Projection::from_control_points(from, to).ok_or_else(|| {
        ScanError::Processing("no projective transform maps this quadrilateral".into())
    })?;

    // Only the out-of-frame default may stay transparent.
    let mut opaque = src.clone();
    for pixel in opaque.pixels_mut() {
        pixel.0[3] = 255;
    }

    let mut output = RgbaImage::from_pixel(out_w, out_h, UNSET_PIXEL);
    warp_into(&opaque, &projection, Interpolation::Nearest, UNSET_PIXEL, &mut output);
    Ok(output)
}

/// Area of a quadrilateral via the shoelace formula. Vertices must be in
/// order (CW or CCW).
fn shoelace_area(quad: &[(f64, f64); 4]) -> f64 {
    let n = quad.len();
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += quad[i].0 * quad[j].1;
        area -= quad[j].0 * quad[i].1;
    }
    area.abs() / 2.0
}
