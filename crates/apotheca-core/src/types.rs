// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the invoice scanner.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ScanError};

/// Unique identifier for one scanner session (open → close/export).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanSessionId(pub Uuid);

impl ScanSessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScanSessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ScanSessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Phases of the scan pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    /// Scanner not open; nothing held.
    Closed,
    /// Live camera preview (or waiting for one).
    Camera,
    /// A frame is captured; the user is adjusting corners.
    Crop,
    /// The rectified and enhanced result is on screen.
    Preview,
}

impl std::fmt::Display for ScanState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Closed => "closed",
            Self::Camera => "camera",
            Self::Crop => "crop",
            Self::Preview => "preview",
        };
        f.write_str(name)
    }
}

/// How the scanner should start when opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanIntent {
    /// Start the live camera preview.
    Camera,
    /// Skip the camera and open the file picker straight away.
    Gallery,
}

/// Where a captured frame came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameSource {
    Camera,
    Gallery,
}

/// Which way the requested camera should face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    /// Rear camera, pointing away from the user.
    Environment,
    /// Front ("selfie") camera.
    User,
}

/// Per-pixel tone transform applied after rectification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnhancementMode {
    /// Contrast-boosted, brightness-shifted grayscale tuned for printed pages.
    #[default]
    Auto,
    /// No filter; the rectified pixels are used as-is.
    Color,
    /// Plain luminance grayscale.
    Grayscale,
    /// Hard binary threshold.
    Bw,
}

impl EnhancementMode {
    /// All modes, in the order the UI lists them.
    pub const ALL: [EnhancementMode; 4] = [Self::Auto, Self::Color, Self::Grayscale, Self::Bw];

    /// Short label for mode selector buttons.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Auto => "Auto",
            Self::Color => "Color",
            Self::Grayscale => "Grayscale",
            Self::Bw => "B&W",
        }
    }
}

/// Which algorithm maps the user's quadrilateral onto the output rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RectifyMethod {
    /// Bilinear interpolation along the top/bottom edges. Not a true
    /// homography; adequate for near-planar document photos.
    #[default]
    Bilinear,
    /// Full projective (homographic) warp.
    Projective,
}

/// A point normalized to `[0,1] × [0,1]` relative to the displayed image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    /// Build a point, clamping each axis into `[0, 1]`.
    ///
    /// NaN inputs collapse to 0 so a point can never leave the unit square.
    pub fn clamped(x: f64, y: f64) -> Self {
        Self {
            x: clamp_unit(x),
            y: clamp_unit(y),
        }
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// The four logical corners of a document, in winding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomRight,
        Self::BottomLeft,
    ];

    /// Position of this corner inside a [`CornerSet`].
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Inset of the default quadrilateral from each image edge.
pub const DEFAULT_CORNER_INSET: f64 = 0.08;

/// The four user-adjustable boundary points of the document, always stored
/// as `[top-left, top-right, bottom-right, bottom-left]`.
///
/// Only [`CornerSet::move_corner`] mutates a point, and it touches exactly one
/// index; the winding order can never change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerSet {
    points: [NormalizedPoint; 4],
}

impl CornerSet {
    /// Build a corner set from points in TL, TR, BR, BL order. Every point is
    /// clamped to the unit square.
    pub fn new(points: [NormalizedPoint; 4]) -> Self {
        Self {
            points: points.map(|p| NormalizedPoint::clamped(p.x, p.y)),
        }
    }

    pub fn points(&self) -> &[NormalizedPoint; 4] {
        &self.points
    }

    pub fn get(&self, corner: Corner) -> NormalizedPoint {
        self.points[corner.index()]
    }

    /// Move the corner at `index` to `(x, y)`, clamped to `[0, 1]` per axis.
    pub fn move_corner(&mut self, index: usize, x: f64, y: f64) -> Result<NormalizedPoint> {
        let slot = self
            .points
            .get_mut(index)
            .ok_or(ScanError::InvalidCorner(index))?;
        *slot = NormalizedPoint::clamped(x, y);
        Ok(*slot)
    }

    /// Scale every point to absolute pixel coordinates of a `width × height`
    /// frame.
    pub fn to_absolute(&self, width: u32, height: u32) -> [(f64, f64); 4] {
        self.points
            .map(|p| (p.x * width as f64, p.y * height as f64))
    }
}

impl Default for CornerSet {
    fn default() -> Self {
        let lo = DEFAULT_CORNER_INSET;
        let hi = 1.0 - DEFAULT_CORNER_INSET;
        Self {
            points: [
                NormalizedPoint { x: lo, y: lo },
                NormalizedPoint { x: hi, y: lo },
                NormalizedPoint { x: hi, y: hi },
                NormalizedPoint { x: lo, y: hi },
            ],
        }
    }
}
