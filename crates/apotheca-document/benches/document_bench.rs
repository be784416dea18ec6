// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the apotheca-document crate. The rectify and
// enhance passes run synchronously on the UI thread, so their cost on a
// phone-sized frame is what decides how long the busy indicator shows.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{Rgba, RgbaImage};

use apotheca_core::types::{CornerSet, EnhancementMode, NormalizedPoint, RectifyMethod};
use apotheca_document::{PerspectiveRectifier, ScanEnhancer};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A 1280x960 synthetic "photo": grey desk with a lighter, slightly skewed page.
fn synthetic_photo() -> RgbaImage {
    RgbaImage::from_fn(1280, 960, |x, y| {
        let on_page = x > 150 + y / 10 && x < 1150 - y / 20 && y > 80 && y < 900;
        if on_page {
            Rgba([235, 232, 225, 255])
        } else {
            Rgba([70, 72, 75, 255])
        }
    })
}

fn skewed_corners() -> CornerSet {
    CornerSet::new([
        NormalizedPoint { x: 0.13, y: 0.09 },
        NormalizedPoint { x: 0.89, y: 0.08 },
        NormalizedPoint { x: 0.86, y: 0.93 },
        NormalizedPoint { x: 0.19, y: 0.94 },
    ])
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_rectify(c: &mut Criterion) {
    let photo = synthetic_photo();
    let corners = skewed_corners();

    for method in [RectifyMethod::Bilinear, RectifyMethod::Projective] {
        let rectifier = PerspectiveRectifier::new(method);
        c.bench_function(&format!("rectify {method:?} (1280x960)"), |b| {
            b.iter(|| {
                let out = rectifier.rectify(black_box(&photo), black_box(&corners));
                black_box(out.ok());
            });
        });
    }
}

fn bench_enhance(c: &mut Criterion) {
    let photo = synthetic_photo();

    for mode in [EnhancementMode::Auto, EnhancementMode::Bw] {
        c.bench_function(&format!("enhance {mode:?} (1280x960)"), |b| {
            b.iter(|| {
                let out = ScanEnhancer::new(black_box(photo.clone())).apply(mode);
                black_box(out.into_rgba());
            });
        });
    }
}

criterion_group!(benches, bench_rectify, bench_enhance);
criterion_main!(benches);
