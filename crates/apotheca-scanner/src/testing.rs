// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory bridge used by the unit tests: a camera whose grant can be held
// back until the test releases it, and a picker that returns canned bytes.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use apotheca_bridge::traits::*;
use apotheca_core::error::{DeviceError, Result};
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tokio::sync::oneshot;

pub type TrackHandle = Arc<Mutex<Vec<TrackState>>>;

pub struct FakeStream {
    id: String,
    width: u32,
    height: u32,
    tracks: TrackHandle,
}

impl MediaStream for FakeStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn grab_frame(&mut self) -> Result<VideoFrame> {
        let image = RgbaImage::from_fn(self.width, self.height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 180, 255])
        });
        Ok(VideoFrame {
            width: self.width,
            height: self.height,
            rgba: image.into_raw(),
        })
    }

    fn track_states(&self) -> Vec<TrackState> {
        self.tracks.lock().unwrap().clone()
    }

    fn stop(&mut self) {
        for track in self.tracks.lock().unwrap().iter_mut() {
            *track = TrackState::Ended;
        }
    }
}

#[derive(Default)]
pub struct FakeBridge {
    pub unsupported: bool,
    pub failure: Mutex<Option<DeviceError>>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    issued: Mutex<Vec<TrackHandle>>,
    pub picked: Mutex<Option<Vec<u8>>>,
}

impl FakeBridge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn unsupported() -> Arc<Self> {
        Arc::new(Self {
            unsupported: true,
            ..Self::default()
        })
    }

    /// Hold the next `open_stream` until the returned sender fires.
    pub fn hold_next_grant(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.lock().unwrap() = Some(rx);
        tx
    }

    pub fn fail_next(&self, err: DeviceError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn set_picked(&self, bytes: Option<Vec<u8>>) {
        *self.picked.lock().unwrap() = bytes;
    }

    /// Track handles of every stream handed out so far.
    pub fn issued_tracks(&self) -> Vec<TrackHandle> {
        self.issued.lock().unwrap().clone()
    }

    pub fn live_track_count(&self) -> usize {
        self.issued_tracks()
            .iter()
            .flat_map(|t| t.lock().unwrap().clone())
            .filter(|s| *s == TrackState::Live)
            .count()
    }
}

impl PlatformBridge for FakeBridge {
    fn platform_name(&self) -> &str {
        "Fake"
    }
}

#[async_trait]
impl NativeCamera for FakeBridge {
    fn camera_supported(&self) -> bool {
        !self.unsupported
    }

    async fn open_stream(
        &self,
        constraints: CameraConstraints,
    ) -> std::result::Result<Box<dyn MediaStream>, DeviceError> {
        let gate = self.gate.lock().unwrap().take();
        if let Some(rx) = gate {
            let _ = rx.await;
        }
        if let Some(err) = self.failure.lock().unwrap().take() {
            return Err(err);
        }

        let tracks: TrackHandle = Arc::new(Mutex::new(vec![TrackState::Live]));
        let mut issued = self.issued.lock().unwrap();
        issued.push(Arc::clone(&tracks));
        Ok(Box::new(FakeStream {
            id: format!("fake-stream-{}", issued.len()),
            // Small frames keep the tests fast; the aspect follows the request.
            width: constraints.ideal_width / 20,
            height: constraints.ideal_height / 20,
            tracks,
        }))
    }
}

impl NativeFilePicker for FakeBridge {
    fn pick_file(&self, _mime_types: &[&str]) -> Result<Option<String>> {
        Ok(self
            .picked
            .lock()
            .unwrap()
            .as_ref()
            .map(|_| "invoice.png".to_string()))
    }

    fn read_picked_file(&self, _path: &str) -> Result<Vec<u8>> {
        Ok(self.picked.lock().unwrap().clone().unwrap_or_default())
    }
}

/// PNG-encoded solid image, as if picked from the gallery.
pub fn png_bytes(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(pixel));
    let mut buffer = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .unwrap();
    buffer
}
