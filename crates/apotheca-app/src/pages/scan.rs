// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan page — the scanner overlay: camera, corner editing, preview, confirm.
//
// The page owns one `ScanController` for as long as it is mounted. Dropping
// the page drops the controller, which stops any camera it still holds.

use std::rc::Rc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use dioxus::prelude::*;

use apotheca_core::error::ScanError;
use apotheca_core::human_errors::{HumanError, Severity, humanize_error};
use apotheca_core::types::{Corner, EnhancementMode, ScanIntent, ScanState};
use apotheca_document::ExportedScan;
use apotheca_scanner::{
    AcquisitionResult, CameraState, DisplayRect, InputKind, OpenOutcome, PendingAcquisition,
    PickOutcome, ScanController,
};

use crate::Route;
use crate::services::app_services::AppServices;
use crate::state::{AppState, ScanRecord};

#[component]
pub fn Scan() -> Element {
    let svc = use_context::<AppServices>();
    let app_state = use_context::<Signal<AppState>>();
    let nav = navigator();

    let ui = ScanUi {
        scanner: use_signal({
            let svc = svc.clone();
            move || ScanController::new(svc.bridge(), app_state.peek().config.clone())
        }),
        notice: use_signal(|| None),
        frame_url: use_signal(|| None),
        preview_url: use_signal(|| None),
        display: use_signal(|| None),
        crop_box: use_signal(|| None),
        unsaved: use_signal(|| None),
    };

    let state = ui.scanner.read().state();
    let has_unsaved = ui.unsaved.read().is_some();
    let retry_svc = svc.clone();

    rsx! {
        div {
            h1 { "Scan Invoice" }

            if let Some(ref notice) = *ui.notice.read() {
                NoticeBanner { notice: notice.clone(), ui }
            }

            {match state {
                ScanState::Closed if has_unsaved => rsx! {
                    UnsavedView {
                        ui,
                        on_save: move |_| ui.save_export(&retry_svc, app_state, nav),
                    }
                },
                ScanState::Closed => rsx! { ClosedView { ui } },
                ScanState::Camera => rsx! { CameraView { ui } },
                ScanState::Crop => rsx! { CropView { ui } },
                ScanState::Preview => rsx! {
                    PreviewView {
                        ui,
                        on_confirm: move |_| ui.confirm(&svc, app_state, nav),
                    }
                },
            }}
        }
    }
}

/// Every signal the scanner overlay reads or writes. `Copy`, so event
/// handlers can capture it freely.
#[derive(Clone, Copy, PartialEq)]
struct ScanUi {
    scanner: Signal<ScanController>,
    notice: Signal<Option<HumanError>>,
    frame_url: Signal<Option<String>>,
    preview_url: Signal<Option<String>>,
    display: Signal<Option<DisplayRect>>,
    crop_box: Signal<Option<Rc<MountedData>>>,
    /// A confirmed scan that has not reached disk yet. The controller has
    /// already reset, so this is the only copy.
    unsaved: Signal<Option<ExportedScan>>,
}

impl ScanUi {
    // -- Transitions ----------------------------------------------------------

    fn open(mut self, intent: ScanIntent) {
        self.notice.set(None);
        let result = self.scanner.write().open(intent);
        match result {
            Ok(OpenOutcome::Acquiring(pending)) => self.acquire(pending),
            Ok(OpenOutcome::CameraUnavailable(err)) => self.report(&ScanError::Device(err)),
            Ok(OpenOutcome::Picked) => self.refresh_images(),
            Ok(OpenOutcome::Cancelled) => {}
            Err(e) => self.report(&e),
        }
    }

    fn restart_camera(mut self) {
        self.notice.set(None);
        let result = self.scanner.write().start_camera();
        match result {
            Ok(pending) => self.acquire(pending),
            Err(e) => self.report(&e),
        }
    }

    /// Await the platform grant off the event handler and hand it back.
    fn acquire(self, pending: PendingAcquisition) {
        let mut scanner = self.scanner;
        spawn(async move {
            let outcome = pending.resolve().await;
            let result = scanner.write().finish_camera(outcome);
            if let AcquisitionResult::Failed(err) = result {
                self.report(&ScanError::Device(err));
            }
        });
    }

    fn capture(mut self) {
        let result = self.scanner.write().capture();
        match result {
            Ok(()) => self.refresh_images(),
            Err(e) => self.report(&e),
        }
    }

    fn pick(mut self) {
        let result = self.scanner.write().pick_from_gallery();
        match result {
            Ok(PickOutcome::Picked) => {
                self.notice.set(None);
                self.refresh_images();
            }
            Ok(PickOutcome::Cancelled) => {}
            Err(e) => self.report(&e),
        }
    }

    fn retake(mut self) {
        let result = self.scanner.write().retake();
        match result {
            Ok(()) => {
                self.refresh_images();
                self.restart_camera();
            }
            Err(e) => self.report(&e),
        }
    }

    fn process(mut self) {
        self.notice.set(None);
        let result = self.scanner.write().process();
        match result {
            Ok(()) => self.refresh_images(),
            Err(e) => self.report(&e),
        }
    }

    fn adjust(mut self) {
        let result = self.scanner.write().adjust();
        match result {
            Ok(()) => self.refresh_images(),
            Err(e) => self.report(&e),
        }
    }

    fn confirm(mut self, svc: &AppServices, app_state: Signal<AppState>, nav: Navigator) {
        let result = self.scanner.write().confirm();
        let scan = match result {
            Ok(scan) => scan,
            Err(e) => return self.report(&e),
        };
        self.refresh_images();
        self.unsaved.set(Some(scan));
        self.save_export(svc, app_state, nav);
    }

    /// Write the held export to disk. It is only released once the write
    /// succeeds, so a failure can be retried from the unsaved view.
    fn save_export(mut self, svc: &AppServices, mut app_state: Signal<AppState>, nav: Navigator) {
        let Some(scan) = self.unsaved.peek().clone() else {
            return;
        };
        match svc.store_scan(&scan) {
            Ok(path) => {
                tracing::info!(filename = %scan.filename, "invoice scan confirmed");
                self.unsaved.set(None);
                self.notice.set(None);
                app_state.write().record_scan(ScanRecord::new(&scan, path));
                nav.push(Route::Home {});
            }
            Err(e) => {
                tracing::error!(error = %e, filename = %scan.filename, "failed to store scan");
                self.report(&e);
            }
        }
    }

    fn discard_export(mut self) {
        if let Some(scan) = self.unsaved.write().take() {
            tracing::warn!(filename = %scan.filename, "unsaved scan discarded");
        }
        self.notice.set(None);
    }

    fn close(mut self) {
        self.scanner.write().close();
        self.notice.set(None);
        self.refresh_images();
    }

    fn set_mode(mut self, mode: EnhancementMode) {
        let result = self.scanner.write().set_mode(mode);
        if let Err(e) = result {
            self.report(&e);
        }
    }

    // -- Corner dragging ------------------------------------------------------

    fn begin_drag(mut self, index: usize) {
        let result = self.scanner.write().begin_drag(index);
        match result {
            Ok(()) => self.refresh_display(),
            Err(e) => self.report(&e),
        }
    }

    fn drag_to(mut self, index: usize, client_x: f64, client_y: f64, input: InputKind) {
        let Some(display) = *self.display.peek() else {
            return;
        };
        let result = self
            .scanner
            .write()
            .move_drag(index, client_x, client_y, display, input);
        if let Err(e) = result {
            tracing::debug!(error = %e, "corner move rejected");
        }
    }

    fn end_drag(mut self) {
        if self.scanner.peek().active_corner().is_some() {
            self.scanner.write().end_drag();
        }
    }

    /// Re-measure the on-screen image; the window may have been resized
    /// since the last drag.
    fn refresh_display(self) {
        let mut display = self.display;
        let mounted = self.crop_box.peek().clone();
        let Some(element) = mounted else {
            return;
        };
        spawn(async move {
            match element.get_client_rect().await {
                Ok(rect) => display.set(Some(DisplayRect {
                    left: rect.origin.x,
                    top: rect.origin.y,
                    width: rect.size.width,
                    height: rect.size.height,
                })),
                Err(e) => tracing::debug!(error = ?e, "could not measure crop view"),
            }
        });
    }

    // -- Display --------------------------------------------------------------

    /// Re-encode the on-screen copies after the frame or result changed.
    fn refresh_images(mut self) {
        let scanner = self.scanner.peek();
        let quality = scanner.config().display_quality();
        let frame = scanner.captured_frame().map(|f| data_url(f.display_jpeg()));
        let preview = scanner.rectified_frame().and_then(|r| {
            r.to_jpeg_bytes(quality)
                .inspect_err(|e| tracing::warn!(error = %e, "preview encode failed"))
                .ok()
                .map(|bytes| data_url(&bytes))
        });
        drop(scanner);
        self.frame_url.set(frame);
        self.preview_url.set(preview);
    }

    fn report(mut self, err: &ScanError) {
        tracing::warn!(error = %err, "scanner action failed");
        self.notice.set(Some(humanize_error(err)));
    }
}

fn data_url(jpeg: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg))
}

// -- Views --------------------------------------------------------------------

const PRIMARY: &str = "flex: 1; padding: 12px; border-radius: 8px; border: none; background: #007aff; color: white; font-size: 16px;";
const SECONDARY: &str = "flex: 1; padding: 12px; border-radius: 8px; border: 1px solid #ccc; background: white; font-size: 16px;";
const DANGER: &str = "flex: 1; padding: 12px; border-radius: 8px; border: 1px solid #ff3b30; color: #ff3b30; background: white; font-size: 16px;";

#[component]
fn NoticeBanner(notice: HumanError, ui: ScanUi) -> Element {
    let colour = match notice.severity {
        Severity::Transient => "#ff9500",
        Severity::ActionRequired => "#007aff",
        Severity::Permanent => "#ff3b30",
    };
    let in_camera = ui.scanner.read().state() == ScanState::Camera;

    rsx! {
        div { style: "padding: 12px; margin: 12px 0; border-left: 4px solid {colour}; background: #f8f8f8; border-radius: 4px;",
            strong { "{notice.message}" }
            p { style: "color: #666; font-size: 14px; margin: 4px 0;", "{notice.suggestion}" }
            if notice.offer_gallery && in_camera {
                button { style: SECONDARY, onclick: move |_| ui.pick(), "Choose from Gallery" }
            }
        }
    }
}

#[component]
fn ClosedView(ui: ScanUi) -> Element {
    rsx! {
        p { style: "color: #666;", "Photograph a supplier invoice or load an image of one." }
        div { style: "display: flex; flex-direction: column; gap: 12px; margin: 24px 0;",
            button { style: PRIMARY, onclick: move |_| ui.open(ScanIntent::Camera), "\u{1F4F7} Use Camera" }
            button { style: SECONDARY, onclick: move |_| ui.open(ScanIntent::Gallery), "Choose from Gallery" }
        }
    }
}

#[component]
fn UnsavedView(ui: ScanUi, on_save: EventHandler<()>) -> Element {
    let (filename, kib) = ui
        .unsaved
        .read()
        .as_ref()
        .map(|scan| (scan.filename.clone(), scan.bytes.len().div_ceil(1024)))
        .unwrap_or_default();

    rsx! {
        p { style: "color: #666;", "The last scan hasn't been saved yet." }
        p { style: "font-family: monospace; font-size: 14px;", "{filename} · {kib} KiB" }
        div { style: "display: flex; gap: 8px; margin: 24px 0;",
            button { style: PRIMARY, onclick: move |_| on_save.call(()), "Save Again" }
            button { style: DANGER, onclick: move |_| ui.discard_export(), "Discard" }
        }
    }
}

#[component]
fn CameraView(ui: ScanUi) -> Element {
    let camera = ui.scanner.read().camera_state().clone();
    let (status, ready, can_retry) = match &camera {
        CameraState::Idle => ("Camera stopped.".to_string(), false, true),
        CameraState::Starting => ("Waiting for the camera…".to_string(), false, false),
        CameraState::Ready { width, height } => {
            (format!("Camera ready ({width}×{height}). Fit the invoice in the frame."), true, false)
        }
        CameraState::Failed(err) => (format!("Camera unavailable: {err}"), false, err.allows_gallery_fallback()),
    };

    rsx! {
        div { style: "height: 240px; border-radius: 12px; background: #111; color: #eee; display: flex; align-items: center; justify-content: center; text-align: center; padding: 16px; margin: 16px 0;",
            "{status}"
        }
        div { style: "display: flex; gap: 8px;",
            button { style: PRIMARY, disabled: !ready, onclick: move |_| ui.capture(), "Capture" }
            button { style: SECONDARY, onclick: move |_| ui.pick(), "Gallery" }
        }
        div { style: "display: flex; gap: 8px; margin-top: 8px;",
            if can_retry {
                button { style: SECONDARY, onclick: move |_| ui.restart_camera(), "Retry Camera" }
            }
            button { style: DANGER, onclick: move |_| ui.close(), "Close" }
        }
    }
}

#[component]
fn CropView(ui: ScanUi) -> Element {
    let scanner = ui.scanner.read();
    let points = *scanner.corners().points();
    let mode = scanner.mode();
    let busy = scanner.is_processing();
    drop(scanner);

    let polygon = points
        .iter()
        .map(|p| format!("{:.2},{:.2}", p.x * 100.0, p.y * 100.0))
        .collect::<Vec<_>>()
        .join(" ");
    let mut crop_box = ui.crop_box;

    rsx! {
        p { style: "color: #666; font-size: 14px;", "Drag the corners onto the edges of the invoice." }
        div { style: "text-align: center; margin: 12px 0;",
            div {
                style: "position: relative; display: inline-block; touch-action: none; user-select: none;",
                onmounted: move |evt| {
                    crop_box.set(Some(evt.data()));
                    ui.refresh_display();
                },
                onmousemove: move |evt| {
                    if let Some(index) = ui.scanner.peek().active_corner() {
                        let p = evt.client_coordinates();
                        ui.drag_to(index, p.x, p.y, InputKind::Pointer);
                    }
                },
                onmouseup: move |_| ui.end_drag(),
                onmouseleave: move |_| ui.end_drag(),

                if let Some(ref url) = *ui.frame_url.read() {
                    img { src: "{url}", draggable: "false", style: "display: block; max-width: 100%; max-height: 60vh;" }
                }
                svg {
                    style: "position: absolute; left: 0; top: 0; width: 100%; height: 100%; pointer-events: none;",
                    view_box: "0 0 100 100",
                    preserve_aspect_ratio: "none",
                    polygon {
                        points: "{polygon}",
                        fill: "rgba(0, 122, 255, 0.12)",
                        stroke: "#007aff",
                        stroke_width: "0.6",
                    }
                }
                for corner in Corner::ALL {
                    CornerHandle {
                        ui,
                        index: corner.index(),
                        x: points[corner.index()].x,
                        y: points[corner.index()].y,
                    }
                }
            }
        }

        div { style: "display: flex; gap: 6px; margin: 12px 0;",
            for option in EnhancementMode::ALL {
                {
                    let selected = option == mode;
                    let background = if selected { "#007aff" } else { "white" };
                    let colour = if selected { "white" } else { "#333" };
                    rsx! {
                        button {
                            style: "flex: 1; padding: 8px; border-radius: 6px; border: 1px solid #ccc; background: {background}; color: {colour}; font-size: 14px;",
                            onclick: move |_| ui.set_mode(option),
                            "{option.label()}"
                        }
                    }
                }
            }
        }

        div { style: "display: flex; gap: 8px;",
            button { style: SECONDARY, disabled: busy, onclick: move |_| ui.retake(), "Retake" }
            button { style: PRIMARY, disabled: busy, onclick: move |_| ui.process(),
                if busy { "Processing…" } else { "Process" }
            }
        }
        div { style: "display: flex; margin-top: 8px;",
            button { style: DANGER, onclick: move |_| ui.close(), "Close" }
        }
    }
}

#[component]
fn CornerHandle(ui: ScanUi, index: usize, x: f64, y: f64) -> Element {
    let active = ui.scanner.read().active_corner() == Some(index);
    let size = if active { 28 } else { 22 };
    let left = x * 100.0;
    let top = y * 100.0;

    rsx! {
        div {
            style: "position: absolute; left: {left}%; top: {top}%; width: {size}px; height: {size}px; transform: translate(-50%, -50%); border-radius: 50%; border: 3px solid #007aff; background: rgba(255, 255, 255, 0.85); cursor: grab;",
            onmousedown: move |evt| {
                evt.stop_propagation();
                ui.begin_drag(index);
            },
            ontouchstart: move |_| ui.begin_drag(index),
            ontouchmove: move |evt| {
                if let Some(touch) = evt.touches().first() {
                    let p = touch.client_coordinates();
                    ui.drag_to(index, p.x, p.y, InputKind::Touch);
                }
            },
            ontouchend: move |_| ui.end_drag(),
        }
    }
}

#[component]
fn PreviewView(ui: ScanUi, on_confirm: EventHandler<()>) -> Element {
    let (mode, dims) = {
        let scanner = ui.scanner.read();
        (
            scanner.mode(),
            scanner.rectified_frame().map(|r| (r.width(), r.height())),
        )
    };
    let (w, h) = dims.unwrap_or_default();

    rsx! {
        p { style: "color: #666; font-size: 14px;", "{mode.label()} · {w}×{h}" }
        div { style: "text-align: center; margin: 12px 0; background: #f0f0f0; border-radius: 8px; padding: 8px;",
            if let Some(ref url) = *ui.preview_url.read() {
                img { src: "{url}", style: "max-width: 100%; max-height: 60vh;" }
            }
        }
        div { style: "display: flex; gap: 8px;",
            button { style: SECONDARY, onclick: move |_| ui.adjust(), "Adjust" }
            button { style: PRIMARY, onclick: move |_| on_confirm.call(()), "Confirm" }
        }
        div { style: "display: flex; margin-top: 8px;",
            button { style: DANGER, onclick: move |_| ui.close(), "Close" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_is_base64_jpeg() {
        assert_eq!(data_url(&[0xFF, 0xD8, 0xFF]), "data:image/jpeg;base64,/9j/");
    }
}
