// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Global application state — reactive signals for the Dioxus UI.

use std::path::PathBuf;

use apotheca_core::ScannerConfig;
use apotheca_core::types::EnhancementMode;
use apotheca_document::ExportedScan;
use chrono::{DateTime, Utc};

use crate::services::app_services::AppServices;

/// A scan the user confirmed during this run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRecord {
    pub filename: String,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub mode: EnhancementMode,
    pub sha256: String,
    pub size_bytes: usize,
    pub captured_at: DateTime<Utc>,
}

impl ScanRecord {
    pub fn new(scan: &ExportedScan, path: PathBuf) -> Self {
        Self {
            filename: scan.filename.clone(),
            path,
            width: scan.width,
            height: scan.height,
            mode: scan.mode,
            sha256: scan.sha256.clone(),
            size_bytes: scan.bytes.len(),
            captured_at: scan.captured_at,
        }
    }
}

/// Shared state accessible to all pages via `use_context`.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Scanner settings as last saved.
    pub config: ScannerConfig,
    /// Scans confirmed since launch, newest first.
    pub scans: Vec<ScanRecord>,
    /// Status message for user feedback.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(svc: &AppServices) -> Self {
        Self {
            config: svc.config(),
            ..Self::default()
        }
    }

    pub fn record_scan(&mut self, record: ScanRecord) {
        self.status_message = Some(format!("Saved {}", record.filename));
        self.scans.insert(0, record);
    }
}
