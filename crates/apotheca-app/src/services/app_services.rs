// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — owns the platform bridge, the persisted scanner
// settings and the folder confirmed scans are written to.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use apotheca_bridge::traits::PlatformBridge;
use apotheca_core::ScannerConfig;
use apotheca_core::error::{Result, ScanError};
use apotheca_document::ExportedScan;
use tracing::{info, warn};

use super::data_dir;

const CONFIG_FILE: &str = "scanner.json";
const SCANS_DIR: &str = "scans";

/// Shared services accessible from all Dioxus components via
/// `use_context::<AppServices>()`.
#[derive(Clone)]
pub struct AppServices {
    bridge: Arc<dyn PlatformBridge>,
    data_dir: PathBuf,
    config: Arc<Mutex<ScannerConfig>>,
}

impl AppServices {
    /// Initialise against the platform data directory. Call once at startup.
    pub fn init() -> Self {
        Self::with_data_dir(apotheca_bridge::platform_bridge(), data_dir::data_dir())
    }

    /// Initialise against an explicit directory and bridge.
    pub fn with_data_dir(bridge: Arc<dyn PlatformBridge>, dir: PathBuf) -> Self {
        let config = load_config(&dir).unwrap_or_default();
        info!(
            path = %dir.display(),
            platform = bridge.platform_name(),
            camera = bridge.camera_supported(),
            "app services initialised"
        );
        Self {
            bridge,
            data_dir: dir,
            config: Arc::new(Mutex::new(config)),
        }
    }

    pub fn bridge(&self) -> Arc<dyn PlatformBridge> {
        Arc::clone(&self.bridge)
    }

    // -- Config ---------------------------------------------------------------

    /// Current scanner settings.
    pub fn config(&self) -> ScannerConfig {
        self.config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the settings in memory and on disk.
    pub fn save_config(&self, config: &ScannerConfig) -> Result<()> {
        *self.config.lock().unwrap_or_else(PoisonError::into_inner) = config.clone();
        persist_config(&self.data_dir, config)
    }

    // -- Scans ----------------------------------------------------------------

    /// Write a confirmed scan into the scans folder. Returns its path.
    ///
    /// Borrows the scan so the caller still holds it when the write fails.
    pub fn store_scan(&self, scan: &ExportedScan) -> Result<PathBuf> {
        let dir = self.data_dir.join(SCANS_DIR);
        let path = dir.join(&scan.filename);
        std::fs::create_dir_all(&dir)
            .and_then(|()| std::fs::write(&path, &scan.bytes))
            .map_err(|source| ScanError::Store {
                path: path.clone(),
                source,
            })?;
        info!(path = %path.display(), bytes = scan.bytes.len(), sha256 = %scan.sha256, "scan stored");
        Ok(path)
    }
}

fn load_config(data_dir: &Path) -> Option<ScannerConfig> {
    let path = data_dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    serde_json::from_str(&data)
        .inspect_err(|e| warn!(path = %path.display(), error = %e, "ignoring malformed scanner config"))
        .ok()
}

fn persist_config(data_dir: &Path, config: &ScannerConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use apotheca_bridge::desktop::DesktopBridge;
    use apotheca_core::types::EnhancementMode;
    use apotheca_document::RectifiedFrame;
    use image::{Rgba, RgbaImage};

    fn services(dir: &Path) -> AppServices {
        AppServices::with_data_dir(Arc::new(DesktopBridge), dir.to_path_buf())
    }

    #[test]
    fn missing_config_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(services(tmp.path()).config(), ScannerConfig::default());
    }

    #[test]
    fn saved_config_survives_restart() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ScannerConfig {
            default_mode: EnhancementMode::Bw,
            filename_prefix: "invoice".into(),
            ..ScannerConfig::default()
        };
        services(tmp.path()).save_config(&config).unwrap();

        assert_eq!(services(tmp.path()).config(), config);
    }

    #[test]
    fn malformed_config_falls_back_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE), "{ not json").unwrap();
        assert_eq!(services(tmp.path()).config(), ScannerConfig::default());
    }

    fn scan_with_prefix(prefix: &str) -> ExportedScan {
        let frame = RectifiedFrame::new(
            RgbaImage::from_pixel(8, 6, Rgba([250, 250, 250, 255])),
            EnhancementMode::Color,
        );
        ExportedScan::encode(&frame, chrono::Utc::now(), prefix, 90).unwrap()
    }

    #[test]
    fn stored_scan_lands_in_scans_folder() {
        let tmp = tempfile::tempdir().unwrap();
        let scan = scan_with_prefix("scan");

        let path = services(tmp.path()).store_scan(&scan).unwrap();
        assert_eq!(path.parent().unwrap(), tmp.path().join(SCANS_DIR));
        assert_eq!(std::fs::read(&path).unwrap(), scan.bytes);
    }

    #[test]
    fn hostile_prefix_still_lands_in_scans_folder() {
        let tmp = tempfile::tempdir().unwrap();
        for prefix in ["../x", "a/b", "../../etc/passwd"] {
            let path = services(tmp.path())
                .store_scan(&scan_with_prefix(prefix))
                .unwrap();
            assert_eq!(path.parent().unwrap(), tmp.path().join(SCANS_DIR), "{prefix}");
        }
    }

    #[test]
    fn failed_write_is_a_store_error_and_can_be_retried() {
        let tmp = tempfile::tempdir().unwrap();
        let svc = services(tmp.path());
        let scan = scan_with_prefix("scan");

        // A plain file where the scans folder should be blocks the write.
        let blocker = tmp.path().join(SCANS_DIR);
        std::fs::write(&blocker, b"").unwrap();

        let err = svc.store_scan(&scan).unwrap_err();
        match err {
            ScanError::Store { path, .. } => assert!(path.ends_with(&scan.filename)),
            other => panic!("expected a store error, got {other:?}"),
        }

        std::fs::remove_file(&blocker).unwrap();
        let path = svc.store_scan(&scan).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), scan.bytes);
    }
}
