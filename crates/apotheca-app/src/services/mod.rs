// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — what the Dioxus pages need from outside the scanner:
// the platform bridge, persisted settings and somewhere to put finished scans.

pub mod app_services;
pub mod data_dir;
