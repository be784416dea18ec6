// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — owned frames and their encoded forms.

pub mod frame;

pub use frame::{CapturedFrame, RectifiedFrame};
