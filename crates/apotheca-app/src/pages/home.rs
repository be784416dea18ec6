// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Home page — scans confirmed this session and the entry point to the scanner.

use dioxus::prelude::*;

use crate::Route;
use crate::state::AppState;

#[component]
pub fn Home() -> Element {
    let state = use_context::<Signal<AppState>>();

    rsx! {
        div {
            h1 { "Invoices" }
            p { style: "color: #666;", "Scan supplier invoices for the point-of-sale." }

            div { style: "margin: 24px 0;",
                QuickAction { to: Route::Scan {}, label: "Scan Invoice", icon: "\u{1F4F7}" }
            }

            if state.read().scans.is_empty() {
                p { style: "text-align: center; color: #aaa; margin: 48px 0;",
                    "No invoices scanned yet."
                }
            } else {
                {
                    let count = state.read().scans.len();
                    rsx! {
                        p { style: "color: #666; font-size: 14px; margin-bottom: 8px;",
                            "{count} scan(s) this session"
                        }
                    }
                }
                for scan in state.read().scans.iter() {
                    {
                        let ts = scan.captured_at.format("%Y-%m-%d %H:%M:%S").to_string();
                        let size_kb = scan.size_bytes / 1024;
                        let digest = scan.sha256.get(..12).unwrap_or(&scan.sha256).to_string();
                        let path = scan.path.display().to_string();
                        rsx! {
                            div { style: "padding: 12px; margin: 8px 0; border: 1px solid #e0e0e0; border-radius: 8px;",
                                strong { "{scan.filename}" }
                                p { style: "color: #666; font-size: 14px; margin: 4px 0;",
                                    "{scan.width}×{scan.height} · {scan.mode.label()} · {size_kb} KB"
                                }
                                div { style: "font-size: 12px; color: #888;",
                                    "{ts} · sha256 {digest}…"
                                }
                                div { style: "font-size: 12px; color: #aaa; word-break: break-all;", "{path}" }
                            }
                        }
                    }
                }
            }

            if let Some(ref msg) = state.read().status_message {
                p { style: "color: #34c759; font-size: 14px; margin-top: 12px;", "{msg}" }
            }
        }
    }
}

#[component]
fn QuickAction(to: Route, label: &'static str, icon: &'static str) -> Element {
    rsx! {
        Link { to: to,
            style: "display: flex; flex-direction: column; align-items: center; justify-content: center; padding: 24px 16px; border: 1px solid #e0e0e0; border-radius: 12px; text-decoration: none; color: #333; background: white;",
            span { style: "font-size: 32px; margin-bottom: 8px;", "{icon}" }
            span { style: "font-size: 14px;", "{label}" }
        }
    }
}
