// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings page — persistent scanner configuration.

use dioxus::prelude::*;

use apotheca_core::types::{CameraFacing, EnhancementMode, RectifyMethod};

use crate::services::app_services::AppServices;
use crate::state::AppState;

#[component]
pub fn Settings() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();
    let mut save_msg = use_signal(|| Option::<String>::None);

    rsx! {
        div {
            h1 { "Settings" }

            section { style: "margin: 16px 0;",
                h3 { "Camera" }
                div { style: "display: flex; justify-content: space-between; align-items: center; padding: 12px 0; border-bottom: 1px solid #f0f0f0;",
                    span { "Camera" }
                    select {
                        style: "padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px;",
                        value: facing_key(state.read().config.facing),
                        onchange: move |evt| {
                            if let Some(facing) = facing_from_key(&evt.value()) {
                                state.write().config.facing = facing;
                            }
                        },
                        option { value: "environment", "Rear" }
                        option { value: "user", "Front" }
                    }
                }
                NumberRow {
                    label: "Preferred width",
                    value: state.read().config.preferred_width,
                    on_change: move |v: u32| { state.write().config.preferred_width = v; },
                }
                NumberRow {
                    label: "Preferred height",
                    value: state.read().config.preferred_height,
                    on_change: move |v: u32| { state.write().config.preferred_height = v; },
                }
            }

            section { style: "margin: 16px 0;",
                h3 { "Processing" }
                div { style: "display: flex; justify-content: space-between; align-items: center; padding: 12px 0; border-bottom: 1px solid #f0f0f0;",
                    span { "Default enhancement" }
                    select {
                        style: "padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px;",
                        value: mode_key(state.read().config.default_mode),
                        onchange: move |evt| {
                            if let Some(mode) = mode_from_key(&evt.value()) {
                                state.write().config.default_mode = mode;
                            }
                        },
                        for mode in EnhancementMode::ALL {
                            option { value: mode_key(mode), "{mode.label()}" }
                        }
                    }
                }
                div { style: "display: flex; justify-content: space-between; align-items: center; padding: 12px 0; border-bottom: 1px solid #f0f0f0;",
                    span { "Perspective correction" }
                    select {
                        style: "padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px;",
                        value: method_key(state.read().config.rectify_method),
                        onchange: move |evt| {
                            if let Some(method) = method_from_key(&evt.value()) {
                                state.write().config.rectify_method = method;
                            }
                        },
                        option { value: "bilinear", "Bilinear" }
                        option { value: "projective", "Projective" }
                    }
                }
            }

            section { style: "margin: 16px 0;",
                h3 { "Export" }
                NumberRow {
                    label: "JPEG quality",
                    value: u32::from(state.read().config.export_quality),
                    on_change: move |v: u32| {
                        if let Ok(q) = u8::try_from(v) && (1..=100).contains(&q) {
                            state.write().config.export_quality = q;
                        }
                    },
                }
                div { style: "display: flex; justify-content: space-between; align-items: center; padding: 12px 0; border-bottom: 1px solid #f0f0f0;",
                    span { "File name prefix" }
                    input {
                        style: "width: 120px; padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px; text-align: right;",
                        value: "{state.read().config.filename_prefix}",
                        onchange: move |evt| {
                            let prefix = evt.value().trim().to_string();
                            if !prefix.is_empty() {
                                state.write().config.filename_prefix = prefix;
                            }
                        },
                    }
                }
            }

            button {
                style: "width: 100%; padding: 12px; border-radius: 8px; border: none; background: #007aff; color: white; font-size: 16px; margin-top: 8px;",
                onclick: {
                    let svc = svc.clone();
                    move |_| {
                        let config = state.read().config.clone();
                        match svc.save_config(&config) {
                            Ok(()) => {
                                tracing::info!("settings saved");
                                save_msg.set(Some("Settings saved. They apply to the next scan.".into()));
                            }
                            Err(e) => {
                                tracing::error!(error = %e, "failed to save settings");
                                save_msg.set(Some(format!("Save failed: {e}")));
                            }
                        }
                    }
                },
                "Save Settings"
            }
            if let Some(ref msg) = *save_msg.read() {
                p { style: "color: #34c759; font-size: 14px; text-align: center; margin-top: 8px;",
                    "{msg}"
                }
            }
        }
    }
}

#[component]
fn NumberRow(label: &'static str, value: u32, on_change: EventHandler<u32>) -> Element {
    rsx! {
        div { style: "display: flex; justify-content: space-between; align-items: center; padding: 12px 0; border-bottom: 1px solid #f0f0f0;",
            span { "{label}" }
            input {
                r#type: "number",
                style: "width: 80px; padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px; text-align: right;",
                value: "{value}",
                onchange: move |evt| {
                    if let Ok(v) = evt.value().parse::<u32>()
                        && v > 0
                    {
                        on_change.call(v);
                    }
                },
            }
        }
    }
}

fn mode_key(mode: EnhancementMode) -> &'static str {
    match mode {
        EnhancementMode::Auto => "auto",
        EnhancementMode::Color => "color",
        EnhancementMode::Grayscale => "grayscale",
        EnhancementMode::Bw => "bw",
    }
}

fn mode_from_key(key: &str) -> Option<EnhancementMode> {
    EnhancementMode::ALL.into_iter().find(|m| mode_key(*m) == key)
}

fn method_key(method: RectifyMethod) -> &'static str {
    match method {
        RectifyMethod::Bilinear => "bilinear",
        RectifyMethod::Projective => "projective",
    }
}

fn method_from_key(key: &str) -> Option<RectifyMethod> {
    match key {
        "bilinear" => Some(RectifyMethod::Bilinear),
        "projective" => Some(RectifyMethod::Projective),
        _ => None,
    }
}

fn facing_key(facing: CameraFacing) -> &'static str {
    match facing {
        CameraFacing::Environment => "environment",
        CameraFacing::User => "user",
    }
}

fn facing_from_key(key: &str) -> Option<CameraFacing> {
    match key {
        "environment" => Some(CameraFacing::Environment),
        "user" => Some(CameraFacing::User),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_keys_round_trip() {
        for mode in EnhancementMode::ALL {
            assert_eq!(mode_from_key(mode_key(mode)), Some(mode));
        }
        assert_eq!(method_from_key("projective"), Some(RectifyMethod::Projective));
        assert_eq!(facing_from_key("user"), Some(CameraFacing::User));
        assert_eq!(mode_from_key("sepia"), None);
    }
}
