use std::sync::Arc;

use tauri::{AppHandle, State};

use crate::{haptics::webview::WebviewHaptic, patterns::Pattern, AppState};

use super::{PlaybackController, PlaybackSnapshot};

fn controller_from_state(state: &State<'_, AppState>) -> Result<PlaybackController, String> {
    state
        .playback
        .get()
        .cloned()
        .ok_or_else(|| "haptics have not been probed yet".to_string())
}

/// One-time capability report from the page. The first call creates the
/// controller; later (or concurrent) calls just return its state.
#[tauri::command]
pub async fn probe_haptics(
    supported: bool,
    state: State<'_, AppState>,
    app_handle: AppHandle,
) -> Result<PlaybackSnapshot, String> {
    let controller = state
        .playback
        .get_or_probe(&state.catalog, &state.settings, move || {
            Arc::new(WebviewHaptic::new(app_handle, supported))
        })
        .await
        .map_err(|e| e.to_string())?;

    Ok(controller.snapshot())
}

#[tauri::command]
pub fn list_patterns(state: State<'_, AppState>) -> Vec<Pattern> {
    state.catalog.patterns().to_vec()
}

#[tauri::command]
pub fn get_playback_state(state: State<'_, AppState>) -> PlaybackSnapshot {
    match state.playback.get() {
        Some(controller) => controller.snapshot(),
        None => PlaybackSnapshot {
            is_running: false,
            selected_pattern_id: state.settings.default_pattern_id.clone(),
            is_supported: false,
        },
    }
}

#[tauri::command]
pub fn select_pattern(state: State<'_, AppState>, id: String) -> Result<PlaybackSnapshot, String> {
    let controller = controller_from_state(&state)?;
    controller.select_pattern(&id);
    Ok(controller.snapshot())
}

#[tauri::command]
pub fn toggle_playback(state: State<'_, AppState>) -> Result<PlaybackSnapshot, String> {
    let controller = controller_from_state(&state)?;
    controller.toggle();
    Ok(controller.snapshot())
}
