use serde::Serialize;
use tauri::{AppHandle, Emitter};

use super::HapticPrimitive;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_error;

/// Event the page listens for; it forwards `sequence` to `navigator.vibrate`.
pub const VIBRATE_EVENT: &str = "haptic://vibrate";

#[derive(Serialize, Clone)]
struct VibrateEvent<'a> {
    sequence: &'a [u32],
}

/// Primitive backed by the webview's vibration capability.
///
/// Availability is what the page reported when it probed
/// `navigator.vibrate`; it is fixed for the lifetime of this value.
pub struct WebviewHaptic {
    app_handle: AppHandle,
    supported: bool,
}

impl WebviewHaptic {
    pub fn new(app_handle: AppHandle, supported: bool) -> Self {
        Self {
            app_handle,
            supported,
        }
    }
}

impl HapticPrimitive for WebviewHaptic {
    fn is_available(&self) -> bool {
        self.supported
    }

    fn vibrate(&self, sequence: &[u32]) -> bool {
        if !self.supported {
            return false;
        }
        match self.app_handle.emit(VIBRATE_EVENT, VibrateEvent { sequence }) {
            Ok(()) => true,
            Err(err) => {
                log_error!("Failed to emit {VIBRATE_EVENT}: {err}");
                false
            }
        }
    }
}
