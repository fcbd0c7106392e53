use std::sync::Arc;

use anyhow::Result;
use tokio::sync::OnceCell;

use crate::{haptics::HapticPrimitive, patterns::Catalog, settings::PlaybackSettings};

use super::PlaybackController;

/// Holds the controller created by the first capability probe.
///
/// Concurrent probes wait on the one in flight instead of building a second
/// controller, so no extra primitive is ever probed or torn down.
#[derive(Default)]
pub struct ControllerSlot {
    cell: OnceCell<PlaybackController>,
}

impl ControllerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&PlaybackController> {
        self.cell.get()
    }

    /// Returns the existing controller, or builds one around the primitive
    /// made by `make_haptic`. `make_haptic` runs at most once per slot.
    pub async fn get_or_probe<F>(
        &self,
        catalog: &Catalog,
        settings: &PlaybackSettings,
        make_haptic: F,
    ) -> Result<&PlaybackController>
    where
        F: FnOnce() -> Arc<dyn HapticPrimitive>,
    {
        self.cell
            .get_or_try_init(move || async move {
                PlaybackController::new(catalog.clone(), make_haptic(), settings.clone())
            })
            .await
    }
}
