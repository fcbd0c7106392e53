use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use anyhow::{Context, Result};
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use tokio::{runtime::Handle, time};
use tokio_util::sync::CancellationToken;

use crate::{
    haptics::{HapticPrimitive, STOP_SEQUENCE},
    patterns::{effective_sequence, rearm_delay, Catalog, Pattern},
    settings::PlaybackSettings,
};

use super::state::{PlaybackState, Retrigger};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// What the UI needs to render the controls.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub is_running: bool,
    pub selected_pattern_id: String,
    pub is_supported: bool,
}

struct ControllerInner {
    catalog: Catalog,
    settings: PlaybackSettings,
    haptic: Arc<dyn HapticPrimitive>,
    /// Result of the one-time capability probe. Never re-probed.
    supported: bool,
    runtime: Handle,
    state: Mutex<PlaybackState>,
}

impl ControllerInner {
    fn lock_state(&self) -> MutexGuard<'_, PlaybackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn resolve(&self, state: &mut PlaybackState) -> Option<(&Pattern, Vec<u32>)> {
        let pattern = self.catalog.get(&state.selected_pattern_id)?;
        let sequence = effective_sequence(pattern, &mut state.rng, &self.settings);
        Some((pattern, sequence))
    }

    fn stop_locked(&self, state: &mut PlaybackState) {
        let was_armed = state.disarm();
        if self.supported {
            self.haptic.vibrate(&STOP_SEQUENCE);
        }
        if state.is_running() || was_armed {
            log_info!("playback of '{}' stopped", state.selected_pattern_id);
        }
        state.end_loop();
    }

    fn teardown_locked(&self, state: &mut PlaybackState) {
        if state.torn_down {
            return;
        }
        self.stop_locked(state);
        state.torn_down = true;
    }

    /// One re-trigger firing. Returns the delay until the next one, or `None`
    /// when the loop it belongs to is no longer current.
    fn fire(&self, generation: u64) -> Option<Duration> {
        let mut state = self.lock_state();
        if !state.is_current(generation) {
            log_debug!("stale re-trigger (generation {generation}) ignored");
            return None;
        }

        let Some((pattern, sequence)) = self.resolve(&mut state) else {
            log_warn!(
                "selected pattern '{}' vanished from the catalog; stopping",
                state.selected_pattern_id
            );
            self.stop_locked(&mut state);
            return None;
        };

        log_debug!("re-triggering '{}' with {:?}", pattern.id, sequence);
        if !self.haptic.vibrate(&sequence) {
            log_debug!("haptic primitive did not accept re-trigger");
        }
        Some(rearm_delay(&sequence, self.settings.min_rearm_ms))
    }
}

impl Drop for ControllerInner {
    fn drop(&mut self) {
        let mut state = self.lock_state();
        self.teardown_locked(&mut state);
    }
}

/// Keeps a short one-shot vibration primitive playing a pattern indefinitely
/// by re-issuing it every time the previous sequence should have finished.
///
/// Cloning is cheap; all clones drive the same loop. The loop is torn down
/// when [`teardown`](Self::teardown) is called or the last clone is dropped.
#[derive(Clone)]
pub struct PlaybackController {
    inner: Arc<ControllerInner>,
}

impl PlaybackController {
    /// Probes the primitive and captures the current tokio runtime for the
    /// re-trigger task.
    pub fn new(
        catalog: Catalog,
        haptic: Arc<dyn HapticPrimitive>,
        settings: PlaybackSettings,
    ) -> Result<Self> {
        Self::with_rng(catalog, haptic, settings, StdRng::from_entropy())
    }

    pub fn with_rng(
        catalog: Catalog,
        haptic: Arc<dyn HapticPrimitive>,
        settings: PlaybackSettings,
        rng: StdRng,
    ) -> Result<Self> {
        settings.validate()?;
        let runtime =
            Handle::try_current().context("playback controller requires a tokio runtime")?;

        let supported = haptic.is_available();
        if supported {
            log_info!("vibration capability detected");
        } else {
            log_warn!("vibration capability unavailable; playback disabled for this session");
        }

        let selected = if catalog.contains(&settings.default_pattern_id) {
            settings.default_pattern_id.clone()
        } else {
            let first = catalog.first().id.clone();
            log_warn!(
                "default pattern '{}' not in catalog, selecting '{}'",
                settings.default_pattern_id,
                first
            );
            first
        };

        Ok(Self {
            inner: Arc::new(ControllerInner {
                catalog,
                settings,
                haptic,
                supported,
                runtime,
                state: Mutex::new(PlaybackState::new(selected, rng)),
            }),
        })
    }

    /// Changes the pattern used by the next [`start`](Self::start).
    ///
    /// Unknown ids are ignored. A running loop is stopped first so two
    /// patterns never interleave.
    pub fn select_pattern(&self, id: &str) {
        if !self.inner.catalog.contains(id) {
            log_warn!("ignoring selection of unknown pattern '{id}'");
            return;
        }

        let mut state = self.inner.lock_state();
        if state.is_running() {
            self.inner.stop_locked(&mut state);
        }
        state.selected_pattern_id = id.to_string();
        log_info!("selected pattern '{id}'");
    }

    /// Plays the selected pattern now and keeps re-triggering it until stopped.
    ///
    /// Must be called from the user-gesture context when the host gates
    /// vibration on gestures: the first invocation happens before this
    /// returns. Returns whether the primitive accepted that invocation;
    /// `false` without side effects when the capability is absent.
    pub fn start(&self) -> bool {
        let mut state = self.inner.lock_state();
        self.start_locked(&mut state)
    }

    /// Halts vibration and cancels the pending re-trigger. Idempotent.
    pub fn stop(&self) {
        let mut state = self.inner.lock_state();
        self.inner.stop_locked(&mut state);
    }

    /// Stops when running, starts otherwise. Returns the new running state.
    pub fn toggle(&self) -> bool {
        let mut state = self.inner.lock_state();
        if state.is_running() {
            self.inner.stop_locked(&mut state);
        } else {
            self.start_locked(&mut state);
        }
        state.is_running()
    }

    /// Releases the timer for good. Runs the stop sequence at most once over
    /// the controller's lifetime; later [`start`](Self::start) calls are no-ops.
    pub fn teardown(&self) {
        let mut state = self.inner.lock_state();
        self.inner.teardown_locked(&mut state);
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let state = self.inner.lock_state();
        PlaybackSnapshot {
            is_running: state.is_running(),
            selected_pattern_id: state.selected_pattern_id.clone(),
            is_supported: self.inner.supported,
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock_state().is_running()
    }

    pub fn is_supported(&self) -> bool {
        self.inner.supported
    }

    /// Whether a re-trigger task is currently pending.
    pub fn is_armed(&self) -> bool {
        self.inner.lock_state().is_armed()
    }

    pub fn selected_pattern_id(&self) -> String {
        self.inner.lock_state().selected_pattern_id.clone()
    }

    fn start_locked(&self, state: &mut PlaybackState) -> bool {
        if !self.inner.supported {
            log_debug!("start ignored: vibration unsupported");
            return false;
        }
        if state.torn_down {
            log_warn!("start ignored: controller already torn down");
            return false;
        }

        // Never leave an earlier loop pending next to the new one.
        state.disarm();

        let Some((pattern, sequence)) = self.inner.resolve(state) else {
            log_warn!(
                "cannot start: pattern '{}' not in catalog",
                state.selected_pattern_id
            );
            state.end_loop();
            return false;
        };

        let accepted = self.inner.haptic.vibrate(&sequence);
        if !accepted {
            log_warn!("haptic primitive did not accept '{}'", pattern.id);
        }
        let delay = rearm_delay(&sequence, self.inner.settings.min_rearm_ms);
        log_info!(
            "playing '{}' ({} segments), re-trigger in {}ms",
            pattern.id,
            sequence.len(),
            delay.as_millis()
        );

        let generation = state.begin_loop();
        let cancel = CancellationToken::new();
        let handle = self.inner.runtime.spawn(retrigger_loop(
            Arc::downgrade(&self.inner),
            generation,
            delay,
            cancel.clone(),
        ));
        state.arm(Retrigger { cancel, handle });

        accepted
    }
}

/// Sleeps for the current sequence's length, then re-issues the pattern,
/// until cancelled or superseded by a newer loop.
async fn retrigger_loop(
    inner: Weak<ControllerInner>,
    generation: u64,
    mut delay: Duration,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = time::sleep(delay) => {}
        }

        // Cancellation may race the wake-up; `fire` re-checks under the lock.
        let Some(controller) = inner.upgrade() else {
            break;
        };
        match controller.fire(generation) {
            Some(next) => delay = next,
            None => break,
        }
    }
}
