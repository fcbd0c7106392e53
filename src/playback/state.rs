use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Looping,
}

/// The single pending re-trigger task of a looping controller.
pub(crate) struct Retrigger {
    pub(crate) cancel: CancellationToken,
    pub(crate) handle: JoinHandle<()>,
}

pub(crate) struct PlaybackState {
    pub(crate) selected_pattern_id: String,
    pub(crate) status: PlaybackStatus,
    /// Bumped on every start; a re-trigger only acts while its generation is current.
    pub(crate) generation: u64,
    pub(crate) torn_down: bool,
    pub(crate) rng: StdRng,
    retrigger: Option<Retrigger>,
}

impl PlaybackState {
    pub(crate) fn new(selected_pattern_id: String, rng: StdRng) -> Self {
        Self {
            selected_pattern_id,
            status: PlaybackStatus::Idle,
            generation: 0,
            torn_down: false,
            rng,
            retrigger: None,
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.status == PlaybackStatus::Looping
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.retrigger.is_some()
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.is_running() && self.generation == generation
    }

    /// Enters Looping under a fresh generation and returns it.
    pub(crate) fn begin_loop(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.status = PlaybackStatus::Looping;
        self.generation
    }

    pub(crate) fn end_loop(&mut self) {
        self.status = PlaybackStatus::Idle;
    }

    /// Stores the re-trigger for the current loop. Any previous one is cancelled first.
    pub(crate) fn arm(&mut self, retrigger: Retrigger) {
        self.disarm();
        self.retrigger = Some(retrigger);
    }

    /// Cancels the pending re-trigger, if any. Returns whether one was armed.
    pub(crate) fn disarm(&mut self) -> bool {
        match self.retrigger.take() {
            Some(retrigger) => {
                retrigger.cancel.cancel();
                retrigger.handle.abort();
                true
            }
            None => false,
        }
    }
}
