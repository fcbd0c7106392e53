use std::time::Duration;

use rand::Rng;

use crate::settings::{PlaybackSettings, RandomizerSettings};

use super::{Pattern, PatternKind};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// Sum of every on/off segment, in milliseconds.
pub fn total_duration_ms(sequence: &[u32]) -> u64 {
    sequence.iter().map(|&ms| u64::from(ms)).sum()
}

/// Draws `count` durations, each `min_ms + floor(u * span_ms)` for uniform `u` in `[0, 1)`.
pub fn random_sequence<R: Rng>(rng: &mut R, settings: &RandomizerSettings) -> Vec<u32> {
    (0..settings.count)
        .map(|_| {
            let u: f64 = rng.gen();
            settings
                .min_ms
                .saturating_add((u * f64::from(settings.span_ms)).floor() as u32)
        })
        .collect()
}

/// Resolves the sequence handed to the primitive for one playback cycle.
///
/// Randomized patterns are re-rolled on every call. An empty result is
/// replaced by a single `fallback_ms` pulse, so the returned list is never
/// empty.
pub fn effective_sequence<R: Rng>(
    pattern: &Pattern,
    rng: &mut R,
    settings: &PlaybackSettings,
) -> Vec<u32> {
    let sequence = match pattern.kind {
        PatternKind::Fixed => pattern.durations.clone(),
        PatternKind::Randomized => random_sequence(rng, &settings.randomizer),
    };

    if sequence.is_empty() {
        log_debug!(
            "pattern '{}' resolved to an empty sequence, using {}ms fallback",
            pattern.id,
            settings.fallback_ms
        );
        return vec![settings.fallback_ms];
    }

    sequence
}

/// Delay before the next re-trigger: the sequence's own length, floored at `min_rearm_ms`.
pub fn rearm_delay(sequence: &[u32], min_rearm_ms: u64) -> Duration {
    Duration::from_millis(total_duration_ms(sequence).max(min_rearm_ms))
}
