//! The seam between the playback loop and whatever actually buzzes.

#[cfg(feature = "desktop")]
pub mod webview;

/// The stop directive understood by every primitive.
pub const STOP_SEQUENCE: [u32; 1] = [0];

/// A one-shot vibration capability.
///
/// `vibrate` starts executing the alternating on/off durations and returns
/// without waiting for them to finish. Calling it again replaces whatever is
/// in flight; `[0]` or `[]` stops the motor.
pub trait HapticPrimitive: Send + Sync {
    /// Whether the capability exists at all. Probed once per controller.
    fn is_available(&self) -> bool;

    /// Returns `true` if the call was accepted. Acceptance does not mean the
    /// hardware actually vibrated.
    fn vibrate(&self, sequence: &[u32]) -> bool;
}

/// Stand-in for hosts without a vibration capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableHaptic;

impl HapticPrimitive for UnavailableHaptic {
    fn is_available(&self) -> bool {
        false
    }

    fn vibrate(&self, _sequence: &[u32]) -> bool {
        false
    }
}
