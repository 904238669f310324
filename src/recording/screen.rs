//! Screen appearance hook
//!
//! Counterpart of a view-lifecycle "on appear" callback: host UI code
//! calls [`record_screen`] when a screen becomes visible and a navigation
//! entry lands in the continuous log.

use super::manager::Recorder;

/// Record a screen appearance against the shared recorder.
///
/// Wire this into the host's screen-visibility callback so navigation is
/// captured without touching the rest of the recording API.
pub fn record_screen(name: &str) {
    Recorder::shared().record_screen(name);
}
