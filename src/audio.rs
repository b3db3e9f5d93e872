use log::debug;

use crate::models::SwipeDirection;

/// Feedback sounds and text-to-speech, injected into the session rather than
/// reached through process globals.
///
/// Swipe feedback plays synchronously before the vote round trip so the
/// gesture feels instant. Speech is fire-and-forget; `stop_speaking` must be
/// immediate and idempotent (a no-op when nothing is playing).
pub trait AudioService: Send + Sync {
    fn play_swipe(&self, direction: SwipeDirection);
    fn play_ignore(&self);
    /// Reaction when the aggregate comes back: a chime when the user agrees
    /// with the majority, a "whoa" when they cast a hot take.
    fn play_reaction(&self, agreement: bool, overrated: bool);
    fn speak(&self, text: &str);
    fn stop_speaking(&self);
}

/// Silent implementation for tests and headless use.
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioService for NullAudio {
    fn play_swipe(&self, _direction: SwipeDirection) {}
    fn play_ignore(&self) {}
    fn play_reaction(&self, _agreement: bool, _overrated: bool) {}
    fn speak(&self, _text: &str) {}
    fn stop_speaking(&self) {}
}

/// Logs audio events instead of playing them; what the demo binary uses.
#[derive(Debug, Default)]
pub struct LogAudio;

impl AudioService for LogAudio {
    fn play_swipe(&self, direction: SwipeDirection) {
        debug!("audio: swipe {direction:?}");
    }

    fn play_ignore(&self) {
        debug!("audio: ignore");
    }

    fn play_reaction(&self, agreement: bool, overrated: bool) {
        debug!("audio: reaction agreement={agreement} overrated={overrated}");
    }

    fn speak(&self, text: &str) {
        debug!("audio: speak {text:?}");
    }

    fn stop_speaking(&self) {
        debug!("audio: stop speaking");
    }
}
