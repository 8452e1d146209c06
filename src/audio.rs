use tracing::trace;

use crate::tuning::TuningState;

/// The sound engine the exam drives. Implementations must not block the
/// caller: `start_interval` may acquire a device in the background.
pub trait IntervalAudio {
    /// Begin sounding the pair in `state`, replacing anything already playing.
    fn start_interval(&mut self, state: &TuningState);
    /// Retune the sounding pair in place. Called on every slider move.
    fn update_interval(&mut self, state: &TuningState);
    /// Silence output. Safe to call when nothing plays.
    fn stop(&mut self);
}

/// Collaborator that produces no sound and only tracks whether it would be
/// playing.
#[derive(Debug, Default, Clone)]
pub struct SilentAudio {
    current: Option<TuningState>,
}

impl SilentAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&TuningState> {
        self.current.as_ref()
    }
}

impl IntervalAudio for SilentAudio {
    fn start_interval(&mut self, state: &TuningState) {
        trace!(f1 = state.f1_hz, f2 = state.f2_hz, "start interval");
        self.current = Some(*state);
    }

    fn update_interval(&mut self, state: &TuningState) {
        if self.current.is_some() {
            trace!(f1 = state.f1_hz, f2 = state.f2_hz, "update interval");
            self.current = Some(*state);
        }
    }

    fn stop(&mut self) {
        self.current = None;
    }
}

impl<A: IntervalAudio + ?Sized> IntervalAudio for Box<A> {
    fn start_interval(&mut self, state: &TuningState) {
        (**self).start_interval(state)
    }

    fn update_interval(&mut self, state: &TuningState) {
        (**self).update_interval(state)
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}
