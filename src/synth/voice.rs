use std::fmt;

use tracing::trace;

/*
Voice Lifecycle
===============

A voice is one sounding tone. Its life is a small state machine driven by
four events: the attack finishing, the input that started it ending, the
sustain pedal lifting, and the release finishing.

                   AttackElapsed
    ┌───────────┐ ─────────────→ ┌────────────┐
    │ Attacking │                │ Sustaining │
    └───────────┘                └────────────┘
          │  InputEnded               │  InputEnded
          │                           │
          ├──── pedal up ─────────────┼──────────────┐
          │                           │              ↓
          └──── pedal down ──┐ ┌──────┘        ┌───────────┐ ReleaseElapsed ┌─────────┐
                             ↓ ↓               │ Releasing │ ─────────────→ │ Stopped │
                      ┌────────────────┐       └───────────┘                └─────────┘
                      │ PendingRelease │ ──────────→ ↑
                      └────────────────┘ PedalLifted

Any event that does not appear on an arrow leaves the state unchanged, so
duplicate or late events (a second key-up, a pedal lift with nothing
held) are harmless.

Releasing is terminal apart from ReleaseElapsed: a voice that has started
fading always fades out completely, even if the same pad is struck again.
The new strike gets a new voice.
*/

/// Stable name for a voice. Handles are issued in increasing order and
/// never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceHandle(pub(crate) u64);

impl VoiceHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for VoiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "voice#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    /// Ramping up; the input is held.
    Attacking,
    /// Full level; the input is held.
    Sustaining,
    /// Input ended while the pedal was down. Still sounding.
    PendingRelease,
    /// Fading out toward a scheduled stop.
    Releasing,
    /// Silent and removed from the registry.
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceEvent {
    AttackElapsed,
    InputEnded { pedal_down: bool },
    PedalLifted,
    ReleaseElapsed,
}

impl VoiceState {
    /// The state after `event`. Events with no transition return `self`.
    pub fn next(self, event: VoiceEvent) -> VoiceState {
        use VoiceEvent::*;
        use VoiceState::*;

        match (self, event) {
            (Attacking, AttackElapsed) => Sustaining,
            (Attacking | Sustaining, InputEnded { pedal_down: true }) => PendingRelease,
            (Attacking | Sustaining, InputEnded { pedal_down: false }) => Releasing,
            (PendingRelease, PedalLifted) => Releasing,
            (Releasing, ReleaseElapsed) => Stopped,
            (state, _) => state,
        }
    }

    /// Still owned by the input that started it.
    pub fn is_held(self) -> bool {
        matches!(self, VoiceState::Attacking | VoiceState::Sustaining)
    }

    pub fn is_sounding(self) -> bool {
        !matches!(self, VoiceState::Stopped)
    }
}

/// A registered voice and the engine tone behind it.
#[derive(Debug, Clone)]
pub struct Voice<T> {
    handle: VoiceHandle,
    frequency: f32,
    tone: T,
    state: VoiceState,
    started_at: f64,
    attack_ends_at: f64,
    release_ends_at: Option<f64>,
}

impl<T: Copy> Voice<T> {
    pub(crate) fn new(handle: VoiceHandle, frequency: f32, tone: T, now: f64, attack: f32) -> Self {
        Self {
            handle,
            frequency,
            tone,
            state: VoiceState::Attacking,
            started_at: now,
            attack_ends_at: now + attack as f64,
            release_ends_at: None,
        }
    }

    /// Feed `event` through the state machine. Returns whether the state moved.
    pub(crate) fn apply(&mut self, event: VoiceEvent) -> bool {
        let next = self.state.next(event);
        if next == self.state {
            return false;
        }
        trace!(voice = %self.handle, from = ?self.state, to = ?next, "voice transition");
        self.state = next;
        true
    }

    pub(crate) fn set_release_end(&mut self, at: f64) {
        self.release_ends_at = Some(at);
    }

    pub fn handle(&self) -> VoiceHandle {
        self.handle
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn tone(&self) -> T {
        self.tone
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn started_at(&self) -> f64 {
        self.started_at
    }

    pub fn attack_ends_at(&self) -> f64 {
        self.attack_ends_at
    }

    /// Engine time the tone stops, once a release has been scheduled.
    pub fn release_ends_at(&self) -> Option<f64> {
        self.release_ends_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use VoiceEvent::*;
    use VoiceState::*;

    const STATES: [VoiceState; 5] = [Attacking, Sustaining, PendingRelease, Releasing, Stopped];
    const EVENTS: [VoiceEvent; 5] = [
        AttackElapsed,
        InputEnded { pedal_down: false },
        InputEnded { pedal_down: true },
        PedalLifted,
        ReleaseElapsed,
    ];

    fn expected(state: VoiceState, event: VoiceEvent) -> VoiceState {
        match (state, event) {
            (Attacking, AttackElapsed) => Sustaining,
            (Attacking, InputEnded { pedal_down: true }) => PendingRelease,
            (Attacking, InputEnded { pedal_down: false }) => Releasing,
            (Sustaining, InputEnded { pedal_down: true }) => PendingRelease,
            (Sustaining, InputEnded { pedal_down: false }) => Releasing,
            (PendingRelease, PedalLifted) => Releasing,
            (Releasing, ReleaseElapsed) => Stopped,
            _ => state,
        }
    }

    #[test]
    fn every_state_event_pair() {
        for state in STATES {
            for event in EVENTS {
                assert_eq!(
                    state.next(event),
                    expected(state, event),
                    "{state:?} + {event:?}"
                );
            }
        }
    }

    #[test]
    fn stopped_is_absorbing() {
        for event in EVENTS {
            assert_eq!(Stopped.next(event), Stopped);
        }
    }

    #[test]
    fn second_input_end_changes_nothing() {
        let once = Sustaining.next(InputEnded { pedal_down: false });
        let twice = once.next(InputEnded { pedal_down: false });
        assert_eq!(once, twice);

        let held = Sustaining.next(InputEnded { pedal_down: true });
        assert_eq!(held.next(InputEnded { pedal_down: false }), PendingRelease);
    }

    #[test]
    fn apply_reports_movement() {
        let mut voice = Voice::new(VoiceHandle(0), 440.0, (), 1.0, 0.03);
        assert_eq!(voice.state(), Attacking);
        assert!((voice.attack_ends_at() - 1.03).abs() < 1e-6);

        assert!(!voice.apply(PedalLifted));
        assert!(voice.apply(AttackElapsed));
        assert_eq!(voice.state(), Sustaining);
    }
}
