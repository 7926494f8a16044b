//! Phase notifications for UI or tooling. Observers are passed into the
//! engine entry points; the engine keeps no registry of its own.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    RoundStart,
    RoundStartAi,
    RoundEnd,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseEvent {
    pub phase: Phase,
    pub round: u32,
}

pub trait PhaseObserver {
    fn on_phase(&mut self, event: PhaseEvent);
}

impl PhaseObserver for () {
    fn on_phase(&mut self, _event: PhaseEvent) {}
}

/// Records every event in order.
impl PhaseObserver for Vec<PhaseEvent> {
    fn on_phase(&mut self, event: PhaseEvent) {
        self.push(event);
    }
}

/// Fans each event out to every observer in registration order.
impl PhaseObserver for Vec<Box<dyn PhaseObserver>> {
    fn on_phase(&mut self, event: PhaseEvent) {
        for observer in self.iter_mut() {
            observer.on_phase(event);
        }
    }
}
