//! Telemetry recorder
//!
//! Pure observer: the session loop calls these hooks with already
//! computed facts, and each hook appends one record to the append-only
//! session log. The recorder infers nothing from raw simulation state.

use crate::game::state::{Side, WeaponMode};
use crate::telemetry::{MovementKind, SimulationClock, Stimulus, TelemetryEvent};

/// Append-only event log for one session
#[derive(Debug)]
pub struct Recorder {
    events: Vec<TelemetryEvent>,
    /// Lookback window for retroactive hit-marking, seconds
    shot_hit_lookback: f64,
}

impl Recorder {
    pub fn new(shot_hit_lookback: f64) -> Self {
        Self {
            events: Vec::new(),
            shot_hit_lookback,
        }
    }

    pub fn events(&self) -> &[TelemetryEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<TelemetryEvent> {
        self.events
    }

    pub fn reaction(&mut self, clock: &SimulationClock, stimulus: Stimulus, latency: f64) {
        self.events.push(TelemetryEvent::Reaction {
            t: clock.seconds(),
            stimulus,
            latency,
        });
    }

    pub fn movement(&mut self, clock: &SimulationClock, kind: MovementKind) {
        self.events.push(TelemetryEvent::Movement {
            t: clock.seconds(),
            kind,
        });
    }

    pub fn shot(&mut self, clock: &SimulationClock, shooter: Side, mode: WeaponMode) {
        self.events.push(TelemetryEvent::Shot {
            t: clock.seconds(),
            shooter,
            mode,
            hit: false,
        });
    }

    pub fn mode_switch(
        &mut self,
        clock: &SimulationClock,
        side: Side,
        from: WeaponMode,
        to: WeaponMode,
    ) {
        self.events.push(TelemetryEvent::ModeSwitch {
            t: clock.seconds(),
            side,
            from,
            to,
        });
    }

    pub fn drift(&mut self, clock: &SimulationClock, idle: f64, recovered: bool) {
        self.events.push(TelemetryEvent::Drift {
            t: clock.seconds(),
            idle,
            recovered,
        });
    }

    /// Retroactively mark the most recent shot by `shooter` as a hit if
    /// it falls inside the lookback window. This is the sole permitted
    /// mutation of an appended record: a heuristic linking annotation,
    /// not ground-truth hit detection, and it never looks past the most
    /// recent shot.
    pub fn mark_recent_shot_hit(&mut self, clock: &SimulationClock, shooter: Side) {
        let now = clock.seconds();
        let lookback = self.shot_hit_lookback;
        for event in self.events.iter_mut().rev() {
            if let TelemetryEvent::Shot {
                t,
                shooter: s,
                hit,
                ..
            } = event
            {
                if *s != shooter {
                    continue;
                }
                if now - *t <= lookback {
                    *hit = true;
                }
                return;
            }
        }
    }
}
