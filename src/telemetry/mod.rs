//! Session telemetry
//!
//! A closed tagged union of gameplay observations with fixed payloads,
//! appended to an append-only per-session log by the [`recorder`], then
//! folded into a [`summary::SessionSummary`] at session end.
//!
//! Timestamps are simulation time (seconds derived from the tick
//! counter), so recording is deterministic under a fixed seed; wall-clock
//! identity lives only in the session metadata.

pub mod recorder;
pub mod summary;

use serde::{Deserialize, Serialize};

use crate::game::state::{Side, WeaponMode};

/// Explicit simulation clock passed into telemetry hooks; no ambient
/// globals, no reliance on a host render loop.
#[derive(Debug, Clone, Copy)]
pub struct SimulationClock {
    pub tick: u64,
    pub dt: f32,
}

impl SimulationClock {
    pub fn new(dt: f32) -> Self {
        Self { tick: 0, dt }
    }

    pub fn advance(&mut self) {
        self.tick += 1;
    }

    /// Elapsed simulation time in seconds
    pub fn seconds(&self) -> f64 {
        self.tick as f64 * self.dt as f64
    }
}

/// What provoked a recorded reaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stimulus {
    /// An opponent shot entered play
    IncomingShot,
    /// A platform on the player's side collapsed
    PlatformCollapse,
}

/// Movement observations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementKind {
    Jump,
    DirectionChange,
}

/// One immutable telemetry record. The single documented exception to
/// immutability is `Shot::hit`, which may be set retroactively within a
/// bounded lookback from a later impact (see [`recorder::Recorder`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TelemetryEvent {
    Reaction {
        t: f64,
        stimulus: Stimulus,
        /// Stimulus-to-input latency in seconds
        latency: f64,
    },
    Movement {
        t: f64,
        kind: MovementKind,
    },
    Shot {
        t: f64,
        shooter: Side,
        mode: WeaponMode,
        /// Best-effort correlation, not ground truth
        hit: bool,
    },
    ModeSwitch {
        t: f64,
        side: Side,
        from: WeaponMode,
        to: WeaponMode,
    },
    Drift {
        t: f64,
        /// Length of the no-input window in seconds
        idle: f64,
        /// False only when the session ended mid-drift
        recovered: bool,
    },
}

impl TelemetryEvent {
    pub fn timestamp(&self) -> f64 {
        match self {
            TelemetryEvent::Reaction { t, .. }
            | TelemetryEvent::Movement { t, .. }
            | TelemetryEvent::Shot { t, .. }
            | TelemetryEvent::ModeSwitch { t, .. }
            | TelemetryEvent::Drift { t, .. } => *t,
        }
    }
}
