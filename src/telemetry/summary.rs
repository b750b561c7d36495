//! Session aggregation
//!
//! Folds a finished session's event log into per-category scalar
//! summaries and a cognitive-profile vector. The fold is a pure function
//! of the log: re-running it over the same log yields byte-identical
//! output, and there are no running accumulators to diverge from it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::constants::telemetry::REACTION_CAP_S;
use crate::game::state::Side;
use crate::telemetry::{MovementKind, TelemetryEvent};

/// Minimal session identity handed to persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMeta {
    pub id: Uuid,
    pub started_unix_ms: u64,
}

/// Why the session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// The human combatant fell out of the window
    HumanFell,
    /// The human combatant was shot down
    HumanSlain,
    /// The session tick limit elapsed
    TickLimit,
    /// The host left mid-session; the partial log was still flushed
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReactionStats {
    pub count: u32,
    pub mean_latency: f64,
    pub min_latency: f64,
    pub max_latency: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MovementStats {
    pub jumps: u32,
    pub direction_changes: u32,
    pub events_per_minute: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ShotStats {
    /// Shots fired by the human side
    pub fired: u32,
    /// Of those, shots retro-correlated with an impact
    pub hits: u32,
    pub accuracy: f64,
    /// Shots the opponent fired at the human
    pub incoming: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DriftStats {
    pub count: u32,
    pub mean_idle: f64,
    pub recovery_ratio: f64,
}

/// Normalized behavioral feature vector, each component in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CognitiveProfile {
    pub attention: f64,
    pub reactivity: f64,
    pub precision: f64,
    pub adaptability: f64,
}

/// The single artifact handed to the persistence collaborator,
/// write-once at session end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub schema_version: u32,
    pub session_id: Uuid,
    pub started_unix_ms: u64,
    pub ended_unix_ms: u64,
    pub ticks: u64,
    pub duration_s: f64,
    pub end: EndReason,
    pub reactions: ReactionStats,
    pub movement: MovementStats,
    pub shots: ShotStats,
    pub drift: DriftStats,
    pub mode_switches: u32,
    pub profile: CognitiveProfile,
    /// The full immutable event log
    pub events: Vec<TelemetryEvent>,
}

pub const SCHEMA_VERSION: u32 = 1;

/// Fold the event log into a summary. Pure and deterministic; safe to
/// re-run from the log alone.
pub fn summarize(
    meta: &SessionMeta,
    end: EndReason,
    ended_unix_ms: u64,
    ticks: u64,
    duration_s: f64,
    events: &[TelemetryEvent],
) -> SessionSummary {
    let minutes = (duration_s / 60.0).max(1.0 / 60.0);

    let mut reactions = ReactionStats {
        min_latency: f64::INFINITY,
        ..Default::default()
    };
    let mut latency_sum = 0.0;
    let mut movement = MovementStats::default();
    let mut shots = ShotStats::default();
    let mut drift = DriftStats::default();
    let mut idle_sum = 0.0;
    let mut recovered = 0u32;
    let mut mode_switches = 0u32;

    for event in events {
        match event {
            TelemetryEvent::Reaction { latency, .. } => {
                reactions.count += 1;
                latency_sum += latency;
                reactions.min_latency = reactions.min_latency.min(*latency);
                reactions.max_latency = reactions.max_latency.max(*latency);
            }
            TelemetryEvent::Movement { kind, .. } => match kind {
                MovementKind::Jump => movement.jumps += 1,
                MovementKind::DirectionChange => movement.direction_changes += 1,
            },
            TelemetryEvent::Shot { shooter, hit, .. } => match shooter {
                Side::Left => {
                    shots.fired += 1;
                    if *hit {
                        shots.hits += 1;
                    }
                }
                Side::Right => shots.incoming += 1,
            },
            TelemetryEvent::ModeSwitch { .. } => mode_switches += 1,
            TelemetryEvent::Drift {
                idle,
                recovered: r,
                ..
            } => {
                drift.count += 1;
                idle_sum += idle;
                if *r {
                    recovered += 1;
                }
            }
        }
    }

    if reactions.count > 0 {
        reactions.mean_latency = latency_sum / reactions.count as f64;
    } else {
        reactions.min_latency = 0.0;
    }
    movement.events_per_minute =
        (movement.jumps + movement.direction_changes) as f64 / minutes;
    if shots.fired > 0 {
        shots.accuracy = shots.hits as f64 / shots.fired as f64;
    }
    if drift.count > 0 {
        drift.mean_idle = idle_sum / drift.count as f64;
        drift.recovery_ratio = recovered as f64 / drift.count as f64;
    }

    let profile = derive_profile(&reactions, &shots, &drift, mode_switches, &movement, minutes);

    SessionSummary {
        schema_version: SCHEMA_VERSION,
        session_id: meta.id,
        started_unix_ms: meta.started_unix_ms,
        ended_unix_ms,
        ticks,
        duration_s,
        end,
        reactions,
        movement,
        shots,
        drift,
        mode_switches,
        profile,
        events: events.to_vec(),
    }
}

fn derive_profile(
    reactions: &ReactionStats,
    shots: &ShotStats,
    drift: &DriftStats,
    mode_switches: u32,
    movement: &MovementStats,
    minutes: f64,
) -> CognitiveProfile {
    let drifts_per_minute = drift.count as f64 / minutes;
    let attention = (1.0 / (1.0 + drifts_per_minute))
        * (0.5 + 0.5 * if drift.count > 0 { drift.recovery_ratio } else { 1.0 });

    let reactivity = if reactions.count > 0 {
        (1.0 - reactions.mean_latency / REACTION_CAP_S).clamp(0.0, 1.0)
    } else {
        0.5
    };

    let precision = if shots.fired > 0 { shots.accuracy } else { 0.5 };

    let switch_rate =
        (mode_switches as f64 + movement.direction_changes as f64) / minutes;
    let adaptability = (switch_rate / 20.0).clamp(0.0, 1.0);

    CognitiveProfile {
        attention: attention.clamp(0.0, 1.0),
        reactivity,
        precision,
        adaptability,
    }
}
