//! Simulation systems, run once per tick in a fixed order:
//! level generation, entity physics, projectile resolution, deferred
//! platform removal, particle decay, pruning.

pub mod ai;
pub mod level;
pub mod particles;
pub mod physics;
pub mod projectile;

use crate::game::state::{OwnerSide, PickupKind, PlatformId, Side, WeaponMode};

/// Facts computed by the systems during one tick. The session loop
/// translates these into telemetry hooks and end-of-session handling;
/// the systems themselves never talk to the recorder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    /// First tick of a landing on a platform (`chipped` = the landing
    /// counted a hit against it)
    Landed {
        side: Side,
        platform: PlatformId,
        chipped: bool,
    },
    PlatformDestroyed {
        platform: PlatformId,
        owner: OwnerSide,
    },
    ShotFired {
        side: Side,
        mode: WeaponMode,
    },
    ProjectileHit {
        shooter: Side,
        target: Side,
        lethal: bool,
    },
    FallDeath {
        side: Side,
    },
    PickupTaken {
        side: Side,
        kind: PickupKind,
    },
    ModeSwitch {
        side: Side,
        from: WeaponMode,
        to: WeaponMode,
    },
    Respawned {
        side: Side,
    },
}
