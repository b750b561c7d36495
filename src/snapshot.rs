//! Render contract
//!
//! A read-only per-tick view of the simulation: positioned, colored
//! primitives only. Nothing in here feeds back into the core.

use serde::{Deserialize, Serialize};

use crate::game::state::{GameState, OwnerSide, PickupKind, Rect, Side};
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CombatantView {
    pub side: Side,
    pub pos: Vec2,
    pub facing_right: bool,
    pub alive: bool,
    /// 0 while dead, 1 while alive; the renderer fades respawns itself
    pub alpha: f32,
    pub health_frac: f32,
    pub color: u8,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlatformView {
    pub rect: Rect,
    pub owner: OwnerSide,
    pub damage_tier: u32,
    pub color: u8,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProjectileView {
    pub pos: Vec2,
    /// Arcing shots get a different sprite
    pub arc: bool,
    pub color: u8,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ParticleView {
    pub pos: Vec2,
    pub alpha: f32,
    pub color: u8,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PickupView {
    pub pos: Vec2,
    pub kind: PickupKind,
    pub collected: bool,
}

/// Everything the render collaborator needs for one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub tick: u64,
    pub camera_top: f32,
    pub combatants: Vec<CombatantView>,
    pub platforms: Vec<PlatformView>,
    pub projectiles: Vec<ProjectileView>,
    pub particles: Vec<ParticleView>,
    pub pickups: Vec<PickupView>,
}

impl RenderSnapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            tick: state.tick,
            camera_top: state.camera.top,
            combatants: state
                .combatants
                .iter()
                .map(|c| CombatantView {
                    side: c.side,
                    pos: c.pos,
                    facing_right: c.facing_right,
                    alive: c.alive,
                    alpha: if c.alive { 1.0 } else { 0.0 },
                    health_frac: if c.max_health > 0.0 {
                        c.health / c.max_health
                    } else {
                        0.0
                    },
                    color: c.side.color_index(),
                })
                .collect(),
            platforms: state
                .platforms
                .iter()
                .map(|p| PlatformView {
                    rect: p.rect,
                    owner: p.owner,
                    damage_tier: p.damage_tier(),
                    color: p.owner.color_index(),
                })
                .collect(),
            projectiles: state
                .projectiles
                .iter()
                .map(|p| ProjectileView {
                    pos: p.pos,
                    arc: p.spec.gravity,
                    color: p.owner.color_index(),
                })
                .collect(),
            particles: state
                .particles
                .iter()
                .map(|p| ParticleView {
                    pos: p.pos,
                    alpha: p.alpha(),
                    color: p.color,
                })
                .collect(),
            pickups: state
                .pickups
                .iter()
                .map(|c| PickupView {
                    pos: c.pos,
                    kind: c.kind,
                    collected: c.collected,
                })
                .collect(),
        }
    }
}
