//! Procedural level generation
//!
//! Keeps platform rows extending at least `ahead_margin` units above the
//! camera's leading edge, appending batches of rows on demand and pruning
//! rows that fall behind the trailing window. Segment placement uses
//! rejection sampling with a fixed attempt budget; exhausting the budget
//! just yields a sparser row, never an error.

use rand::rngs::StdRng;
use rand::Rng;
use smallvec::SmallVec;

use crate::config::ArenaConfig;
use crate::game::constants::arena::ENTITY_H;
use crate::game::state::{GameState, OwnerSide, PickupKind, PlatformId, Rect};
use crate::util::vec2::Vec2;

/// Horizontal padding at the arena edges and the center seam
const EDGE_PAD: f32 = 8.0;

#[derive(Debug, Clone, Copy)]
struct SegmentPlan {
    x: f32,
    pickup: Option<PickupKind>,
}

/// Spawn the neutral floor under both combatants and fill the initial
/// window. Called once at session start.
pub fn bootstrap(state: &mut GameState, config: &ArenaConfig) {
    let floor_y = config.session.spawn_drop + ENTITY_H * 0.5;
    state.spawn_platform(
        Rect::new(0.0, floor_y, config.view_w(), config.level.segment_h),
        OwnerSide::Neutral,
        u32::MAX,
    );
    state.min_generated_y = floor_y;
    ensure_ahead(state, config);
}

/// Maintain the ahead-guarantee: rows exist at least `ahead_margin`
/// units above the camera top. Pull-based; cheap when already satisfied.
pub fn ensure_ahead(state: &mut GameState, config: &ArenaConfig) {
    let spacing = config.level.row_spacing;
    if !state.min_generated_y.is_finite() {
        state.min_generated_y = state.camera.top;
    }
    while state.camera.top - state.min_generated_y < config.level.ahead_margin {
        let base = state.min_generated_y;
        for k in 1..=config.level.batch_rows {
            let y = base - k as f32 * spacing;
            generate_row(state, config, y);
        }
        // Advance the frontier even if every row starved, so generation
        // cannot stall on degenerate tunables
        let frontier = base - config.level.batch_rows as f32 * spacing;
        if frontier < state.min_generated_y {
            state.min_generated_y = frontier;
        }
    }
}

/// Drop rows that have fallen behind the trailing window, with their
/// pickups
pub fn prune(state: &mut GameState, config: &ArenaConfig) {
    let cutoff = state.camera.bottom() + config.level.trail_margin;
    let mut removed: SmallVec<[PlatformId; 8]> = SmallVec::new();
    for platform in &state.platforms {
        if platform.rect.y > cutoff {
            removed.push(platform.id);
        }
    }
    if removed.is_empty() {
        return;
    }
    state.platforms.retain(|p| !removed.contains(&p.id));
    state.pickups.retain(|c| !removed.contains(&c.platform_id));
    tracing::debug!("pruned {} trailing platforms", removed.len());
}

/// Generate one row: 1-3 candidate segments per side, rejection sampled
fn generate_row(state: &mut GameState, config: &ArenaConfig, y: f32) {
    let view_w = config.view_w();
    let seg_w = config.level.segment_w;
    let seg_h = config.level.segment_h;
    let half = view_w * 0.5;

    for owner in [OwnerSide::Left, OwnerSide::Right] {
        let (band_lo, band_hi) = match owner {
            OwnerSide::Left => (EDGE_PAD, half - seg_w - EDGE_PAD),
            OwnerSide::Right => (half + EDGE_PAD, view_w - seg_w - EDGE_PAD),
            OwnerSide::Neutral => unreachable!(),
        };
        if band_hi <= band_lo {
            // Segment cannot fit the band at all; the row stays empty
            // on this side
            continue;
        }

        let plans = plan_side(&mut state.rng, config, band_lo, band_hi);
        for plan in plans {
            let id = state.spawn_platform(
                Rect::new(plan.x, y, seg_w, seg_h),
                owner,
                config.combat.platform_max_hits,
            );
            if let Some(kind) = plan.pickup {
                state.spawn_pickup(id, Vec2::new(plan.x + seg_w * 0.5, y - 10.0), kind);
            }
        }
    }
}

/// Rejection-sample segment positions for one side of one row
fn plan_side(
    rng: &mut StdRng,
    config: &ArenaConfig,
    band_lo: f32,
    band_hi: f32,
) -> SmallVec<[SegmentPlan; 3]> {
    let clearance = config.level.segment_w + config.level.spacing_margin;
    let count = rng.gen_range(1..=config.level.max_segments_per_side);
    let mut plans: SmallVec<[SegmentPlan; 3]> = SmallVec::new();

    'candidate: for _ in 0..count {
        for _ in 0..config.level.placement_attempts {
            let x = rng.gen_range(band_lo..band_hi);
            if plans.iter().all(|p| (p.x - x).abs() >= clearance) {
                let pickup = if rng.gen::<f32>() < config.level.pickup_chance {
                    Some(roll_pickup_kind(rng, &config.level.pickup_weights))
                } else {
                    None
                };
                plans.push(SegmentPlan { x, pickup });
                continue 'candidate;
            }
        }
        // Attempt budget exhausted: drop this candidate
    }
    plans
}

fn roll_pickup_kind(rng: &mut StdRng, weights: &[u32; 3]) -> PickupKind {
    let total: u32 = weights.iter().sum();
    let mut roll = rng.gen_range(0..total);
    for (i, w) in weights.iter().enumerate() {
        if roll < *w {
            return match i {
                0 => PickupKind::Empower,
                1 => PickupKind::Hazard,
                _ => PickupKind::Heal,
            };
        }
        roll -= w;
    }
    PickupKind::Heal
}
