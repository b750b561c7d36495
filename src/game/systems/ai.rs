//! Scripted opponent controller
//!
//! A per-tick utility evaluator, not a planner: it rescans the human
//! side's visible platforms, scores rows by vertical proximity (weighted
//! up), horizontal distance (weighted down) and segment density, steers
//! at the best target, and gates its jumps and shots on cooldowns plus a
//! stochastic strategy tag. Intentionally beatable and legible rather
//! than adversarial-optimal.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;

use crate::config::ArenaConfig;
use crate::game::input::InputState;
use crate::game::state::{GameState, OwnerSide, Side};

const BAND_SLACK: f32 = 48.0;

/// Coarse behavior tag, re-rolled every fixed interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Aggressive,
    Defensive,
    Tricky,
}

#[derive(Debug, Clone, Copy)]
struct RowTarget {
    y: f32,
    center_x: f32,
    dx: f32,
    count: u32,
}

/// Controller state for the Right-side combatant
#[derive(Debug)]
pub struct AiController {
    strategy: Strategy,
    strategy_ticks: u32,
    jump_cooldown: u32,
    /// Idle random-walk direction: -1, 0 or 1
    drift_dir: i8,
    rng: StdRng,
}

impl AiController {
    pub fn new(config: &ArenaConfig) -> Self {
        // Offset the seed so the controller's stream stays independent of
        // the world rng
        let rng = match config.session.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(0x9E37_79B9_7F4A_7C15)),
            None => StdRng::from_entropy(),
        };
        Self {
            strategy: Strategy::Defensive,
            strategy_ticks: 0,
            jump_cooldown: 0,
            drift_dir: 0,
            rng,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Produce this tick's intent. Always returns a valid intent, even
    /// with no legal target anywhere in view.
    pub fn decide(&mut self, state: &GameState, config: &ArenaConfig) -> InputState {
        self.jump_cooldown = self.jump_cooldown.saturating_sub(1);

        self.strategy_ticks += 1;
        if self.strategy_ticks >= config.ai.strategy_interval_ticks {
            self.strategy_ticks = 0;
            self.strategy = match self.rng.gen_range(0..3) {
                0 => Strategy::Aggressive,
                1 => Strategy::Defensive,
                _ => Strategy::Tricky,
            };
            tracing::debug!("AI strategy re-rolled to {:?}", self.strategy);
        }

        let bot = state.combatant(Side::Right);
        if !bot.alive {
            return InputState::default();
        }

        let mut input = InputState::default();
        let target = self.best_target(state, config);

        match target {
            Some(t) => {
                let half_eps = config.ai.align_eps * 0.5;
                if t.center_x < bot.pos.x - half_eps {
                    input.left = true;
                } else if t.center_x > bot.pos.x + half_eps {
                    input.right = true;
                }

                if bot.grounded && self.jump_cooldown == 0 {
                    let aligned = t.dx <= config.ai.align_eps;
                    let urgent = bot.pos.y - t.y > config.ai.urgent_gap;
                    if aligned || urgent {
                        input.jump = true;
                        self.jump_cooldown = config.ai.jump_cooldown_ticks;
                    }
                }
            }
            None => {
                // Idle drift fallback: hold a direction, occasionally
                // re-rolling it
                if self.rng.gen_bool(config.ai.drift_flip_p) {
                    self.drift_dir = self.rng.gen_range(-1..=1);
                }
                match self.drift_dir {
                    -1 => input.left = true,
                    1 => input.right = true,
                    _ => {}
                }

                // Looser jump trigger keyed purely on the vertical gap to
                // the camera top
                if bot.grounded
                    && self.jump_cooldown == 0
                    && bot.pos.y - state.camera.top > config.ai.fallback_jump_gap
                {
                    input.jump = true;
                    self.jump_cooldown = config.ai.jump_cooldown_ticks;
                }
            }
        }

        let shoot_p = match self.strategy {
            Strategy::Aggressive => config.ai.aggressive_shoot_p,
            Strategy::Defensive => config.ai.defensive_shoot_p,
            Strategy::Tricky => config.ai.tricky_shoot_p,
        };
        input.shoot = self.rng.gen_bool(shoot_p);

        input
    }

    /// Score visible Left-owned rows and pick the best. Each row is
    /// represented by its nearest segment.
    fn best_target(&self, state: &GameState, config: &ArenaConfig) -> Option<RowTarget> {
        let bot = state.combatant(Side::Right);
        let view_w = config.view_w();
        let view_h = config.view_h();

        let mut rows: SmallVec<[RowTarget; 8]> = SmallVec::new();
        for platform in state.visible_platforms(BAND_SLACK) {
            if platform.owner != OwnerSide::Left
                || platform.is_destroyed()
                || state.pending_removal(platform.id)
            {
                continue;
            }
            let center_x = platform.rect.center_x();
            let dx = (center_x - bot.pos.x).abs();
            match rows
                .iter_mut()
                .find(|r| (r.y - platform.rect.y).abs() < 1.0)
            {
                Some(row) => {
                    row.count += 1;
                    if dx < row.dx {
                        row.dx = dx;
                        row.center_x = center_x;
                    }
                }
                None => rows.push(RowTarget {
                    y: platform.rect.y,
                    center_x,
                    dx,
                    count: 1,
                }),
            }
        }

        rows.into_iter().max_by(|a, b| {
            let sa = self.score(a, bot.pos.y, view_w, view_h, config);
            let sb = self.score(b, bot.pos.y, view_w, view_h, config);
            sa.partial_cmp(&sb).unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    fn score(
        &self,
        row: &RowTarget,
        bot_y: f32,
        view_w: f32,
        view_h: f32,
        config: &ArenaConfig,
    ) -> f32 {
        let vertical_proximity = 1.0 - ((bot_y - row.y).abs() / view_h).clamp(0.0, 1.0);
        let horizontal_distance = (row.dx / view_w).clamp(0.0, 1.0);
        config.ai.vertical_weight * vertical_proximity
            - config.ai.horizontal_weight * horizontal_distance
            + config.ai.density_bonus * row.count.saturating_sub(1) as f32
    }
}
