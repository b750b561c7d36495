//! Arena configuration
//!
//! Every tunable the simulation reads lives here, grouped the way the
//! systems consume them. Defaults come from [`crate::game::constants`];
//! `load_or_default` applies environment overrides with warn-and-fallback.

use std::path::PathBuf;

use crate::game::constants::{
    ai, arena, combat, level, persist, physics, session, telemetry,
};

/// Physics tunables
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    pub gravity: f32,
    /// Horizontal damping per tick, applied as `vx *= 1.0 - friction`
    pub friction: f32,
    pub move_accel: f32,
    pub max_run_speed: f32,
    pub jump_speed: f32,
    /// Camera climb rate, units/s
    pub scroll_speed: f32,
    pub top_clamp_margin: f32,
    pub dt: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: physics::GRAVITY,
            friction: physics::FRICTION,
            move_accel: physics::MOVE_ACCEL,
            max_run_speed: physics::MAX_RUN_SPEED,
            jump_speed: physics::JUMP_SPEED,
            scroll_speed: physics::SCROLL_SPEED,
            top_clamp_margin: physics::TOP_CLAMP_MARGIN,
            dt: physics::DT,
        }
    }
}

/// Level generator tunables
#[derive(Debug, Clone)]
pub struct LevelConfig {
    pub row_spacing: f32,
    pub segment_w: f32,
    pub segment_h: f32,
    pub spacing_margin: f32,
    pub max_segments_per_side: u32,
    pub placement_attempts: u32,
    pub ahead_margin: f32,
    pub batch_rows: u32,
    pub trail_margin: f32,
    pub pickup_chance: f32,
    /// Weighted pickup kind odds (Empower : Hazard : Heal)
    pub pickup_weights: [u32; 3],
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            row_spacing: level::ROW_SPACING,
            segment_w: level::SEGMENT_W,
            segment_h: level::SEGMENT_H,
            spacing_margin: level::SPACING_MARGIN,
            max_segments_per_side: level::MAX_SEGMENTS_PER_SIDE,
            placement_attempts: level::PLACEMENT_ATTEMPTS,
            ahead_margin: level::AHEAD_MARGIN,
            batch_rows: level::BATCH_ROWS,
            trail_margin: level::TRAIL_MARGIN,
            pickup_chance: level::PICKUP_CHANCE,
            pickup_weights: level::PICKUP_WEIGHTS,
        }
    }
}

/// Combat tunables
#[derive(Debug, Clone)]
pub struct CombatConfig {
    pub max_health: f32,
    pub projectile_damage: f32,
    pub projectile_speed: f32,
    pub lob_speed: f32,
    pub projectile_gravity_factor: f32,
    pub shoot_cooldown_ticks: u32,
    pub respawn_ticks: u32,
    pub platform_max_hits: u32,
    pub heal_fraction: f32,
    pub buff_ticks: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            max_health: combat::MAX_HEALTH,
            projectile_damage: combat::PROJECTILE_DAMAGE,
            projectile_speed: combat::PROJECTILE_SPEED,
            lob_speed: combat::LOB_SPEED,
            projectile_gravity_factor: combat::PROJECTILE_GRAVITY_FACTOR,
            shoot_cooldown_ticks: combat::SHOOT_COOLDOWN_TICKS,
            respawn_ticks: combat::RESPAWN_TICKS,
            platform_max_hits: combat::PLATFORM_MAX_HITS,
            heal_fraction: combat::HEAL_FRACTION,
            buff_ticks: combat::BUFF_TICKS,
        }
    }
}

/// AI controller tunables
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub jump_cooldown_ticks: u32,
    pub align_eps: f32,
    pub urgent_gap: f32,
    pub vertical_weight: f32,
    pub horizontal_weight: f32,
    pub density_bonus: f32,
    pub strategy_interval_ticks: u32,
    pub aggressive_shoot_p: f64,
    pub defensive_shoot_p: f64,
    pub tricky_shoot_p: f64,
    pub drift_flip_p: f64,
    pub fallback_jump_gap: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            jump_cooldown_ticks: ai::JUMP_COOLDOWN_TICKS,
            align_eps: ai::ALIGN_EPS,
            urgent_gap: ai::URGENT_GAP,
            vertical_weight: ai::VERTICAL_WEIGHT,
            horizontal_weight: ai::HORIZONTAL_WEIGHT,
            density_bonus: ai::DENSITY_BONUS,
            strategy_interval_ticks: ai::STRATEGY_INTERVAL_TICKS,
            aggressive_shoot_p: ai::AGGRESSIVE_SHOOT_P,
            defensive_shoot_p: ai::DEFENSIVE_SHOOT_P,
            tricky_shoot_p: ai::TRICKY_SHOOT_P,
            drift_flip_p: ai::DRIFT_FLIP_P,
            fallback_jump_gap: ai::FALLBACK_JUMP_GAP,
        }
    }
}

/// Session tunables
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub max_ticks: u64,
    /// Fixed RNG seed for deterministic runs; None seeds from entropy
    pub seed: Option<u64>,
    pub left_spawn_frac: f32,
    pub right_spawn_frac: f32,
    pub spawn_drop: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_ticks: session::MAX_TICKS,
            seed: None,
            left_spawn_frac: session::LEFT_SPAWN_FRAC,
            right_spawn_frac: session::RIGHT_SPAWN_FRAC,
            spawn_drop: session::SPAWN_DROP,
        }
    }
}

/// Telemetry tunables
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub shot_hit_lookback_s: f64,
    pub drift_threshold_s: f64,
    pub reaction_cap_s: f64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            shot_hit_lookback_s: telemetry::SHOT_HIT_LOOKBACK_S,
            drift_threshold_s: telemetry::DRIFT_THRESHOLD_S,
            reaction_cap_s: telemetry::REACTION_CAP_S,
        }
    }
}

/// Persistence tunables
#[derive(Debug, Clone)]
pub struct PersistConfig {
    /// Directory for the durable local summary cache
    pub cache_dir: PathBuf,
    pub cache_capacity: usize,
    pub relay_capacity: usize,
    pub max_cached_file_bytes: u64,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(".summit-duel/pending"),
            cache_capacity: persist::CACHE_CAPACITY,
            relay_capacity: persist::RELAY_CAPACITY,
            max_cached_file_bytes: persist::MAX_CACHED_FILE_BYTES,
        }
    }
}

/// Complete arena configuration
#[derive(Debug, Clone, Default)]
pub struct ArenaConfig {
    pub physics: PhysicsConfig,
    pub level: LevelConfig,
    pub combat: CombatConfig,
    pub ai: AiConfig,
    pub session: SessionConfig,
    pub telemetry: TelemetryConfig,
    pub persist: PersistConfig,
}

impl ArenaConfig {
    /// View window dimensions in world units
    pub fn view_w(&self) -> f32 {
        arena::VIEW_W
    }

    pub fn view_h(&self) -> f32 {
        arena::VIEW_H
    }

    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(seed) = std::env::var("SIM_SEED") {
            if let Ok(parsed) = seed.parse::<u64>() {
                config.session.seed = Some(parsed);
            } else {
                tracing::warn!("Invalid SIM_SEED '{}', seeding from entropy", seed);
            }
        }

        if let Ok(speed) = std::env::var("SCROLL_SPEED") {
            if let Ok(parsed) = speed.parse::<f32>() {
                if parsed > 0.0 {
                    config.physics.scroll_speed = parsed;
                } else {
                    tracing::warn!("SCROLL_SPEED must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid SCROLL_SPEED '{}', using default", speed);
            }
        }

        if let Ok(ticks) = std::env::var("SESSION_MAX_TICKS") {
            if let Ok(parsed) = ticks.parse::<u64>() {
                if parsed > 0 {
                    config.session.max_ticks = parsed;
                } else {
                    tracing::warn!("SESSION_MAX_TICKS must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid SESSION_MAX_TICKS '{}', using default", ticks);
            }
        }

        if let Ok(chance) = std::env::var("PICKUP_CHANCE") {
            if let Ok(parsed) = chance.parse::<f32>() {
                if (0.0..=1.0).contains(&parsed) {
                    config.level.pickup_chance = parsed;
                } else {
                    tracing::warn!("PICKUP_CHANCE must be 0.0-1.0, using default");
                }
            } else {
                tracing::warn!("Invalid PICKUP_CHANCE '{}', using default", chance);
            }
        }

        if let Ok(dir) = std::env::var("SUMMARY_CACHE_DIR") {
            config.persist.cache_dir = PathBuf::from(dir);
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if self.physics.dt <= 0.0 {
            return Err("dt must be positive".to_string());
        }
        if !(0.0..1.0).contains(&self.physics.friction) {
            return Err("friction must be in [0, 1)".to_string());
        }
        if self.level.ahead_margin <= self.level.row_spacing {
            return Err("ahead_margin must exceed row_spacing".to_string());
        }
        if !(0.0..=1.0).contains(&self.level.pickup_chance) {
            return Err("pickup_chance must be in [0, 1]".to_string());
        }
        if self.level.pickup_weights.iter().sum::<u32>() == 0 {
            return Err("pickup_weights must not all be zero".to_string());
        }
        if self.combat.platform_max_hits == 0 {
            return Err("platform_max_hits must be at least 1".to_string());
        }
        if self.combat.respawn_ticks == 0 {
            return Err("respawn_ticks must be at least 1".to_string());
        }
        if self.session.max_ticks == 0 {
            return Err("max_ticks must be at least 1".to_string());
        }
        if self.persist.cache_capacity == 0 {
            return Err("cache_capacity must be at least 1".to_string());
        }
        Ok(())
    }
}
