//! Default arena tunables.
//!
//! Everything here is a default for [`crate::config::ArenaConfig`]; the
//! simulation reads the config, never these constants directly, so a test
//! harness can substitute deterministic values.

/// Physics constants. Coordinates are screen-style: +y is down, the camera
/// top line climbs (decreases) at `SCROLL_SPEED`.
pub mod physics {
    /// Gravity applied to vertical velocity, units/s^2
    pub const GRAVITY: f32 = 1_400.0;
    /// Horizontal damping per tick, applied as `vx *= 1.0 - FRICTION`
    pub const FRICTION: f32 = 0.16;
    /// Horizontal acceleration while a direction is held, units/s^2
    pub const MOVE_ACCEL: f32 = 2_600.0;
    /// Maximum horizontal run speed
    pub const MAX_RUN_SPEED: f32 = 260.0;
    /// Instant upward speed granted by a jump
    pub const JUMP_SPEED: f32 = 560.0;
    /// Camera climb rate, units/s
    pub const SCROLL_SPEED: f32 = 34.0;
    /// Entities may not rise above the camera top by more than this
    pub const TOP_CLAMP_MARGIN: f32 = 10.0;
    /// Simulation tick rate in Hz
    pub const TICK_RATE: u32 = 60;
    /// Delta time per tick in seconds
    pub const DT: f32 = 1.0 / 60.0;
}

/// Arena window dimensions in world units
pub mod arena {
    pub const VIEW_W: f32 = 480.0;
    pub const VIEW_H: f32 = 640.0;
    /// Combatant AABB size
    pub const ENTITY_W: f32 = 40.0;
    pub const ENTITY_H: f32 = 40.0;
}

/// Combat constants
pub mod combat {
    /// Starting and maximum combatant health
    pub const MAX_HEALTH: f32 = 100.0;
    /// Damage dealt by one projectile to a combatant
    pub const PROJECTILE_DAMAGE: f32 = 18.0;
    /// Horizontal projectile launch speed
    pub const PROJECTILE_SPEED: f32 = 420.0;
    /// Upward launch component for arcing (Lobber) shots
    pub const LOB_SPEED: f32 = 160.0;
    /// Fraction of gravity accumulated by arcing shots
    pub const PROJECTILE_GRAVITY_FACTOR: f32 = 0.5;
    /// Ticks between shots from one combatant
    pub const SHOOT_COOLDOWN_TICKS: u32 = 24;
    /// Ticks a dead AI combatant waits before resetting
    pub const RESPAWN_TICKS: u32 = 120;
    /// Hits a destructible platform survives
    pub const PLATFORM_MAX_HITS: u32 = 3;
    /// Fraction of max health restored by a Heal pickup
    pub const HEAL_FRACTION: f32 = 0.35;
    /// Duration of an Empower/Hazard shoot-enable window, in ticks
    pub const BUFF_TICKS: u32 = 360;
}

/// Level generation constants
pub mod level {
    /// Vertical distance between generated rows
    pub const ROW_SPACING: f32 = 90.0;
    /// Platform segment size
    pub const SEGMENT_W: f32 = 92.0;
    pub const SEGMENT_H: f32 = 14.0;
    /// Required clearance between accepted segments in one side+row
    pub const SPACING_MARGIN: f32 = 18.0;
    /// Candidate segments rolled per side per row (1..=this)
    pub const MAX_SEGMENTS_PER_SIDE: u32 = 3;
    /// Rejection-sampling attempt budget per candidate
    pub const PLACEMENT_ATTEMPTS: u32 = 8;
    /// Rows must extend at least this far above the camera top
    pub const AHEAD_MARGIN: f32 = 480.0;
    /// Rows appended per generation batch
    pub const BATCH_ROWS: u32 = 4;
    /// Rows are pruned once this far below the window bottom
    pub const TRAIL_MARGIN: f32 = 120.0;
    /// Chance an accepted segment carries a pickup
    pub const PICKUP_CHANCE: f32 = 0.22;
    /// Weighted pickup kind odds (Empower : Hazard : Heal)
    pub const PICKUP_WEIGHTS: [u32; 3] = [4, 3, 3];
}

/// AI controller constants
pub mod ai {
    /// Ticks between AI jumps
    pub const JUMP_COOLDOWN_TICKS: u32 = 30;
    /// Horizontal alignment tolerance for jumping at a target, units
    pub const ALIGN_EPS: f32 = 26.0;
    /// Vertical gap above which a target is "urgent" and jumped at anyway
    pub const URGENT_GAP: f32 = 180.0;
    /// Target scoring: weight on vertical proximity (up-weighted)
    pub const VERTICAL_WEIGHT: f32 = 1.0;
    /// Target scoring: weight on horizontal distance (down-weighted)
    pub const HORIZONTAL_WEIGHT: f32 = 0.35;
    /// Target scoring: bonus per extra segment in the row
    pub const DENSITY_BONUS: f32 = 0.15;
    /// Ticks between strategy re-rolls
    pub const STRATEGY_INTERVAL_TICKS: u32 = 600;
    /// Per-tick shoot probability by strategy
    pub const AGGRESSIVE_SHOOT_P: f64 = 0.035;
    pub const DEFENSIVE_SHOOT_P: f64 = 0.012;
    pub const TRICKY_SHOOT_P: f64 = 0.022;
    /// Per-tick chance the idle random walk flips direction
    pub const DRIFT_FLIP_P: f64 = 0.02;
    /// With no target, jump once the combatant sinks this far below the
    /// camera top (looser, purely vertical trigger)
    pub const FALLBACK_JUMP_GAP: f32 = 280.0;
}

/// Session constants
pub mod session {
    /// Hard tick limit for one session (3 minutes at 60 Hz)
    pub const MAX_TICKS: u64 = 10_800;
    /// Spawn x positions as fractions of the view width
    pub const LEFT_SPAWN_FRAC: f32 = 0.25;
    pub const RIGHT_SPAWN_FRAC: f32 = 0.75;
    /// Spawn height below the camera top
    pub const SPAWN_DROP: f32 = 120.0;
}

/// Telemetry constants
pub mod telemetry {
    /// Lookback window for retroactively marking a shot as a hit, seconds
    pub const SHOT_HIT_LOOKBACK_S: f64 = 2.0;
    /// No-input duration that opens a drift window, seconds
    pub const DRIFT_THRESHOLD_S: f64 = 1.25;
    /// Reactions slower than this are not attributed to the stimulus
    pub const REACTION_CAP_S: f64 = 3.0;
}

/// Persistence constants
pub mod persist {
    /// Bounded FIFO capacity of the local summary cache
    pub const CACHE_CAPACITY: usize = 16;
    /// Relay channel capacity
    pub const RELAY_CAPACITY: usize = 8;
    /// Cached summary files larger than this are skipped on load
    pub const MAX_CACHED_FILE_BYTES: u64 = 1024 * 1024;
}
