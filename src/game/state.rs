//! Game state definitions and structures
//!
//! Owns all simulation entities (combatants, platforms, projectiles,
//! particles, pickups) in contiguous collections. Entities reference each
//! other by id only; platform removal is deferred to end-of-tick so no
//! reference is invalidated mid-resolution.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::ArenaConfig;
use crate::util::vec2::Vec2;

/// Stable platform identifier (monotonically allocated, never reused)
pub type PlatformId = u64;

/// Combatant side. Left is the human, Right the scripted opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    /// Palette index for the render snapshot
    pub fn color_index(&self) -> u8 {
        self.index() as u8
    }
}

/// Platform ownership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnerSide {
    Left,
    Right,
    Neutral,
}

impl OwnerSide {
    /// Whether a shot from `shooter` damages a platform owned by `self`.
    /// Neutral platforms absorb everything.
    pub fn opposes(&self, shooter: Side) -> bool {
        matches!(
            (self, shooter),
            (OwnerSide::Left, Side::Right) | (OwnerSide::Right, Side::Left)
        )
    }

    pub fn color_index(&self) -> u8 {
        match self {
            OwnerSide::Left => 0,
            OwnerSide::Right => 1,
            OwnerSide::Neutral => 2,
        }
    }
}

impl From<Side> for OwnerSide {
    fn from(side: Side) -> Self {
        match side {
            Side::Left => OwnerSide::Left,
            Side::Right => OwnerSide::Right,
        }
    }
}

/// Character variant; shapes projectile behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterVariant {
    /// Straight shots
    Striker,
    /// Shots accumulate gravity and arc
    Lobber,
    /// Shots pass through the shooter's own platforms and never strike
    /// the shooter's side
    Phantom,
}

impl CharacterVariant {
    pub fn roll(rng: &mut StdRng) -> Self {
        match rng.gen_range(0..3) {
            0 => CharacterVariant::Striker,
            1 => CharacterVariant::Lobber,
            _ => CharacterVariant::Phantom,
        }
    }
}

/// Active weapon mode. Standard is the intrinsic armament (AI side);
/// the human only shoots while an Empowered or Hazard window is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponMode {
    Standard,
    Empowered,
    Hazard,
}

/// Time-boxed combat modifier from a pickup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveBuff {
    pub mode: WeaponMode,
    /// Remaining window, decremented once per tick
    pub remaining: u32,
}

/// Axis-aligned rectangle, top-left anchored
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w * 0.5
    }
}

/// A player or AI combatant. The roster is fixed at two; death flips
/// `alive` and starts `respawn_ticks`, it never removes the entity.
#[derive(Debug, Clone)]
pub struct Combatant {
    pub side: Side,
    pub pos: Vec2,
    pub vel: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub facing_right: bool,
    pub shoot_cooldown: u32,
    /// Platform last stood on; change detection drives landing damage
    pub last_platform: Option<PlatformId>,
    pub alive: bool,
    /// Counts up while dead, monotonically, until the respawn threshold
    pub respawn_ticks: u32,
    pub variant: CharacterVariant,
    pub buff: Option<ActiveBuff>,
    pub grounded: bool,
}

impl Combatant {
    pub fn new(side: Side, variant: CharacterVariant, pos: Vec2, max_health: f32) -> Self {
        Self {
            side,
            pos,
            vel: Vec2::ZERO,
            health: max_health,
            max_health,
            facing_right: side == Side::Left,
            shoot_cooldown: 0,
            last_platform: None,
            alive: true,
            respawn_ticks: 0,
            variant,
            buff: None,
            grounded: false,
        }
    }

    /// Loose arcade AABB centered on `pos`
    pub fn aabb(&self) -> Rect {
        use crate::game::constants::arena::{ENTITY_H, ENTITY_W};
        Rect::new(
            self.pos.x - ENTITY_W * 0.5,
            self.pos.y - ENTITY_H * 0.5,
            ENTITY_W,
            ENTITY_H,
        )
    }

    /// Apply damage, clamping health into `[0, max_health]`.
    /// Returns true if this was the killing blow.
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        debug_assert!(amount >= 0.0, "damage must be non-negative");
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        self.alive && self.health <= 0.0
    }

    pub fn heal_fraction(&mut self, fraction: f32) {
        self.health = (self.health + self.max_health * fraction).min(self.max_health);
    }

    pub fn weapon_mode(&self) -> WeaponMode {
        self.buff.map(|b| b.mode).unwrap_or(WeaponMode::Standard)
    }

    /// Whether this combatant may fire right now (cooldown aside).
    /// The AI side is always armed; the human needs an open buff window.
    pub fn shoot_enabled(&self) -> bool {
        match self.side {
            Side::Right => true,
            Side::Left => self.buff.is_some(),
        }
    }
}

/// A platform segment
#[derive(Debug, Clone)]
pub struct Platform {
    pub id: PlatformId,
    pub rect: Rect,
    /// Accumulated hits; non-decreasing for the platform's lifetime
    pub hits: u32,
    pub max_hits: u32,
    pub owner: OwnerSide,
}

impl Platform {
    pub fn is_destroyed(&self) -> bool {
        self.hits >= self.max_hits
    }

    /// Damage tier for rendering: 0 pristine, rising toward max_hits - 1
    pub fn damage_tier(&self) -> u32 {
        self.hits.min(self.max_hits.saturating_sub(1))
    }
}

/// Projectile flight and damage behavior, fixed at fire time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSpec {
    /// Accumulates a fraction of gravity each tick
    pub gravity: bool,
    pub damages_platforms: bool,
    pub damages_entities: bool,
    /// Shooter-side platforms are passed through instead of absorbing
    pub passes_own_platforms: bool,
    /// Entities of this side are never struck
    pub bypass: Option<Side>,
}

/// A live projectile
#[derive(Debug, Clone)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub owner: Side,
    pub spec: ProjectileSpec,
}

/// Cosmetic particle; no collision, no gameplay effect
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining life in ticks; removed at 0
    pub life: u32,
    pub max_life: u32,
    pub color: u8,
}

impl Particle {
    pub fn alpha(&self) -> f32 {
        if self.max_life == 0 {
            0.0
        } else {
            self.life as f32 / self.max_life as f32
        }
    }
}

/// Pickup kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Empower,
    Hazard,
    Heal,
}

/// A coin riding a platform. Once collected it is permanently inert.
#[derive(Debug, Clone)]
pub struct Pickup {
    pub platform_id: PlatformId,
    pub pos: Vec2,
    pub kind: PickupKind,
    pub collected: bool,
}

/// The scrolling camera. `top` is the leading edge and decreases as the
/// arena climbs.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub top: f32,
    pub view_h: f32,
}

impl Camera {
    pub fn bottom(&self) -> f32 {
        self.top + self.view_h
    }

    pub fn advance(&mut self, scroll_speed: f32, dt: f32) {
        self.top -= scroll_speed * dt;
    }

    /// Band test for "currently visible" platforms; a small slack keeps
    /// entities landing right at the edges well-behaved
    pub fn in_band(&self, y: f32, slack: f32) -> bool {
        y >= self.top - slack && y <= self.bottom() + slack
    }
}

/// Complete simulation state
#[derive(Debug)]
pub struct GameState {
    pub tick: u64,
    pub camera: Camera,
    pub combatants: [Combatant; 2],
    pub platforms: Vec<Platform>,
    pub projectiles: Vec<Projectile>,
    pub particles: Vec<Particle>,
    pub pickups: Vec<Pickup>,
    pub rng: StdRng,
    /// Highest (smallest y) generated row; the generation frontier
    pub min_generated_y: f32,
    next_platform_id: PlatformId,
    pending_platform_removals: SmallVec<[PlatformId; 8]>,
}

impl GameState {
    pub fn new(config: &ArenaConfig) -> Self {
        let mut rng = match config.session.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let view_w = config.view_w();
        let view_h = config.view_h();
        let camera = Camera {
            top: 0.0,
            view_h,
        };
        let spawn_y = config.session.spawn_drop;
        let left = Combatant::new(
            Side::Left,
            CharacterVariant::roll(&mut rng),
            Vec2::new(view_w * config.session.left_spawn_frac, spawn_y),
            config.combat.max_health,
        );
        let right = Combatant::new(
            Side::Right,
            CharacterVariant::roll(&mut rng),
            Vec2::new(view_w * config.session.right_spawn_frac, spawn_y),
            config.combat.max_health,
        );
        Self {
            tick: 0,
            camera,
            combatants: [left, right],
            platforms: Vec::with_capacity(64),
            projectiles: Vec::new(),
            particles: Vec::new(),
            pickups: Vec::new(),
            rng,
            min_generated_y: f32::INFINITY,
            next_platform_id: 0,
            pending_platform_removals: SmallVec::new(),
        }
    }

    pub fn combatant(&self, side: Side) -> &Combatant {
        &self.combatants[side.index()]
    }

    pub fn combatant_mut(&mut self, side: Side) -> &mut Combatant {
        &mut self.combatants[side.index()]
    }

    /// Spawn a platform, returning its stable id
    pub fn spawn_platform(&mut self, rect: Rect, owner: OwnerSide, max_hits: u32) -> PlatformId {
        let id = self.next_platform_id;
        self.next_platform_id += 1;
        self.platforms.push(Platform {
            id,
            rect,
            hits: 0,
            max_hits,
            owner,
        });
        if rect.y < self.min_generated_y {
            self.min_generated_y = rect.y;
        }
        id
    }

    pub fn platform(&self, id: PlatformId) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.id == id)
    }

    pub fn spawn_projectile(&mut self, projectile: Projectile) {
        self.projectiles.push(projectile);
    }

    pub fn spawn_pickup(&mut self, platform_id: PlatformId, pos: Vec2, kind: PickupKind) {
        self.pickups.push(Pickup {
            platform_id,
            pos,
            kind,
            collected: false,
        });
    }

    /// Queue a platform for removal at end-of-tick. Safe to call while
    /// iterating; duplicates are collapsed.
    pub fn queue_platform_removal(&mut self, id: PlatformId) {
        if !self.pending_platform_removals.contains(&id) {
            self.pending_platform_removals.push(id);
        }
    }

    pub fn pending_removal(&self, id: PlatformId) -> bool {
        self.pending_platform_removals.contains(&id)
    }

    /// Apply deferred platform removals: drop the platforms, emit an
    /// explosion burst in each owner's color, and drop carried pickups.
    pub fn apply_platform_removals(&mut self) {
        if self.pending_platform_removals.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending_platform_removals);
        for id in &pending {
            if let Some(platform) = self.platforms.iter().find(|p| p.id == *id) {
                let center = Vec2::new(platform.rect.center_x(), platform.rect.y);
                let color = platform.owner.color_index();
                crate::game::systems::particles::explosion_burst(
                    &mut self.particles,
                    &mut self.rng,
                    center,
                    color,
                );
            }
        }
        self.platforms.retain(|p| !pending.contains(&p.id));
        self.pickups.retain(|c| !pending.contains(&c.platform_id));
    }

    /// Visible platforms in stable spawn order (deterministic iteration)
    pub fn visible_platforms(&self, slack: f32) -> impl Iterator<Item = &Platform> {
        let camera = self.camera;
        self.platforms
            .iter()
            .filter(move |p| camera.in_band(p.rect.y, slack))
    }
}
