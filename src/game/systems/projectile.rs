//! Projectile firing and resolution
//!
//! Shots are created by a fire intent subject to a per-combatant cooldown
//! and the shoot-enable rules, then resolved with at most one collision
//! outcome per projectile per tick: visible platforms are checked before
//! entities, first match wins.

use smallvec::SmallVec;

use crate::config::ArenaConfig;
use crate::game::constants::arena::ENTITY_W;
use crate::game::state::{
    CharacterVariant, GameState, OwnerSide, PlatformId, Projectile, ProjectileSpec, Side,
    WeaponMode,
};
use crate::game::systems::{particles, physics, SimEvent};
use crate::util::vec2::Vec2;

const BAND_SLACK: f32 = 48.0;
/// Projectiles this far outside the vertical window are culled
const CULL_MARGIN: f32 = 60.0;

/// Derive flight and damage behavior from the shooter's variant and
/// active weapon mode
pub fn projectile_spec(
    variant: CharacterVariant,
    mode: WeaponMode,
    shooter: Side,
) -> ProjectileSpec {
    let mut spec = ProjectileSpec {
        gravity: variant == CharacterVariant::Lobber,
        damages_platforms: true,
        damages_entities: true,
        passes_own_platforms: variant == CharacterVariant::Phantom,
        bypass: if variant == CharacterVariant::Phantom {
            Some(shooter)
        } else {
            None
        },
    };
    match mode {
        WeaponMode::Standard | WeaponMode::Empowered => {}
        // Entity-only damage window
        WeaponMode::Hazard => spec.damages_platforms = false,
    }
    spec
}

/// Attempt to fire for one side. Returns true if a projectile spawned.
pub fn try_fire(
    state: &mut GameState,
    config: &ArenaConfig,
    side: Side,
    events: &mut Vec<SimEvent>,
) -> bool {
    let cooldown = config.combat.shoot_cooldown_ticks;
    let speed = config.combat.projectile_speed;
    let lob = config.combat.lob_speed;

    let combatant = state.combatant_mut(side);
    if !combatant.alive || combatant.shoot_cooldown > 0 || !combatant.shoot_enabled() {
        return false;
    }

    let mode = combatant.weapon_mode();
    let spec = projectile_spec(combatant.variant, mode, side);
    let dir = if combatant.facing_right { 1.0 } else { -1.0 };
    let pos = combatant.pos + Vec2::new(dir * (ENTITY_W * 0.5 + 6.0), -4.0);
    let vel = Vec2::new(dir * speed, if spec.gravity { -lob } else { 0.0 });
    combatant.shoot_cooldown = cooldown;

    state.spawn_projectile(Projectile {
        pos,
        vel,
        owner: side,
        spec,
    });
    events.push(SimEvent::ShotFired { side, mode });
    true
}

/// Integrate and resolve all live projectiles
pub fn update(state: &mut GameState, config: &ArenaConfig, events: &mut Vec<SimEvent>) {
    let dt = config.physics.dt;
    let arc_gravity = config.physics.gravity * config.combat.projectile_gravity_factor;
    let damage = config.combat.projectile_damage;
    let mut destroyed: SmallVec<[PlatformId; 4]> = SmallVec::new();

    {
        let GameState {
            camera,
            combatants,
            platforms,
            projectiles,
            particles: particle_store,
            rng,
            ..
        } = state;

        projectiles.retain_mut(|proj| {
            if proj.spec.gravity {
                proj.vel.y += arc_gravity * dt;
            }
            proj.pos += proj.vel * dt;

            // Off-window cull
            if proj.pos.y < camera.top - CULL_MARGIN || proj.pos.y > camera.bottom() + CULL_MARGIN
            {
                return false;
            }

            // Platforms first
            for platform in platforms.iter_mut() {
                if !camera.in_band(platform.rect.y, BAND_SLACK) || platform.is_destroyed() {
                    continue;
                }
                if !platform.rect.contains(proj.pos) {
                    continue;
                }
                if proj.spec.passes_own_platforms
                    && platform.owner == OwnerSide::from(proj.owner)
                {
                    continue;
                }

                if proj.spec.damages_platforms && platform.owner.opposes(proj.owner) {
                    platform.hits = platform.hits.saturating_add(1);
                    particles::impact_burst(
                        particle_store,
                        rng,
                        proj.pos,
                        platform.owner.color_index(),
                    );
                    if platform.is_destroyed() {
                        destroyed.push(platform.id);
                        events.push(SimEvent::PlatformDestroyed {
                            platform: platform.id,
                            owner: platform.owner,
                        });
                    }
                } else {
                    // Absorbed as a neutral impact
                    particles::impact_burst(
                        particle_store,
                        rng,
                        proj.pos,
                        OwnerSide::Neutral.color_index(),
                    );
                }
                return false;
            }

            // Then entities
            for target in combatants.iter_mut() {
                if target.side == proj.owner || !target.alive {
                    continue;
                }
                if proj.spec.bypass == Some(target.side) {
                    continue;
                }
                if !proj.spec.damages_entities {
                    continue;
                }
                if !target.aabb().contains(proj.pos) {
                    continue;
                }

                let lethal = target.apply_damage(damage);
                particles::impact_burst(
                    particle_store,
                    rng,
                    proj.pos,
                    target.side.color_index(),
                );
                if lethal {
                    physics::kill(target);
                }
                events.push(SimEvent::ProjectileHit {
                    shooter: proj.owner,
                    target: target.side,
                    lethal,
                });
                return false;
            }

            true
        });
    }

    for id in destroyed {
        state.queue_platform_removal(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{ActiveBuff, Rect};

    fn test_setup() -> (GameState, ArenaConfig) {
        let mut config = ArenaConfig::default();
        config.session.seed = Some(42);
        let state = GameState::new(&config);
        (state, config)
    }

    fn spawn_shot(state: &mut GameState, owner: Side, pos: Vec2, vel: Vec2, spec: ProjectileSpec) {
        state.spawn_projectile(Projectile {
            pos,
            vel,
            owner,
            spec,
        });
    }

    fn standard_spec(owner: Side) -> ProjectileSpec {
        projectile_spec(CharacterVariant::Striker, WeaponMode::Standard, owner)
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let (mut state, config) = test_setup();
        let mut events = Vec::new();
        assert!(try_fire(&mut state, &config, Side::Right, &mut events));
        assert!(!try_fire(&mut state, &config, Side::Right, &mut events));
        assert_eq!(state.projectiles.len(), 1);
    }

    #[test]
    fn test_human_fire_needs_buff_window() {
        let (mut state, config) = test_setup();
        let mut events = Vec::new();
        assert!(!try_fire(&mut state, &config, Side::Left, &mut events));

        state.combatant_mut(Side::Left).buff = Some(ActiveBuff {
            mode: WeaponMode::Empowered,
            remaining: 60,
        });
        assert!(try_fire(&mut state, &config, Side::Left, &mut events));
        assert!(events.contains(&SimEvent::ShotFired {
            side: Side::Left,
            mode: WeaponMode::Empowered,
        }));
    }

    #[test]
    fn test_opposing_platform_takes_damage() {
        let (mut state, config) = test_setup();
        let id = state.spawn_platform(Rect::new(200.0, 100.0, 92.0, 14.0), OwnerSide::Left, 3);
        spawn_shot(
            &mut state,
            Side::Right,
            Vec2::new(246.0, 107.0),
            Vec2::ZERO,
            standard_spec(Side::Right),
        );

        let mut events = Vec::new();
        update(&mut state, &config, &mut events);

        assert_eq!(state.platform(id).unwrap().hits, 1);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_own_platform_absorbs_without_damage() {
        let (mut state, config) = test_setup();
        let id = state.spawn_platform(Rect::new(200.0, 100.0, 92.0, 14.0), OwnerSide::Right, 3);
        spawn_shot(
            &mut state,
            Side::Right,
            Vec2::new(246.0, 107.0),
            Vec2::ZERO,
            standard_spec(Side::Right),
        );

        let mut events = Vec::new();
        update(&mut state, &config, &mut events);

        assert_eq!(state.platform(id).unwrap().hits, 0);
        assert!(state.projectiles.is_empty(), "shot still consumed");
    }

    #[test]
    fn test_phantom_shot_passes_own_platform() {
        let (mut state, config) = test_setup();
        let id = state.spawn_platform(Rect::new(200.0, 100.0, 92.0, 14.0), OwnerSide::Right, 3);
        let spec = projectile_spec(CharacterVariant::Phantom, WeaponMode::Standard, Side::Right);
        spawn_shot(
            &mut state,
            Side::Right,
            Vec2::new(246.0, 107.0),
            Vec2::ZERO,
            spec,
        );

        let mut events = Vec::new();
        update(&mut state, &config, &mut events);

        assert_eq!(state.platform(id).unwrap().hits, 0);
        assert_eq!(state.projectiles.len(), 1, "shot passes through");
    }

    #[test]
    fn test_hazard_shot_never_damages_platforms() {
        let (mut state, config) = test_setup();
        let id = state.spawn_platform(Rect::new(200.0, 100.0, 92.0, 14.0), OwnerSide::Left, 3);
        let spec = projectile_spec(CharacterVariant::Striker, WeaponMode::Hazard, Side::Right);
        spawn_shot(
            &mut state,
            Side::Right,
            Vec2::new(246.0, 107.0),
            Vec2::ZERO,
            spec,
        );

        let mut events = Vec::new();
        update(&mut state, &config, &mut events);

        assert_eq!(state.platform(id).unwrap().hits, 0);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_platform_destroyed_exactly_once_at_max_hits() {
        let (mut state, config) = test_setup();
        let id = state.spawn_platform(Rect::new(200.0, 100.0, 92.0, 14.0), OwnerSide::Left, 3);

        let mut events = Vec::new();
        let mut observed_hits = Vec::new();
        for _ in 0..5 {
            spawn_shot(
                &mut state,
                Side::Right,
                Vec2::new(246.0, 107.0),
                Vec2::ZERO,
                standard_spec(Side::Right),
            );
            update(&mut state, &config, &mut events);
            if let Some(p) = state.platform(id) {
                observed_hits.push(p.hits);
            }
            state.apply_platform_removals();
        }

        // hits are non-decreasing and the platform is gone after max_hits
        assert!(observed_hits.windows(2).all(|w| w[0] <= w[1]));
        assert!(state.platform(id).is_none());
        let destroy_events = events
            .iter()
            .filter(|e| matches!(e, SimEvent::PlatformDestroyed { platform, .. } if *platform == id))
            .count();
        assert_eq!(destroy_events, 1);
    }

    #[test]
    fn test_entity_hit_applies_damage() {
        let (mut state, config) = test_setup();
        let target_pos = state.combatant(Side::Left).pos;
        spawn_shot(
            &mut state,
            Side::Right,
            target_pos,
            Vec2::ZERO,
            standard_spec(Side::Right),
        );

        let mut events = Vec::new();
        update(&mut state, &config, &mut events);

        let c = state.combatant(Side::Left);
        assert_eq!(c.health, c.max_health - config.combat.projectile_damage);
        assert!(events.contains(&SimEvent::ProjectileHit {
            shooter: Side::Right,
            target: Side::Left,
            lethal: false,
        }));
    }

    #[test]
    fn test_lethal_hit_triggers_death_sequence() {
        let (mut state, config) = test_setup();
        state.combatant_mut(Side::Left).health = 5.0;
        let target_pos = state.combatant(Side::Left).pos;
        spawn_shot(
            &mut state,
            Side::Right,
            target_pos,
            Vec2::ZERO,
            standard_spec(Side::Right),
        );

        let mut events = Vec::new();
        update(&mut state, &config, &mut events);

        let c = state.combatant(Side::Left);
        assert!(!c.alive);
        assert_eq!(c.health, 0.0);
        assert_eq!(c.respawn_ticks, 0);
        assert!(events.contains(&SimEvent::ProjectileHit {
            shooter: Side::Right,
            target: Side::Left,
            lethal: true,
        }));
    }

    #[test]
    fn test_bypass_side_is_never_struck() {
        let (mut state, config) = test_setup();
        let mut spec = standard_spec(Side::Right);
        spec.bypass = Some(Side::Left);
        let target_pos = state.combatant(Side::Left).pos;
        spawn_shot(&mut state, Side::Right, target_pos, Vec2::ZERO, spec);

        let mut events = Vec::new();
        update(&mut state, &config, &mut events);

        let c = state.combatant(Side::Left);
        assert_eq!(c.health, c.max_health);
        assert_eq!(state.projectiles.len(), 1);
    }

    #[test]
    fn test_platforms_resolve_before_entities() {
        let (mut state, config) = test_setup();
        let target_pos = state.combatant(Side::Left).pos;
        // Platform covering the combatant's position
        let id = state.spawn_platform(
            Rect::new(target_pos.x - 46.0, target_pos.y - 7.0, 92.0, 14.0),
            OwnerSide::Left,
            3,
        );
        spawn_shot(
            &mut state,
            Side::Right,
            target_pos,
            Vec2::ZERO,
            standard_spec(Side::Right),
        );

        let mut events = Vec::new();
        update(&mut state, &config, &mut events);

        assert_eq!(state.platform(id).unwrap().hits, 1);
        let c = state.combatant(Side::Left);
        assert_eq!(c.health, c.max_health, "platform outcome wins");
    }

    #[test]
    fn test_off_window_projectiles_culled() {
        let (mut state, config) = test_setup();
        let spawn_y = state.camera.bottom() + 100.0;
        spawn_shot(
            &mut state,
            Side::Right,
            Vec2::new(100.0, spawn_y),
            Vec2::ZERO,
            standard_spec(Side::Right),
        );

        let mut events = Vec::new();
        update(&mut state, &config, &mut events);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_arcing_shot_accumulates_gravity() {
        let (mut state, config) = test_setup();
        let spec = projectile_spec(CharacterVariant::Lobber, WeaponMode::Standard, Side::Right);
        assert!(spec.gravity);
        spawn_shot(
            &mut state,
            Side::Right,
            Vec2::new(100.0, 300.0),
            Vec2::new(200.0, -config.combat.lob_speed),
            spec,
        );

        let mut events = Vec::new();
        update(&mut state, &config, &mut events);
        let vy = state.projectiles[0].vel.y;
        assert!(vy > -config.combat.lob_speed, "gravity pulls the arc down");
    }
}
