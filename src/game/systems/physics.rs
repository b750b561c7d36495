//! Entity kinematics and collision resolution
//!
//! Per tick, for each live combatant: gravity, integration, horizontal
//! damping, camera-top clamp, landing detection against the visible
//! platform band, pickup collection, fall death, and respawn bookkeeping.
//!
//! Landing damage is once-per-landing: a platform takes one hit the first
//! tick a combatant stands on it, tracked by `last_platform` change
//! detection, not every tick it remains grounded.

use smallvec::SmallVec;

use crate::config::ArenaConfig;
use crate::game::constants::arena::{ENTITY_H, ENTITY_W};
use crate::game::input::InputState;
use crate::game::state::{
    ActiveBuff, CharacterVariant, Combatant, GameState, PickupKind, PlatformId, Side, WeaponMode,
};
use crate::game::systems::SimEvent;
use crate::util::vec2::Vec2;

/// Slack around the visible window for the platform band test
const BAND_SLACK: f32 = 48.0;

/// Apply one side's held input: horizontal acceleration, facing, jump.
/// Dead combatants ignore input entirely.
pub fn apply_input(state: &mut GameState, config: &ArenaConfig, side: Side, input: &InputState) {
    let dt = config.physics.dt;
    let max_run = config.physics.max_run_speed;
    let accel = config.physics.move_accel;
    let jump_speed = config.physics.jump_speed;

    let combatant = state.combatant_mut(side);
    if !combatant.alive {
        return;
    }

    let dir = input.direction();
    if dir != 0.0 {
        combatant.vel.x += dir * accel * dt;
        combatant.facing_right = dir > 0.0;
    }
    combatant.vel.x = combatant.vel.x.clamp(-max_run, max_run);

    if input.jump && combatant.grounded {
        combatant.vel.y = -jump_speed;
        combatant.grounded = false;
    }
}

/// Advance all combatants one tick
pub fn update(state: &mut GameState, config: &ArenaConfig, events: &mut Vec<SimEvent>) {
    let dt = config.physics.dt;
    let drag = 1.0 - config.physics.friction;
    let view_w = config.view_w();
    let mut destroyed: SmallVec<[PlatformId; 4]> = SmallVec::new();

    {
        let GameState {
            camera,
            combatants,
            platforms,
            pickups,
            ..
        } = state;

        for combatant in combatants.iter_mut() {
            let side = combatant.side;

            if !combatant.alive {
                // Velocity frozen, no collision checks; only the respawn
                // counter advances
                combatant.respawn_ticks += 1;
                continue;
            }

            if combatant.shoot_cooldown > 0 {
                combatant.shoot_cooldown -= 1;
            }

            let mut expired_mode = None;
            if let Some(buff) = &mut combatant.buff {
                buff.remaining = buff.remaining.saturating_sub(1);
                if buff.remaining == 0 {
                    expired_mode = Some(buff.mode);
                }
            }
            if let Some(from) = expired_mode {
                combatant.buff = None;
                events.push(SimEvent::ModeSwitch {
                    side,
                    from,
                    to: WeaponMode::Standard,
                });
            }

            combatant.vel.y += config.physics.gravity * dt;
            combatant.pos += combatant.vel * dt;
            combatant.vel.x *= drag;

            // Horizontal walls
            let half_w = ENTITY_W * 0.5;
            combatant.pos.x = combatant.pos.x.clamp(half_w, view_w - half_w);

            // Camera-top clamp: no flying above the visible window
            let top_line = camera.top + config.physics.top_clamp_margin + ENTITY_H * 0.5;
            if combatant.pos.y < top_line {
                combatant.pos.y = top_line;
                combatant.vel.y = combatant.vel.y.max(0.0);
            }

            // Landing: first overlapping visible platform wins
            let mut landed = None;
            if combatant.vel.y >= 0.0 {
                let aabb = combatant.aabb();
                for platform in platforms.iter_mut() {
                    if !camera.in_band(platform.rect.y, BAND_SLACK) {
                        continue;
                    }
                    if platform.is_destroyed() {
                        continue;
                    }
                    if aabb.overlaps(&platform.rect) {
                        combatant.pos.y = platform.rect.y - ENTITY_H * 0.5;
                        combatant.vel.y = 0.0;
                        combatant.grounded = true;

                        let first_landing = combatant.last_platform != Some(platform.id);
                        if first_landing {
                            platform.hits = platform.hits.saturating_add(1);
                            events.push(SimEvent::Landed {
                                side,
                                platform: platform.id,
                                chipped: true,
                            });
                            if platform.is_destroyed() {
                                destroyed.push(platform.id);
                                events.push(SimEvent::PlatformDestroyed {
                                    platform: platform.id,
                                    owner: platform.owner,
                                });
                            }
                        }
                        combatant.last_platform = Some(platform.id);
                        landed = Some(platform.id);
                        break;
                    }
                }
            }
            if landed.is_none() {
                combatant.grounded = false;
                combatant.last_platform = None;
            }

            // Pickup collection; collected coins are permanently inert
            let aabb = combatant.aabb();
            for pickup in pickups.iter_mut() {
                if pickup.collected || !aabb.contains(pickup.pos) {
                    continue;
                }
                pickup.collected = true;
                events.push(SimEvent::PickupTaken {
                    side,
                    kind: pickup.kind,
                });
                match pickup.kind {
                    PickupKind::Heal => combatant.heal_fraction(config.combat.heal_fraction),
                    PickupKind::Empower | PickupKind::Hazard => {
                        let from = combatant.weapon_mode();
                        let mode = if pickup.kind == PickupKind::Empower {
                            WeaponMode::Empowered
                        } else {
                            WeaponMode::Hazard
                        };
                        combatant.buff = Some(ActiveBuff {
                            mode,
                            remaining: config.combat.buff_ticks,
                        });
                        if from != mode {
                            events.push(SimEvent::ModeSwitch {
                                side,
                                from,
                                to: mode,
                            });
                        }
                    }
                }
            }

            debug_assert!(
                combatant.health >= 0.0 && combatant.health <= combatant.max_health,
                "health out of bounds"
            );
            combatant.health = combatant.health.clamp(0.0, combatant.max_health);

            // Fall death below the visible window
            if combatant.pos.y > camera.bottom() {
                kill(combatant);
                events.push(SimEvent::FallDeath { side });
            }
        }
    }

    for id in destroyed {
        state.queue_platform_removal(id);
    }

    respawn_ai(state, config, events);
}

/// Force a combatant into the dead state and start its respawn counter
pub fn kill(combatant: &mut Combatant) {
    combatant.health = 0.0;
    combatant.alive = false;
    combatant.vel = Vec2::ZERO;
    combatant.respawn_ticks = 0;
    combatant.buff = None;
    combatant.grounded = false;
    combatant.last_platform = None;
}

/// Reset the AI combatant in place once its respawn duration elapses.
/// The human side never respawns; its death ends the session.
fn respawn_ai(state: &mut GameState, config: &ArenaConfig, events: &mut Vec<SimEvent>) {
    let spawn_x = config.view_w() * config.session.right_spawn_frac;
    let spawn_y = state.camera.top + config.session.spawn_drop;
    let max_health = config.combat.max_health;
    let threshold = config.combat.respawn_ticks;

    let GameState {
        combatants, rng, ..
    } = state;
    let ai = &mut combatants[Side::Right.index()];
    if ai.alive || ai.respawn_ticks < threshold {
        return;
    }

    ai.pos = Vec2::new(spawn_x, spawn_y);
    ai.vel = Vec2::ZERO;
    ai.health = max_health;
    ai.alive = true;
    ai.respawn_ticks = 0;
    ai.shoot_cooldown = 0;
    ai.buff = None;
    ai.grounded = false;
    ai.last_platform = None;
    ai.variant = CharacterVariant::roll(rng);
    ai.facing_right = false;

    events.push(SimEvent::Respawned { side: Side::Right });
    tracing::debug!("AI combatant respawned at y={:.0}", spawn_y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{OwnerSide, Rect};

    fn test_setup() -> (GameState, ArenaConfig) {
        let mut config = ArenaConfig::default();
        config.session.seed = Some(42);
        let state = GameState::new(&config);
        (state, config)
    }

    /// Place a platform directly under a combatant's feet
    fn platform_under(state: &mut GameState, side: Side, owner: OwnerSide) -> PlatformId {
        let pos = state.combatant(side).pos;
        state.spawn_platform(
            Rect::new(pos.x - 46.0, pos.y + ENTITY_H * 0.5, 92.0, 14.0),
            owner,
            3,
        )
    }

    #[test]
    fn test_gravity_accelerates_fall() {
        let (mut state, config) = test_setup();
        let mut events = Vec::new();
        let vy0 = state.combatant(Side::Left).vel.y;
        update(&mut state, &config, &mut events);
        assert!(state.combatant(Side::Left).vel.y > vy0);
    }

    #[test]
    fn test_horizontal_damping() {
        let (mut state, config) = test_setup();
        let mut events = Vec::new();
        state.combatant_mut(Side::Left).vel.x = 100.0;
        update(&mut state, &config, &mut events);
        let vx = state.combatant(Side::Left).vel.x;
        assert!(vx < 100.0 && vx > 0.0);
    }

    #[test]
    fn test_landing_snaps_and_zeroes_vertical_velocity() {
        let (mut state, config) = test_setup();
        let id = platform_under(&mut state, Side::Left, OwnerSide::Left);
        state.combatant_mut(Side::Left).vel.y = 50.0;

        let mut events = Vec::new();
        update(&mut state, &config, &mut events);

        let c = state.combatant(Side::Left);
        assert!(c.grounded);
        assert_eq!(c.vel.y, 0.0);
        assert_eq!(c.last_platform, Some(id));
    }

    #[test]
    fn test_landing_damage_once_while_grounded() {
        let (mut state, config) = test_setup();
        let id = platform_under(&mut state, Side::Left, OwnerSide::Left);

        let mut events = Vec::new();
        for _ in 0..30 {
            update(&mut state, &config, &mut events);
        }

        // 30 grounded ticks contribute exactly one hit
        assert_eq!(state.platform(id).unwrap().hits, 1);
        let landings = events
            .iter()
            .filter(|e| matches!(e, SimEvent::Landed { .. }))
            .count();
        assert_eq!(landings, 1);
    }

    #[test]
    fn test_third_landing_destroys_platform() {
        let (mut state, config) = test_setup();
        let id = platform_under(&mut state, Side::Left, OwnerSide::Left);
        state.platforms.iter_mut().find(|p| p.id == id).unwrap().hits = 2;

        let mut events = Vec::new();
        update(&mut state, &config, &mut events);

        assert!(events
            .iter()
            .any(|e| matches!(e, SimEvent::PlatformDestroyed { platform, .. } if *platform == id)));
        state.apply_platform_removals();
        assert!(state.platform(id).is_none());
    }

    #[test]
    fn test_camera_top_clamp() {
        let (mut state, config) = test_setup();
        let c = state.combatant_mut(Side::Left);
        c.pos.y = -500.0;
        c.vel.y = -400.0;

        let mut events = Vec::new();
        update(&mut state, &config, &mut events);

        let c = state.combatant(Side::Left);
        assert!(c.pos.y >= state.camera.top);
        assert!(c.vel.y >= 0.0, "clamped entities cannot keep rising");
    }

    #[test]
    fn test_fall_death_below_window() {
        let (mut state, config) = test_setup();
        let below_window = state.camera.bottom() + 1.0;
        let c = state.combatant_mut(Side::Left);
        c.pos.y = below_window;
        c.vel.y = 10.0;

        let mut events = Vec::new();
        update(&mut state, &config, &mut events);

        let c = state.combatant(Side::Left);
        assert!(!c.alive);
        assert_eq!(c.health, 0.0);
        assert!(events.contains(&SimEvent::FallDeath { side: Side::Left }));
    }

    #[test]
    fn test_dead_combatant_is_frozen() {
        let (mut state, config) = test_setup();
        kill(state.combatant_mut(Side::Left));
        let pos = state.combatant(Side::Left).pos;

        let mut events = Vec::new();
        update(&mut state, &config, &mut events);

        assert_eq!(state.combatant(Side::Left).pos, pos);
        assert_eq!(state.combatant(Side::Left).respawn_ticks, 1);
    }

    #[test]
    fn test_ai_respawns_after_exact_duration() {
        let (mut state, config) = test_setup();
        kill(state.combatant_mut(Side::Right));

        let mut events = Vec::new();
        for _ in 0..config.combat.respawn_ticks - 1 {
            update(&mut state, &config, &mut events);
        }
        assert!(!state.combatant(Side::Right).alive);

        update(&mut state, &config, &mut events);
        let ai = state.combatant(Side::Right);
        assert!(ai.alive);
        assert_eq!(ai.health, ai.max_health);
        assert!(events.contains(&SimEvent::Respawned { side: Side::Right }));
    }

    #[test]
    fn test_human_never_respawns() {
        let (mut state, config) = test_setup();
        kill(state.combatant_mut(Side::Left));

        let mut events = Vec::new();
        for _ in 0..config.combat.respawn_ticks * 3 {
            update(&mut state, &config, &mut events);
        }
        assert!(!state.combatant(Side::Left).alive);
    }

    #[test]
    fn test_health_bounds_hold_over_many_ticks() {
        let (mut state, config) = test_setup();
        platform_under(&mut state, Side::Left, OwnerSide::Neutral);
        let mut events = Vec::new();
        for _ in 0..200 {
            update(&mut state, &config, &mut events);
            for c in &state.combatants {
                assert!(c.health >= 0.0 && c.health <= c.max_health);
            }
        }
    }

    #[test]
    fn test_pickup_collected_once() {
        let (mut state, config) = test_setup();
        let id = platform_under(&mut state, Side::Left, OwnerSide::Left);
        let pos = state.combatant(Side::Left).pos;
        state.spawn_pickup(id, pos, PickupKind::Heal);
        state.combatant_mut(Side::Left).health = 10.0;

        let mut events = Vec::new();
        update(&mut state, &config, &mut events);
        let healed = state.combatant(Side::Left).health;
        assert!(healed > 10.0);

        // Re-visiting the same coin grants nothing
        state.combatant_mut(Side::Left).health = 10.0;
        update(&mut state, &config, &mut events);
        assert_eq!(state.combatant(Side::Left).health, 10.0);
        let taken = events
            .iter()
            .filter(|e| matches!(e, SimEvent::PickupTaken { .. }))
            .count();
        assert_eq!(taken, 1);
    }

    #[test]
    fn test_empower_pickup_opens_buff_window() {
        let (mut state, config) = test_setup();
        let id = platform_under(&mut state, Side::Left, OwnerSide::Left);
        let pos = state.combatant(Side::Left).pos;
        state.spawn_pickup(id, pos, PickupKind::Empower);

        let mut events = Vec::new();
        update(&mut state, &config, &mut events);

        let c = state.combatant(Side::Left);
        assert_eq!(c.weapon_mode(), WeaponMode::Empowered);
        assert!(c.shoot_enabled());
        assert!(events.iter().any(|e| matches!(
            e,
            SimEvent::ModeSwitch {
                side: Side::Left,
                to: WeaponMode::Empowered,
                ..
            }
        )));
    }

    #[test]
    fn test_buff_window_expires_back_to_standard() {
        let (mut state, mut config) = test_setup();
        config.combat.buff_ticks = 5;
        let id = platform_under(&mut state, Side::Left, OwnerSide::Left);
        let pos = state.combatant(Side::Left).pos;
        state.spawn_pickup(id, pos, PickupKind::Hazard);

        let mut events = Vec::new();
        for _ in 0..8 {
            update(&mut state, &config, &mut events);
        }

        assert_eq!(state.combatant(Side::Left).weapon_mode(), WeaponMode::Standard);
        assert!(events.iter().any(|e| matches!(
            e,
            SimEvent::ModeSwitch {
                side: Side::Left,
                from: WeaponMode::Hazard,
                to: WeaponMode::Standard,
            }
        )));
    }

    #[test]
    fn test_jump_requires_ground() {
        let (mut state, config) = test_setup();
        let input = InputState {
            jump: true,
            ..Default::default()
        };
        let vy0 = state.combatant(Side::Left).vel.y;
        apply_input(&mut state, &config, Side::Left, &input);
        assert_eq!(state.combatant(Side::Left).vel.y, vy0, "airborne jump ignored");

        state.combatant_mut(Side::Left).grounded = true;
        apply_input(&mut state, &config, Side::Left, &input);
        assert_eq!(
            state.combatant(Side::Left).vel.y,
            -config.physics.jump_speed
        );
    }
}
