//! Particle bursts and decay
//!
//! Particles are purely cosmetic: spawned on impacts and platform
//! explosions, decremented each tick, removed at zero life. Gameplay
//! logic never reads them.

use rand::rngs::StdRng;
use rand::Rng;

use crate::game::state::{GameState, Particle};
use crate::util::vec2::Vec2;

const EXPLOSION_COUNT: u32 = 10;
const EXPLOSION_SPEED: f32 = 180.0;
const EXPLOSION_LIFE: u32 = 28;

const IMPACT_COUNT: u32 = 5;
const IMPACT_SPEED: f32 = 110.0;
const IMPACT_LIFE: u32 = 16;

/// Radial burst for a destroyed platform, in the owner side's color
pub fn explosion_burst(particles: &mut Vec<Particle>, rng: &mut StdRng, pos: Vec2, color: u8) {
    burst(
        particles,
        rng,
        pos,
        color,
        EXPLOSION_COUNT,
        EXPLOSION_SPEED,
        EXPLOSION_LIFE,
    );
}

/// Smaller burst for a projectile impact
pub fn impact_burst(particles: &mut Vec<Particle>, rng: &mut StdRng, pos: Vec2, color: u8) {
    burst(
        particles,
        rng,
        pos,
        color,
        IMPACT_COUNT,
        IMPACT_SPEED,
        IMPACT_LIFE,
    );
}

fn burst(
    particles: &mut Vec<Particle>,
    rng: &mut StdRng,
    pos: Vec2,
    color: u8,
    count: u32,
    speed: f32,
    life: u32,
) {
    for _ in 0..count {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let magnitude = rng.gen_range(0.3..1.0) * speed;
        particles.push(Particle {
            pos,
            vel: Vec2::new(angle.cos() * magnitude, angle.sin() * magnitude),
            life,
            max_life: life,
            color,
        });
    }
}

/// Integrate and decay all particles, dropping the expired
pub fn update(state: &mut GameState, dt: f32) {
    for particle in &mut state.particles {
        particle.pos += particle.vel * dt;
        particle.life = particle.life.saturating_sub(1);
    }
    state.particles.retain(|p| p.life > 0);
}
