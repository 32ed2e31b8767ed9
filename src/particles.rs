//! Short-lived visual particles: hit explosions, slash trails, sparks, smoke.
//!
//! The pool itself is a plain struct so the duel simulation can own one and
//! tests can drive it without an App. Drawing goes through gizmos.

use bevy::prelude::*;
use rand::Rng;

/// Downward pull applied to particles, scaled by [`PARTICLE_GRAVITY_SCALE`].
pub const GRAVITY: f32 = 980.0;
pub const PARTICLE_GRAVITY_SCALE: f32 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Screen position, y grows downward.
    pub position: Vec2,
    pub velocity: Vec2,
    pub color: Color,
    pub size: f32,
    pub life: f32,
    pub max_life: f32,
    /// Degrees.
    pub rotation: f32,
    /// Degrees per second.
    pub rotation_speed: f32,
}

impl Particle {
    /// Remaining life as a fraction in [0, 1]; drives the fade-out.
    pub fn life_fraction(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
}

fn direction(degrees: f32) -> Vec2 {
    let radians = degrees.to_radians();
    Vec2::new(radians.cos(), radians.sin())
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Radial burst. Defaults used by the game are 100..400 px/s.
    pub fn explosion(
        &mut self,
        rng: &mut impl Rng,
        position: Vec2,
        count: usize,
        color: Color,
        min_speed: f32,
        max_speed: f32,
    ) {
        let (lo, hi) = ordered(min_speed, max_speed);
        for _ in 0..count {
            let speed = rng.gen_range(lo..=hi);
            let life = rng.gen_range(0.5..=1.5);
            self.particles.push(Particle {
                position,
                velocity: direction(rng.gen_range(0.0..360.0)) * speed,
                color,
                size: rng.gen_range(3.0..=10.0),
                life,
                max_life: life,
                rotation: rng.gen_range(0.0..360.0),
                rotation_speed: rng.gen_range(-500.0..=500.0),
            });
        }
    }

    /// Thirty particles scattered along `start -> end`, drifting in the slash
    /// direction and tapering in size toward the tail.
    pub fn slash_trail(&mut self, rng: &mut impl Rng, start: Vec2, end: Vec2, color: Color) {
        const TRAIL_LEN: usize = 30;

        let span = end - start;
        let dir = span.normalize_or_zero();
        let angle = span.y.atan2(span.x).to_degrees();

        for i in 0..TRAIL_LEN {
            let t = i as f32 / TRAIL_LEN as f32;
            let jitter = Vec2::new(rng.gen_range(-10.0..=10.0), rng.gen_range(-10.0..=10.0));
            let life = rng.gen_range(0.3..=0.8);
            self.particles.push(Particle {
                position: start + span * t + jitter,
                velocity: dir * rng.gen_range(50.0..=150.0),
                color,
                size: 5.0 * (1.0 - t) + 1.0,
                life,
                max_life: life,
                rotation: angle,
                rotation_speed: rng.gen_range(-100.0..=100.0),
            });
        }
    }

    pub fn sparks(&mut self, rng: &mut impl Rng, position: Vec2, count: usize, color: Color) {
        for _ in 0..count {
            let life = rng.gen_range(0.3..=0.8);
            self.particles.push(Particle {
                position,
                velocity: direction(rng.gen_range(0.0..360.0)) * rng.gen_range(200.0..=600.0),
                color,
                size: rng.gen_range(1.0..=4.0),
                life,
                max_life: life,
                rotation: rng.gen_range(0.0..360.0),
                rotation_speed: rng.gen_range(-1000.0..=1000.0),
            });
        }
    }

    pub fn smoke(&mut self, rng: &mut impl Rng, position: Vec2, count: usize, color: Color) {
        for _ in 0..count {
            let life = rng.gen_range(1.5..=3.0);
            self.particles.push(Particle {
                position,
                // Negative y rises on screen.
                velocity: Vec2::new(rng.gen_range(-50.0..=50.0), rng.gen_range(-100.0..=-50.0)),
                color,
                size: rng.gen_range(10.0..=25.0),
                life,
                max_life: life,
                rotation: rng.gen_range(0.0..360.0),
                rotation_speed: rng.gen_range(-50.0..=50.0),
            });
        }
    }

    /// Integrate every particle, then drop the expired ones.
    pub fn advance(&mut self, delta_time: f32) {
        for particle in &mut self.particles {
            particle.position += particle.velocity * delta_time;
            particle.velocity.y += GRAVITY * PARTICLE_GRAVITY_SCALE * delta_time;
            particle.rotation += particle.rotation_speed * delta_time;
            particle.life -= delta_time;
        }
        self.particles.retain(|particle| particle.life > 0.0);
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Draw particles as thin rotated rectangles. `to_world` maps the screen
/// coordinates the simulation uses onto Bevy's world space.
pub fn draw_particles(gizmos: &mut Gizmos, system: &ParticleSystem, to_world: impl Fn(Vec2) -> Vec2) {
    for particle in system.particles() {
        let alpha = particle.life_fraction();
        let color = particle.color.with_alpha(particle.color.alpha() * alpha);
        gizmos.rect_2d(
            // Screen y points down, so the angle flips sign.
            Isometry2d::new(to_world(particle.position), Rot2::degrees(-particle.rotation)),
            Vec2::new(particle.size, particle.size * 0.3),
            color,
        );
    }
}
