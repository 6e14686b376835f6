use std::collections::VecDeque;

use glam::Vec2;

use crate::boundary::WorldBounds;
use crate::color::Color;
use crate::config::ParticleSettings;

/// A stationary trail dot left behind by a boid. Fades and shrinks each
/// tick until it expires.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    position: Vec2,
    velocity: Vec2,
    color: Color,
    /// 0-255 scale. Only ever decreases.
    alpha: f32,
    size: f32,
    alpha_decay: f32,
    size_decay: f32,
}

impl Particle {
    /// Emit a particle from a boid.
    ///
    /// `elapsed_ms` is the time since the previous tick; it drives how far the
    /// color drifts from the boid's color toward a random palette entry.
    pub fn spawn(
        origin_position: Vec2,
        origin_velocity: Vec2,
        origin_color: Color,
        palette: &[Color],
        elapsed_ms: f32,
        settings: &ParticleSettings,
        rng: &mut fastrand::Rng,
    ) -> Self {
        let target = if palette.is_empty() {
            origin_color
        } else {
            palette[rng.usize(0..palette.len())]
        };
        let color = origin_color.lerp(target, elapsed_ms / 1000.0);

        // Jitter box is wider across the axis perpendicular to travel.
        let spread = Vec2::new(origin_velocity.y.abs(), origin_velocity.x.abs());
        let jitter = Vec2::new(rng.f32() * 2.0 - 1.0, rng.f32() * 2.0 - 1.0) * spread;

        Self {
            position: origin_position + jitter,
            velocity: origin_velocity,
            color,
            alpha: settings.initial_alpha,
            size: settings.size_range.sample(rng),
            alpha_decay: settings.alpha_decay_range.sample(rng),
            size_decay: settings.size_decay_range.sample(rng),
        }
    }

    /// Fade and shrink by one tick.
    pub fn update(&mut self) {
        self.alpha -= self.alpha_decay;
        self.size -= self.size_decay;
    }

    /// Invisible, collapsed, or outside the world.
    pub fn finished(&self, bounds: &WorldBounds) -> bool {
        self.alpha < 0.0 || self.size < 0.0 || !bounds.contains(self.position)
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Velocity of the emitting boid at spawn time. Particles do not move.
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn size(&self) -> f32 {
        self.size
    }
}

/// Bounded FIFO of a boid's live particles. Pushing past capacity evicts
/// the oldest particle.
#[derive(Debug, Clone)]
pub struct ParticleTrail {
    particles: VecDeque<Particle>,
    capacity: usize,
}

impl ParticleTrail {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, particle: Particle) {
        if self.capacity == 0 {
            return;
        }
        if self.particles.len() >= self.capacity {
            self.particles.pop_front();
        }
        self.particles.push_back(particle);
    }

    /// Age every particle once and drop the finished ones in the same pass.
    pub fn update_and_prune(&mut self, bounds: &WorldBounds) {
        self.particles.retain_mut(|p| {
            p.update();
            !p.finished(bounds)
        });
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the cap, evicting the oldest particles that no longer fit.
    pub fn set_capacity(&mut self, capacity: usize) {
        while self.particles.len() > capacity {
            self.particles.pop_front();
        }
        self.capacity = capacity;
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}
