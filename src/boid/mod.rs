pub mod steering;

use glam::Vec2;

use crate::boundary::{BoundaryPolicy, WorldBounds};
use crate::color::Color;
use crate::config::{FlockConfig, ParticleSettings, PerceptionRadii, SteeringWeights};
use crate::math::Steer;
use crate::particles::{Particle, ParticleTrail};
use steering::{SteeringForces, SteeringLimits};

/// Pre-tick copy of a boid's kinematic state. Neighbor queries read these,
/// never the live boids, so update order cannot leak into a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoidSnapshot {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Everything `integrate` needs besides the boid itself.
pub struct StepContext<'a> {
    pub bounds: &'a WorldBounds,
    pub boundary: BoundaryPolicy,
    pub palette: &'a [Color],
    pub particles: &'a ParticleSettings,
    /// Wall-clock time since the previous tick, in milliseconds.
    pub elapsed_ms: f32,
    pub rng: &'a mut fastrand::Rng,
}

/// A flocking agent and its particle trail.
#[derive(Debug, Clone)]
pub struct Boid {
    position: Vec2,
    velocity: Vec2,
    acceleration: Vec2,
    color: Color,
    radius: f32,
    max_force: f32,
    max_speed: f32,
    trail: ParticleTrail,
    last_forces: SteeringForces,
}

impl Boid {
    /// Create a boid with the physical limits from `config`.
    /// The starting velocity is capped at `config.max_speed`.
    pub fn new(position: Vec2, velocity: Vec2, color: Color, config: &FlockConfig) -> Self {
        Self {
            position,
            velocity: velocity.limit(config.max_speed),
            acceleration: Vec2::ZERO,
            color,
            radius: config.boid_radius,
            max_force: config.max_force,
            max_speed: config.max_speed,
            trail: ParticleTrail::new(config.max_particles_per_boid),
            last_forces: SteeringForces::ZERO,
        }
    }

    /// Take on the physical limits and trail cap of `config`. Velocity is
    /// re-capped and the oldest particles beyond the new cap are dropped.
    pub fn apply_config(&mut self, config: &FlockConfig) {
        self.radius = config.boid_radius;
        self.max_force = config.max_force;
        self.max_speed = config.max_speed;
        self.velocity = self.velocity.limit(config.max_speed);
        self.trail.set_capacity(config.max_particles_per_boid);
    }

    pub fn snapshot(&self) -> BoidSnapshot {
        BoidSnapshot {
            position: self.position,
            velocity: self.velocity,
        }
    }

    pub fn limits(&self) -> SteeringLimits {
        SteeringLimits {
            max_speed: self.max_speed,
            max_force: self.max_force,
        }
    }

    /// Weighted alignment, cohesion and separation against `neighbors`.
    /// Read-only, so the flock can run it for every boid before any moves.
    pub fn compute_forces(
        &self,
        neighbors: &[BoidSnapshot],
        radii: &PerceptionRadii,
        weights: SteeringWeights,
    ) -> SteeringForces {
        let me = self.snapshot();
        let limits = self.limits();
        let alignment = steering::alignment(&me, neighbors, radii.alignment, limits);
        let cohesion = steering::cohesion(&me, neighbors, radii.cohesion, limits);
        let separation = steering::separation(&me, neighbors, radii.separation, limits);
        SteeringForces {
            alignment: alignment * weights.alignment,
            cohesion: cohesion * weights.cohesion,
            separation: separation * weights.separation,
        }
    }

    /// Apply `forces`, move, wrap, and advance the particle trail.
    pub fn integrate(&mut self, forces: SteeringForces, ctx: &mut StepContext<'_>) {
        self.last_forces = forces;
        self.acceleration = forces.total();
        self.velocity = (self.velocity + self.acceleration).limit(self.max_speed);
        self.position += self.velocity;
        self.position = ctx.boundary.apply(self.position, self.radius, ctx.bounds);

        self.trail.push(Particle::spawn(
            self.position,
            self.velocity,
            self.color,
            ctx.palette,
            ctx.elapsed_ms,
            ctx.particles,
            ctx.rng,
        ));
        self.trail.update_and_prune(ctx.bounds);
    }

    /// One full update against an already-fetched neighbor set.
    pub fn step(
        &mut self,
        neighbors: &[BoidSnapshot],
        radii: &PerceptionRadii,
        weights: SteeringWeights,
        ctx: &mut StepContext<'_>,
    ) {
        let forces = self.compute_forces(neighbors, radii, weights);
        self.integrate(forces, ctx);
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn acceleration(&self) -> Vec2 {
        self.acceleration
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    pub fn max_force(&self) -> f32 {
        self.max_force
    }

    /// Forces applied on the most recent step.
    pub fn last_forces(&self) -> SteeringForces {
        self.last_forces
    }

    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.trail.iter()
    }

    pub fn trail(&self) -> &ParticleTrail {
        &self.trail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        bounds: WorldBounds,
        palette: Vec<Color>,
        settings: ParticleSettings,
        rng: fastrand::Rng,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                bounds: WorldBounds::for_policy(BoundaryPolicy::Wrap, 400.0, 400.0),
                palette: crate::color::DEFAULT_PALETTE.to_vec(),
                settings: ParticleSettings::default(),
                rng: fastrand::Rng::with_seed(4),
            }
        }

        fn ctx(&mut self) -> StepContext<'_> {
            StepContext {
                bounds: &self.bounds,
                boundary: BoundaryPolicy::Wrap,
                palette: &self.palette,
                particles: &self.settings,
                elapsed_ms: 16.0,
                rng: &mut self.rng,
            }
        }
    }

    fn boid(px: f32, py: f32, vx: f32, vy: f32) -> Boid {
        let red = Color::rgb(255, 0, 0);
        Boid::new(Vec2::new(px, py), Vec2::new(vx, vy), red, &FlockConfig::default())
    }

    #[test]
    fn lone_boid_keeps_its_velocity() {
        let mut fx = Fixture::new();
        let mut b = boid(0.0, 0.0, 1.5, -2.0);
        for _ in 0..100 {
            b.step(&[], &PerceptionRadii::default(), SteeringWeights::default(), &mut fx.ctx());
            assert_eq!(b.velocity(), Vec2::new(1.5, -2.0));
            assert_eq!(b.last_forces(), SteeringForces::ZERO);
            assert_eq!(b.acceleration(), Vec2::ZERO);
        }
    }

    #[test]
    fn speed_is_capped() {
        let mut fx = Fixture::new();
        let mut b = boid(0.0, 0.0, 4.0, 0.0);
        let crowd: Vec<BoidSnapshot> = (0..8)
            .map(|i| BoidSnapshot {
                position: Vec2::new(-3.0 + i as f32, 2.0),
                velocity: Vec2::new(4.0, 0.0),
            })
            .collect();
        let max = SteeringWeights {
            alignment: 2.0,
            cohesion: 2.0,
            separation: 2.0,
        };
        for _ in 0..50 {
            b.step(&crowd, &PerceptionRadii::default(), max, &mut fx.ctx());
            assert!(b.velocity().length() <= b.max_speed() + 1e-5);
        }
    }

    #[test]
    fn initial_velocity_is_capped() {
        let b = boid(0.0, 0.0, 30.0, 40.0);
        assert!((b.velocity().length() - 4.0).abs() < 1e-5);
    }

    #[test]
    fn apply_config_replaces_limits() {
        let fast = FlockConfig {
            max_speed: 10.0,
            max_force: 3.0,
            ..Default::default()
        };
        let mut b = Boid::new(Vec2::ZERO, Vec2::new(9.0, 0.0), Color::rgb(0, 0, 0), &fast);
        assert_eq!(b.velocity(), Vec2::new(9.0, 0.0));

        let slow = FlockConfig {
            max_speed: 4.0,
            max_force: 0.5,
            boid_radius: 2.0,
            max_particles_per_boid: 3,
            ..Default::default()
        };
        b.apply_config(&slow);
        assert_eq!(b.max_speed(), 4.0);
        assert_eq!(b.max_force(), 0.5);
        assert_eq!(b.radius(), 2.0);
        assert_eq!(b.trail().capacity(), 3);
        assert!((b.velocity() - Vec2::new(4.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn zero_weights_disable_steering() {
        let b = boid(0.0, 0.0, 1.0, 0.0);
        let n = [BoidSnapshot {
            position: Vec2::new(1.0, 0.0),
            velocity: Vec2::new(-1.0, 0.0),
        }];
        let w = SteeringWeights {
            alignment: 0.0,
            cohesion: 0.0,
            separation: 0.0,
        };
        let f = b.compute_forces(&n, &PerceptionRadii::default(), w);
        assert_eq!(f.total(), Vec2::ZERO);
    }

    #[test]
    fn step_spawns_one_particle_per_tick() {
        let mut fx = Fixture::new();
        let mut b = boid(0.0, 0.0, 1.0, 0.0);
        b.step(&[], &PerceptionRadii::default(), SteeringWeights::default(), &mut fx.ctx());
        assert_eq!(b.trail().len(), 1);
        b.step(&[], &PerceptionRadii::default(), SteeringWeights::default(), &mut fx.ctx());
        assert_eq!(b.trail().len(), 2);
    }

    #[test]
    fn trail_stays_within_capacity() {
        let mut fx = Fixture::new();
        // Very slow decay so nothing expires on its own.
        fx.settings.alpha_decay_range = crate::config::Range::new(0.001, 0.002);
        fx.settings.size_decay_range = crate::config::Range::new(0.0001, 0.0002);
        let mut b = boid(0.0, 0.0, 0.5, 0.0);
        let cap = b.trail().capacity();
        for _ in 0..cap * 3 {
            b.step(&[], &PerceptionRadii::default(), SteeringWeights::default(), &mut fx.ctx());
            assert!(b.trail().len() <= cap);
        }
        assert_eq!(b.trail().len(), cap);
    }
}
