use glam::Vec2;

use crate::boid::Boid;
use crate::boundary::WorldBounds;
use crate::config::FlockConfig;

/// Spawn `config.num_boids` boids with randomized attributes.
///
/// Positions are uniform over the world, headings uniform over the circle,
/// speeds uniform in `config.initial_velocity`, colors drawn from the palette.
pub fn spawn_boids(
    config: &FlockConfig,
    bounds: &WorldBounds,
    rng: &mut fastrand::Rng,
) -> Vec<Boid> {
    (0..config.num_boids)
        .map(|_| spawn_boid(config, bounds, rng))
        .collect()
}

fn spawn_boid(config: &FlockConfig, bounds: &WorldBounds, rng: &mut fastrand::Rng) -> Boid {
    let position = bounds.random_point(rng);

    let angle = rng.f32() * std::f32::consts::TAU;
    let range = config.initial_velocity;
    let speed = range.min + rng.f32() * (range.max - range.min);
    let velocity = Vec2::from_angle(angle) * speed;

    let color = config.palette[rng.usize(0..config.palette.len())];
    Boid::new(position, velocity, color, config)
}
