use glam::Vec2;

use crate::math::Steer;

use super::BoidSnapshot;

/// Distance floor for inverse-distance separation weighting.
pub const SEPARATION_EPSILON: f32 = 1e-3;

/// Speed and force caps of the steering boid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringLimits {
    pub max_speed: f32,
    pub max_force: f32,
}

/// Weighted output of the three rules for one boid on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SteeringForces {
    pub alignment: Vec2,
    pub cohesion: Vec2,
    pub separation: Vec2,
}

impl SteeringForces {
    pub const ZERO: Self = Self {
        alignment: Vec2::ZERO,
        cohesion: Vec2::ZERO,
        separation: Vec2::ZERO,
    };

    pub fn total(&self) -> Vec2 {
        self.alignment + self.cohesion + self.separation
    }
}

/// Steer toward the average velocity of neighbors within `radius`.
pub fn alignment(
    me: &BoidSnapshot,
    neighbors: &[BoidSnapshot],
    radius: f32,
    limits: SteeringLimits,
) -> Vec2 {
    let radius_sq = radius * radius;
    let (sum, count) = neighbors
        .iter()
        .filter(|n| n.position.distance_squared(me.position) < radius_sq)
        .fold((Vec2::ZERO, 0u32), |(sum, count), n| (sum + n.velocity, count + 1));
    if count == 0 {
        return Vec2::ZERO;
    }
    steer_toward(sum / count as f32, me, limits)
}

/// Steer toward the centroid of neighbors within `radius`.
pub fn cohesion(
    me: &BoidSnapshot,
    neighbors: &[BoidSnapshot],
    radius: f32,
    limits: SteeringLimits,
) -> Vec2 {
    let radius_sq = radius * radius;
    let (sum, count) = neighbors
        .iter()
        .filter(|n| n.position.distance_squared(me.position) < radius_sq)
        .fold((Vec2::ZERO, 0u32), |(sum, count), n| (sum + n.position, count + 1));
    if count == 0 {
        return Vec2::ZERO;
    }
    let centroid = sum / count as f32;
    steer_toward(centroid - me.position, me, limits)
}

/// Steer away from neighbors within `radius`, weighted by inverse distance.
pub fn separation(
    me: &BoidSnapshot,
    neighbors: &[BoidSnapshot],
    radius: f32,
    limits: SteeringLimits,
) -> Vec2 {
    let radius_sq = radius * radius;
    let mut sum = Vec2::ZERO;
    let mut count = 0u32;
    for n in neighbors {
        let away = me.position - n.position;
        let dist_sq = away.length_squared();
        if dist_sq >= radius_sq {
            continue;
        }
        // Overlapping boids contribute a zero vector rather than Inf.
        sum += away / dist_sq.sqrt().max(SEPARATION_EPSILON);
        count += 1;
    }
    if count == 0 {
        return Vec2::ZERO;
    }
    steer_toward(sum / count as f32, me, limits)
}

/// Reynolds steering: desired velocity at full speed, minus current velocity,
/// capped at `max_force`.
fn steer_toward(desired: Vec2, me: &BoidSnapshot, limits: SteeringLimits) -> Vec2 {
    (desired.with_magnitude(limits.max_speed) - me.velocity).limit(limits.max_force)
}
