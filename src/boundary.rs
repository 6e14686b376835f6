use glam::Vec2;

/// How boids leave and re-enter the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryPolicy {
    /// Toroidal world centered on the origin. Crossing `+bound` resets the
    /// axis to exactly `-bound` and vice versa.
    #[default]
    Wrap,
    /// World with its origin at the top-left corner. A boid whose edge
    /// pokes past one side pops back in at the opposite side, inset by its
    /// radius. Still a screen wrap, not a bounce.
    ClampToEdge,
}

/// Axis-aligned world rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl WorldBounds {
    /// Bounds for a `width` x `height` world under `policy`.
    pub fn for_policy(policy: BoundaryPolicy, width: f32, height: f32) -> Self {
        match policy {
            BoundaryPolicy::Wrap => {
                let half = Vec2::new(width * 0.5, height * 0.5);
                Self {
                    min: -half,
                    max: half,
                }
            }
            BoundaryPolicy::ClampToEdge => Self {
                min: Vec2::ZERO,
                max: Vec2::new(width, height),
            },
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Uniformly random point inside the bounds.
    pub fn random_point(&self, rng: &mut fastrand::Rng) -> Vec2 {
        let size = self.size();
        self.min + Vec2::new(rng.f32() * size.x, rng.f32() * size.y)
    }
}

impl BoundaryPolicy {
    /// Return `pos` brought back inside `bounds`.
    pub fn apply(self, pos: Vec2, radius: f32, bounds: &WorldBounds) -> Vec2 {
        match self {
            BoundaryPolicy::Wrap => Vec2::new(
                wrap_axis(pos.x, bounds.min.x, bounds.max.x),
                wrap_axis(pos.y, bounds.min.y, bounds.max.y),
            ),
            BoundaryPolicy::ClampToEdge => Vec2::new(
                pop_axis(pos.x, radius, bounds.min.x, bounds.max.x),
                pop_axis(pos.y, radius, bounds.min.y, bounds.max.y),
            ),
        }
    }
}

fn wrap_axis(v: f32, min: f32, max: f32) -> f32 {
    if v > max {
        min
    } else if v < min {
        max
    } else {
        v
    }
}

fn pop_axis(v: f32, radius: f32, min: f32, max: f32) -> f32 {
    if v + radius > max {
        min + radius
    } else if v - radius < min {
        max - radius
    } else {
        v
    }
}
