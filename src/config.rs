use glam::Vec2;

use crate::boundary::{BoundaryPolicy, WorldBounds};
use crate::color::{palette_from_hex, Color, DEFAULT_PALETTE};
use crate::error::{ConfigurationError, Result};
use crate::spatial::{grid_dims, MAX_CELLS};

/// Upper bound for live-tunable steering weights.
pub const MAX_WEIGHT: f32 = 2.0;

/// Speed range for a boid's randomized starting velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityRange {
    pub min: f32,
    pub max: f32,
}

impl Default for VelocityRange {
    fn default() -> Self {
        Self { min: 2.0, max: 4.0 }
    }
}

/// Per-rule multipliers. Tunable at runtime through `Flock::set_weights`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringWeights {
    pub alignment: f32,
    pub cohesion: f32,
    pub separation: f32,
}

impl Default for SteeringWeights {
    fn default() -> Self {
        Self {
            alignment: 1.0,
            cohesion: 1.0,
            separation: 1.0,
        }
    }
}

impl SteeringWeights {
    /// Clamp every weight into `[0, MAX_WEIGHT]`. NaN becomes 0.
    pub fn clamped(self) -> Self {
        let c = |w: f32| if w.is_nan() { 0.0 } else { w.clamp(0.0, MAX_WEIGHT) };
        Self {
            alignment: c(self.alignment),
            cohesion: c(self.cohesion),
            separation: c(self.separation),
        }
    }
}

/// Distance within which each rule considers another boid a neighbor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerceptionRadii {
    pub alignment: f32,
    pub cohesion: f32,
    pub separation: f32,
}

impl Default for PerceptionRadii {
    fn default() -> Self {
        Self {
            alignment: 50.0,
            cohesion: 100.0,
            separation: 50.0,
        }
    }
}

impl PerceptionRadii {
    /// Largest radius of any rule.
    pub fn max(&self) -> f32 {
        self.alignment.max(self.cohesion).max(self.separation)
    }
}

/// Inclusive-exclusive `[min, max)` float range used for random draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut fastrand::Rng) -> f32 {
        self.min + rng.f32() * (self.max - self.min)
    }
}

/// Trail particle parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSettings {
    /// Starting alpha on a 0-255 scale.
    pub initial_alpha: f32,
    pub size_range: Range,
    pub alpha_decay_range: Range,
    pub size_decay_range: Range,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            initial_alpha: 150.0,
            size_range: Range::new(1.5, 9.5),
            alpha_decay_range: Range::new(1.1, 8.2),
            size_decay_range: Range::new(0.01, 0.63),
        }
    }
}

impl ParticleSettings {
    /// Worst-case number of `update` calls before a particle expires.
    pub fn max_lifetime_ticks(&self) -> u32 {
        (self.initial_alpha / self.alpha_decay_range.min).ceil() as u32 + 1
    }
}

/// How agents are registered in the spatial grid.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GridMembership {
    /// Each agent lives in the one cell containing its center. Cheap, but
    /// under-counts neighbors sitting across a cell border.
    #[default]
    SingleCell,
    /// Each agent is registered in every cell overlapped by its
    /// `position ± radius` box, so a home-cell query sees every agent
    /// within `radius`.
    MultiCell { radius: f32 },
}

/// Construction-time flock configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FlockConfig {
    pub num_boids: usize,
    pub world_width: f32,
    pub world_height: f32,
    pub cell_size: f32,
    pub boid_radius: f32,
    pub max_force: f32,
    pub max_speed: f32,
    pub initial_velocity: VelocityRange,
    pub weights: SteeringWeights,
    pub radii: PerceptionRadii,
    pub palette: Vec<Color>,
    pub particles: ParticleSettings,
    /// Live particles kept per boid. Oldest are evicted past this.
    pub max_particles_per_boid: usize,
    pub boundary: BoundaryPolicy,
    pub membership: GridMembership,
    /// RNG seed. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            num_boids: 85,
            world_width: 1531.0,
            world_height: 980.0,
            cell_size: 100.0,
            boid_radius: 4.0,
            max_force: 1.0,
            max_speed: 4.0,
            initial_velocity: VelocityRange::default(),
            weights: SteeringWeights::default(),
            radii: PerceptionRadii::default(),
            palette: DEFAULT_PALETTE.to_vec(),
            particles: ParticleSettings::default(),
            max_particles_per_boid: 64,
            boundary: BoundaryPolicy::Wrap,
            membership: GridMembership::SingleCell,
            seed: None,
        }
    }
}

impl FlockConfig {
    /// World rectangle for the configured size and boundary policy.
    pub fn world_bounds(&self) -> WorldBounds {
        WorldBounds::for_policy(self.boundary, self.world_width, self.world_height)
    }

    /// Replace the palette with parsed `#RRGGBB` strings.
    pub fn with_hex_palette(mut self, hexes: &[&str]) -> Result<Self> {
        self.palette = palette_from_hex(hexes)?;
        Ok(self)
    }

    /// Reject configurations that would degenerate at runtime.
    pub fn validate(&self) -> Result<()> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(ConfigurationError::InvalidCellSize(self.cell_size));
        }
        if !self.max_speed.is_finite() || self.max_speed <= 0.0 {
            return Err(ConfigurationError::InvalidMaxSpeed(self.max_speed));
        }
        if !self.max_force.is_finite() || self.max_force < 0.0 {
            return Err(ConfigurationError::InvalidMaxForce(self.max_force));
        }
        let finite_positive = |v: f32| v.is_finite() && v > 0.0;
        if !finite_positive(self.world_width) || !finite_positive(self.world_height) {
            return Err(ConfigurationError::InvalidWorldSize {
                width: self.world_width,
                height: self.world_height,
            });
        }
        let world = Vec2::new(self.world_width, self.world_height);
        if grid_dims(world, self.cell_size).is_none() {
            return Err(ConfigurationError::GridTooLarge {
                cell_size: self.cell_size,
                width: self.world_width,
                height: self.world_height,
                max: MAX_CELLS,
            });
        }
        let v = self.initial_velocity;
        if !v.min.is_finite() || !v.max.is_finite() || v.min < 0.0 || v.min > v.max {
            return Err(ConfigurationError::InvalidVelocityRange {
                min: v.min,
                max: v.max,
            });
        }
        if self.palette.is_empty() {
            return Err(ConfigurationError::EmptyPalette);
        }
        if !self.boid_radius.is_finite() || self.boid_radius < 0.0 {
            return Err(invalid("boid_radius", format!("must be >= 0, got {}", self.boid_radius)));
        }
        if self.boundary == BoundaryPolicy::ClampToEdge
            && (self.boid_radius * 2.0 >= self.world_width
                || self.boid_radius * 2.0 >= self.world_height)
        {
            return Err(invalid("boid_radius", "boid does not fit inside the world".to_string()));
        }

        for (name, r) in [
            ("radii.alignment", self.radii.alignment),
            ("radii.cohesion", self.radii.cohesion),
            ("radii.separation", self.radii.separation),
        ] {
            if !finite_positive(r) {
                return Err(invalid(name, format!("must be finite and > 0, got {r}")));
            }
        }

        let w = self.weights;
        for (name, value) in [
            ("weights.alignment", w.alignment),
            ("weights.cohesion", w.cohesion),
            ("weights.separation", w.separation),
        ] {
            if !value.is_finite() || !(0.0..=MAX_WEIGHT).contains(&value) {
                return Err(invalid(name, format!("must be in [0, {MAX_WEIGHT}], got {value}")));
            }
        }

        let p = &self.particles;
        if !finite_positive(p.initial_alpha) {
            return Err(invalid("particles.initial_alpha", format!("got {}", p.initial_alpha)));
        }
        check_range("particles.size_range", p.size_range, false)?;
        check_range("particles.alpha_decay_range", p.alpha_decay_range, true)?;
        check_range("particles.size_decay_range", p.size_decay_range, true)?;

        if let GridMembership::MultiCell { radius } = self.membership {
            if !radius.is_finite() || radius < 0.0 {
                return Err(invalid("membership.radius", format!("must be >= 0, got {radius}")));
            }
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: String) -> ConfigurationError {
    ConfigurationError::InvalidParameter { name, reason }
}

fn check_range(name: &'static str, r: Range, strictly_positive: bool) -> Result<()> {
    let low_ok = if strictly_positive { r.min > 0.0 } else { r.min >= 0.0 };
    if !r.min.is_finite() || !r.max.is_finite() || !low_ok || r.min > r.max {
        return Err(invalid(name, format!("bad range {}..{}", r.min, r.max)));
    }
    Ok(())
}
