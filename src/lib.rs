//! Grid-accelerated 2D boids flocking core.
//!
//! A [`Flock`] owns every [`Boid`] and a uniform [`SpatialGrid`]. Each tick it
//! rebuilds the grid, computes alignment, cohesion and separation for every
//! boid against a pre-tick snapshot, then integrates positions and ages each
//! boid's particle trail. Rendering is left to the caller; see
//! [`render::instance`] for GPU-ready instance structs.

pub mod boid;
pub mod boundary;
pub mod color;
pub mod config;
pub mod debug;
pub mod error;
pub mod flock;
pub mod math;
pub mod particles;
pub mod render;
pub mod spatial;

pub use boid::steering::SteeringForces;
pub use boid::{Boid, BoidSnapshot};
pub use boundary::{BoundaryPolicy, WorldBounds};
pub use color::Color;
pub use config::{FlockConfig, GridMembership, SteeringWeights, VelocityRange};
pub use error::{ConfigurationError, Result};
pub use flock::Flock;
pub use math::{Steer, Vector2};
pub use particles::Particle;
pub use spatial::SpatialGrid;
