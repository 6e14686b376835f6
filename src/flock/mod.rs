pub mod spawn;

use glam::Vec2;
use instant::Instant;

use crate::boid::steering::SteeringForces;
use crate::boid::{Boid, BoidSnapshot, StepContext};
use crate::boundary::WorldBounds;
use crate::config::{FlockConfig, GridMembership, SteeringWeights};
use crate::debug::timer::{SystemPhase, SystemTimers};
use crate::error::Result;
use crate::render::instance::{BoidInstance, ParticleInstance};
use crate::spatial::SpatialGrid;

// ---------------------------------------------------------------------------
// Buffers: pre-allocated, reused each tick
// ---------------------------------------------------------------------------

/// Scratch space for the read phase.
struct ForceBuffers {
    /// One entry per boid, filled before any boid moves.
    forces: Vec<SteeringForces>,
    neighbor_ids: Vec<u32>,
    neighbors: Vec<BoidSnapshot>,
}

impl ForceBuffers {
    fn new(capacity: usize) -> Self {
        Self {
            forces: Vec::with_capacity(capacity),
            neighbor_ids: Vec::with_capacity(64),
            neighbors: Vec::with_capacity(64),
        }
    }
}

// ---------------------------------------------------------------------------
// Flock
// ---------------------------------------------------------------------------

/// Owns every boid and the spatial grid, and runs the per-tick pipeline.
///
/// Each tick is frame-consistent: all forces are computed from a snapshot
/// taken before any boid moves, then all boids are integrated.
pub struct Flock {
    config: FlockConfig,
    bounds: WorldBounds,
    boids: Vec<Boid>,
    grid: SpatialGrid,
    /// Pre-tick state, indexed like `boids`.
    snapshots: Vec<BoidSnapshot>,
    positions: Vec<Vec2>,
    bufs: ForceBuffers,
    /// Live-tunable rule weights, read every tick.
    weights: SteeringWeights,
    rng: fastrand::Rng,
    last_tick: Option<Instant>,
    tick_count: u64,
    timers: SystemTimers,
}

impl Flock {
    /// Validate `config` and spawn a randomized flock.
    pub fn new(config: FlockConfig) -> Result<Self> {
        config.validate()?;
        let bounds = config.world_bounds();
        let mut rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let boids = spawn::spawn_boids(&config, &bounds, &mut rng);
        Self::assemble(config, bounds, boids, rng)
    }

    /// Validate `config` and adopt an explicit population.
    /// `config.num_boids` is overridden with `boids.len()`, and every boid takes
    /// on the radius, speed and force limits and trail cap of `config`.
    pub fn from_boids(mut config: FlockConfig, mut boids: Vec<Boid>) -> Result<Self> {
        config.num_boids = boids.len();
        config.validate()?;
        for boid in &mut boids {
            boid.apply_config(&config);
        }
        let bounds = config.world_bounds();
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self::assemble(config, bounds, boids, rng)
    }

    fn assemble(
        config: FlockConfig,
        bounds: WorldBounds,
        boids: Vec<Boid>,
        rng: fastrand::Rng,
    ) -> Result<Self> {
        let reach = config.radii.max();
        if config.cell_size < reach {
            log::warn!(
                "Cell size {:.1} is below the largest perception radius {:.1}; \
                 neighbors across cell borders will be missed",
                config.cell_size,
                reach
            );
        }
        if let GridMembership::MultiCell { radius } = config.membership {
            if radius < reach {
                log::warn!(
                    "Multi-cell radius {:.1} is below the largest perception radius {:.1}",
                    radius,
                    reach
                );
            }
        }

        let grid = SpatialGrid::new(bounds, config.cell_size, config.membership)?;
        log::info!(
            "Flock ready: {} boids in {}x{} world ({:?}, {}x{} grid)",
            boids.len(),
            config.world_width,
            config.world_height,
            config.boundary,
            grid.cols(),
            grid.rows()
        );

        let n = boids.len();
        Ok(Self {
            weights: config.weights,
            config,
            bounds,
            boids,
            grid,
            snapshots: Vec::with_capacity(n),
            positions: Vec::with_capacity(n),
            bufs: ForceBuffers::new(n),
            rng,
            last_tick: None,
            tick_count: 0,
            timers: SystemTimers::new(),
        })
    }

    /// Advance one tick, timing the gap since the previous call.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let elapsed_ms = match self.last_tick {
            Some(last) => now.duration_since(last).as_secs_f32() * 1000.0,
            None => 0.0,
        };
        self.last_tick = Some(now);
        self.advance(elapsed_ms);
    }

    /// Advance one tick with an explicit frame gap. Deterministic for a seeded flock.
    pub fn advance(&mut self, elapsed_ms: f32) {
        let elapsed_ms = if elapsed_ms.is_finite() && elapsed_ms >= 0.0 {
            elapsed_ms
        } else {
            log::warn!("Ignoring invalid frame gap {elapsed_ms}ms");
            0.0
        };

        // 1. Snapshot pre-tick state + rebuild grid
        self.timers.begin();
        self.rebuild();
        self.timers.end(SystemPhase::GridRebuild);

        // 2. Read phase: forces for every boid, nobody moves
        self.timers.begin();
        self.compute_forces();
        self.timers.end(SystemPhase::Forces);

        // 3. Write phase: integrate, wrap, particles
        self.timers.begin();
        self.integrate(elapsed_ms);
        self.timers.end(SystemPhase::Integrate);

        self.tick_count += 1;
    }

    fn rebuild(&mut self) {
        self.snapshots.clear();
        self.positions.clear();
        for boid in &self.boids {
            let snap = boid.snapshot();
            self.snapshots.push(snap);
            self.positions.push(snap.position);
        }
        self.grid.rebuild(&self.positions);
        debug_assert_eq!(self.grid.indexed_count(), self.boids.len());
    }

    fn compute_forces(&mut self) {
        let reach = self.config.radii.max();
        let bufs = &mut self.bufs;
        bufs.forces.clear();
        for (idx, boid) in self.boids.iter().enumerate() {
            self.grid.neighbors_of(idx as u32, reach, &mut bufs.neighbor_ids);
            bufs.neighbors.clear();
            bufs.neighbors
                .extend(bufs.neighbor_ids.iter().map(|&n| self.snapshots[n as usize]));
            bufs.forces
                .push(boid.compute_forces(&bufs.neighbors, &self.config.radii, self.weights));
        }
    }

    fn integrate(&mut self, elapsed_ms: f32) {
        let mut ctx = StepContext {
            bounds: &self.bounds,
            boundary: self.config.boundary,
            palette: &self.config.palette,
            particles: &self.config.particles,
            elapsed_ms,
            rng: &mut self.rng,
        };
        for (boid, forces) in self.boids.iter_mut().zip(&self.bufs.forces) {
            boid.integrate(*forces, &mut ctx);
        }
    }

    /// Current rule weights.
    pub fn weights(&self) -> SteeringWeights {
        self.weights
    }

    /// Retune rule weights; values are clamped to the slider range `[0, 2]`.
    pub fn set_weights(&mut self, weights: SteeringWeights) {
        self.weights = weights.clamped();
        log::debug!("Steering weights set to {:?}", self.weights);
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    pub fn boid(&self, idx: usize) -> Option<&Boid> {
        self.boids.get(idx)
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn bounds(&self) -> &WorldBounds {
        &self.bounds
    }

    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn timers(&self) -> &SystemTimers {
        &self.timers
    }

    /// Live particles across every boid.
    pub fn particle_count(&self) -> usize {
        self.boids.iter().map(|b| b.trail().len()).sum()
    }

    /// Fill render buffers (cleared first) with one instance per boid and particle.
    pub fn build_instances(
        &self,
        boids_out: &mut Vec<BoidInstance>,
        particles_out: &mut Vec<ParticleInstance>,
    ) {
        boids_out.clear();
        particles_out.clear();
        for boid in &self.boids {
            boids_out.push(BoidInstance::from_boid(boid));
            particles_out.extend(boid.particles().map(ParticleInstance::from_particle));
        }
    }
}
