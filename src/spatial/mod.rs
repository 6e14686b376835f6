use glam::Vec2;

use crate::boundary::WorldBounds;
use crate::config::GridMembership;
use crate::error::{ConfigurationError, Result};

/// Marks an agent that is not currently indexed.
const UNINDEXED: u32 = u32::MAX;

/// Upper bound on the number of grid cells.
pub const MAX_CELLS: usize = 1 << 20;

/// Columns and rows needed to cover `size` with square cells, or `None` when
/// the grid would exceed [`MAX_CELLS`].
pub fn grid_dims(size: Vec2, cell_size: f32) -> Option<(usize, usize)> {
    let axis = |len: f32| {
        let n = (len / cell_size).ceil();
        if n.is_finite() && n <= MAX_CELLS as f32 {
            Some((n as usize).max(1))
        } else {
            None
        }
    };
    let (cols, rows) = (axis(size.x)?, axis(size.y)?);
    cols.checked_mul(rows)
        .filter(|&cells| cells <= MAX_CELLS)
        .map(|_| (cols, rows))
}

/// Uniform grid over the world rectangle for cell-resolution neighbor queries.
///
/// Cell size should be at least the largest perception radius so that
/// sharing a cell is a reasonable proxy for "within radius". Positions
/// outside the world are clamped to the nearest edge cell, so a boid caught
/// mid-wrap is still queryable.
///
/// The grid is rebuilt wholesale every tick. Buckets keep their allocations
/// across rebuilds.
pub struct SpatialGrid {
    cell_size: f32,
    inv_cell_size: f32,
    origin: Vec2,
    cols: usize,
    rows: usize,
    membership: GridMembership,
    /// Agent indices per cell, row-major.
    buckets: Vec<Vec<u32>>,
    /// Rebuild-time position of each agent, indexed by agent id.
    positions: Vec<Vec2>,
    /// Home cell of each agent, or `UNINDEXED`.
    home: Vec<u32>,
    /// Distinct agents currently indexed.
    indexed: usize,
}

impl SpatialGrid {
    /// Fails when `cell_size` is not positive or the grid would exceed [`MAX_CELLS`].
    pub fn new(bounds: WorldBounds, cell_size: f32, membership: GridMembership) -> Result<Self> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(ConfigurationError::InvalidCellSize(cell_size));
        }
        let size = bounds.size();
        let too_large = ConfigurationError::GridTooLarge {
            cell_size,
            width: size.x,
            height: size.y,
            max: MAX_CELLS,
        };
        let (cols, rows) = grid_dims(size, cell_size).ok_or(too_large)?;
        let mut buckets = Vec::with_capacity(cols * rows);
        for _ in 0..cols * rows {
            buckets.push(Vec::with_capacity(8));
        }
        log::debug!(
            "Spatial grid: {}x{} cells of {:.1} ({:?})",
            cols,
            rows,
            cell_size,
            membership
        );
        Ok(Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            origin: bounds.min,
            cols,
            rows,
            membership,
            buckets,
            positions: Vec::new(),
            home: Vec::new(),
            indexed: 0,
        })
    }

    /// Empty every bucket and forget all memberships.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear(); // Keeps allocation.
        }
        self.home.iter_mut().for_each(|h| *h = UNINDEXED);
        self.indexed = 0;
    }

    /// Clear, then index every agent at its position. Agent ids are slice indices.
    pub fn rebuild(&mut self, positions: &[Vec2]) {
        self.clear();
        self.positions.clear();
        self.positions.extend_from_slice(positions);
        self.home.clear();
        self.home.resize(positions.len(), UNINDEXED);
        for (idx, &pos) in positions.iter().enumerate() {
            self.insert(idx as u32, pos);
        }
    }

    /// Index one agent. Re-inserting an already indexed agent is a no-op.
    pub fn insert(&mut self, agent: u32, pos: Vec2) {
        let slot = agent as usize;
        if slot >= self.home.len() {
            self.home.resize(slot + 1, UNINDEXED);
            self.positions.resize(slot + 1, Vec2::ZERO);
        }
        if self.home[slot] != UNINDEXED {
            return;
        }
        self.positions[slot] = pos;
        let home = self.cell_id(pos);
        self.home[slot] = home as u32;
        self.indexed += 1;

        match self.membership {
            GridMembership::SingleCell => self.buckets[home].push(agent),
            GridMembership::MultiCell { radius } => {
                let (x0, y0) = self.cell_coords(pos - Vec2::splat(radius));
                let (x1, y1) = self.cell_coords(pos + Vec2::splat(radius));
                for cy in y0..=y1 {
                    for cx in x0..=x1 {
                        self.buckets[cy * self.cols + cx].push(agent);
                    }
                }
            }
        }
    }

    /// Call `callback` for every agent sharing `agent`'s home cell, excluding
    /// `agent` itself. Candidates farther than `query_radius` from the agent
    /// (rebuild-time positions) are skipped; pass `f32::INFINITY` for the
    /// raw cell contents. Unindexed agents have no neighbors.
    pub fn for_each_neighbor(&self, agent: u32, query_radius: f32, mut callback: impl FnMut(u32)) {
        let Some(&home) = self.home.get(agent as usize) else {
            return;
        };
        if home == UNINDEXED {
            return;
        }
        let me = self.positions[agent as usize];
        let radius_sq = query_radius * query_radius;
        let filter = query_radius.is_finite();
        for &other in &self.buckets[home as usize] {
            if other == agent {
                continue;
            }
            if filter && self.positions[other as usize].distance_squared(me) > radius_sq {
                continue;
            }
            callback(other);
        }
    }

    /// Collect neighbors of `agent` into `out` (cleared first).
    pub fn neighbors_of(&self, agent: u32, query_radius: f32, out: &mut Vec<u32>) {
        out.clear();
        self.for_each_neighbor(agent, query_radius, |idx| out.push(idx));
    }

    /// Row-major cell id for a position, clamped into the grid.
    pub fn cell_id(&self, pos: Vec2) -> usize {
        let (cx, cy) = self.cell_coords(pos);
        cy * self.cols + cx
    }

    fn cell_coords(&self, pos: Vec2) -> (usize, usize) {
        let local = (pos - self.origin) * self.inv_cell_size;
        let clamp = |v: f32, n: usize| {
            if v.is_nan() {
                0
            } else {
                (v.floor().max(0.0) as usize).min(n - 1)
            }
        };
        (clamp(local.x, self.cols), clamp(local.y, self.rows))
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn membership(&self) -> GridMembership {
        self.membership
    }

    /// Agents registered in `cell`. Out-of-range cells are empty.
    pub fn bucket(&self, cell: usize) -> &[u32] {
        self.buckets.get(cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sum of all bucket lengths. Equals `indexed_count()` under single-cell membership.
    pub fn bucket_total(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// Number of distinct agents indexed since the last clear.
    pub fn indexed_count(&self) -> usize {
        self.indexed
    }

    pub fn occupied_cells(&self) -> usize {
        self.buckets.iter().filter(|b| !b.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BoundaryPolicy;

    fn grid(membership: GridMembership) -> SpatialGrid {
        let bounds = WorldBounds::for_policy(BoundaryPolicy::ClampToEdge, 500.0, 300.0);
        SpatialGrid::new(bounds, 50.0, membership).unwrap()
    }

    #[test]
    fn dimensions_round_up() {
        let bounds = WorldBounds::for_policy(BoundaryPolicy::ClampToEdge, 510.0, 300.0);
        let g = SpatialGrid::new(bounds, 50.0, GridMembership::SingleCell).unwrap();
        assert_eq!(g.cols(), 11);
        assert_eq!(g.rows(), 6);
    }

    #[test]
    fn oversized_grids_are_rejected() {
        let bounds = WorldBounds::for_policy(BoundaryPolicy::Wrap, 1531.0, 980.0);
        for cell_size in [1e-30, 0.01] {
            assert!(matches!(
                SpatialGrid::new(bounds, cell_size, GridMembership::SingleCell),
                Err(ConfigurationError::GridTooLarge { .. })
            ));
        }
        assert!(matches!(
            SpatialGrid::new(bounds, 0.0, GridMembership::SingleCell),
            Err(ConfigurationError::InvalidCellSize(_))
        ));
    }

    #[test]
    fn grid_dims_respects_cell_cap() {
        assert_eq!(grid_dims(Vec2::new(100.0, 50.0), 10.0), Some((10, 5)));
        assert_eq!(grid_dims(Vec2::new(1024.0, 1024.0), 1.0), Some((1024, 1024)));
        assert_eq!(grid_dims(Vec2::new(1025.0, 1024.0), 1.0), None);
        assert_eq!(grid_dims(Vec2::new(1.0, 1.0), f32::MIN_POSITIVE), None);
        assert_eq!(grid_dims(Vec2::new(f32::INFINITY, 1.0), 1.0), None);
    }

    #[test]
    fn cell_id_formula() {
        let g = grid(GridMembership::SingleCell);
        assert_eq!(g.cell_id(Vec2::new(0.0, 0.0)), 0);
        assert_eq!(g.cell_id(Vec2::new(75.0, 0.0)), 1);
        assert_eq!(g.cell_id(Vec2::new(75.0, 120.0)), 1 + 2 * 10);
    }

    #[test]
    fn out_of_bounds_positions_clamp() {
        let g = grid(GridMembership::SingleCell);
        assert_eq!(g.cell_id(Vec2::new(-40.0, -10.0)), 0);
        assert_eq!(g.cell_id(Vec2::new(9000.0, 9000.0)), 10 * 6 - 1);
        assert_eq!(g.cell_id(Vec2::new(f32::NAN, 10.0)), 0);
    }

    #[test]
    fn insert_and_query() {
        let mut g = grid(GridMembership::SingleCell);
        g.rebuild(&[
            Vec2::new(100.0, 100.0),
            Vec2::new(110.0, 105.0),
            Vec2::new(400.0, 250.0),
        ]);

        let mut found = Vec::new();
        g.neighbors_of(0, f32::INFINITY, &mut found);
        assert_eq!(found, vec![1]);

        g.neighbors_of(2, f32::INFINITY, &mut found);
        assert!(found.is_empty());
    }

    #[test]
    fn query_radius_filters_cell_mates() {
        let mut g = grid(GridMembership::SingleCell);
        g.rebuild(&[Vec2::new(101.0, 101.0), Vec2::new(149.0, 149.0)]);
        let mut found = Vec::new();
        g.neighbors_of(0, 10.0, &mut found);
        assert!(found.is_empty());
        g.neighbors_of(0, 100.0, &mut found);
        assert_eq!(found, vec![1]);
    }

    #[test]
    fn clear_and_reuse() {
        let mut g = grid(GridMembership::SingleCell);
        g.rebuild(&[Vec2::new(50.0, 50.0), Vec2::new(52.0, 50.0)]);
        g.clear();

        let mut found = Vec::new();
        g.neighbors_of(0, f32::INFINITY, &mut found);
        assert!(found.is_empty());
        assert_eq!(g.bucket_total(), 0);
        assert_eq!(g.indexed_count(), 0);
    }

    #[test]
    fn unknown_agent_has_no_neighbors() {
        let mut g = grid(GridMembership::SingleCell);
        g.rebuild(&[Vec2::new(10.0, 10.0)]);
        let mut found = vec![99];
        g.neighbors_of(42, f32::INFINITY, &mut found);
        assert!(found.is_empty());
    }

    #[test]
    fn rebuild_indexes_every_agent_exactly_once() {
        let mut rng = fastrand::Rng::with_seed(99);
        for n in [0usize, 1, 2, 17, 256, 1000] {
            let positions: Vec<Vec2> = (0..n)
                // Deliberately spill outside the world on every side.
                .map(|_| Vec2::new(rng.f32() * 700.0 - 100.0, rng.f32() * 500.0 - 100.0))
                .collect();
            let mut g = grid(GridMembership::SingleCell);
            g.rebuild(&positions);
            assert_eq!(g.bucket_total(), n, "bucket total for n={n}");
            assert_eq!(g.indexed_count(), n);

            let mut seen = vec![0u32; n];
            for cell in 0..g.cols() * g.rows() {
                for &idx in g.bucket(cell) {
                    seen[idx as usize] += 1;
                }
            }
            assert!(seen.iter().all(|&c| c == 1));
        }
    }

    #[test]
    fn neighbors_never_include_self() {
        let mut rng = fastrand::Rng::with_seed(3);
        let positions: Vec<Vec2> = (0..300)
            .map(|_| Vec2::new(rng.f32() * 500.0, rng.f32() * 300.0))
            .collect();
        for membership in [
            GridMembership::SingleCell,
            GridMembership::MultiCell { radius: 30.0 },
        ] {
            let mut g = grid(membership);
            g.rebuild(&positions);
            let mut found = Vec::new();
            for i in 0..positions.len() as u32 {
                g.neighbors_of(i, f32::INFINITY, &mut found);
                assert!(!found.contains(&i));
            }
        }
    }

    #[test]
    fn multi_cell_sees_across_borders() {
        // Two agents 4 units apart on either side of the x = 50 cell border.
        let positions = [Vec2::new(48.0, 25.0), Vec2::new(52.0, 25.0)];

        let mut single = grid(GridMembership::SingleCell);
        single.rebuild(&positions);
        let mut found = Vec::new();
        single.neighbors_of(0, f32::INFINITY, &mut found);
        assert!(found.is_empty());

        let mut multi = grid(GridMembership::MultiCell { radius: 10.0 });
        multi.rebuild(&positions);
        multi.neighbors_of(0, f32::INFINITY, &mut found);
        assert_eq!(found, vec![1]);
        assert_eq!(multi.indexed_count(), 2);
        assert_eq!(multi.bucket_total(), 4);
    }
}
