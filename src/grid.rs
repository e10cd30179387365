//! Toroidal grid math and the registry of environmental resources.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Ticks a consumed berry stays out of the world before it may respawn.
pub const BERRY_RESPAWN_TICKS: u64 = 300;

/// A cell on the grid. Coordinates always land in `[0, grid)` after
/// [`Position::wrapped`]; the grid is a torus, so movement off one edge
/// re-enters on the opposite edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn wrapped(self, grid: i32) -> Self {
        Self {
            x: self.x.rem_euclid(grid),
            y: self.y.rem_euclid(grid),
        }
    }

    pub fn offset(self, dx: i32, dy: i32, grid: i32) -> Self {
        Self::new(self.x + dx, self.y + dy).wrapped(grid)
    }

    /// One step toward `target`: each axis independently moves by the sign of
    /// the coordinate difference, so diagonal closure is possible.
    pub fn stepped_toward(self, target: Position, grid: i32) -> Self {
        let dx = (target.x - self.x).signum();
        let dy = (target.y - self.y).signum();
        self.offset(dx, dy, grid)
    }

    pub fn distance_sq(self, other: Position) -> i64 {
        let dx = i64::from(other.x - self.x);
        let dy = i64::from(other.y - self.y);
        dx * dx + dy * dy
    }

    pub fn chebyshev(self, other: Position) -> i32 {
        (other.x - self.x).abs().max((other.y - self.y).abs())
    }
}

/// Anything that occupies a cell and can close in on a target one step at a
/// time. The survivor and hostile agents share this movement rule.
pub trait Movable {
    fn position(&self) -> Position;
    fn set_position(&mut self, pos: Position);

    fn step_toward(&mut self, target: Position, grid: i32) {
        let next = self.position().stepped_toward(target, grid);
        self.set_position(next);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Tree,
    Stone,
    Berry,
    Water,
}

/// Per-cell Bernoulli probabilities used when seeding the grid. At most one
/// kind claims a cell; draws happen in the declared order and the first hit
/// wins.
#[derive(Debug, Clone, Deserialize)]
pub struct SpawnDensities {
    #[serde(default = "default_tree_density")]
    pub tree: f64,
    #[serde(default = "default_berry_density")]
    pub berry: f64,
    #[serde(default = "default_water_density")]
    pub water: f64,
    #[serde(default = "default_stone_density")]
    pub stone: f64,
}

fn default_tree_density() -> f64 {
    0.01
}

fn default_berry_density() -> f64 {
    0.002
}

fn default_water_density() -> f64 {
    0.001
}

fn default_stone_density() -> f64 {
    0.005
}

impl Default for SpawnDensities {
    fn default() -> Self {
        Self {
            tree: default_tree_density(),
            berry: default_berry_density(),
            water: default_water_density(),
            stone: default_stone_density(),
        }
    }
}

/// The world's resource locations: four disjoint position sets plus the
/// removal ledger that schedules berry respawns.
///
/// Sets are ordered (`BTreeSet`), so iteration order is the lexicographic
/// position order. Nearest-resource ties resolve to the first minimal
/// element of that order, which keeps repeated queries stable.
#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    grid: i32,
    trees: BTreeSet<Position>,
    stones: BTreeSet<Position>,
    berries: BTreeSet<Position>,
    water: BTreeSet<Position>,
    berry_ledger: BTreeMap<Position, u64>,
}

impl ResourceRegistry {
    pub fn empty(grid: i32) -> Self {
        Self {
            grid,
            trees: BTreeSet::new(),
            stones: BTreeSet::new(),
            berries: BTreeSet::new(),
            water: BTreeSet::new(),
            berry_ledger: BTreeMap::new(),
        }
    }

    /// Seeds every cell except `origin` with independent Bernoulli draws.
    pub fn generate(
        grid: i32,
        densities: &SpawnDensities,
        origin: Position,
        rng: &mut impl Rng,
    ) -> Self {
        let mut registry = Self::empty(grid);
        for x in 0..grid {
            for y in 0..grid {
                let pos = Position::new(x, y);
                if pos == origin {
                    continue;
                }
                if rng.gen_bool(densities.tree) {
                    registry.trees.insert(pos);
                } else if rng.gen_bool(densities.berry) {
                    registry.berries.insert(pos);
                } else if rng.gen_bool(densities.water) {
                    registry.water.insert(pos);
                } else if rng.gen_bool(densities.stone) {
                    registry.stones.insert(pos);
                }
            }
        }
        registry
    }

    pub fn grid(&self) -> i32 {
        self.grid
    }

    fn set(&self, kind: ResourceKind) -> &BTreeSet<Position> {
        match kind {
            ResourceKind::Tree => &self.trees,
            ResourceKind::Stone => &self.stones,
            ResourceKind::Berry => &self.berries,
            ResourceKind::Water => &self.water,
        }
    }

    fn set_mut(&mut self, kind: ResourceKind) -> &mut BTreeSet<Position> {
        match kind {
            ResourceKind::Tree => &mut self.trees,
            ResourceKind::Stone => &mut self.stones,
            ResourceKind::Berry => &mut self.berries,
            ResourceKind::Water => &mut self.water,
        }
    }

    pub fn insert(&mut self, kind: ResourceKind, pos: Position) {
        let wrapped = pos.wrapped(self.grid);
        self.set_mut(kind).insert(wrapped);
    }

    pub fn contains(&self, kind: ResourceKind, pos: Position) -> bool {
        self.set(kind).contains(&pos)
    }

    pub fn is_tree(&self, pos: Position) -> bool {
        self.trees.contains(&pos)
    }

    /// The resource occupying `pos`, if any. Cells hold at most one kind.
    pub fn kind_at(&self, pos: Position) -> Option<ResourceKind> {
        if self.berries.contains(&pos) {
            Some(ResourceKind::Berry)
        } else if self.water.contains(&pos) {
            Some(ResourceKind::Water)
        } else if self.trees.contains(&pos) {
            Some(ResourceKind::Tree)
        } else if self.stones.contains(&pos) {
            Some(ResourceKind::Stone)
        } else {
            None
        }
    }

    /// The instance of `kind` with minimal squared Euclidean distance to
    /// `origin`. Ties resolve to the lexicographically smallest position.
    pub fn nearest(&self, origin: Position, kind: ResourceKind) -> Option<Position> {
        self.set(kind)
            .iter()
            .copied()
            .min_by_key(|pos| pos.distance_sq(origin))
    }

    /// Removes `pos` from the set for `kind`. Removed berries enter the
    /// ledger with the removal tick; a ledger entry and set membership are
    /// mutually exclusive.
    pub fn consume(&mut self, pos: Position, kind: ResourceKind, now: u64) {
        if self.set_mut(kind).remove(&pos) && kind == ResourceKind::Berry {
            self.berry_ledger.insert(pos, now);
        }
    }

    /// Returns every berry whose removal is more than [`BERRY_RESPAWN_TICKS`]
    /// old to the world, clearing its ledger entry.
    pub fn respawn_due(&mut self, now: u64) -> Vec<Position> {
        let due: Vec<Position> = self
            .berry_ledger
            .iter()
            .filter(|(_, &removed)| now.saturating_sub(removed) > BERRY_RESPAWN_TICKS)
            .map(|(&pos, _)| pos)
            .collect();
        for pos in &due {
            self.berry_ledger.remove(pos);
            self.berries.insert(*pos);
        }
        due
    }

    pub fn pending_respawns(&self) -> usize {
        self.berry_ledger.len()
    }

    pub fn positions(&self, kind: ResourceKind) -> impl Iterator<Item = Position> + '_ {
        self.set(kind).iter().copied()
    }

    pub fn count(&self, kind: ResourceKind) -> usize {
        self.set(kind).len()
    }
}
