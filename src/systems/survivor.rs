use anyhow::Result;
use rand::Rng;

use crate::{
    engine::{System, SystemContext},
    grid::{Movable, Position, ResourceKind},
    rng::SystemRng,
    world::{Task, World, MOVE_STAMINA_COST, REST_STAMINA_THRESHOLD},
};

/// The survivor's per-tick decision loop. Exactly one branch executes each
/// tick, in strict priority order: rest, eat, drink, task, wander.
pub struct SurvivorSystem;

impl SurvivorSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SurvivorSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for SurvivorSystem {
    fn name(&self) -> &str {
        "survivor"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let now = ctx.tick;

        if world.survivor.stamina < REST_STAMINA_THRESHOLD {
            world.survivor.rest();
            return Ok(());
        }

        if world.survivor.is_hungry(now) {
            if world.survivor.inventory.berries > 0 {
                world.survivor.inventory.berries -= 1;
                world.survivor.last_ate = now;
            } else if let Some(target) =
                world.registry.nearest(world.survivor.pos, ResourceKind::Berry)
            {
                seek(world, target);
            } else {
                wander(world, rng);
            }
            return Ok(());
        }

        if world.survivor.is_thirsty(now) {
            if let Some(target) = world.registry.nearest(world.survivor.pos, ResourceKind::Water) {
                seek(world, target);
            } else {
                wander(world, rng);
            }
            return Ok(());
        }

        if let Some(task) = world.survivor.task {
            if let Some(target) = task_target(world, task) {
                walk(world, target);
            } else {
                wander(world, rng);
            }
            return Ok(());
        }

        wander(world, rng);
        Ok(())
    }
}

/// Need-driven approach. Steps regardless of blocking terrain: an urgent
/// survivor pushes through tree cells that ordinary movement refuses.
fn seek(world: &mut World, target: Position) {
    let next = world.survivor.position().stepped_toward(target, world.grid());
    if next != world.survivor.position() {
        world.survivor.set_position(next);
        world.survivor.spend_stamina(MOVE_STAMINA_COST);
    }
}

/// Task movement. A step that would land on a tree cell is skipped and the
/// survivor stays put for the tick.
fn walk(world: &mut World, target: Position) {
    let next = world.survivor.position().stepped_toward(target, world.grid());
    if next == world.survivor.position() || world.registry.is_tree(next) {
        return;
    }
    world.survivor.set_position(next);
    world.survivor.spend_stamina(MOVE_STAMINA_COST);
}

/// One of the four axis directions, uniformly at random; tree cells block.
fn wander(world: &mut World, rng: &mut SystemRng<'_>) {
    const DIRECTIONS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
    let (dx, dy) = DIRECTIONS[rng.gen_range(0..DIRECTIONS.len())];
    let next = world.survivor.position().offset(dx, dy, world.grid());
    if world.registry.is_tree(next) {
        return;
    }
    world.survivor.set_position(next);
    world.survivor.spend_stamina(MOVE_STAMINA_COST);
}

fn task_target(world: &World, task: Task) -> Option<Position> {
    let origin = world.survivor.pos;
    match task {
        Task::Mining => world.registry.nearest(origin, ResourceKind::Stone),
        Task::Woodcutting => world.registry.nearest(origin, ResourceKind::Tree),
        Task::Foraging => world.registry.nearest(origin, ResourceKind::Berry),
        Task::Hunting => nearest_hostile(world, origin),
    }
}

/// Hostiles are enumerated in spawn order, which doubles as the distance
/// tie-break, mirroring the fixed enumeration order used for resources.
fn nearest_hostile(world: &World, origin: Position) -> Option<Position> {
    world
        .hostiles
        .iter()
        .map(|hostile| hostile.pos)
        .min_by_key(|pos| pos.distance_sq(origin))
}
