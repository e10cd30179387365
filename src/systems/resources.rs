use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    grid::ResourceKind,
    rng::SystemRng,
    world::World,
};

/// Applies world-contact effects at the survivor's cell, then returns
/// respawn-due berries to the world. Runs every tick regardless of which
/// decision branch the survivor took.
pub struct ResourceSystem;

impl ResourceSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ResourceSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ResourceSystem {
    fn name(&self) -> &str {
        "resources"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let now = ctx.tick;
        let pos = world.survivor.pos;

        match world.registry.kind_at(pos) {
            Some(ResourceKind::Berry) => {
                world.registry.consume(pos, ResourceKind::Berry, now);
                // A hungry survivor eats on the spot; otherwise the berry is
                // pocketed. The meal clock resets either way.
                if !world.survivor.is_hungry(now) {
                    world.survivor.inventory.berries += 1;
                }
                world.survivor.last_ate = now;
            }
            Some(ResourceKind::Water) => {
                world.survivor.last_drank = now;
            }
            Some(ResourceKind::Tree) => {
                // Trees stay in the world; standing on one yields wood.
                world.survivor.inventory.wood += 1;
            }
            Some(ResourceKind::Stone) => {
                world.registry.consume(pos, ResourceKind::Stone, now);
                world.survivor.inventory.stone += 1;
            }
            None => {}
        }

        world.registry.respawn_due(now);
        Ok(())
    }
}
