use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    grid::Movable,
    rng::SystemRng,
    world::{World, ATTACK_STAMINA_COST, HOSTILE_CONTACT_DAMAGE},
};

/// Pursuit and combat for every live hostile agent. Removal indices are
/// collected during the sweep and applied afterwards, so the sweep never
/// observes a half-updated list.
pub struct HostileSystem;

impl HostileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HostileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for HostileSystem {
    fn name(&self) -> &str {
        "hostiles"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let survivor_pos = world.survivor.pos;
        let grid = world.grid();
        let damage = world.survivor.attack_damage();

        let mut slain = Vec::new();
        for (index, hostile) in world.hostiles.iter_mut().enumerate() {
            if hostile.pos.chebyshev(survivor_pos) <= 1 {
                hostile.health -= damage;
                world.survivor.spend_stamina(ATTACK_STAMINA_COST);
                world.survivor.take_damage(HOSTILE_CONTACT_DAMAGE);
                if hostile.health <= 0 {
                    slain.push(index);
                }
            } else {
                hostile.step_toward(survivor_pos, grid);
            }
        }

        for index in slain.into_iter().rev() {
            world.hostiles.remove(index);
        }
        Ok(())
    }
}
