//! End-to-end behavior of the tick pipeline.

use std::path::PathBuf;

use stranded::{
    engine::{Engine, EngineSettings},
    grid::{Position, ResourceKind, ResourceRegistry},
    world::{
        HostileAgent, SimulationTime, Survivor, Weapon, World, HOSTILE_MAX_HEALTH,
        REST_STAMINA_THRESHOLD,
    },
};

fn engine(seed: u64) -> Engine {
    Engine::standard(EngineSettings {
        scenario_name: "test".into(),
        seed,
        snapshot_interval_ticks: 0,
        snapshot_dir: PathBuf::from("snapshots"),
    })
}

fn bare_world(survivor: Survivor) -> World {
    World::new(survivor, Vec::new(), ResourceRegistry::empty(100))
}

/// Survivor pinned in place: its own cell is water, all four axis neighbours
/// are trees (wander is always blocked), and hunger is served from the
/// inventory. Hostiles can still reach the diagonals.
fn caged_world(berries_in_pocket: u32) -> World {
    let centre = Position::new(50, 50);
    let mut registry = ResourceRegistry::empty(100);
    registry.insert(ResourceKind::Water, centre);
    for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
        registry.insert(ResourceKind::Tree, centre.offset(dx, dy, 100));
    }
    let mut survivor = Survivor::new(centre, 100, 100);
    survivor.inventory.berries = berries_in_pocket;
    World::new(survivor, Vec::new(), registry)
}

#[test]
fn hungry_survivor_reaches_berry_in_two_ticks_and_eats_immediately() {
    let mut world = bare_world(Survivor::new(Position::new(50, 50), 100, 100));
    world.time = SimulationTime::at(100, 0);
    world.registry.insert(ResourceKind::Berry, Position::new(52, 50));

    let mut engine = engine(1);
    engine.step(&mut world).unwrap();
    assert_eq!(world.survivor.pos, Position::new(51, 50));

    engine.step(&mut world).unwrap();
    assert_eq!(world.survivor.pos, Position::new(52, 50));
    assert_eq!(world.survivor.inventory.berries, 0, "eaten, not queued");
    assert_eq!(world.survivor.last_ate, 102);
    assert!(!world
        .registry
        .contains(ResourceKind::Berry, Position::new(52, 50)));
    assert_eq!(world.survivor.hunger_level(world.time.tick()), 1.0);
}

#[test]
fn hunger_level_never_rises_between_meals() {
    let mut world = bare_world(Survivor::new(Position::new(50, 50), 100, 100));
    let mut engine = engine(2);

    let mut previous = world.survivor.hunger_level(world.time.tick());
    for _ in 0..60 {
        engine.step(&mut world).unwrap();
        let current = world.survivor.hunger_level(world.time.tick());
        assert!(current <= previous);
        previous = current;
    }
}

#[test]
fn consumed_berry_stays_out_for_the_full_respawn_horizon() {
    let mut world = caged_world(40);
    let berry = Position::new(90, 90);
    world.registry.insert(ResourceKind::Berry, berry);

    let mut engine = engine(3);
    for _ in 0..5 {
        engine.step(&mut world).unwrap();
    }
    let removal_tick = world.time.tick();
    world.registry.consume(berry, ResourceKind::Berry, removal_tick);

    // Absent through now - removal == 300, present at the first tick past it.
    while world.time.tick() < removal_tick + 300 {
        engine.step(&mut world).unwrap();
        assert!(!world.registry.contains(ResourceKind::Berry, berry));
    }
    engine.step(&mut world).unwrap();
    assert!(world.registry.contains(ResourceKind::Berry, berry));
}

#[test]
fn unarmed_combat_kills_a_hostile_on_the_tenth_qualifying_tick() {
    let mut world = caged_world(40);
    world.hostiles.push(HostileAgent::new(Position::new(51, 51)));

    let mut engine = engine(4);
    for expected in 1..=9 {
        engine.step(&mut world).unwrap();
        assert_eq!(world.hostiles.len(), 1, "removed early at tick {expected}");
        assert_eq!(world.hostiles[0].health, HOSTILE_MAX_HEALTH - 5 * expected);
    }
    engine.step(&mut world).unwrap();
    assert!(world.hostiles.is_empty());
    // Ten contact ticks also cost the survivor health.
    assert_eq!(world.survivor.health, 100 - 50);
}

#[test]
fn an_equipped_weapon_doubles_attack_damage() {
    let mut world = caged_world(40);
    world.survivor.weapon = Some(Weapon::Sword);
    world.hostiles.push(HostileAgent::new(Position::new(49, 49)));

    let mut engine = engine(5);
    engine.step(&mut world).unwrap();
    assert_eq!(world.hostiles[0].health, HOSTILE_MAX_HEALTH - 10);
    for _ in 0..4 {
        engine.step(&mut world).unwrap();
    }
    assert!(world.hostiles.is_empty());
}

#[test]
fn distant_hostiles_close_in_diagonally() {
    let mut world = caged_world(40);
    world.hostiles.push(HostileAgent::new(Position::new(55, 57)));

    let mut engine = engine(6);
    engine.step(&mut world).unwrap();
    assert_eq!(world.hostiles[0].pos, Position::new(54, 56));
}

#[test]
fn rest_takes_priority_over_hunger() {
    // Hunger is pending (last meal at tick 0), but resting wins.
    let mut world = bare_world(Survivor::new(Position::new(50, 50), 100, 15));
    world.time = SimulationTime::at(100, 0);
    world.registry.insert(ResourceKind::Berry, Position::new(52, 50));

    let mut engine = engine(7);
    engine.step(&mut world).unwrap();

    assert_eq!(world.survivor.pos, Position::new(50, 50), "no movement while resting");
    assert_eq!(world.survivor.stamina, REST_STAMINA_THRESHOLD);
    assert!(world
        .registry
        .contains(ResourceKind::Berry, Position::new(52, 50)));
}

#[test]
fn starvation_kills_exactly_at_the_depletion_horizon() {
    let mut world = bare_world(Survivor::new(Position::new(50, 50), 100, 100));
    world.survivor.last_drank = 300; // thirst never fires first
    world.time = SimulationTime::at(150, 0);

    let mut engine = engine(8);
    engine.run(&mut world, 500).unwrap();

    // Hunger level hits zero at tick 200; the run stops there, well short of
    // the requested tick count.
    assert_eq!(world.time.tick(), 200);
    assert!(world.death_due());
}

#[test]
fn contact_damage_can_kill_the_survivor() {
    let mut world = caged_world(40);
    world.survivor.health = 5;
    world.hostiles.push(HostileAgent::new(Position::new(51, 51)));

    let mut engine = engine(9);
    let summary = engine.step(&mut world).unwrap();
    assert_eq!(world.survivor.health, 0);
    assert!(summary.dead);
}

#[test]
fn nearest_berry_ties_resolve_to_the_smaller_position() {
    let mut world = bare_world(Survivor::new(Position::new(50, 50), 100, 100));
    world.time = SimulationTime::at(100, 0);
    world.registry.insert(ResourceKind::Berry, Position::new(52, 50));
    world.registry.insert(ResourceKind::Berry, Position::new(48, 50));

    let mut engine = engine(10);
    engine.step(&mut world).unwrap();
    assert_eq!(world.survivor.pos, Position::new(49, 50));
}

#[test]
fn seeking_ignores_tree_blocking() {
    // The only path to the berry runs through a tree cell; a hungry survivor
    // walks straight over it.
    let mut world = bare_world(Survivor::new(Position::new(50, 50), 100, 100));
    world.time = SimulationTime::at(100, 0);
    world.registry.insert(ResourceKind::Tree, Position::new(51, 50));
    world.registry.insert(ResourceKind::Berry, Position::new(52, 50));

    let mut engine = engine(11);
    engine.step(&mut world).unwrap();
    assert_eq!(world.survivor.pos, Position::new(51, 50));
    // Standing on the tree also yields wood.
    assert_eq!(world.survivor.inventory.wood, 1);
}

#[test]
fn runs_are_reproducible_per_seed() {
    let mut world_a = bare_world(Survivor::new(Position::new(50, 50), 100, 100));
    let mut world_b = bare_world(Survivor::new(Position::new(50, 50), 100, 100));

    engine(42).run(&mut world_a, 50).unwrap();
    engine(42).run(&mut world_b, 50).unwrap();

    assert_eq!(world_a.survivor.pos, world_b.survivor.pos);
    assert_eq!(world_a.survivor.stamina, world_b.survivor.stamina);
}

#[test]
fn stone_contact_harvests_and_removes_the_stone() {
    // A stone sits on the berry-bound path; walking over it picks it up.
    let mut world = bare_world(Survivor::new(Position::new(50, 50), 100, 100));
    world.time = SimulationTime::at(100, 0);
    world.registry.insert(ResourceKind::Berry, Position::new(52, 50));
    world.registry.insert(ResourceKind::Stone, Position::new(51, 50));

    let mut engine = engine(12);
    engine.step(&mut world).unwrap();
    assert_eq!(world.survivor.pos, Position::new(51, 50));
    assert_eq!(world.survivor.inventory.stone, 1);
    assert!(!world
        .registry
        .contains(ResourceKind::Stone, Position::new(51, 50)));
}
