//! Mutable world state: the survivor, hostile agents, weather, and time.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::grid::{Movable, Position, ResourceKind, ResourceRegistry};
use crate::needs;

pub const HEALTH_MAX: i32 = 200;
pub const STAMINA_MAX: i32 = 200;

/// Below this stamina the survivor rests instead of acting.
pub const REST_STAMINA_THRESHOLD: i32 = 20;
pub const REST_RECOVERY: i32 = 5;
/// Resting never raises stamina past this point.
pub const REST_RECOVERY_CAP: i32 = 100;

pub const MOVE_STAMINA_COST: i32 = 1;
pub const ATTACK_STAMINA_COST: i32 = 10;
pub const UNARMED_DAMAGE: i32 = 5;
pub const WEAPON_DAMAGE: i32 = 10;

pub const HOSTILE_MAX_HEALTH: i32 = 50;
pub const HOSTILE_CONTACT_DAMAGE: i32 = 5;

pub const TICKS_PER_DAY: u64 = 1440;
pub const WEATHER_CHANGE_TICKS: u64 = 300;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub wood: u32,
    pub stone: u32,
    pub berries: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weapon {
    Axe,
    Sword,
}

impl Weapon {
    pub fn damage(self) -> i32 {
        WEAPON_DAMAGE
    }

    /// Crafting cost as (wood, stone).
    pub fn cost(self) -> (u32, u32) {
        match self {
            Weapon::Axe => (5, 3),
            Weapon::Sword => (3, 5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    Mining,
    Woodcutting,
    Foraging,
    Hunting,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Survivor {
    pub pos: Position,
    pub health: i32,
    pub stamina: i32,
    pub last_ate: u64,
    pub last_drank: u64,
    pub inventory: Inventory,
    pub weapon: Option<Weapon>,
    pub task: Option<Task>,
}

impl Survivor {
    pub fn new(pos: Position, health: i32, stamina: i32) -> Self {
        Self {
            pos,
            health: health.clamp(0, HEALTH_MAX),
            stamina: stamina.clamp(0, STAMINA_MAX),
            last_ate: 0,
            last_drank: 0,
            inventory: Inventory::default(),
            weapon: None,
            task: None,
        }
    }

    pub fn is_hungry(&self, now: u64) -> bool {
        needs::is_hungry(now, self.last_ate)
    }

    pub fn is_thirsty(&self, now: u64) -> bool {
        needs::is_thirsty(now, self.last_drank)
    }

    pub fn hunger_level(&self, now: u64) -> f32 {
        needs::hunger_level(now, self.last_ate)
    }

    pub fn thirst_level(&self, now: u64) -> f32 {
        needs::thirst_level(now, self.last_drank)
    }

    pub fn spend_stamina(&mut self, cost: i32) {
        self.stamina = (self.stamina - cost).max(0);
    }

    pub fn rest(&mut self) {
        self.stamina = (self.stamina + REST_RECOVERY).min(REST_RECOVERY_CAP);
    }

    pub fn take_damage(&mut self, damage: i32) {
        self.health = (self.health - damage).max(0);
    }

    pub fn attack_damage(&self) -> i32 {
        self.weapon.map(Weapon::damage).unwrap_or(UNARMED_DAMAGE)
    }

    /// Deducts materials and equips the weapon. Insufficient materials leave
    /// the inventory and the equipped weapon untouched.
    pub fn craft(&mut self, weapon: Weapon) -> bool {
        let (wood, stone) = weapon.cost();
        if self.inventory.wood < wood || self.inventory.stone < stone {
            return false;
        }
        self.inventory.wood -= wood;
        self.inventory.stone -= stone;
        self.weapon = Some(weapon);
        true
    }
}

impl Movable for Survivor {
    fn position(&self) -> Position {
        self.pos
    }

    fn set_position(&mut self, pos: Position) {
        self.pos = pos;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostileAgent {
    pub pos: Position,
    pub health: i32,
}

impl HostileAgent {
    pub fn new(pos: Position) -> Self {
        Self {
            pos,
            health: HOSTILE_MAX_HEALTH,
        }
    }
}

impl Movable for HostileAgent {
    fn position(&self) -> Position {
        self.pos
    }

    fn set_position(&mut self, pos: Position) {
        self.pos = pos;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Clear,
    Rainy,
    Stormy,
}

impl Weather {
    fn roll(rng: &mut impl Rng) -> Self {
        match rng.gen_range(0..3) {
            0 => Weather::Clear,
            1 => Weather::Rainy,
            _ => Weather::Stormy,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherState {
    pub condition: Weather,
    pub changed_at: u64,
}

impl WeatherState {
    pub fn new() -> Self {
        Self::at(Weather::Clear, 0)
    }

    pub fn at(condition: Weather, changed_at: u64) -> Self {
        Self {
            condition,
            changed_at,
        }
    }

    /// Re-rolls the condition uniformly once more than
    /// [`WEATHER_CHANGE_TICKS`] have elapsed since the last change.
    pub fn update(&mut self, now: u64, rng: &mut impl Rng) {
        if now.saturating_sub(self.changed_at) > WEATHER_CHANGE_TICKS {
            self.condition = Weather::roll(rng);
            self.changed_at = now;
        }
    }
}

impl Default for WeatherState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct SimulationTime {
    tick: u64,
    day: u64,
}

impl SimulationTime {
    pub fn new() -> Self {
        Self::at(0, 0)
    }

    pub fn at(tick: u64, day: u64) -> Self {
        Self { tick, day }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn day(&self) -> u64 {
        self.day
    }

    pub fn advance(&mut self) {
        self.tick += 1;
        if self.tick % TICKS_PER_DAY == 0 {
            self.day += 1;
        }
    }
}

impl Default for SimulationTime {
    fn default() -> Self {
        Self::new()
    }
}

/// One shared mutable snapshot of everything the tick pipeline touches.
/// Exactly one writer (the engine) mutates it; observers only ever see a
/// completed tick through [`World::snapshot`].
#[derive(Debug, Clone)]
pub struct World {
    pub time: SimulationTime,
    pub weather: WeatherState,
    pub survivor: Survivor,
    pub hostiles: Vec<HostileAgent>,
    pub registry: ResourceRegistry,
}

impl World {
    pub fn new(survivor: Survivor, hostiles: Vec<HostileAgent>, registry: ResourceRegistry) -> Self {
        Self {
            time: SimulationTime::new(),
            weather: WeatherState::new(),
            survivor,
            hostiles,
            registry,
        }
    }

    pub fn grid(&self) -> i32 {
        self.registry.grid()
    }

    /// The terminal condition, checked once per tick after all mutations.
    pub fn death_due(&self) -> bool {
        let now = self.time.tick();
        self.survivor.health <= 0
            || self.survivor.hunger_level(now) <= 0.0
            || self.survivor.thirst_level(now) <= 0.0
    }

    pub fn snapshot(&self, scenario: &str) -> WorldSnapshot {
        let now = self.time.tick();
        WorldSnapshot {
            scenario: scenario.to_string(),
            tick: now,
            day: self.time.day(),
            weather: self.weather.condition,
            alive: !self.death_due(),
            survivor: SurvivorSnapshot {
                pos: self.survivor.pos,
                health: self.survivor.health,
                stamina: self.survivor.stamina,
                hunger_level: self.survivor.hunger_level(now),
                thirst_level: self.survivor.thirst_level(now),
                inventory: self.survivor.inventory,
                weapon: self.survivor.weapon,
                task: self.survivor.task,
            },
            hostiles: self
                .hostiles
                .iter()
                .map(|h| HostileSnapshot {
                    pos: h.pos,
                    health: h.health,
                })
                .collect(),
            resources: ResourceSnapshot {
                trees: self.registry.positions(ResourceKind::Tree).collect(),
                stones: self.registry.positions(ResourceKind::Stone).collect(),
                berries: self.registry.positions(ResourceKind::Berry).collect(),
                water: self.registry.positions(ResourceKind::Water).collect(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SurvivorSnapshot {
    pub pos: Position,
    pub health: i32,
    pub stamina: i32,
    pub hunger_level: f32,
    pub thirst_level: f32,
    pub inventory: Inventory,
    pub weapon: Option<Weapon>,
    pub task: Option<Task>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HostileSnapshot {
    pub pos: Position,
    pub health: i32,
}

/// Resource positions in lexicographic order, straight out of the ordered
/// sets, so identical states serialize identically.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceSnapshot {
    pub trees: Vec<Position>,
    pub stones: Vec<Position>,
    pub berries: Vec<Position>,
    pub water: Vec<Position>,
}

/// Read-only view of a completed tick, consumed by rendering and snapshot
/// collaborators.
#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    pub scenario: String,
    pub tick: u64,
    pub day: u64,
    pub weather: Weather,
    pub alive: bool,
    pub survivor: SurvivorSnapshot,
    pub hostiles: Vec<HostileSnapshot>,
    pub resources: ResourceSnapshot,
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn lone_world(survivor: Survivor) -> World {
        World::new(survivor, Vec::new(), ResourceRegistry::empty(100))
    }

    #[test]
    fn day_rolls_over_every_1440_ticks() {
        let mut time = SimulationTime::new();
        for _ in 0..TICKS_PER_DAY - 1 {
            time.advance();
        }
        assert_eq!(time.day(), 0);
        time.advance();
        assert_eq!(time.day(), 1);
        assert_eq!(time.tick(), TICKS_PER_DAY);
    }

    #[test]
    fn weather_changes_only_after_the_period() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut weather = WeatherState::new();
        weather.update(WEATHER_CHANGE_TICKS, &mut rng);
        assert_eq!(weather.changed_at, 0);
        weather.update(WEATHER_CHANGE_TICKS + 1, &mut rng);
        assert_eq!(weather.changed_at, WEATHER_CHANGE_TICKS + 1);
    }

    #[test]
    fn crafting_deducts_materials_and_equips() {
        let mut survivor = Survivor::new(Position::new(0, 0), 100, 100);
        survivor.inventory.wood = 5;
        survivor.inventory.stone = 3;
        assert!(survivor.craft(Weapon::Axe));
        assert_eq!(survivor.inventory, Inventory::default());
        assert_eq!(survivor.weapon, Some(Weapon::Axe));
    }

    #[test]
    fn crafting_shortfall_changes_nothing() {
        let mut survivor = Survivor::new(Position::new(0, 0), 100, 100);
        survivor.inventory.wood = 4;
        survivor.inventory.stone = 3;
        assert!(!survivor.craft(Weapon::Axe));
        assert_eq!(survivor.inventory.wood, 4);
        assert_eq!(survivor.inventory.stone, 3);
        assert_eq!(survivor.weapon, None);
    }

    #[test]
    fn damage_and_stamina_floor_at_zero() {
        let mut survivor = Survivor::new(Position::new(0, 0), 10, 5);
        survivor.take_damage(50);
        survivor.spend_stamina(50);
        assert_eq!(survivor.health, 0);
        assert_eq!(survivor.stamina, 0);
    }

    #[test]
    fn death_fires_on_health_hunger_or_thirst() {
        let fed = |mut s: Survivor| {
            s.last_ate = 1000;
            s.last_drank = 1000;
            s
        };

        let mut world = lone_world(fed(Survivor::new(Position::new(0, 0), 100, 100)));
        world.time = SimulationTime::at(1000, 0);
        assert!(!world.death_due());

        world.survivor.health = 0;
        assert!(world.death_due());

        let mut starved = lone_world(Survivor::new(Position::new(0, 0), 100, 100));
        starved.survivor.last_drank = crate::needs::NEED_HORIZON_TICKS;
        starved.time = SimulationTime::at(crate::needs::NEED_HORIZON_TICKS, 0);
        assert!(starved.death_due());
    }
}
