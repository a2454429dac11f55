//! World state and core simulation types
//!
//! Everything the presentation layer may read after a tick lives here.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::grid::{Cell, Grid};
use crate::consts::*;
use crate::settings::Settings;
use crate::{clamp_to_bounds, degrees_toward, direction_from_degrees};

/// Margin kept between randomly placed crates and the arena edge
const CRATE_MARGIN: f32 = 100.0;

/// Enemy behavior state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BehaviorState {
    /// Wander between random free cells
    Patrol,
    /// Path toward the player
    #[default]
    Chase,
    /// Close range with line of sight, fires more often
    Attack,
    /// Low health, run away from the player
    Flee,
}

impl BehaviorState {
    /// States in which an enemy may fire
    #[inline]
    pub fn is_hostile(self) -> bool {
        matches!(self, BehaviorState::Attack | BehaviorState::Chase)
    }
}

/// Which side fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
}

/// The player's avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Displacement applied during the last tick
    pub vel: Vec2,
    /// Collision diameter
    pub size: f32,
    pub health: u32,
    pub max_health: u32,
    pub speed: f32,
    /// Facing in degrees, from the last aim direction
    pub angle: f32,
}

impl Player {
    pub fn new(pos: Vec2, settings: &Settings) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size: settings.player_size,
            health: settings.player_max_health,
            max_health: settings.player_max_health,
            speed: settings.player_speed,
            angle: 0.0,
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    /// Subtract damage, saturating at zero
    pub fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    /// Heal up to max health, returning the amount actually restored
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.health;
        self.health = self.health.saturating_add(amount).min(self.max_health);
        self.health - before
    }
}

/// A projectile in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub faction: Faction,
    /// Firing enemy, if any (back-reference only)
    pub owner: Option<u32>,
    pub pos: Vec2,
    /// Travel direction in degrees
    pub angle: f32,
    /// Units per tick
    pub speed: f32,
    pub size: f32,
    /// Ticks left before expiry
    pub lifetime: u32,
}

impl Projectile {
    /// Effective collision radius
    #[inline]
    pub fn hit_radius(&self) -> f32 {
        self.size * PROJECTILE_HIT_SCALE
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        direction_from_degrees(self.angle) * self.speed
    }

    /// Strictly inside the open world rectangle
    #[inline]
    pub fn in_world(&self, width: f32, height: f32) -> bool {
        self.pos.x > 0.0 && self.pos.x < width && self.pos.y > 0.0 && self.pos.y < height
    }
}

/// A hostile actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub size: f32,
    pub health: i32,
    /// Health at spawn, the reference for the flee threshold
    pub max_health: i32,
    pub speed: f32,
    pub state: BehaviorState,
    /// Ticks until the next shot is allowed
    pub shoot_cooldown: i32,
    /// Planned route, front is the cell currently occupied
    pub path: VecDeque<Cell>,
    /// Ticks until the path is recomputed
    pub path_cooldown: i32,
    pub target: Vec2,
}

impl Enemy {
    pub fn new(id: u32, pos: Vec2, settings: &Settings, shoot_cooldown: i32) -> Self {
        Self {
            id,
            pos,
            size: settings.enemy_size,
            health: settings.enemy_health,
            max_health: settings.enemy_health,
            speed: settings.enemy_speed,
            state: BehaviorState::Chase,
            shoot_cooldown,
            path: VecDeque::new(),
            path_cooldown: 0,
            target: pos,
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

/// A loot crate that heals the player on contact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crate {
    pub id: u32,
    pub pos: Vec2,
    pub size: f32,
    pub heal: u32,
    pub looted: bool,
}

/// Static axis-aligned obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    /// Minimum corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Wall {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Strict interior test; points on the boundary are outside
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x > self.pos.x
            && p.x < self.pos.x + self.size.x
            && p.y > self.pos.y
            && p.y < self.pos.y + self.size.y
    }

    pub fn default_layout() -> Vec<Wall> {
        DEFAULT_WALLS
            .iter()
            .map(|&(x, y, w, h)| Wall::new(x, y, w, h))
            .collect()
    }
}

/// Things that happened during the last tick, for audio/effects hooks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemySpawned { id: u32 },
    PlayerHit { damage: u32, health: u32 },
    EnemyHit { id: u32, health: i32 },
    EnemyKilled { id: u32, pos: Vec2 },
    LootDropped { pos: Vec2 },
    CrateLooted { id: u32, healed: u32 },
    GameOver { score: u64 },
}

/// Complete world state
#[derive(Debug, Clone, Serialize)]
pub struct WorldState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Shared random source for every draw in the simulation
    #[serde(skip)]
    pub rng: Pcg32,
    pub settings: Settings,
    /// Occupancy derived from `walls`
    #[serde(skip)]
    pub grid: Grid,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub player: Player,
    /// Live enemies (sorted by id)
    pub enemies: Vec<Enemy>,
    /// All projectiles in flight, both factions (sorted by id)
    pub projectiles: Vec<Projectile>,
    pub crates: Vec<Crate>,
    pub walls: Vec<Wall>,
    pub score: u64,
    pub game_over: bool,
    /// Events raised during the last tick
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl WorldState {
    /// Create a world with default settings and wall layout
    pub fn new(seed: u64) -> Self {
        Self::with_settings(seed, Settings::default())
    }

    pub fn with_settings(seed: u64, settings: Settings) -> Self {
        Self::with_layout(seed, settings, Wall::default_layout())
    }

    /// Build walls, grid, player and the initial crates
    pub fn with_layout(seed: u64, settings: Settings, walls: Vec<Wall>) -> Self {
        let grid = Grid::build(
            &walls,
            settings.cell_size,
            settings.world_width,
            settings.world_height,
        );
        let player = Player::new(Vec2::from(PLAYER_START), &settings);

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            settings,
            grid,
            time_ticks: 0,
            player,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            crates: Vec::new(),
            walls,
            score: 0,
            game_over: false,
            events: Vec::new(),
            next_id: 1,
        };

        let max_x = (state.settings.world_width - CRATE_MARGIN).max(CRATE_MARGIN);
        let max_y = (state.settings.world_height - CRATE_MARGIN).max(CRATE_MARGIN);
        for _ in 0..state.settings.initial_crates {
            let x = state.rng.random_range(CRATE_MARGIN..=max_x);
            let y = state.rng.random_range(CRATE_MARGIN..=max_y);
            state.spawn_crate(Vec2::new(x, y));
        }

        log::info!(
            "World initialized: seed={}, walls={}, blocked cells={}/{}",
            seed,
            state.walls.len(),
            state.grid.blocked_count(),
            state.grid.len()
        );

        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add an enemy at `pos` in CHASE toward the player, ignoring the cap
    pub fn spawn_enemy_at(&mut self, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        let (lo, hi) = self.settings.initial_shot_cooldown;
        let cooldown = self.rng.random_range(lo..=hi) as i32;
        let half = self.settings.enemy_size / 2.0;
        let pos = clamp_to_bounds(pos, half, self.settings.world_width, self.settings.world_height);

        let mut enemy = Enemy::new(id, pos, &self.settings, cooldown);
        enemy.target = self.player.pos;
        self.enemies.push(enemy);
        self.events.push(GameEvent::EnemySpawned { id });
        log::debug!("Enemy {} spawned at ({:.0}, {:.0})", id, pos.x, pos.y);
        id
    }

    pub fn spawn_crate(&mut self, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.crates.push(Crate {
            id,
            pos,
            size: self.settings.crate_size,
            heal: self.settings.crate_heal,
            looted: false,
        });
        id
    }

    /// Fire a projectile from `from` toward `target`
    pub fn fire_projectile(
        &mut self,
        faction: Faction,
        owner: Option<u32>,
        from: Vec2,
        target: Vec2,
    ) -> u32 {
        let id = self.next_entity_id();
        let speed = match faction {
            Faction::Player => self.settings.player_shot_speed,
            Faction::Enemy => self.settings.enemy_shot_speed,
        };
        self.projectiles.push(Projectile {
            id,
            faction,
            owner,
            pos: from,
            angle: degrees_toward(from, target),
            speed,
            size: self.settings.projectile_size,
            lifetime: self.settings.projectile_lifetime,
        });
        id
    }

    pub fn projectiles_of(&self, faction: Faction) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter().filter(move |p| p.faction == faction)
    }

    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn enemy_mut(&mut self, id: u32) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    /// Ensure collections are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.projectiles.sort_by_key(|p| p.id);
        self.crates.sort_by_key(|c| c.id);
    }

    /// Serialize the snapshot for debugging or external tooling
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
