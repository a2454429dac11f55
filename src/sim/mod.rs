//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (one shared `Pcg32` in `WorldState`)
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod behavior;
pub mod collision;
pub mod combat;
pub mod grid;
pub mod pathfinding;
pub mod state;
pub mod tick;

pub use behavior::{Perception, flee_target, transition, update_enemies};
pub use collision::{circles_overlap, push_back_offset, wall_containing};
pub use combat::{Edge, resolve_combat, try_spawn_enemy};
pub use grid::{Cell, Grid};
pub use pathfinding::{find_path, path_cost};
pub use state::{
    BehaviorState, Crate, Enemy, Faction, GameEvent, Player, Projectile, Wall, WorldState,
};
pub use tick::{TickInput, tick};
