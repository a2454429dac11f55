//! Enemy decision-making
//!
//! Each tick every enemy perceives the player, re-evaluates its behavior
//! state from scratch, derives a movement target, refreshes its path on a
//! jittered cooldown, walks the path and possibly fires.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;

use super::grid::Grid;
use super::pathfinding::find_path;
use super::state::{BehaviorState, Enemy, Faction, WorldState};
use crate::clamp_to_bounds;
use crate::settings::Settings;

/// What an enemy knows about the player this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    pub distance: f32,
    pub line_of_sight: bool,
}

impl Perception {
    pub fn of(enemy: &Enemy, player_pos: Vec2, grid: &Grid) -> Self {
        Self {
            distance: enemy.pos.distance(player_pos),
            line_of_sight: grid.has_line_of_sight(enemy.pos, player_pos),
        }
    }
}

/// Next behavior state, independent of the current one
///
/// FLEE wins over everything once health drops under the flee fraction of
/// the enemy's initial health.
pub fn transition(enemy: &Enemy, perception: &Perception, settings: &Settings) -> BehaviorState {
    if (enemy.health as f32) < enemy.max_health as f32 * settings.flee_health_fraction {
        BehaviorState::Flee
    } else if perception.distance < settings.attack_range && perception.line_of_sight {
        BehaviorState::Attack
    } else if perception.distance < settings.chase_range {
        BehaviorState::Chase
    } else {
        BehaviorState::Patrol
    }
}

/// Point `flee_distance` units directly away from the player, kept inside the safety margin
pub fn flee_target(enemy_pos: Vec2, player_pos: Vec2, settings: &Settings) -> Vec2 {
    let away = (enemy_pos - player_pos).normalize_or_zero();
    clamp_to_bounds(
        enemy_pos + away * settings.flee_distance,
        settings.flee_margin,
        settings.world_width,
        settings.world_height,
    )
}

/// Movement target for the enemy's current state, or `None` to keep the old one
fn select_target<R: Rng>(
    enemy: &Enemy,
    player_pos: Vec2,
    grid: &Grid,
    rng: &mut R,
    settings: &Settings,
) -> Option<Vec2> {
    match enemy.state {
        BehaviorState::Attack | BehaviorState::Chase => Some(player_pos),
        BehaviorState::Flee => Some(flee_target(enemy.pos, player_pos, settings)),
        BehaviorState::Patrol => {
            if enemy.path.len() > 1 {
                return None;
            }
            grid.random_free_cell(rng, settings.free_cell_attempts)
                .map(|cell| grid.cell_to_world_center(cell))
        }
    }
}

/// Count down and, when due, replan toward the current target
pub fn refresh_path<R: Rng>(enemy: &mut Enemy, grid: &Grid, rng: &mut R, settings: &Settings) {
    enemy.path_cooldown -= 1;
    if enemy.path_cooldown > 0 {
        return;
    }

    let start = grid.world_to_cell(enemy.pos);
    let goal = grid.world_to_cell(enemy.target);
    enemy.path = VecDeque::from(find_path(grid, start, goal));
    let (lo, hi) = settings.path_refresh_ticks;
    enemy.path_cooldown = rng.random_range(lo..=hi) as i32;

    log::trace!(
        "Enemy {} replanned {:?} -> {:?}: {} cells",
        enemy.id,
        start,
        goal,
        enemy.path.len()
    );
}

/// Steer toward the next cell center, dropping the front cell once it is reached
///
/// Assumes the enemy stands in a walkable cell. Planning from a blocked cell
/// yields an empty path, so an enemy inside a wall footprint stays put.
pub fn follow_path(enemy: &mut Enemy, grid: &Grid, step: f32, settings: &Settings) {
    if enemy.path.len() > 1 {
        let next = grid.cell_to_world_center(enemy.path[1]);
        let to_next = next - enemy.pos;
        let dist = to_next.length();
        if dist > 0.0 {
            enemy.pos += to_next / dist * enemy.speed * step;
        }
        if dist < grid.cell_size() / 2.0 {
            enemy.path.pop_front();
        }
    }
    enemy.pos = clamp_to_bounds(
        enemy.pos,
        enemy.radius(),
        settings.world_width,
        settings.world_height,
    );
}

/// Tick the shot cooldown; returns true when the enemy fires this tick
pub fn ready_to_fire<R: Rng>(
    enemy: &mut Enemy,
    perception: &Perception,
    rng: &mut R,
    settings: &Settings,
) -> bool {
    enemy.shoot_cooldown -= 1;
    if enemy.shoot_cooldown > 0 || !enemy.state.is_hostile() || !perception.line_of_sight {
        return false;
    }

    let (lo, hi) = if enemy.state == BehaviorState::Attack {
        settings.attack_shot_cooldown
    } else {
        settings.chase_shot_cooldown
    };
    enemy.shoot_cooldown = rng.random_range(lo..=hi) as i32;
    true
}

/// Run one decision/movement step for every enemy
pub fn update_enemies(state: &mut WorldState, step: f32) {
    let player_pos = state.player.pos;
    let grid = &state.grid;
    let settings = &state.settings;
    let rng = &mut state.rng;

    // Shots are fired after the pass so entity ids stay in iteration order
    let mut shots: Vec<(u32, Vec2)> = Vec::new();

    for enemy in &mut state.enemies {
        let perception = Perception::of(enemy, player_pos, grid);

        let next_state = transition(enemy, &perception, settings);
        if next_state != enemy.state {
            log::trace!("Enemy {}: {:?} -> {:?}", enemy.id, enemy.state, next_state);
            enemy.state = next_state;
        }

        if let Some(target) = select_target(enemy, player_pos, grid, rng, settings) {
            enemy.target = target;
        }

        refresh_path(enemy, grid, rng, settings);
        follow_path(enemy, grid, step, settings);

        if ready_to_fire(enemy, &perception, rng, settings) {
            shots.push((enemy.id, enemy.pos));
        }
    }

    for (owner, from) in shots {
        state.fire_projectile(Faction::Enemy, Some(owner), from, player_pos);
    }
}
