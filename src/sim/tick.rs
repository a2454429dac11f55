//! Fixed timestep simulation tick
//!
//! Core game loop that advances the world deterministically. Speeds are
//! expressed in units per tick; `dt` is converted to a step scale relative to
//! `SIM_DT`, so the expected fixed `dt` yields a scale of exactly 1.

use glam::Vec2;

use super::behavior::update_enemies;
use super::collision::{intent_displacement, push_back_offset, wall_containing};
use super::combat::{resolve_combat, try_spawn_enemy};
use super::state::{Faction, WorldState};
use crate::consts::*;
use crate::{clamp_to_bounds, degrees_toward};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired movement direction; magnitude 1 or more is full speed
    pub move_intent: Vec2,
    /// World points to fire at, one projectile each
    pub shots: Vec<Vec2>,
}

/// Advance the world by one fixed timestep
pub fn tick(state: &mut WorldState, input: &TickInput, dt: f32) {
    // Round over: nothing moves until reset
    if state.game_over {
        return;
    }

    let step = if dt.is_finite() && dt > 0.0 { dt / SIM_DT } else { 0.0 };

    state.time_ticks += 1;
    state.events.clear();

    fire_player_shots(state, &input.shots);
    move_player(state, input.move_intent, step);
    update_enemies(state, step);
    advance_projectiles(state, step);
    resolve_combat(state);
    if !state.game_over {
        try_spawn_enemy(state);
        push_player_out_of_walls(state);
    }

    state.normalize_order();
}

/// Spawn one player projectile per aim point, from the player's current position
fn fire_player_shots(state: &mut WorldState, shots: &[Vec2]) {
    for &target in shots {
        let from = state.player.pos;
        state.player.angle = degrees_toward(from, target);
        state.fire_projectile(Faction::Player, None, from, target);
    }
}

fn move_player(state: &mut WorldState, intent: Vec2, step: f32) {
    let (w, h) = (state.settings.world_width, state.settings.world_height);
    let player = &mut state.player;

    let displacement = intent_displacement(intent, player.speed) * step;
    player.pos = clamp_to_bounds(player.pos + displacement, player.radius(), w, h);
    player.vel = displacement;
}

/// Age and move every projectile; drop the expired and the escaped
fn advance_projectiles(state: &mut WorldState, step: f32) {
    let (w, h) = (state.settings.world_width, state.settings.world_height);
    for projectile in &mut state.projectiles {
        projectile.lifetime = projectile.lifetime.saturating_sub(1);
        projectile.pos += projectile.velocity() * step;
    }
    state
        .projectiles
        .retain(|p| p.lifetime > 0 && p.in_world(w, h));
}

/// Soft push-back when the player's center ends up inside a wall
fn push_player_out_of_walls(state: &mut WorldState) {
    let (w, h) = (state.settings.world_width, state.settings.world_height);
    let player = &mut state.player;
    if wall_containing(&state.walls, player.pos).is_none() {
        return;
    }
    player.pos += push_back_offset(player.vel, player.speed * WALL_PUSH_FACTOR);
    player.pos = clamp_to_bounds(player.pos, player.radius(), w, h);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::state::{BehaviorState, GameEvent};
    use proptest::prelude::*;

    /// Default walls, no crates, no random spawns
    fn quiet_world(seed: u64) -> WorldState {
        let mut settings = Settings::default();
        settings.initial_crates = 0;
        settings.spawn_chance = 0.0;
        WorldState::with_settings(seed, settings)
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    #[test]
    fn test_tick_advances_clock() {
        let mut state = quiet_world(1);
        tick(&mut state, &idle(), SIM_DT);
        tick(&mut state, &idle(), SIM_DT);
        assert_eq!(state.time_ticks, 2);
    }

    #[test]
    fn test_tick_is_noop_after_game_over() {
        let mut state = quiet_world(1);
        state.player.health = 0;
        state.game_over = true;
        let before = state.to_json().unwrap();

        let input = TickInput {
            move_intent: Vec2::X,
            shots: vec![Vec2::new(0.0, 0.0)],
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.to_json().unwrap(), before);
    }

    #[test]
    fn test_player_moves_at_clamped_speed() {
        let mut state = quiet_world(1);
        let input = TickInput {
            move_intent: Vec2::new(0.0, 40.0),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.player.pos, Vec2::new(400.0, 305.0));
        assert_eq!(state.player.vel, Vec2::new(0.0, 5.0));
    }

    #[test]
    fn test_player_clamped_to_world() {
        let mut state = quiet_world(1);
        state.player.pos = Vec2::new(782.0, 300.0);
        let input = TickInput {
            move_intent: Vec2::X,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.player.pos.x, 785.0);
    }

    #[test]
    fn test_shot_sets_facing_and_flies() {
        let mut state = quiet_world(1);
        let input = TickInput {
            shots: vec![Vec2::new(400.0, 400.0)],
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert!((state.player.angle - 90.0).abs() < 1e-4);
        assert_eq!(state.projectiles.len(), 1);
        let p = &state.projectiles[0];
        assert_eq!(p.lifetime, 99);
        assert!((p.pos - Vec2::new(400.0, 312.0)).length() < 1e-3);
    }

    #[test]
    fn test_projectile_lifetime_strictly_decreases_until_removed() {
        let mut state = quiet_world(1);
        state.settings.player_shot_speed = 0.5;
        let input = TickInput {
            shots: vec![Vec2::new(400.0, 400.0)],
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);

        let mut last = state.projectiles[0].lifetime;
        let mut ticks = 1;
        while let Some(p) = state.projectiles.first() {
            assert!(p.lifetime < 100);
            tick(&mut state, &idle(), SIM_DT);
            ticks += 1;
            if let Some(p) = state.projectiles.first() {
                assert!(p.lifetime < last);
                assert!(p.lifetime > 0);
                last = p.lifetime;
            }
        }
        assert_eq!(ticks, 100);
    }

    #[test]
    fn test_projectile_removed_when_leaving_world() {
        let mut state = quiet_world(1);
        state.player.pos = Vec2::new(400.0, 690.0);
        let input = TickInput {
            shots: vec![Vec2::new(400.0, 1000.0)],
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_low_health_enemy_flees_next_tick() {
        let mut state = quiet_world(1);
        let id = state.spawn_enemy_at(Vec2::new(440.0, 300.0));
        state.enemy_mut(id).unwrap().health = 10;

        tick(&mut state, &idle(), SIM_DT);
        let enemy = state.enemy(id).unwrap();
        assert_eq!(enemy.state, BehaviorState::Flee);
        assert!(enemy.target.x > enemy.pos.x);
    }

    #[test]
    fn test_adjacent_attacker_hits_for_fixed_damage() {
        let mut state = quiet_world(1);
        let id = state.spawn_enemy_at(Vec2::new(440.0, 300.0));
        state.enemy_mut(id).unwrap().shoot_cooldown = 1;

        let mut hits = 0;
        for _ in 0..20 {
            tick(&mut state, &idle(), SIM_DT);
            hits += state
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::PlayerHit { .. }))
                .count() as u32;
        }

        assert_eq!(state.enemy(id).unwrap().state, BehaviorState::Attack);
        assert!(hits >= 1);
        assert_eq!(state.player.health, 100 - 12 * hits);
    }

    #[test]
    fn test_dead_player_is_not_healed_in_same_tick() {
        let mut state = quiet_world(1);
        state.settings.enemy_shot_speed = 0.5;
        state.player.health = 12;
        let at = state.player.pos;
        state.spawn_crate(at);
        state.fire_projectile(Faction::Enemy, None, at, at + Vec2::X);

        tick(&mut state, &idle(), SIM_DT);
        assert!(state.game_over);
        assert_eq!(state.player.health, 0);
        assert_eq!(state.crates.len(), 1);
        assert!(
            !state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::CrateLooted { .. }))
        );
    }

    #[test]
    fn test_wall_push_back_follows_movement_axis() {
        // Vertical wall spans x 300..320; moving +y inside it pushes back along -y
        let mut state = quiet_world(1);
        state.player.pos = Vec2::new(310.0, 400.0);
        let input = TickInput {
            move_intent: Vec2::Y,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.player.pos, Vec2::new(310.0, 402.5));
    }

    #[test]
    fn test_wall_push_back_when_idle_nudges_left() {
        let mut state = quiet_world(1);
        state.player.pos = Vec2::new(310.0, 400.0);
        tick(&mut state, &idle(), SIM_DT);
        assert_eq!(state.player.pos, Vec2::new(307.5, 400.0));
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut settings = Settings::default();
        settings.spawn_chance = 0.1;
        let mut state1 = WorldState::with_settings(99999, settings.clone());
        let mut state2 = WorldState::with_settings(99999, settings);

        for i in 0..400 {
            let angle = i as f32 * 0.05;
            let input = TickInput {
                move_intent: Vec2::new(angle.cos(), angle.sin()),
                shots: if i % 15 == 0 { vec![Vec2::new(100.0, 100.0)] } else { Vec::new() },
            };
            tick(&mut state1, &input, SIM_DT);
            tick(&mut state2, &input, SIM_DT);
        }

        assert_eq!(state1.to_json().unwrap(), state2.to_json().unwrap());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_world_invariants_hold(
            seed in any::<u64>(),
            intents in prop::collection::vec((-2.0f32..2.0, -2.0f32..2.0, any::<bool>()), 1..300),
        ) {
            let mut state = WorldState::new(seed);
            state.settings.spawn_chance = 0.2;
            let (w, h) = (state.settings.world_width, state.settings.world_height);

            for (x, y, fire) in intents {
                let input = TickInput {
                    move_intent: Vec2::new(x, y),
                    shots: if fire {
                        vec![Vec2::new(x * 200.0 + 400.0, y * 200.0 + 300.0)]
                    } else {
                        Vec::new()
                    },
                };
                tick(&mut state, &input, SIM_DT);

                prop_assert!(state.player.health <= state.player.max_health);
                prop_assert_eq!(state.player.health == 0, state.game_over);
                prop_assert!(state.enemies.iter().all(|e| e.health > 0));
                prop_assert!(state.projectiles.iter().all(|p| p.lifetime > 0 && p.in_world(w, h)));
                prop_assert!(state.crates.iter().all(|c| !c.looted));
            }
        }
    }
}
