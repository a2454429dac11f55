//! Combat, loot and spawning
//!
//! Hits are detected against a stable view of the world, then removals are
//! applied in one pass so a projectile can never deliver damage twice.

use glam::Vec2;
use rand::Rng;

use super::collision::circles_overlap;
use super::state::{Faction, GameEvent, WorldState};
use crate::settings::Settings;

/// Depth of the band along each edge where enemies appear
const SPAWN_EDGE_DEPTH: f32 = 50.0;

/// Arena edge used for spawning; `Top` is the y = 0 edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];
}

/// Random point inside the spawn band of a random edge
pub fn edge_spawn_point<R: Rng>(rng: &mut R, settings: &Settings) -> Vec2 {
    let (w, h, d) = (settings.world_width, settings.world_height, SPAWN_EDGE_DEPTH);
    let along_x = d..=(w - d).max(d);
    let along_y = d..=(h - d).max(d);
    match Edge::ALL[rng.random_range(0..Edge::ALL.len())] {
        Edge::Top => Vec2::new(rng.random_range(along_x), rng.random_range(0.0..=d)),
        Edge::Bottom => Vec2::new(
            rng.random_range(along_x),
            rng.random_range((h - d).max(0.0)..=h),
        ),
        Edge::Left => Vec2::new(rng.random_range(0.0..=d), rng.random_range(along_y)),
        Edge::Right => Vec2::new(
            rng.random_range((w - d).max(0.0)..=w),
            rng.random_range(along_y),
        ),
    }
}

/// Roll the per-tick spawn chance and add an enemy if under the cap
pub fn try_spawn_enemy(state: &mut WorldState) -> Option<u32> {
    if !state.rng.random_bool(state.settings.spawn_chance) {
        return None;
    }
    if state.enemies.len() >= state.settings.max_enemies {
        return None;
    }
    let pos = edge_spawn_point(&mut state.rng, &state.settings);
    Some(state.spawn_enemy_at(pos))
}

/// Enemy projectiles against the player
pub fn resolve_enemy_fire(state: &mut WorldState) {
    let damage = state.settings.enemy_shot_damage;
    let player = &mut state.player;
    let mut spent = Vec::new();

    for projectile in state.projectiles.iter().filter(|p| p.faction == Faction::Enemy) {
        if circles_overlap(projectile.pos, projectile.hit_radius(), player.pos, player.radius()) {
            player.take_damage(damage);
            spent.push(projectile.id);
            state.events.push(GameEvent::PlayerHit {
                damage,
                health: player.health,
            });
        }
    }

    if spent.is_empty() {
        return;
    }
    state.projectiles.retain(|p| !spent.contains(&p.id));

    if state.player.is_dead() && !state.game_over {
        state.game_over = true;
        state.events.push(GameEvent::GameOver { score: state.score });
        log::info!("Game over at tick {}: score {}", state.time_ticks, state.score);
    }
}

/// Player projectiles against enemies; each projectile hits the first live enemy it overlaps
pub fn resolve_player_fire(state: &mut WorldState) {
    let damage = state.settings.player_shot_damage;
    let mut spent = Vec::new();

    for projectile in state.projectiles.iter().filter(|p| p.faction == Faction::Player) {
        let radius = projectile.hit_radius();
        let hit = state
            .enemies
            .iter_mut()
            .find(|e| !e.is_dead() && circles_overlap(projectile.pos, radius, e.pos, e.radius()));
        if let Some(enemy) = hit {
            enemy.health -= damage;
            spent.push(projectile.id);
            state.events.push(GameEvent::EnemyHit {
                id: enemy.id,
                health: enemy.health,
            });
        }
    }

    if !spent.is_empty() {
        state.projectiles.retain(|p| !spent.contains(&p.id));
    }
    remove_dead_enemies(state);
}

/// Drop every enemy at or below zero health, awarding score and rolling loot
pub fn remove_dead_enemies(state: &mut WorldState) {
    let dead: Vec<(u32, Vec2)> = state
        .enemies
        .iter()
        .filter(|e| e.is_dead())
        .map(|e| (e.id, e.pos))
        .collect();
    if dead.is_empty() {
        return;
    }
    state.enemies.retain(|e| !e.is_dead());

    for (id, pos) in dead {
        state.score += state.settings.kill_score;
        state.events.push(GameEvent::EnemyKilled { id, pos });
        log::debug!("Enemy {} killed, score {}", id, state.score);

        if state.rng.random_bool(state.settings.loot_chance) {
            state.spawn_crate(pos);
            state.events.push(GameEvent::LootDropped { pos });
            log::debug!("Loot dropped at ({:.0}, {:.0})", pos.x, pos.y);
        }
    }
}

/// Heal from every unlooted crate the player touches, then remove looted crates
pub fn collect_loot(state: &mut WorldState) {
    let player = &mut state.player;
    for c in state.crates.iter_mut().filter(|c| !c.looted) {
        if circles_overlap(c.pos, c.size / 2.0, player.pos, player.radius()) {
            let healed = player.heal(c.heal);
            c.looted = true;
            state.events.push(GameEvent::CrateLooted { id: c.id, healed });
            log::debug!("Crate {} looted, healed {}", c.id, healed);
        }
    }
    state.crates.retain(|c| !c.looted);
}

/// Full combat pass in resolution order
///
/// A lethal hit on the player ends the pass: no kills are scored and no
/// crates are collected after the round is over.
pub fn resolve_combat(state: &mut WorldState) {
    resolve_enemy_fire(state);
    if state.game_over {
        return;
    }
    resolve_player_fire(state);
    collect_loot(state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::BehaviorState;

    fn empty_world() -> WorldState {
        let mut settings = Settings::default();
        settings.initial_crates = 0;
        WorldState::with_layout(11, settings, Vec::new())
    }

    #[test]
    fn test_enemy_shot_damages_player_once() {
        let mut state = empty_world();
        let at = state.player.pos + Vec2::new(10.0, 0.0);
        state.fire_projectile(Faction::Enemy, None, at, state.player.pos);

        resolve_combat(&mut state);
        assert_eq!(state.player.health, 88);
        assert!(state.projectiles.is_empty());
        assert!(state.events.contains(&GameEvent::PlayerHit { damage: 12, health: 88 }));

        resolve_combat(&mut state);
        assert_eq!(state.player.health, 88);
    }

    #[test]
    fn test_lethal_hit_ends_round() {
        let mut state = empty_world();
        state.player.health = 5;
        let at = state.player.pos;
        state.fire_projectile(Faction::Enemy, None, at, at + Vec2::X);

        resolve_combat(&mut state);
        assert_eq!(state.player.health, 0);
        assert!(state.game_over);
        assert!(state.events.contains(&GameEvent::GameOver { score: 0 }));
    }

    #[test]
    fn test_lethal_hit_stops_heal_and_scoring() {
        let mut state = empty_world();
        state.player.health = 12;
        let at = state.player.pos;
        state.spawn_crate(at);
        let victim = state.spawn_enemy_at(Vec2::new(100.0, 100.0));
        state.enemy_mut(victim).unwrap().health = 10;
        state.fire_projectile(Faction::Enemy, None, at, at + Vec2::X);
        state.fire_projectile(Faction::Player, None, Vec2::new(100.0, 100.0), Vec2::ZERO);

        resolve_combat(&mut state);
        assert!(state.game_over);
        assert_eq!(state.player.health, 0);
        assert_eq!(state.crates.len(), 1);
        assert_eq!(state.score, 0);
        assert!(state.enemy(victim).is_some());
        assert!(state.events.contains(&GameEvent::GameOver { score: 0 }));
    }

    #[test]
    fn test_player_shot_hits_only_first_enemy() {
        let mut state = empty_world();
        let pos = Vec2::new(100.0, 100.0);
        let a = state.spawn_enemy_at(pos);
        let b = state.spawn_enemy_at(pos);
        state.fire_projectile(Faction::Player, None, pos, pos + Vec2::X);

        resolve_combat(&mut state);
        assert_eq!(state.enemy(a).unwrap().health, 25);
        assert_eq!(state.enemy(b).unwrap().health, 50);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_kill_awards_score_and_removes_enemy() {
        let mut state = empty_world();
        let pos = Vec2::new(100.0, 100.0);
        let id = state.spawn_enemy_at(pos);
        state.enemy_mut(id).unwrap().health = 25;
        state.fire_projectile(Faction::Player, None, pos, pos + Vec2::X);

        resolve_combat(&mut state);
        assert!(state.enemy(id).is_none());
        assert_eq!(state.score, 100);
        assert!(state.events.contains(&GameEvent::EnemyKilled { id, pos }));
    }

    #[test]
    fn test_two_shots_on_one_enemy_both_land() {
        let mut state = empty_world();
        let pos = Vec2::new(100.0, 100.0);
        let id = state.spawn_enemy_at(pos);
        state.fire_projectile(Faction::Player, None, pos, pos + Vec2::X);
        state.fire_projectile(Faction::Player, None, pos, pos + Vec2::Y);

        resolve_combat(&mut state);
        assert!(state.enemy(id).is_none());
        assert_eq!(state.score, 100);
    }

    #[test]
    fn test_loot_always_drops_when_certain() {
        let mut state = empty_world();
        state.settings.loot_chance = 1.0;
        let pos = Vec2::new(600.0, 500.0);
        let id = state.spawn_enemy_at(pos);
        state.enemy_mut(id).unwrap().health = 0;

        remove_dead_enemies(&mut state);
        assert_eq!(state.crates.len(), 1);
        assert_eq!(state.crates[0].pos, pos);
    }

    #[test]
    fn test_crate_heals_exactly_once() {
        let mut state = empty_world();
        state.player.health = 50;
        let at = state.player.pos;
        state.spawn_crate(at);

        collect_loot(&mut state);
        assert_eq!(state.player.health, 80);
        assert!(state.crates.is_empty());

        for _ in 0..5 {
            collect_loot(&mut state);
        }
        assert_eq!(state.player.health, 80);
    }

    #[test]
    fn test_crate_heal_capped_at_max() {
        let mut state = empty_world();
        state.player.health = 95;
        let at = state.player.pos + Vec2::new(30.0, 0.0);
        state.spawn_crate(at);

        collect_loot(&mut state);
        assert_eq!(state.player.health, 100);
        assert!(state.events.contains(&GameEvent::CrateLooted { id: 1, healed: 5 }));
    }

    #[test]
    fn test_spawn_respects_cap() {
        let mut state = empty_world();
        state.settings.spawn_chance = 1.0;
        for _ in 0..20 {
            try_spawn_enemy(&mut state);
        }
        assert_eq!(state.enemies.len(), 8);
        assert!(state.enemies.iter().all(|e| e.state == BehaviorState::Chase));
        assert_eq!(try_spawn_enemy(&mut state), None);
    }

    #[test]
    fn test_spawn_points_hug_an_edge() {
        use rand::SeedableRng;
        let settings = Settings::default();
        let mut rng = rand_pcg::Pcg32::seed_from_u64(99);
        for _ in 0..200 {
            let p = edge_spawn_point(&mut rng, &settings);
            let near_edge = p.x <= 50.0 || p.x >= 750.0 || p.y <= 50.0 || p.y >= 650.0;
            assert!(near_edge, "{p:?} not on an edge band");
            assert!((0.0..=800.0).contains(&p.x) && (0.0..=700.0).contains(&p.y));
        }
    }
}
