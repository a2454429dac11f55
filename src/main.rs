//! Arena Siege headless runner
//!
//! Plays one seeded round with a scripted autopilot and logs the outcome.
//! `ARENA_SIEGE_SEED` and `ARENA_SIEGE_SETTINGS` (a JSON file) override the
//! defaults; `RUST_LOG` controls verbosity.

#[cfg(not(target_arch = "wasm32"))]
use arena_siege::{Game, Settings, consts::SIM_DT, sim::WorldState};
#[cfg(not(target_arch = "wasm32"))]
use glam::Vec2;

/// One minute of simulated play
#[cfg(not(target_arch = "wasm32"))]
const DEMO_TICKS: u32 = 60 * 60;

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_SEED: u64 = 0xA11CE;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Arena Siege (headless) starting...");

    let seed = std::env::var("ARENA_SIEGE_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);
    let settings = match std::env::var("ARENA_SIEGE_SETTINGS") {
        Ok(path) => Settings::load_or_default(path),
        Err(_) => Settings::default(),
    };

    let mut game = Game::with_settings(Some(seed), settings);
    log::info!("Game initialized with seed: {}", seed);

    for _ in 0..DEMO_TICKS {
        if game.is_game_over() {
            break;
        }
        let (intent, aim) = autopilot(game.snapshot());
        game.set_player_intent(intent);
        if let Some(target) = aim {
            game.request_shot(target.x, target.y);
        }
        game.tick(SIM_DT);
    }

    let world = game.snapshot();
    log::info!(
        "Round finished after {} ticks: score={}, health={}/{}, enemies alive={}, game over={}",
        world.time_ticks,
        world.score,
        world.player.health,
        world.player.max_health,
        world.enemies.len(),
        world.game_over
    );
    if let Ok(json) = world.to_json() {
        log::debug!("Final snapshot: {json}");
    }

    game.reset();
    if let Some(best) = game.session().top_score() {
        log::info!("Session best: {}", best);
    }
}

/// Scripted player: grab crates when hurt, otherwise orbit the spawn point
/// and shoot the nearest enemy every few ticks
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(world: &WorldState) -> (Vec2, Option<Vec2>) {
    let player = &world.player;

    let nearest_crate = world
        .crates
        .iter()
        .min_by(|a, b| {
            a.pos
                .distance_squared(player.pos)
                .total_cmp(&b.pos.distance_squared(player.pos))
        });

    let intent = match nearest_crate {
        Some(c) if player.health * 10 < player.max_health * 7 => c.pos - player.pos,
        _ => {
            // Wobbling orbit around the spawn point
            let t = world.time_ticks as f32 * 0.02;
            let home = Vec2::from(arena_siege::consts::PLAYER_START);
            let orbit = home + Vec2::new(t.cos(), t.sin()) * (60.0 + (t * 0.7).sin() * 20.0);
            orbit - player.pos
        }
    };

    let aim = if world.time_ticks % 10 == 0 {
        world
            .enemies
            .iter()
            .min_by(|a, b| {
                a.pos
                    .distance_squared(player.pos)
                    .total_cmp(&b.pos.distance_squared(player.pos))
            })
            .map(|e| e.pos)
    } else {
        None
    };

    (intent.normalize_or_zero(), aim)
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is driven by the host page through `arena_siege::Game`
}
