//! Boundary facade for the presentation layer
//!
//! The input layer calls `set_player_intent` / `request_shot`, the frame loop
//! calls `tick` (or `advance` with a wall-clock delta), and the renderer reads
//! `snapshot`. Nothing else reaches into the simulation.

use glam::Vec2;
use rand::Rng;

use crate::consts::*;
use crate::session::{RoundResult, SessionRecord};
use crate::settings::Settings;
use crate::sim::{TickInput, WorldState, tick};

/// A running game: world, pending input and session counters
pub struct Game {
    state: WorldState,
    input: TickInput,
    session: SessionRecord,
    accumulator: f32,
}

impl Game {
    /// Build a fresh world; `None` picks a random seed
    pub fn initialize(seed: Option<u64>) -> Self {
        Self::with_settings(seed, Settings::default())
    }

    pub fn with_settings(seed: Option<u64>, settings: Settings) -> Self {
        let seed = seed.unwrap_or_else(|| rand::rng().random());
        Self {
            state: WorldState::with_settings(seed, settings),
            input: TickInput::default(),
            session: SessionRecord::new(),
            accumulator: 0.0,
        }
    }

    /// Start a new round, keeping settings and the session record
    ///
    /// The next seed is drawn from the current world's RNG, so a seeded game
    /// resets to the same sequence of worlds.
    pub fn reset(&mut self) {
        let seed = self.state.rng.random();
        self.reset_with_seed(seed);
    }

    pub fn reset_with_seed(&mut self, seed: u64) {
        let rank = self.session.record(RoundResult {
            score: self.state.score,
            ticks: self.state.time_ticks,
            seed: self.state.seed,
        });
        log::info!(
            "Round over: score {} (rank {:?}), starting seed {}",
            self.state.score,
            rank,
            seed
        );

        let settings = self.state.settings.clone();
        self.state = WorldState::with_settings(seed, settings);
        self.input = TickInput::default();
        self.accumulator = 0.0;
    }

    /// Held movement direction; ignored once the round is over
    pub fn set_player_intent(&mut self, direction: Vec2) {
        if self.state.game_over {
            return;
        }
        self.input.move_intent = direction;
    }

    /// Queue one player shot toward a world point; ignored once the round is over
    pub fn request_shot(&mut self, x: f32, y: f32) {
        if self.state.game_over {
            return;
        }
        self.input.shots.push(Vec2::new(x, y));
    }

    /// Run exactly one simulation step
    pub fn tick(&mut self, dt: f32) {
        tick(&mut self.state, &self.input, dt);
        // Shots are one-shot inputs; the movement intent is held
        self.input.shots.clear();
    }

    /// Feed a wall-clock frame delta, running as many fixed steps as fit
    ///
    /// Returns the number of ticks run. Capped at `MAX_SUBSTEPS` per call.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, 0.1);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.tick(SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }

    /// Read-only view of the world after the last tick
    pub fn snapshot(&self) -> &WorldState {
        &self.state
    }

    pub fn session(&self) -> &SessionRecord {
        &self.session
    }

    pub fn is_game_over(&self) -> bool {
        self.state.game_over
    }

    pub fn seed(&self) -> u64 {
        self.state.seed
    }
}
