//! Gameplay settings
//!
//! Balance knobs for the simulation. Defaults reproduce the stock arena; any
//! subset can be overridden from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Simulation balance settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Arena ===
    pub world_width: f32,
    pub world_height: f32,
    pub cell_size: f32,

    // === Player ===
    pub player_size: f32,
    pub player_max_health: u32,
    /// Units per tick at full intent
    pub player_speed: f32,
    pub player_shot_speed: f32,
    /// Damage dealt by one player projectile
    pub player_shot_damage: i32,

    // === Enemies ===
    pub enemy_size: f32,
    pub enemy_health: i32,
    pub enemy_speed: f32,
    pub enemy_shot_speed: f32,
    /// Damage dealt to the player by one enemy projectile
    pub enemy_shot_damage: u32,
    /// Live-enemy cap checked at spawn time
    pub max_enemies: usize,
    /// Per-tick chance to attempt a spawn
    pub spawn_chance: f64,
    pub kill_score: u64,

    // === Projectiles ===
    pub projectile_size: f32,
    pub projectile_lifetime: u32,

    // === Crates ===
    pub crate_size: f32,
    pub crate_heal: u32,
    pub initial_crates: usize,
    /// Chance that a dead enemy drops a crate
    pub loot_chance: f64,

    // === Behavior ===
    /// FLEE below this fraction of initial health
    pub flee_health_fraction: f32,
    pub attack_range: f32,
    pub chase_range: f32,
    pub flee_distance: f32,
    /// Flee targets stay this far inside the arena
    pub flee_margin: f32,
    pub free_cell_attempts: u32,
    /// Inclusive tick ranges
    pub path_refresh_ticks: (u32, u32),
    pub initial_shot_cooldown: (u32, u32),
    pub attack_shot_cooldown: (u32, u32),
    pub chase_shot_cooldown: (u32, u32),
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            cell_size: CELL_SIZE,

            player_size: 30.0,
            player_max_health: 100,
            player_speed: 5.0,
            player_shot_speed: 12.0,
            player_shot_damage: 25,

            enemy_size: 25.0,
            enemy_health: 50,
            enemy_speed: 2.5,
            enemy_shot_speed: 8.0,
            enemy_shot_damage: 12,
            max_enemies: 8,
            spawn_chance: 0.02,
            kill_score: 100,

            projectile_size: 5.0,
            projectile_lifetime: 100,

            crate_size: 40.0,
            crate_heal: 30,
            initial_crates: 5,
            loot_chance: 1.0 / 3.0,

            flee_health_fraction: 0.25,
            attack_range: 80.0,
            chase_range: 250.0,
            flee_distance: 150.0,
            flee_margin: 50.0,
            free_cell_attempts: 200,
            path_refresh_ticks: (15, 35),
            initial_shot_cooldown: (60, 120),
            attack_shot_cooldown: (45, 120),
            chase_shot_cooldown: (90, 120),
        }
    }
}

impl Settings {
    /// Parse settings from JSON, filling omitted fields with defaults
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read and parse a JSON settings file
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Load from a file, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load_from_path(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings: {e}");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        let positive = [
            ("world_width", self.world_width),
            ("world_height", self.world_height),
            ("cell_size", self.cell_size),
            ("player_size", self.player_size),
            ("enemy_size", self.enemy_size),
            ("projectile_size", self.projectile_size),
            ("crate_size", self.crate_size),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(SettingsError::Invalid {
                    field,
                    reason: format!("must be positive, got {value}"),
                });
            }
        }

        let chances = [
            ("spawn_chance", self.spawn_chance),
            ("loot_chance", self.loot_chance),
        ];
        for (field, value) in chances {
            if !(0.0..=1.0).contains(&value) {
                return Err(SettingsError::Invalid {
                    field,
                    reason: format!("probability out of range: {value}"),
                });
            }
        }

        if self.player_max_health == 0 {
            return Err(SettingsError::Invalid {
                field: "player_max_health",
                reason: "must be at least 1".into(),
            });
        }

        let ranges = [
            ("path_refresh_ticks", self.path_refresh_ticks),
            ("initial_shot_cooldown", self.initial_shot_cooldown),
            ("attack_shot_cooldown", self.attack_shot_cooldown),
            ("chase_shot_cooldown", self.chase_shot_cooldown),
        ];
        for (field, (lo, hi)) in ranges {
            if lo > hi {
                return Err(SettingsError::Invalid {
                    field,
                    reason: format!("empty range {lo}..={hi}"),
                });
            }
        }

        Ok(())
    }
}
