//! Arena Siege - simulation core of a top-down arena shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, pathfinding, enemy AI, physics, combat)
//! - `game`: Boundary facade driven by the presentation layer
//! - `settings`: Data-driven game balance
//! - `session`: Per-session score record that survives resets

pub mod game;
pub mod session;
pub mod settings;
pub mod sim;

pub use game::Game;
pub use session::SessionRecord;
pub use settings::{Settings, SettingsError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Arena dimensions
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 700.0;
    /// Side length of a navigation grid cell
    pub const CELL_SIZE: f32 = 20.0;

    /// Player spawn point
    pub const PLAYER_START: (f32, f32) = (400.0, 300.0);

    /// Projectiles are drawn with a diameter of twice their size
    pub const PROJECTILE_HIT_SCALE: f32 = 1.0;

    /// Line-of-sight sampling interval (world units)
    pub const LOS_STEP: f32 = 5.0;

    /// Fraction of the player's speed used for the wall push-back
    pub const WALL_PUSH_FACTOR: f32 = 0.5;

    /// Default wall layout as (x, y, width, height)
    pub const DEFAULT_WALLS: [(f32, f32, f32, f32); 6] = [
        (100.0, 100.0, 200.0, 20.0),
        (500.0, 100.0, 200.0, 20.0),
        (100.0, 600.0, 200.0, 20.0),
        (500.0, 600.0, 200.0, 20.0),
        (300.0, 200.0, 20.0, 400.0),
        (500.0, 300.0, 20.0, 200.0),
    ];
}

/// Unit direction for an angle in degrees
#[inline]
pub fn direction_from_degrees(angle: f32) -> Vec2 {
    let rad = angle.to_radians();
    Vec2::new(rad.cos(), rad.sin())
}

/// Angle in degrees of the ray from `from` toward `to`
#[inline]
pub fn degrees_toward(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x).to_degrees()
}

/// Clamp a position so a body of the given half-extent stays inside the world
#[inline]
pub fn clamp_to_bounds(pos: Vec2, half_extent: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        pos.x.clamp(half_extent, (width - half_extent).max(half_extent)),
        pos.y.clamp(half_extent, (height - half_extent).max(half_extent)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_roundtrip() {
        let from = Vec2::new(10.0, 10.0);
        let to = Vec2::new(10.0, 50.0);
        let angle = degrees_toward(from, to);
        assert!((angle - 90.0).abs() < 1e-4);

        let dir = direction_from_degrees(angle);
        assert!(dir.x.abs() < 1e-5);
        assert!((dir.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_clamp_to_bounds() {
        let p = clamp_to_bounds(Vec2::new(-20.0, 900.0), 15.0, 800.0, 700.0);
        assert_eq!(p, Vec2::new(15.0, 685.0));

        let inside = clamp_to_bounds(Vec2::new(400.0, 300.0), 15.0, 800.0, 700.0);
        assert_eq!(inside, Vec2::new(400.0, 300.0));
    }
}
