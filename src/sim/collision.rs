//! Collision detection and response
//!
//! Actors and projectiles are circles; walls are axis-aligned rectangles.
//! Wall response is a soft push-back rather than a physical resolution.

use glam::Vec2;

use super::state::Wall;

/// Circle-circle overlap (touching does not count)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance_squared(b) < (ra + rb) * (ra + rb)
}

/// First wall whose interior contains `point`
pub fn wall_containing(walls: &[Wall], point: Vec2) -> Option<&Wall> {
    walls.iter().find(|w| w.contains_point(point))
}

/// Corrective displacement for a body found inside a wall
///
/// Pushes `distance` units along the dominant axis of `vel`, against the
/// direction of travel. A body with no velocity is nudged toward -x.
pub fn push_back_offset(vel: Vec2, distance: f32) -> Vec2 {
    if vel == Vec2::ZERO {
        return Vec2::new(-distance, 0.0);
    }
    if vel.x.abs() >= vel.y.abs() {
        Vec2::new(-vel.x.signum() * distance, 0.0)
    } else {
        Vec2::new(0.0, -vel.y.signum() * distance)
    }
}

/// Scale an intent vector into a per-tick displacement
///
/// Magnitudes above 1.0 map to full speed; zero (or non-finite) intent yields
/// no movement.
pub fn intent_displacement(intent: Vec2, speed: f32) -> Vec2 {
    let magnitude = intent.length();
    if !(magnitude > 0.0) || !magnitude.is_finite() {
        return Vec2::ZERO;
    }
    intent / magnitude * magnitude.min(1.0) * speed
}
