//! Collision detection between the target point and asteroids

use glam::Vec2;

use super::state::Asteroid;

/// True when `point` lies inside or on the circle
#[inline]
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance(center) <= radius
}

/// Check if a target point hits a live asteroid
pub fn target_hits_asteroid(target: Vec2, asteroid: &Asteroid) -> bool {
    asteroid.alive && point_in_circle(target, asteroid.pos, asteroid.radius as f32)
}

/// Indices of every asteroid the target hits, in collection order.
///
/// Overlapping asteroids are all reported; a single point can destroy
/// several in one tick.
pub fn asteroids_hit(target: Vec2, asteroids: &[Asteroid]) -> Vec<usize> {
    asteroids
        .iter()
        .enumerate()
        .filter(|(_, a)| target_hits_asteroid(target, a))
        .map(|(i, _)| i)
        .collect()
}
