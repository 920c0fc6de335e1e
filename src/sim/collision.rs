//! Collision geometry for voids against solid props
//!
//! Voids are circles; solid props are circles or axis-aligned rectangles.
//! Every function returns a push-out normal and depth instead of mutating,
//! and handles the zero-distance degeneracy with a fixed +X escape.

use glam::Vec2;

/// Result of an overlap test
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the shapes overlap
    pub hit: bool,
    /// Direction to push the circle out (unit length when hit)
    pub normal: Vec2,
    /// Overlap depth along the normal
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }

    /// Displacement that resolves the overlap (zero on miss)
    pub fn correction(&self) -> Vec2 {
        if self.hit {
            self.normal * self.penetration
        } else {
            Vec2::ZERO
        }
    }
}

/// Circle vs circle: push `pos` away from `other`
pub fn circle_circle(pos: Vec2, radius: f32, other: Vec2, other_radius: f32) -> CollisionResult {
    let delta = pos - other;
    let dist = delta.length();
    let min_dist = radius + other_radius;

    if dist >= min_dist {
        return CollisionResult::miss();
    }

    let normal = if dist > f32::EPSILON {
        delta / dist
    } else {
        Vec2::X
    };
    CollisionResult {
        hit: true,
        normal,
        penetration: min_dist - dist,
    }
}

/// Closest point of an axis-aligned rectangle to `point`
#[inline]
pub fn closest_point_on_rect(point: Vec2, center: Vec2, half_extents: Vec2) -> Vec2 {
    point.clamp(center - half_extents, center + half_extents)
}

/// Circle vs axis-aligned rectangle: push `pos` out of the box
///
/// A circle whose center sits on or inside the box escapes along +X by its
/// full radius.
pub fn circle_rect(pos: Vec2, radius: f32, center: Vec2, half_extents: Vec2) -> CollisionResult {
    let closest = closest_point_on_rect(pos, center, half_extents);
    let delta = pos - closest;
    let dist_sq = delta.length_squared();

    if dist_sq >= radius * radius {
        return CollisionResult::miss();
    }

    let dist = dist_sq.sqrt();
    if dist <= f32::EPSILON {
        return CollisionResult {
            hit: true,
            normal: Vec2::X,
            penetration: radius,
        };
    }

    CollisionResult {
        hit: true,
        normal: delta / dist,
        penetration: radius - dist,
    }
}

/// Closest point on segment `a..b` to `point`
pub fn closest_point_on_segment(point: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let seg = b - a;
    let len_sq = seg.length_squared();
    if len_sq < 0.0001 {
        return a; // Degenerate segment
    }
    let t = ((point - a).dot(seg) / len_sq).clamp(0.0, 1.0);
    a + seg * t
}

/// Distance from `point` to segment `a..b`
#[inline]
pub fn segment_distance(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    (point - closest_point_on_segment(point, a, b)).length()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_circle_overlap() {
        let result = circle_circle(Vec2::new(25.0, 0.0), 20.0, Vec2::ZERO, 10.0);
        assert!(result.hit);
        assert!((result.normal - Vec2::X).length() < 1e-6);
        assert!((result.penetration - 5.0).abs() < 1e-5);
        assert!((result.correction() - Vec2::new(5.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_circle_circle_miss_and_degenerate() {
        assert!(!circle_circle(Vec2::new(40.0, 0.0), 20.0, Vec2::ZERO, 10.0).hit);

        let result = circle_circle(Vec2::ZERO, 20.0, Vec2::ZERO, 10.0);
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::X);
        assert_eq!(result.penetration, 30.0);
    }

    #[test]
    fn test_circle_rect_side_hit() {
        // Box spans x in [-50, 50]; circle center at x = 60 with radius 20
        let result = circle_rect(Vec2::new(60.0, 0.0), 20.0, Vec2::ZERO, Vec2::splat(50.0));
        assert!(result.hit);
        assert!((result.normal - Vec2::X).length() < 1e-6);
        assert!((result.penetration - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_circle_rect_corner_hit() {
        let pos = Vec2::new(55.0, 55.0);
        let result = circle_rect(pos, 10.0, Vec2::ZERO, Vec2::splat(50.0));
        assert!(result.hit);
        // Normal points diagonally out of the corner
        assert!((result.normal.x - result.normal.y).abs() < 1e-5);
        assert!(result.normal.x > 0.0);
    }

    #[test]
    fn test_circle_rect_inside_escapes_x() {
        let result = circle_rect(Vec2::new(10.0, 10.0), 20.0, Vec2::ZERO, Vec2::splat(50.0));
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::X);
        assert_eq!(result.penetration, 20.0);
    }

    #[test]
    fn test_circle_rect_miss() {
        assert!(!circle_rect(Vec2::new(80.0, 0.0), 20.0, Vec2::ZERO, Vec2::splat(50.0)).hit);
    }

    #[test]
    fn test_segment_distance() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(100.0, 0.0);
        assert!((segment_distance(Vec2::new(50.0, 30.0), a, b) - 30.0).abs() < 1e-5);
        // Clamped to endpoint
        assert!((segment_distance(Vec2::new(-30.0, 40.0), a, b) - 50.0).abs() < 1e-4);
        // Degenerate segment
        assert!((segment_distance(Vec2::new(3.0, 4.0), a, a) - 5.0).abs() < 1e-5);
    }
}
