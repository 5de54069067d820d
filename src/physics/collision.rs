//! Collision detection and response
//!
//! Detection is exact and symmetric: circle-circle by center distance,
//! rectangle pairs by the separating-axis test over their edge normals,
//! and rectangle-circle by the rectangle's normals plus the axis to the
//! circle's nearest vertex. Resolution only ever moves a dynamic body out
//! of static geometry, damping its reflected velocity by restitution.

use glam::Vec2;

use super::body::{PhysicsBody, Shape};

/// Axis-aligned bounding box used for trivial rejection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center_half(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Strict overlap: touching boxes do not intersect
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// Exact, symmetric collision predicate between two bodies.
///
/// Shared contract: level placement validation and the live world both
/// rely on this exact test, so `is_colliding(a, b) == is_colliding(b, a)`
/// must hold for all body pairs.
pub fn is_colliding(a: &PhysicsBody, b: &PhysicsBody) -> bool {
    // Trivial rejection: a body never collides with itself, and bodies
    // whose bounding boxes are disjoint cannot overlap.
    if std::ptr::eq(a, b) {
        return false;
    }
    if !a.aabb().intersects(&b.aabb()) {
        return false;
    }

    match (a.shape, b.shape) {
        (Shape::Circle, Shape::Circle) => circles_collide(a, b),
        (Shape::Rect, Shape::Rect) => rects_collide(a, b),
        (Shape::Rect, Shape::Circle) => rect_circle_collide(a, b),
        (Shape::Circle, Shape::Rect) => rect_circle_collide(b, a),
    }
}

/// Colliding iff center distance is strictly less than the radius sum
fn circles_collide(a: &PhysicsBody, b: &PhysicsBody) -> bool {
    let dist_sq = a.position.distance_squared(b.position);
    let radius_sum = a.radius() + b.radius();
    dist_sq < radius_sum * radius_sum
}

/// Project a polygon's corners onto an axis, returning the (min, max) interval
fn project(corners: &[Vec2], axis: Vec2) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for corner in corners {
        let d = corner.dot(axis);
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}

#[inline]
fn intervals_overlap(a: (f32, f32), b: (f32, f32)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

/// Each rectangle's two unique edge normals, 4 axes total
fn rect_axes(corners: &[Vec2; 4]) -> [Vec2; 2] {
    let edge_x = corners[1] - corners[0];
    let edge_y = corners[3] - corners[0];
    [
        Vec2::new(-edge_x.y, edge_x.x).normalize_or_zero(),
        Vec2::new(-edge_y.y, edge_y.x).normalize_or_zero(),
    ]
}

/// Separating-axis test over both rectangles' edge normals
fn rects_collide(a: &PhysicsBody, b: &PhysicsBody) -> bool {
    let ca = a.corners();
    let cb = b.corners();
    let axes_a = rect_axes(&ca);
    let axes_b = rect_axes(&cb);

    for axis in axes_a.iter().chain(axes_b.iter()) {
        if !intervals_overlap(project(&ca, *axis), project(&cb, *axis)) {
            return false;
        }
    }
    true
}

/// SAT with the rectangle's two edge normals plus the axis from the circle's
/// center to the rectangle's nearest vertex. Separation on any axis means
/// no collision.
fn rect_circle_collide(rect: &PhysicsBody, circle: &PhysicsBody) -> bool {
    let corners = rect.corners();
    let rect_axes = rect_axes(&corners);

    let nearest = corners
        .iter()
        .copied()
        .min_by(|p, q| {
            let dp = p.distance_squared(circle.position);
            let dq = q.distance_squared(circle.position);
            dp.partial_cmp(&dq).unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(rect.position);
    let vertex_axis = (nearest - circle.position).normalize_or_zero();

    let radius = circle.radius();
    for axis in rect_axes.iter().copied().chain(std::iter::once(vertex_axis)) {
        if axis == Vec2::ZERO {
            continue;
        }
        let rect_interval = project(&corners, axis);
        let center = circle.position.dot(axis);
        let circle_interval = (center - radius, center + radius);
        if !intervals_overlap(rect_interval, circle_interval) {
            return false;
        }
    }
    true
}

/// Push a dynamic circle out of another circle along the line between
/// centers and reflect its velocity, damped by restitution.
pub(crate) fn resolve_circle_circle(body: &mut PhysicsBody, other: &PhysicsBody) {
    let delta = body.position - other.position;
    let dist = delta.length();
    let radius_sum = body.radius() + other.radius();
    // Degenerate concentric case: push straight up
    let normal = if dist > 1e-6 {
        delta / dist
    } else {
        Vec2::new(0.0, -1.0)
    };

    let penetration = radius_sum - dist;
    body.position += normal * penetration;

    let reflected = body.velocity - 2.0 * body.velocity.dot(normal) * normal;
    body.velocity = reflected * (1.0 - body.restitution);
}

/// Resolve a dynamic circle against a rectangle by treating the edges of
/// the rectangle's unrotated bounding box as four zero-width segments.
/// Crossing the top or bottom edge resolves purely along y, a left or
/// right edge purely along x. The rectangle's rotation is deliberately
/// ignored on this path (detection already accounted for it).
pub(crate) fn resolve_rect_circle(body: &mut PhysicsBody, rect: &PhysicsBody) {
    let half = rect.size() / 2.0;
    let left = rect.position.x - half.x;
    let right = rect.position.x + half.x;
    let top = rect.position.y - half.y;
    let bottom = rect.position.y + half.y;

    let r = body.radius();
    let ball_min = body.position - Vec2::splat(r);
    let ball_max = body.position + Vec2::splat(r);
    let damping = 1.0 - body.restitution;

    let spans_x = ball_max.x > left && ball_min.x < right;
    let spans_y = ball_max.y > top && ball_min.y < bottom;

    // Top edge: segment [left, right] x {top}
    if spans_x && ball_min.y < top && ball_max.y > top {
        body.position.y = top - r;
        body.velocity.y = -body.velocity.y * damping;
        return;
    }
    // Bottom edge
    if spans_x && ball_min.y < bottom && ball_max.y > bottom {
        body.position.y = bottom + r;
        body.velocity.y = -body.velocity.y * damping;
        return;
    }
    // Left edge: segment {left} x [top, bottom]
    if spans_y && ball_min.x < left && ball_max.x > left {
        body.position.x = left - r;
        body.velocity.x = -body.velocity.x * damping;
        return;
    }
    // Right edge
    if spans_y && ball_min.x < right && ball_max.x > right {
        body.position.x = right + r;
        body.velocity.x = -body.velocity.x * damping;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;

    fn circle(diameter: f32, pos: Vec2) -> PhysicsBody {
        PhysicsBody::new(Shape::Circle, Vec2::splat(diameter), 1.0)
            .unwrap()
            .with_position(pos)
    }

    fn rect(size: Vec2, pos: Vec2, rotation: f32) -> PhysicsBody {
        PhysicsBody::new(Shape::Rect, size, 1.0)
            .unwrap()
            .with_position(pos)
            .with_rotation(rotation)
    }

    #[test]
    fn test_circle_circle_exact_boundary() {
        // Radius 20 each: touching at center distance 40 is not a collision
        let a = circle(40.0, Vec2::ZERO);
        let b = circle(40.0, Vec2::new(40.0, 0.0));
        assert!(!is_colliding(&a, &b));

        let c = circle(40.0, Vec2::new(20.0, 0.0));
        assert!(is_colliding(&a, &c));
    }

    #[test]
    fn test_body_never_collides_with_itself() {
        let a = circle(1.0, Vec2::ZERO);
        assert!(!is_colliding(&a, &a));
    }

    #[test]
    fn test_rect_rect_sat() {
        let a = rect(Vec2::new(1.0, 1.0), Vec2::ZERO, 0.0);
        let b = rect(Vec2::new(1.0, 1.0), Vec2::new(0.9, 0.0), 0.0);
        assert!(is_colliding(&a, &b));

        let c = rect(Vec2::new(1.0, 1.0), Vec2::new(2.5, 0.0), 0.0);
        assert!(!is_colliding(&a, &c));

        // Diagonal gap only a rotated axis can separate: two diamonds whose
        // AABBs overlap but whose shapes do not
        let d = rect(Vec2::new(1.0, 1.0), Vec2::ZERO, std::f32::consts::FRAC_PI_4);
        let e = rect(
            Vec2::new(1.0, 1.0),
            Vec2::new(1.3, 1.3),
            std::f32::consts::FRAC_PI_4,
        );
        assert!(!is_colliding(&d, &e));
    }

    #[test]
    fn test_rect_circle_vertex_axis() {
        let r = rect(Vec2::new(2.0, 2.0), Vec2::ZERO, 0.0);

        // Circle near a corner, diagonally: closer than the corner reach
        let hit = circle(1.0, Vec2::new(1.2, 1.2));
        assert!(is_colliding(&r, &hit));

        // Circle whose AABB touches the corner's AABB but whose disc does not
        let miss = circle(1.0, Vec2::new(1.45, 1.45));
        assert!(!is_colliding(&r, &miss));
    }

    #[test]
    fn test_rotated_rect_circle() {
        // Diamond (45° square); a circle out by the flat diagonal face
        let diamond = rect(Vec2::new(2.0, 2.0), Vec2::ZERO, std::f32::consts::FRAC_PI_4);
        let near = circle(0.8, Vec2::new(1.2, 1.2));
        assert!(!is_colliding(&diamond, &near));

        let touching = circle(0.8, Vec2::new(0.9, 0.9));
        assert!(is_colliding(&diamond, &touching));
    }

    #[test]
    fn test_resolve_circle_circle_pushes_out_and_damps() {
        let peg = circle(0.04, Vec2::ZERO).as_static();
        let mut ball = circle(0.04, Vec2::new(0.0, -0.03)).with_restitution(0.25);
        ball.velocity = Vec2::new(0.0, 1.0);

        resolve_circle_circle(&mut ball, &peg);

        // Pushed out to exactly the radius sum along the center line
        assert!((ball.position.distance(peg.position) - 0.04).abs() < 1e-5);
        // Falling velocity reflected upward and damped by restitution
        assert!(ball.velocity.y < 0.0);
        assert!((ball.velocity.length() - 0.75).abs() < 1e-4);
    }

    #[test]
    fn test_resolve_rect_circle_top_edge() {
        let block = rect(Vec2::new(0.2, 0.1), Vec2::new(0.5, 0.5), 0.0).as_static();
        let mut ball = circle(0.04, Vec2::new(0.5, 0.46)).with_restitution(0.5);
        ball.velocity = Vec2::new(0.1, 0.8);

        resolve_rect_circle(&mut ball, &block);

        // Resolved purely along y: pushed above the top edge, y inverted
        assert!((ball.position.y - (0.45 - 0.02)).abs() < 1e-5);
        assert!((ball.position.x - 0.5).abs() < 1e-6);
        assert!((ball.velocity.y - (-0.4)).abs() < 1e-4);
        assert!((ball.velocity.x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_resolve_rect_circle_side_edge() {
        let block = rect(Vec2::new(0.2, 0.4), Vec2::new(0.5, 0.5), 0.0).as_static();
        let mut ball = circle(0.04, Vec2::new(0.41, 0.5)).with_restitution(0.0);
        ball.velocity = Vec2::new(0.6, 0.0);

        resolve_rect_circle(&mut ball, &block);

        assert!((ball.position.x - (0.4 - 0.02)).abs() < 1e-5);
        assert!((ball.velocity.x - (-0.6)).abs() < 1e-4);
    }

    proptest! {
        /// is_colliding must be symmetric for every shape pairing
        #[test]
        fn prop_collision_symmetry(
            ax in -1.0f32..1.0, ay in -1.0f32..1.0,
            bx in -1.0f32..1.0, by in -1.0f32..1.0,
            asize in 0.05f32..0.5, bw in 0.05f32..0.5, bh in 0.05f32..0.5,
            arot in -3.1f32..3.1, brot in -3.1f32..3.1,
            a_is_rect: bool, b_is_rect: bool,
        ) {
            let a = if a_is_rect {
                rect(Vec2::new(asize, bh), Vec2::new(ax, ay), arot)
            } else {
                circle(asize, Vec2::new(ax, ay))
            };
            let b = if b_is_rect {
                rect(Vec2::new(bw, bh), Vec2::new(bx, by), brot)
            } else {
                circle(bw, Vec2::new(bx, by))
            };
            prop_assert_eq!(is_colliding(&a, &b), is_colliding(&b, &a));
        }
    }
}
