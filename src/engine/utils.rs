use crate::types::Vec2;

pub(super) fn circle_contains_point(center: Vec2, radius: f64, point: Vec2) -> bool {
    center.distance_squared(point) < radius * radius
}

pub(super) fn circle_contains_circle(
    outer_center: Vec2,
    outer_radius: f64,
    inner_center: Vec2,
    inner_radius: f64,
) -> bool {
    outer_center.distance(inner_center) + inner_radius < outer_radius
}

pub(super) fn floor_position(pos: Vec2) -> Vec2 {
    Vec2 {
        x: pos.x.floor(),
        y: pos.y.floor(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_on_the_edge_is_outside() {
        assert!(!circle_contains_point(Vec2::ZERO, 10.0, Vec2::new(10.0, 0.0)));
        assert!(circle_contains_point(Vec2::ZERO, 10.0, Vec2::new(9.99, 0.0)));
    }

    #[test]
    fn touching_inner_circle_is_not_contained() {
        assert!(circle_contains_circle(Vec2::ZERO, 500.0, Vec2::new(100.0, 0.0), 50.0));
        assert!(!circle_contains_circle(Vec2::ZERO, 150.0, Vec2::new(100.0, 0.0), 50.0));
        assert!(!circle_contains_circle(Vec2::ZERO, 50.0, Vec2::ZERO, 50.0));
    }

    #[test]
    fn floor_position_drops_fractions() {
        assert_eq!(floor_position(Vec2::new(3.9, 1999.2)), Vec2::new(3.0, 1999.0));
    }
}
