/// Axis-aligned bodies and the two collision primitives.
///
/// Every position is the geometric center of the entity. Screen space:
/// x grows rightward, y grows downward, so a body's `top()` is smaller
/// than its `bottom()`.

use serde::Deserialize;

/// Center-anchored bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Body {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Body { x, y, w, h }
    }

    pub fn left(&self) -> f64 { self.x - self.w / 2.0 }
    pub fn right(&self) -> f64 { self.x + self.w / 2.0 }
    pub fn top(&self) -> f64 { self.y - self.h / 2.0 }
    pub fn bottom(&self) -> f64 { self.y + self.h / 2.0 }

    /// Move vertically so the bottom edge sits at `bottom`.
    pub fn set_bottom(&mut self, bottom: f64) {
        self.y = bottom - self.h / 2.0;
    }

    /// Move vertically so the top edge sits at `top`.
    pub fn set_top(&mut self, top: f64) {
        self.y = top + self.h / 2.0;
    }

    /// Open-interval overlap of the horizontal spans (touching edges don't count).
    pub fn overlaps_horizontally(&self, other: &Body) -> bool {
        self.right() > other.left() && self.left() < other.right()
    }

    pub fn is_close_to_top_of(&self, other: &Body, tolerance: f64) -> bool {
        (self.bottom() - other.top()).abs() < tolerance
    }

    /// Is this body's center inside the horizontal span of `other`?
    pub fn centered_over(&self, other: &Body) -> bool {
        self.x >= other.left() && self.x <= other.right()
    }
}

/// Which face of the second body the first one crossed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    None,
    Top,
    Right,
    Bottom,
    Left,
}

/// Play-field bounds. The field's left and top edges are at zero.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Field {
    pub width: f64,
    pub height: f64,
}

impl Default for Field {
    fn default() -> Self {
        Field { width: 1024.0, height: 768.0 }
    }
}

/// Overlap test with per-axis forgiveness.
///
/// Each margin is subtracted from *both* half-extents, so a margin of 5
/// shrinks the combined reach on that axis by 10.
pub fn intersects(a: &Body, b: &Body, margin_x: f64, margin_y: f64) -> bool {
    let reach_x = (a.w / 2.0 - margin_x) + (b.w / 2.0 - margin_x);
    let reach_y = (a.h / 2.0 - margin_y) + (b.h / 2.0 - margin_y);
    (a.x - b.x).abs() < reach_x && (a.y - b.y).abs() < reach_y
}

/// Classify the face of `b` that `a` came through.
///
/// Picks the axis with the smaller penetration; on that axis the smaller of
/// the two directional overlaps decides the face.
pub fn collision_side(a: &Body, b: &Body) -> Side {
    if a.right() <= b.left() || a.left() >= b.right()
        || a.bottom() <= b.top() || a.top() >= b.bottom()
    {
        return Side::None;
    }

    let from_left = a.right() - b.left();
    let from_right = b.right() - a.left();
    let from_above = a.bottom() - b.top();
    let from_below = b.bottom() - a.top();

    if from_left.min(from_right) < from_above.min(from_below) {
        if from_left < from_right { Side::Left } else { Side::Right }
    } else if from_above < from_below {
        Side::Top
    } else {
        Side::Bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_follow_center() {
        let b = Body::new(100.0, 50.0, 30.0, 40.0);
        assert_eq!(b.left(), 85.0);
        assert_eq!(b.right(), 115.0);
        assert_eq!(b.top(), 30.0);
        assert_eq!(b.bottom(), 70.0);
    }

    #[test]
    fn set_bottom_and_top() {
        let mut b = Body::new(0.0, 0.0, 10.0, 20.0);
        b.set_bottom(100.0);
        assert_eq!(b.bottom(), 100.0);
        assert_eq!(b.y, 90.0);
        b.set_top(40.0);
        assert_eq!(b.top(), 40.0);
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Body::new(0.0, 0.0, 10.0, 10.0);
        let b = Body::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps_horizontally(&b));
        let c = Body::new(9.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps_horizontally(&c));
    }

    // ── intersects ──

    #[test]
    fn intersects_without_margin() {
        let a = Body::new(0.0, 0.0, 20.0, 20.0);
        let b = Body::new(19.0, 0.0, 20.0, 20.0);
        assert!(intersects(&a, &b, 0.0, 0.0));
        let c = Body::new(20.0, 0.0, 20.0, 20.0);
        assert!(!intersects(&a, &c, 0.0, 0.0));
    }

    #[test]
    fn margin_shrinks_reach_on_both_bodies() {
        let a = Body::new(0.0, 0.0, 20.0, 20.0);
        // reach with margin 5 is (10-5)+(10-5) = 10
        let near = Body::new(9.5, 0.0, 20.0, 20.0);
        let far = Body::new(10.0, 0.0, 20.0, 20.0);
        assert!(intersects(&a, &near, 5.0, 5.0));
        assert!(!intersects(&a, &far, 5.0, 5.0));
    }

    #[test]
    fn margins_are_per_axis() {
        let a = Body::new(0.0, 0.0, 20.0, 20.0);
        let b = Body::new(0.0, 15.0, 20.0, 20.0);
        assert!(intersects(&a, &b, 5.0, 0.0));
        assert!(!intersects(&a, &b, 0.0, 5.0));
    }

    // ── collision_side ──

    #[test]
    fn separated_boxes_have_no_side() {
        let a = Body::new(0.0, 0.0, 10.0, 10.0);
        let b = Body::new(50.0, 0.0, 10.0, 10.0);
        assert_eq!(collision_side(&a, &b), Side::None);
        let touching = Body::new(10.0, 0.0, 10.0, 10.0);
        assert_eq!(collision_side(&a, &touching), Side::None);
    }

    #[test]
    fn side_from_each_direction() {
        let target = Body::new(100.0, 100.0, 40.0, 40.0);
        // slight penetrations from each direction
        assert_eq!(collision_side(&Body::new(62.0, 100.0, 40.0, 40.0), &target), Side::Left);
        assert_eq!(collision_side(&Body::new(138.0, 100.0, 40.0, 40.0), &target), Side::Right);
        assert_eq!(collision_side(&Body::new(100.0, 62.0, 40.0, 40.0), &target), Side::Top);
        assert_eq!(collision_side(&Body::new(100.0, 138.0, 40.0, 40.0), &target), Side::Bottom);
    }

    #[test]
    fn shallower_axis_wins() {
        let target = Body::new(100.0, 100.0, 40.0, 40.0);
        // 4 deep from the left, 10 deep from above
        let a = Body::new(64.0, 70.0, 40.0, 40.0);
        assert_eq!(collision_side(&a, &target), Side::Left);
        // 10 deep from the left, 4 deep from above
        let b = Body::new(70.0, 64.0, 40.0, 40.0);
        assert_eq!(collision_side(&b, &target), Side::Top);
    }
}
