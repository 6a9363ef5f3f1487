/// Small shared entity types: facing, per-tick input, the boss, pickups.

use super::geometry::{intersects, Body};

/// Pickups are forgiving: a margin of 5 on both axes.
pub const PICKUP_MARGIN: f64 = 5.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> f64 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Facing {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Parse a direction word from level data ("left"/"right", any case).
    pub fn parse(word: &str) -> Option<Facing> {
        match word.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Some(Facing::Left),
            "right" | "r" => Some(Facing::Right),
            _ => None,
        }
    }
}

/// Held state of every control for one tick.
///
/// `jump` and `fire` are edge-triggered by the input layer; the rest are
/// level-triggered.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
    pub fire: bool,
}

/// The boss at the top of each level. Defeated by hammer contact or by
/// draining its health with bullets.
#[derive(Clone, Debug)]
pub struct Boss {
    pub body: Body,
    pub health: u32,
}

impl Boss {
    pub fn new(x: f64, y: f64, w: f64, h: f64, health: u32) -> Self {
        Boss { body: Body::new(x, y, w, h), health }
    }

    pub fn reduce_health(&mut self) {
        self.health = self.health.saturating_sub(1);
    }

    pub fn is_dead(&self) -> bool { self.health == 0 }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PickupKind {
    Hammer,
    Blaster,
}

#[derive(Clone, Debug)]
pub struct Pickup {
    pub kind: PickupKind,
    pub body: Body,
    pub collected: bool,
}

impl Pickup {
    pub fn new(kind: PickupKind, body: Body) -> Self {
        Pickup { kind, body, collected: false }
    }

    /// Mark collected if `collector` touches it. Returns true only on the
    /// tick of collection.
    pub fn try_collect(&mut self, collector: &Body) -> bool {
        if self.collected || !intersects(collector, &self.body, PICKUP_MARGIN, PICKUP_MARGIN) {
            return false;
        }
        self.collected = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_round_trip() {
        assert_eq!(Facing::Left.flipped(), Facing::Right);
        assert_eq!(Facing::Right.flipped().flipped(), Facing::Right);
        assert_eq!(Facing::Left.sign(), -1.0);
        assert_eq!(Facing::parse(" Right "), Some(Facing::Right));
        assert_eq!(Facing::parse("LEFT"), Some(Facing::Left));
        assert_eq!(Facing::parse("up"), None);
    }

    #[test]
    fn boss_health_floors_at_zero() {
        let mut boss = Boss::new(0.0, 0.0, 80.0, 70.0, 2);
        boss.reduce_health();
        assert!(!boss.is_dead());
        boss.reduce_health();
        assert!(boss.is_dead());
        boss.reduce_health();
        assert_eq!(boss.health, 0);
    }

    #[test]
    fn pickup_collects_once() {
        let mut hammer = Pickup::new(PickupKind::Hammer, Body::new(100.0, 100.0, 30.0, 30.0));
        let far = Body::new(200.0, 100.0, 30.0, 40.0);
        assert!(!hammer.try_collect(&far));
        let near = Body::new(110.0, 100.0, 30.0, 40.0);
        assert!(hammer.try_collect(&near));
        assert!(hammer.collected);
        assert!(!hammer.try_collect(&near));
    }

    #[test]
    fn pickup_margin_requires_real_overlap() {
        let mut blaster = Pickup::new(PickupKind::Blaster, Body::new(100.0, 100.0, 30.0, 30.0));
        // reach with margin 5 is (15-5)+(15-5) = 20; 25 apart just touches edges
        let grazing = Body::new(125.0, 100.0, 30.0, 30.0);
        assert!(!blaster.try_collect(&grazing));
    }
}
