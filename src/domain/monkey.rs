/// Monkey patrol AI.
///
/// A monkey walks a cyclic list of route legs, turning at the end of each
/// leg. Two other turns exist and are kept distinct:
///   - edge bounce: reaching a play-field edge reverses without advancing
///     the route;
///   - ledge turn: losing platform support reverses and advances the route.
///
/// The thrower variant also counts up a cooldown and throws a banana in
/// its facing direction every `fire_interval` ticks.

use crate::config::{MonkeyTuning, ProjectileTuning};
use super::entity::Facing;
use super::geometry::{Body, Field};
use super::projectile::{Projectile, ProjectileKind};
use super::terrain::{self, Platform};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MonkeyKind {
    Patrol,
    Thrower { fire_cooldown: u32 },
}

#[derive(Clone, Debug)]
pub struct Monkey {
    pub id: usize,
    pub kind: MonkeyKind,
    pub body: Body,
    pub facing: Facing,
    route: Vec<f64>,
    route_index: usize,
    walked: f64,
    destroyed: bool,
}

impl Monkey {
    /// `route` must be non-empty; the level loader skips monkeys without one.
    pub fn new(id: usize, kind: MonkeyKind, body: Body, facing: Facing, route: Vec<f64>) -> Self {
        debug_assert!(!route.is_empty(), "monkey {id} has no route");
        Monkey { id, kind, body, facing, route, route_index: 0, walked: 0.0, destroyed: false }
    }

    pub fn is_thrower(&self) -> bool {
        matches!(self.kind, MonkeyKind::Thrower { .. })
    }

    pub fn route_index(&self) -> usize { self.route_index }
    pub fn walked(&self) -> f64 { self.walked }

    pub fn destroy(&mut self) { self.destroyed = true; }
    pub fn is_destroyed(&self) -> bool { self.destroyed }

    fn current_leg(&self) -> f64 {
        self.route.get(self.route_index).copied().unwrap_or(f64::INFINITY)
    }

    /// Advance one tick. Returns true when a thrower should throw now.
    pub fn update(&mut self, platforms: &[Platform], field: &Field, tuning: &MonkeyTuning) -> bool {
        if self.destroyed { return false; }

        let step = tuning.speed * self.facing.sign();
        self.body.x += step;
        self.walked += step.abs();

        if self.walked >= self.current_leg() {
            self.route_turn();
        }

        let half = self.body.w / 2.0;
        let at_left_edge = self.body.x - half <= 0.0 && self.facing == Facing::Left;
        let at_right_edge = self.body.x + half >= field.width && self.facing == Facing::Right;
        if at_left_edge || at_right_edge {
            self.edge_bounce();
        }

        if !terrain::is_resting(&self.body, platforms) {
            self.ledge_turn();
        }
        // Unsupported here only means there is nothing to fall onto; the
        // ledge turn above already reacted to it.
        terrain::snap_to_platform_below(&mut self.body, platforms);

        self.tick_fire_cooldown(tuning)
    }

    fn route_turn(&mut self) {
        self.walked = 0.0;
        self.facing = self.facing.flipped();
        self.route_index = (self.route_index + 1) % self.route.len().max(1);
    }

    fn edge_bounce(&mut self) {
        self.walked = 0.0;
        self.facing = self.facing.flipped();
    }

    fn ledge_turn(&mut self) {
        log::debug!("monkey {} lost footing at x={:.1}, turning", self.id, self.body.x);
        self.route_turn();
    }

    fn tick_fire_cooldown(&mut self, tuning: &MonkeyTuning) -> bool {
        let MonkeyKind::Thrower { fire_cooldown } = &mut self.kind else { return false };
        *fire_cooldown += 1;
        if *fire_cooldown >= tuning.fire_interval {
            *fire_cooldown = 0;
            true
        } else {
            false
        }
    }

    /// Banana spawned at the monkey's center, heading where it faces.
    pub fn throw(&self, tuning: &ProjectileTuning) -> Projectile {
        Projectile::new(ProjectileKind::Banana, self.body.x, self.body.y, self.facing, tuning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide_floor() -> Vec<Platform> {
        vec![Platform::new(500.0, 410.0, 1000.0, 20.0)] // top 400, spans 0..1000
    }

    fn monkey_at(x: f64, facing: Facing, route: Vec<f64>) -> Monkey {
        Monkey::new(0, MonkeyKind::Patrol, Body::new(x, 382.0, 36.0, 36.0), facing, route)
    }

    #[test]
    fn route_turn_happens_on_the_exact_tick() {
        let platforms = wide_floor();
        let field = Field::default();
        let tuning = MonkeyTuning::default();
        let mut m = monkey_at(100.0, Facing::Right, vec![50.0, 50.0]);

        for _ in 0..99 { m.update(&platforms, &field, &tuning); }
        assert_eq!(m.body.x, 149.5);
        assert_eq!(m.facing, Facing::Right);
        assert_eq!(m.route_index(), 0);

        m.update(&platforms, &field, &tuning);
        assert_eq!(m.body.x, 150.0);
        assert_eq!(m.facing, Facing::Left);
        assert_eq!(m.route_index(), 1);
        assert_eq!(m.walked(), 0.0);

        m.update(&platforms, &field, &tuning);
        assert_eq!(m.body.x, 149.5);
    }

    #[test]
    fn route_legs_cycle() {
        let platforms = wide_floor();
        let field = Field::default();
        let tuning = MonkeyTuning::default();
        let mut m = monkey_at(300.0, Facing::Right, vec![10.0, 20.0]);

        for _ in 0..20 { m.update(&platforms, &field, &tuning); }  // 10 right
        assert_eq!(m.route_index(), 1);
        for _ in 0..40 { m.update(&platforms, &field, &tuning); }  // 20 left
        assert_eq!(m.route_index(), 0);
        assert_eq!(m.body.x, 290.0);
        assert_eq!(m.facing, Facing::Right);
    }

    #[test]
    fn edge_bounce_keeps_route_index() {
        let platforms = wide_floor();
        let field = Field::default();
        let tuning = MonkeyTuning::default();
        let mut m = monkey_at(18.4, Facing::Left, vec![500.0, 500.0]);

        m.update(&platforms, &field, &tuning);
        assert_eq!(m.facing, Facing::Right);
        assert_eq!(m.route_index(), 0);
        assert_eq!(m.walked(), 0.0);
    }

    #[test]
    fn ledge_turn_advances_route() {
        let platforms = vec![Platform::new(100.0, 410.0, 200.0, 20.0)]; // spans 0..200
        let field = Field::default();
        let tuning = MonkeyTuning::default();
        let mut m = monkey_at(217.5, Facing::Right, vec![1000.0, 1000.0]);

        m.update(&platforms, &field, &tuning); // x = 218: left edge at 200, off the platform
        assert_eq!(m.facing, Facing::Left);
        assert_eq!(m.route_index(), 1);
        assert_eq!(m.body.y, 382.0);

        m.update(&platforms, &field, &tuning); // back on
        assert_eq!(m.facing, Facing::Left);
        assert_eq!(m.route_index(), 1);
    }

    #[test]
    fn snaps_onto_floor_after_walking() {
        let platforms = wide_floor();
        let field = Field::default();
        let tuning = MonkeyTuning::default();
        let mut m = monkey_at(300.0, Facing::Right, vec![100.0]);
        m.body.y = 380.0; // two units above the floor
        m.update(&platforms, &field, &tuning);
        assert_eq!(m.body.bottom(), 400.0);
    }

    #[test]
    fn thrower_fires_every_interval() {
        let platforms = wide_floor();
        let field = Field::default();
        let tuning = MonkeyTuning::default();
        let mut m = Monkey::new(
            7, MonkeyKind::Thrower { fire_cooldown: 0 },
            Body::new(500.0, 382.0, 36.0, 36.0), Facing::Left, vec![20.0, 20.0],
        );

        let mut fired_at = vec![];
        for tick in 1..=600 {
            if m.update(&platforms, &field, &tuning) { fired_at.push(tick); }
        }
        assert_eq!(fired_at, vec![300, 600]);

        let banana = m.throw(&ProjectileTuning { speed: 1.8, max_range: 300.0, width: 20.0, height: 16.0 });
        assert_eq!(banana.kind, ProjectileKind::Banana);
        assert_eq!(banana.body.x, m.body.x);
        assert_eq!(banana.facing(), m.facing);
    }

    #[test]
    fn patrol_monkey_never_fires() {
        let platforms = wide_floor();
        let field = Field::default();
        let tuning = MonkeyTuning::default();
        let mut m = monkey_at(500.0, Facing::Left, vec![20.0]);
        assert!((0..700).all(|_| !m.update(&platforms, &field, &tuning)));
    }

    #[test]
    fn destroyed_monkey_is_inert() {
        let platforms = wide_floor();
        let field = Field::default();
        let tuning = MonkeyTuning { speed: 0.5, fire_interval: 1 };
        let mut m = Monkey::new(
            1, MonkeyKind::Thrower { fire_cooldown: 0 },
            Body::new(500.0, 382.0, 36.0, 36.0), Facing::Left, vec![20.0],
        );
        m.destroy();
        assert!(!m.update(&platforms, &field, &tuning));
        assert_eq!(m.body.x, 500.0);
    }
}
