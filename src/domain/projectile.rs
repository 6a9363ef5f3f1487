/// Straight-line projectiles: the player's bullets and thrown bananas.
///
/// Both share one model: constant horizontal velocity, no gravity,
/// expiry after a maximum travelled distance or on leaving the field.

use crate::config::ProjectileTuning;
use super::entity::Facing;
use super::geometry::{Body, Field};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ProjectileKind {
    Bullet,
    Banana,
}

#[derive(Clone, Debug)]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub body: Body,
    /// Signed, per tick.
    pub velocity: f64,
    pub travelled: f64,
    pub max_range: f64,
    pub expired: bool,
}

impl Projectile {
    pub fn new(kind: ProjectileKind, x: f64, y: f64, facing: Facing, tuning: &ProjectileTuning) -> Self {
        Projectile {
            kind,
            body: Body::new(x, y, tuning.width, tuning.height),
            velocity: tuning.speed * facing.sign(),
            travelled: 0.0,
            max_range: tuning.max_range,
            expired: false,
        }
    }

    pub fn facing(&self) -> Facing {
        if self.velocity < 0.0 { Facing::Left } else { Facing::Right }
    }

    /// Move one tick. Returns true once the projectile should despawn;
    /// an expired projectile never moves again.
    pub fn advance(&mut self, field: &Field) -> bool {
        if self.expired { return true; }
        self.body.x += self.velocity;
        self.travelled += self.velocity.abs();
        if self.travelled >= self.max_range || self.body.x < 0.0 || self.body.x > field.width {
            self.expired = true;
        }
        self.expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bullet_tuning() -> ProjectileTuning {
        ProjectileTuning { speed: 3.8, max_range: 300.0, width: 12.0, height: 6.0 }
    }

    fn banana_tuning() -> ProjectileTuning {
        ProjectileTuning { speed: 1.8, max_range: 300.0, width: 20.0, height: 16.0 }
    }

    fn ticks_until_despawn(p: &mut Projectile, field: &Field) -> u32 {
        let mut ticks = 0;
        loop {
            ticks += 1;
            if p.advance(field) { return ticks; }
            assert!(ticks < 10_000, "projectile never despawned");
        }
    }

    #[test]
    fn bullet_expires_at_range() {
        let field = Field::default();
        let mut b = Projectile::new(ProjectileKind::Bullet, 500.0, 300.0, Facing::Right, &bullet_tuning());
        // ceil(300 / 3.8) = 79
        assert_eq!(ticks_until_despawn(&mut b, &field), 79);
    }

    #[test]
    fn banana_expires_at_range_going_left() {
        let field = Field::default();
        let mut b = Projectile::new(ProjectileKind::Banana, 600.0, 300.0, Facing::Left, &banana_tuning());
        // ceil(300 / 1.8) = 167
        assert_eq!(ticks_until_despawn(&mut b, &field), 167);
        assert!(b.body.x < 600.0);
        assert_eq!(b.facing(), Facing::Left);
    }

    #[test]
    fn leaving_the_field_expires_early() {
        let field = Field::default();
        let mut b = Projectile::new(ProjectileKind::Bullet, 10.0, 300.0, Facing::Left, &bullet_tuning());
        // 10 -> 6.2 -> 2.4 -> -1.4
        assert_eq!(ticks_until_despawn(&mut b, &field), 3);
    }

    #[test]
    fn expired_projectile_stays_put() {
        let field = Field::default();
        let mut b = Projectile::new(ProjectileKind::Bullet, 1022.0, 300.0, Facing::Right, &bullet_tuning());
        assert!(b.advance(&field));
        let x = b.body.x;
        assert!(b.advance(&field));
        assert_eq!(b.body.x, x);
    }

    #[test]
    fn no_vertical_motion() {
        let field = Field::default();
        let mut b = Projectile::new(ProjectileKind::Banana, 500.0, 321.0, Facing::Right, &banana_tuning());
        for _ in 0..20 { b.advance(&field); }
        assert_eq!(b.body.y, 321.0);
    }
}
