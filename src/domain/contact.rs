/// Contact outcomes between the player (or a bullet) and everything that
/// can touch them, as one lookup table instead of per-type branches.

use super::geometry::{collision_side, intersects, Body, Side};

/// Things the player or a bullet can run into.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EntityKind {
    Barrel,
    Monkey,
    Thrower,
    Boss,
    Banana,
}

/// What did the touching.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Contact {
    Player,
    Bullet,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ContactOutcome {
    /// Barrel broken by the hammer; counts toward barrels destroyed.
    SmashBarrel,
    /// Monkey destroyed; worth the monkey bonus.
    DestroyMonkey,
    BossDefeated,
    BossDamaged,
    PlayerDies,
    Ignore,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Barrel => "barrel",
            EntityKind::Monkey => "monkey",
            EntityKind::Thrower => "banana monkey",
            EntityKind::Boss => "boss",
            EntityKind::Banana => "banana",
        }
    }
}

/// Forgiveness margin for a contact test, per axis.
pub fn contact_margin(kind: EntityKind, contact: Contact) -> f64 {
    match (contact, kind) {
        (Contact::Player, EntityKind::Barrel | EntityKind::Boss) => 2.0,
        _ => 5.0,
    }
}

pub fn resolve(kind: EntityKind, contact: Contact, has_hammer: bool) -> ContactOutcome {
    use ContactOutcome::*;
    use EntityKind::*;
    match (contact, kind, has_hammer) {
        (Contact::Player, Banana, _) => PlayerDies,
        (Contact::Player, Barrel, true) => SmashBarrel,
        (Contact::Player, Monkey | Thrower, true) => DestroyMonkey,
        (Contact::Player, Boss, true) => BossDefeated,
        (Contact::Player, _, false) => PlayerDies,
        (Contact::Bullet, Monkey | Thrower, _) => DestroyMonkey,
        (Contact::Bullet, Boss, _) => BossDamaged,
        (Contact::Bullet, Barrel | Banana, _) => Ignore,
    }
}

/// A detected contact, with the face of the target that was hit.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Hit {
    pub outcome: ContactOutcome,
    pub side: Side,
}

/// Test `toucher` against `target` and resolve the outcome if they touch.
pub fn check(toucher: &Body, contact: Contact, target: &Body, kind: EntityKind, has_hammer: bool) -> Option<Hit> {
    let margin = contact_margin(kind, contact);
    if !intersects(toucher, target, margin, margin) {
        return None;
    }
    Some(Hit {
        outcome: resolve(kind, contact, has_hammer),
        side: collision_side(toucher, target),
    })
}
