/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and status messages.

use crate::domain::contact::EntityKind;
use crate::domain::entity::PickupKind;
use crate::domain::geometry::Side;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DeathCause {
    Contact { kind: EntityKind, side: Side },
    TimeUp,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Jumped,
    LadderGrabbed,
    BarrelJumped { id: usize },
    BarrelSmashed { id: usize },
    MonkeyDestroyed { id: usize },
    BananaThrown { monkey: usize },
    ShotFired,
    BossHit { health: u32 },
    PickupCollected { kind: PickupKind },
    PlayerKilled { cause: DeathCause },
    LevelCleared { level: usize, time_bonus: i64, score: i64 },
}
