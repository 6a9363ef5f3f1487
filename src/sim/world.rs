/// WorldState: the complete snapshot of a running game.
///
/// The world owns every collection. Platforms and ladders are fixed after
/// `load_level`; barrels, monkeys and projectiles change only inside
/// `step`, between its phases.

use crate::config::Tuning;
use crate::domain::barrel::Barrel;
use crate::domain::entity::{Boss, Pickup};
use crate::domain::monkey::Monkey;
use crate::domain::player::Player;
use crate::domain::projectile::Projectile;
use crate::domain::terrain::{Ladder, Platform};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
    /// Won a level that has a successor; waiting to load it.
    LevelCleared,
    GameOver,
    /// Won the last level.
    Victory,
}

pub struct WorldState {
    // ── Static geometry ──
    pub platforms: Vec<Platform>,
    pub ladders: Vec<Ladder>,

    // ── Entities ──
    pub player: Player,
    pub barrels: Vec<Barrel>,
    pub monkeys: Vec<Monkey>,
    pub bullets: Vec<Projectile>,
    pub bananas: Vec<Projectile>,
    pub boss: Option<Boss>,
    pub pickups: Vec<Pickup>,

    pub tuning: Tuning,

    // ── Meta ──
    pub phase: Phase,
    /// 1-based.
    pub current_level: usize,
    pub total_levels: usize,
    pub level_name: String,
    pub frame: u32,
    /// Score shown on the win / game-over screen.
    pub final_score: i64,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
}

impl WorldState {
    pub fn new(tuning: Tuning) -> Self {
        let [pw, ph] = tuning.sizes.player;
        WorldState {
            platforms: vec![],
            ladders: vec![],
            player: Player::new(0.0, 0.0, pw, ph),
            barrels: vec![],
            monkeys: vec![],
            bullets: vec![],
            bananas: vec![],
            boss: None,
            pickups: vec![],
            tuning,
            phase: Phase::Title,
            current_level: 0,
            total_levels: 0,
            level_name: String::new(),
            frame: 0,
            final_score: 0,
            message: String::new(),
            message_timer: 0,
        }
    }

    pub fn score(&self) -> i64 {
        self.player.total_score(&self.tuning.scoring)
    }

    pub fn frames_left(&self) -> u32 {
        self.tuning.gameplay.max_frames.saturating_sub(self.frame)
    }

    pub fn seconds_left(&self) -> u32 {
        self.frames_left() / self.tuning.gameplay.frames_per_second.max(1)
    }

    /// Points for finishing with time on the clock (whole seconds only).
    pub fn time_bonus(&self) -> i64 {
        self.seconds_left() as i64 * self.tuning.scoring.time_bonus_per_second
    }

    pub fn set_message(&mut self, text: impl Into<String>, ticks: u32) {
        self.message = text.into();
        self.message_timer = ticks;
    }

    /// Drop every entity of the current level.
    pub fn clear_entities(&mut self) {
        self.platforms.clear();
        self.ladders.clear();
        self.barrels.clear();
        self.monkeys.clear();
        self.bullets.clear();
        self.bananas.clear();
        self.pickups.clear();
        self.boss = None;
    }
}
