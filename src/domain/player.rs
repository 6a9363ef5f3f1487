/// Player controller.
///
/// Motion is an explicit state machine:
///
///   Grounded ──jump / walk off──▶ Airborne ──land──▶ Grounded
///      │ ▲                           ▲
///  grab│ │reach bottom               │ side key / lose the ladder
///      ▼ │                           │
///   Climbing ────────────────────────┘
///
/// One tick is split in two so jump scoring can run in between:
///   1. `update`: input, ladder detection, climb transitions, integration
///   2. `settle`: support check against the platforms, then the fall failsafe

use std::collections::HashSet;

use crate::config::{PlayerTuning, ProjectileTuning, ScoringConfig};
use super::entity::{Facing, FrameInput};
use super::geometry::{intersects, Body, Field};
use super::projectile::{Projectile, ProjectileKind};
use super::terrain::{Ladder, Platform, TerrainView};

// Ladder match scores: lower is better, UNREACHABLE and above never match.
const GRAB_SCORE: f64 = 10.0;
const OVERLAP_SCORE: f64 = 20.0;
const UNREACHABLE_SCORE: f64 = 100.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MotionState {
    Grounded,
    Airborne,
    Climbing,
}

/// Hammer and blaster are mutually exclusive.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PowerUp {
    None,
    Hammer,
    Blaster { ammo: u32 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Score {
    pub barrels_destroyed: u32,
    pub barrels_jumped: u32,
    pub bonus: i64,
}

impl Score {
    pub fn total(&self, table: &ScoringConfig) -> i64 {
        self.barrels_destroyed as i64 * table.barrel_smash
            + self.barrels_jumped as i64 * table.barrel_jump
            + self.bonus
    }
}

/// The ladder the player can use this tick and how it relates to them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LadderReach {
    pub index: usize,
    /// Feet near the ladder's foot: can start climbing up.
    pub at_bottom: bool,
    /// Standing near the ladder's head: can start climbing down.
    pub at_top: bool,
    /// Body overlaps the ladder: can keep climbing either way.
    pub overlapping: bool,
}

impl LadderReach {
    fn score(&self, input: &FrameInput) -> f64 {
        if input.up {
            if self.at_bottom { GRAB_SCORE } else if self.overlapping { OVERLAP_SCORE } else { UNREACHABLE_SCORE }
        } else if input.down {
            if self.at_top { GRAB_SCORE } else if self.overlapping { OVERLAP_SCORE } else { UNREACHABLE_SCORE }
        } else if self.overlapping {
            GRAB_SCORE
        } else {
            UNREACHABLE_SCORE
        }
    }
}

/// What changed during `update`, for the coordinator's event stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MotionEffects {
    pub jumped: bool,
    pub grabbed_ladder: bool,
    pub left_ladder: bool,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
    pub vx: f64,
    pub vy: f64,
    pub motion: MotionState,
    pub facing: Facing,
    /// Ticks left after a climb ends during which jumps don't score.
    pub climb_cooldown: u32,
    /// Ticks left in the "jumped recently" window.
    pub jump_recent: u32,
    pub jump_start_x: f64,
    /// Center of the ladder most recently climbed.
    pub last_ladder_x: Option<f64>,
    /// Index of the ladder most recently grabbed.
    pub climb_ladder: Option<usize>,
    /// Bottom edge at the start of the current tick.
    pub prev_bottom: f64,
    pub power: PowerUp,
    pub score: Score,
    /// Barrel ids credited during the current jump.
    pub(crate) credited: HashSet<usize>,
}

impl Player {
    /// A fresh player starts airborne and settles on the first tick.
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        let body = Body::new(x, y, w, h);
        Player {
            body,
            vx: 0.0,
            vy: 0.0,
            motion: MotionState::Airborne,
            facing: Facing::Right,
            climb_cooldown: 0,
            jump_recent: 0,
            jump_start_x: x,
            last_ladder_x: None,
            climb_ladder: None,
            prev_bottom: body.bottom(),
            power: PowerUp::None,
            score: Score::default(),
            credited: HashSet::new(),
        }
    }

    pub fn is_grounded(&self) -> bool { self.motion == MotionState::Grounded }
    pub fn is_climbing(&self) -> bool { self.motion == MotionState::Climbing }

    pub fn credited_this_jump(&self, barrel_id: usize) -> bool {
        self.credited.contains(&barrel_id)
    }

    // ── Tick part 1: input, ladders, integration ──

    pub fn update(
        &mut self,
        input: &FrameInput,
        terrain: TerrainView<'_>,
        field: &Field,
        t: &PlayerTuning,
    ) -> MotionEffects {
        let mut fx = MotionEffects::default();
        let was_climbing = self.is_climbing();
        self.prev_bottom = self.body.bottom();

        self.resolve_input(input, t, &mut fx);

        let reach = find_reachable_ladder(&self.body, self.motion, input, terrain.ladders, t);
        if self.is_climbing() && !reach.map_or(false, |r| r.overlapping) {
            self.lose_ladder(terrain, t);
        }
        if let Some(reach) = reach {
            self.resolve_climb(input, reach, terrain.ladders, t);
        }

        self.climb_cooldown = self.climb_cooldown.saturating_sub(1);
        self.jump_recent = self.jump_recent.saturating_sub(1);
        if self.is_climbing() {
            self.jump_recent = 0;
        }

        if self.motion == MotionState::Airborne {
            self.vy = (self.vy + t.gravity).min(t.max_fall_speed);
        }
        self.body.y += self.vy;

        let half = self.body.w / 2.0;
        self.body.x = (self.body.x + self.vx).max(half).min(field.width - half);

        fx.grabbed_ladder = !was_climbing && self.is_climbing();
        fx.left_ladder = was_climbing && !self.is_climbing();
        fx
    }

    fn resolve_input(&mut self, input: &FrameInput, t: &PlayerTuning, fx: &mut MotionEffects) {
        // right overrides left when both are held
        self.vx = if input.right {
            self.facing = Facing::Right;
            t.move_speed
        } else if input.left {
            self.facing = Facing::Left;
            -t.move_speed
        } else {
            0.0
        };

        if input.jump && self.is_grounded() {
            self.vy = t.jump_velocity;
            self.motion = MotionState::Airborne;
            self.jump_recent = t.jump_recent_ticks;
            self.jump_start_x = self.body.x;
            self.credited.clear();
            fx.jumped = true;
        }
    }

    fn resolve_climb(&mut self, input: &FrameInput, reach: LadderReach, ladders: &[Ladder], t: &PlayerTuning) {
        let ladder = &ladders[reach.index];
        let climbing = self.is_climbing();
        if climbing {
            self.last_ladder_x = Some(ladder.body.x);
        }

        if input.down && self.body.bottom() > ladder.bottom() - 1.0 {
            // reached the foot of the ladder
            if climbing {
                self.leave_climb(t);
                self.vy = 0.0;
            }
            return;
        }

        if input.up && (reach.at_bottom || reach.overlapping) {
            self.grab(reach.index, ladder, -t.climb_speed);
            return;
        }
        if input.down && reach.at_top {
            self.grab(reach.index, ladder, t.climb_speed);
            self.body.y = ladder.top() + 1.0;
            return;
        }
        if input.down && reach.overlapping {
            self.grab(reach.index, ladder, t.climb_speed);
            return;
        }

        if !climbing { return; }
        if input.left || input.right {
            self.leave_climb(t);
            return;
        }
        // hanging on the rungs
        self.vy = 0.0;
        self.body.x = ladder.body.x;
    }

    fn grab(&mut self, index: usize, ladder: &Ladder, vy: f64) {
        self.motion = MotionState::Climbing;
        self.climb_ladder = Some(index);
        self.vy = vy;
        self.vx = 0.0;
        self.body.x = ladder.body.x;
    }

    fn leave_climb(&mut self, t: &PlayerTuning) {
        if self.is_climbing() {
            self.motion = MotionState::Airborne;
            self.climb_cooldown = t.climb_cooldown_ticks;
        }
    }

    /// Climbed past the end of the ladder: drop the climb and land if a
    /// platform is right there. Climbs carry no upward momentum.
    fn lose_ladder(&mut self, terrain: TerrainView<'_>, t: &PlayerTuning) {
        let climbing_up = self.vy < 0.0;
        self.leave_climb(t);
        if climbing_up {
            self.vy = 0.0;
        }
        let landing = climbing_up
            .then(|| self.ladder_head_platform(terrain, t))
            .flatten()
            .or_else(|| self.standing_platform(terrain.platforms, t));
        if let Some(i) = landing {
            self.land_on(&terrain.platforms[i]);
        }
        self.credited.clear();
    }

    /// Platform at the head of the ladder just climbed, if the player's feet
    /// are within `ladder_detect_tolerance` of it: the ladder's anchor, else
    /// the highest overlapping platform level with the ladder's top.
    fn ladder_head_platform(&self, terrain: TerrainView<'_>, t: &PlayerTuning) -> Option<usize> {
        let ladder = terrain.ladders.get(self.climb_ladder?)?;
        let bottom = self.body.bottom();
        let near = |p: &Platform| {
            self.body.overlaps_horizontally(&p.body)
                && (bottom - p.top()).abs() < t.ladder_detect_tolerance
        };

        if let Some(i) = ladder.anchor.filter(|&i| terrain.platforms.get(i).map_or(false, near)) {
            return Some(i);
        }
        terrain.platforms.iter()
            .enumerate()
            .filter(|(_, p)| near(*p) && (p.top() - ladder.top()).abs() < t.ladder_detect_tolerance)
            .min_by(|a, b| a.1.top().total_cmp(&b.1.top()))
            .map(|(i, _)| i)
    }

    // ── Tick part 2: support and failsafe ──

    pub fn settle(&mut self, platforms: &[Platform], field: &Field, t: &PlayerTuning) {
        if !self.is_climbing() {
            match self.standing_platform(platforms, t) {
                Some(i) => self.land_on(&platforms[i]),
                None => self.motion = MotionState::Airborne,
            }
        }
        self.recover_from_fall(platforms, field, t);
    }

    /// Platform the player stands on: overlapping horizontally, not moving
    /// up, and the bottom edge passed within the buffer of its top during
    /// this tick. The highest such top wins.
    fn standing_platform(&self, platforms: &[Platform], t: &PlayerTuning) -> Option<usize> {
        if self.vy < 0.0 { return None; }
        let buffer = self.body.h * t.platform_buffer_ratio;
        let bottom = self.body.bottom();
        let (lo, hi) = (self.prev_bottom.min(bottom), self.prev_bottom.max(bottom));
        platforms.iter()
            .enumerate()
            .filter(|(_, p)| self.body.overlaps_horizontally(&p.body))
            .filter(|(_, p)| lo <= p.top() + buffer && hi >= p.top() - buffer)
            .min_by(|a, b| a.1.top().total_cmp(&b.1.top()))
            .map(|(i, _)| i)
    }

    fn land_on(&mut self, platform: &Platform) {
        self.body.set_bottom(platform.top());
        self.vy = 0.0;
        self.motion = MotionState::Grounded;
        self.credited.clear();
    }

    fn recover_from_fall(&mut self, platforms: &[Platform], field: &Field, t: &PlayerTuning) {
        if self.body.y <= field.height + t.fall_recovery_margin { return; }
        let lowest = platforms.iter().reduce(|a, b| if b.body.y > a.body.y { b } else { a });
        let Some(platform) = lowest else { return };
        log::warn!(
            "player fell out of the field at ({:.1}, {:.1}); recovering onto platform at ({:.1}, {:.1})",
            self.body.x, self.body.y, platform.body.x, platform.body.y,
        );
        self.body.x = platform.body.x;
        self.land_on(platform);
    }

    // ── Power-ups and score ──

    pub fn collect_hammer(&mut self) {
        self.power = PowerUp::Hammer;
    }

    /// A second blaster adds to the ammo already held.
    pub fn collect_blaster(&mut self, ammo: u32) {
        self.power = match self.power {
            PowerUp::Blaster { ammo: held } => PowerUp::Blaster { ammo: held + ammo },
            _ => PowerUp::Blaster { ammo },
        };
    }

    pub fn has_hammer(&self) -> bool { self.power == PowerUp::Hammer }

    pub fn ammo(&self) -> u32 {
        match self.power {
            PowerUp::Blaster { ammo } => ammo,
            _ => 0,
        }
    }

    /// Spend one round. The blaster is gone once its last round is fired.
    pub fn try_shoot(&mut self, tuning: &ProjectileTuning) -> Option<Projectile> {
        let PowerUp::Blaster { ammo } = self.power else { return None };
        if ammo == 0 { return None; }
        self.power = if ammo == 1 { PowerUp::None } else { PowerUp::Blaster { ammo: ammo - 1 } };
        Some(Projectile::new(ProjectileKind::Bullet, self.body.x, self.body.y, self.facing, tuning))
    }

    pub fn credit_smash(&mut self) {
        self.score.barrels_destroyed += 1;
    }

    pub fn add_bonus(&mut self, points: i64) {
        self.score.bonus += points;
    }

    pub fn total_score(&self, table: &ScoringConfig) -> i64 {
        self.score.total(table)
    }
}

/// Best ladder for this tick's input, if any is within reach.
///
/// The player's center must lie inside the ladder's span. Up prefers a
/// ladder whose foot is at the player's feet, down prefers one whose head
/// is under a grounded player, and overlap keeps an existing climb going.
pub fn find_reachable_ladder(
    body: &Body,
    motion: MotionState,
    input: &FrameInput,
    ladders: &[Ladder],
    t: &PlayerTuning,
) -> Option<LadderReach> {
    let bottom = body.bottom();
    let mut best: Option<(f64, LadderReach)> = None;
    for (index, ladder) in ladders.iter().enumerate() {
        if !body.centered_over(&ladder.body) { continue; }
        let reach = LadderReach {
            index,
            at_bottom: (bottom - ladder.bottom()).abs() < t.ladder_detect_tolerance,
            at_top: motion == MotionState::Grounded
                && (bottom - ladder.top()).abs() < t.ladder_detect_tolerance,
            overlapping: intersects(body, &ladder.body, t.ladder_contact_margin, t.ladder_contact_margin),
        };
        let score = reach.score(input);
        if best.as_ref().map_or(true, |(s, _)| score < *s) {
            best = Some((score, reach));
        }
    }
    best.filter(|(s, _)| *s < UNREACHABLE_SCORE).map(|(_, r)| r)
}
