/// Jump-over-barrel scoring.
///
/// A barrel earns a jump credit when the player comes down across its top
/// edge during a real jump: not from a ladder, not while standing, not by
/// bobbing in place. At most one barrel is credited per tick, nearest
/// first, and each barrel at most once per jump.

use crate::config::JumpScoreTuning;
use super::barrel::Barrel;
use super::geometry::Body;
use super::player::{MotionState, Player};
use super::terrain::Ladder;

/// The player's bottom edge at the start and end of this tick.
#[derive(Clone, Copy, Debug)]
struct Descent {
    from: f64,
    to: f64,
}

impl Descent {
    /// Did this tick's vertical motion carry the player down over `barrel`?
    fn clears(&self, barrel: &Body, grounded: bool, t: &JumpScoreTuning) -> bool {
        let top = barrel.top();
        let was_above = self.from < top + t.top_grace;
        let moving_down = self.to >= self.from - t.descent_slack;
        let near_top = (self.to - top).abs() <= t.crossing_band;
        let significant = (self.to - self.from).abs() >= t.min_vertical_motion;
        let same_platform = (self.to - barrel.bottom()).abs() < t.same_platform_band;
        was_above && moving_down && near_top && significant && (!grounded || !same_platform)
    }
}

impl Player {
    /// Credit at most one barrel for this tick. Returns its id.
    ///
    /// Must run after `update` and before `settle`, once the coordinator has
    /// reset every barrel's per-tick eligibility flag.
    pub fn award_jump_points(
        &mut self,
        barrels: &mut [Barrel],
        ladders: &[Ladder],
        t: &JumpScoreTuning,
    ) -> Option<usize> {
        if barrels.is_empty() || self.jump_scoring_suppressed(ladders, t) {
            return None;
        }
        if (self.body.x - self.jump_start_x).abs() <= t.min_horizontal_travel {
            return None;
        }

        let descent = Descent { from: self.prev_bottom, to: self.body.bottom() };
        let grounded = self.is_grounded();
        let px = self.body.x;

        let mut order: Vec<usize> = (0..barrels.len()).collect();
        order.sort_by(|&a, &b| {
            (barrels[a].body.x - px).abs().total_cmp(&(barrels[b].body.x - px).abs())
        });

        for i in order {
            let barrel = &barrels[i];
            if barrel.is_destroyed() || self.credited.contains(&barrel.id) || !barrel.can_be_scored() {
                continue;
            }
            if (self.body.y - barrel.body.y).abs() > t.layer_band { continue; }
            if (px - barrel.body.x).abs() > t.horizontal_band { continue; }
            if self.last_ladder_x.map_or(false, |lx| (lx - barrel.body.x).abs() < t.ladder_exclusion) {
                continue;
            }
            if !descent.clears(&barrel.body, grounded, t) { continue; }

            let id = barrel.id;
            barrels[i].mark_scored();
            self.credited.insert(id);
            self.score.barrels_jumped += 1;
            log::debug!("barrel {id} jumped at x={px:.1} (total jumped {})", self.score.barrels_jumped);
            return Some(id);
        }
        None
    }

    fn jump_scoring_suppressed(&self, ladders: &[Ladder], t: &JumpScoreTuning) -> bool {
        if self.climb_cooldown > 0 || self.motion == MotionState::Climbing {
            return true;
        }
        let still = self.vy.abs() < t.still_speed;
        let jumped_recently = self.jump_recent > 0;
        if still && self.is_grounded() {
            return true;
        }
        if still && !jumped_recently && self.near_any_ladder(ladders, t) {
            return true;
        }
        // airborne without having jumped: walked off a ledge
        !(jumped_recently || self.vy > 0.0) && !self.is_grounded()
    }

    fn near_any_ladder(&self, ladders: &[Ladder], t: &JumpScoreTuning) -> bool {
        let bottom = self.body.bottom();
        ladders.iter().any(|l| {
            (self.body.x - l.body.x).abs() < t.ladder_exclusion
                && bottom >= l.top() - t.ladder_vertical_slack
                && bottom <= l.bottom() + t.ladder_vertical_slack
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlayerTuning, ScoringConfig};
    use crate::domain::entity::FrameInput;
    use crate::domain::geometry::Field;
    use crate::domain::terrain::{Platform, TerrainView};

    fn floor() -> Vec<Platform> {
        (0..11).map(|i| Platform::new(50.0 + 100.0 * i as f64, 758.0, 100.0, 20.0)).collect()
    }

    /// One coordinator-shaped tick: reset flags, move, score, settle.
    fn tick(
        p: &mut Player,
        input: FrameInput,
        barrels: &mut [Barrel],
        platforms: &[Platform],
        ladders: &[Ladder],
    ) -> Option<usize> {
        let pt = PlayerTuning::default();
        let field = Field::default();
        for b in barrels.iter_mut() { b.reset_frame_flags(); }
        p.update(&input, TerrainView { platforms, ladders }, &field, &pt);
        let credited = p.award_jump_points(barrels, ladders, &JumpScoreTuning::default());
        p.settle(platforms, &field, &pt);
        credited
    }

    fn standing_player(x: f64, platforms: &[Platform]) -> Player {
        let mut p = Player::new(x, 728.0, 30.0, 40.0);
        tick(&mut p, FrameInput::default(), &mut [], platforms, &[]);
        assert!(p.is_grounded());
        p
    }

    fn jump_right() -> FrameInput {
        FrameInput { right: true, jump: true, ..FrameInput::default() }
    }

    fn hold_right() -> FrameInput {
        FrameInput { right: true, ..FrameInput::default() }
    }

    #[test]
    fn running_jump_credits_barrel_exactly_once() {
        let platforms = floor();
        let mut barrels = vec![Barrel::new(0, 522.5, 733.0, 30.0, 30.0)];
        let mut p = standing_player(400.0, &platforms);

        let mut credits = vec![];
        for n in 1..=60 {
            let input = if n == 1 { jump_right() } else { hold_right() };
            if let Some(id) = tick(&mut p, input, &mut barrels, &platforms, &[]) {
                credits.push((n, id));
            }
            if n == 35 {
                assert!(p.credited_this_jump(0));
            }
        }

        // the bottom edge enters the crossing band on the 35th tick of the jump
        assert_eq!(credits, vec![(35, 0)]);
        assert_eq!(p.score.barrels_jumped, 1);
        assert_eq!(p.total_score(&ScoringConfig::default()), 30);
        // landed: the per-jump set is cleared again
        assert!(p.is_grounded());
        assert!(!p.credited_this_jump(0));
    }

    #[test]
    fn one_barrel_per_tick_nearest_first() {
        let platforms = floor();
        let mut barrels = vec![
            Barrel::new(0, 530.0, 733.0, 30.0, 30.0),
            Barrel::new(1, 522.5, 733.0, 30.0, 30.0),
        ];
        let mut p = standing_player(400.0, &platforms);

        let mut credits = vec![];
        for n in 1..=60 {
            let input = if n == 1 { jump_right() } else { hold_right() };
            if let Some(id) = tick(&mut p, input, &mut barrels, &platforms, &[]) {
                credits.push((n, id));
            }
        }
        assert_eq!(credits, vec![(35, 1), (36, 0)]);
        assert_eq!(p.score.barrels_jumped, 2);
    }

    #[test]
    fn vertical_hop_in_place_scores_nothing() {
        let platforms = floor();
        let mut barrels = vec![Barrel::new(0, 400.0, 733.0, 30.0, 30.0)];
        let mut p = standing_player(400.0, &platforms);
        for n in 1..=60 {
            let input = if n == 1 { FrameInput { jump: true, ..FrameInput::default() } } else { FrameInput::default() };
            assert_eq!(tick(&mut p, input, &mut barrels, &platforms, &[]), None);
        }
        assert_eq!(p.score.barrels_jumped, 0);
    }

    #[test]
    fn destroyed_barrel_is_not_credited() {
        let platforms = floor();
        let mut barrels = vec![Barrel::new(0, 522.5, 733.0, 30.0, 30.0)];
        barrels[0].destroy();
        let mut p = standing_player(400.0, &platforms);
        for n in 1..=60 {
            let input = if n == 1 { jump_right() } else { hold_right() };
            assert_eq!(tick(&mut p, input, &mut barrels, &platforms, &[]), None);
        }
    }

    #[test]
    fn barrel_beside_last_used_ladder_is_excluded() {
        let platforms = floor();
        let mut barrels = vec![Barrel::new(0, 522.5, 733.0, 30.0, 30.0)];
        let mut p = standing_player(400.0, &platforms);
        p.last_ladder_x = Some(530.0);
        for n in 1..=60 {
            let input = if n == 1 { jump_right() } else { hold_right() };
            assert_eq!(tick(&mut p, input, &mut barrels, &platforms, &[]), None);
        }
    }

    #[test]
    fn consumed_eligibility_flag_blocks_credit() {
        let platforms = floor();
        let mut barrels = vec![Barrel::new(0, 522.5, 733.0, 30.0, 30.0)];
        let mut p = standing_player(400.0, &platforms);
        let pt = PlayerTuning::default();
        let field = Field::default();
        for n in 1..=34 {
            let input = if n == 1 { jump_right() } else { hold_right() };
            tick(&mut p, input, &mut barrels, &platforms, &[]);
        }
        // tick 35 by hand, with the flag already consumed this frame
        barrels[0].mark_scored();
        p.update(&hold_right(), TerrainView { platforms: &platforms, ladders: &[] }, &field, &pt);
        assert_eq!(p.award_jump_points(&mut barrels, &[], &JumpScoreTuning::default()), None);
    }

    #[test]
    fn suppressed_during_climb_cooldown() {
        let platforms = floor();
        let mut barrels = vec![Barrel::new(0, 522.5, 733.0, 30.0, 30.0)];
        let mut p = standing_player(400.0, &platforms);
        for n in 1..=34 {
            let input = if n == 1 { jump_right() } else { hold_right() };
            tick(&mut p, input, &mut barrels, &platforms, &[]);
        }
        p.climb_cooldown = 5;
        assert_eq!(tick(&mut p, hold_right(), &mut barrels, &platforms, &[]), None);
    }
}
