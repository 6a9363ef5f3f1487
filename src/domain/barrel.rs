/// Barrels: fall under gravity, stop dead on platforms, and carry the
/// per-tick eligibility flag used by jump scoring.

use crate::config::BarrelTuning;
use super::geometry::Body;
use super::terrain::Platform;

#[derive(Clone, Debug)]
pub struct Barrel {
    /// Stable identity for jump-credit bookkeeping.
    pub id: usize,
    pub body: Body,
    pub vy: f64,
    destroyed: bool,
    scored_this_frame: bool,
}

impl Barrel {
    pub fn new(id: usize, x: f64, y: f64, w: f64, h: f64) -> Self {
        Barrel { id, body: Body::new(x, y, w, h), vy: 0.0, destroyed: false, scored_this_frame: false }
    }

    pub fn update(&mut self, tuning: &BarrelTuning) {
        if self.destroyed { return; }
        self.vy = (self.vy + tuning.gravity).min(tuning.max_fall_speed);
        self.body.y += self.vy;
    }

    /// Land on the first platform whose top lies within one barrel height of
    /// the barrel's bottom. Barrels don't bounce.
    pub fn try_snap_to_platform(&mut self, platforms: &[Platform]) -> bool {
        let landing = platforms.iter().find(|p| {
            self.body.overlaps_horizontally(&p.body)
                && self.body.is_close_to_top_of(&p.body, self.body.h)
        });
        match landing {
            Some(p) => {
                self.body.set_bottom(p.top());
                self.vy = 0.0;
                true
            }
            None => false,
        }
    }

    pub fn destroy(&mut self) { self.destroyed = true; }
    pub fn is_destroyed(&self) -> bool { self.destroyed }

    pub fn reset_frame_flags(&mut self) { self.scored_this_frame = false; }
    pub fn can_be_scored(&self) -> bool { !self.scored_this_frame }
    pub fn mark_scored(&mut self) { self.scored_this_frame = true; }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_with_capped_speed() {
        let tuning = BarrelTuning { gravity: 0.4, max_fall_speed: 5.0 };
        let mut b = Barrel::new(0, 100.0, 0.0, 30.0, 30.0);
        b.update(&tuning);
        assert!((b.vy - 0.4).abs() < 1e-9);
        assert!((b.body.y - 0.4).abs() < 1e-9);
        for _ in 0..30 { b.update(&tuning); }
        assert_eq!(b.vy, 5.0);
    }

    #[test]
    fn destroyed_barrel_is_frozen() {
        let tuning = BarrelTuning::default();
        let mut b = Barrel::new(0, 100.0, 50.0, 30.0, 30.0);
        b.destroy();
        b.update(&tuning);
        assert_eq!(b.body.y, 50.0);
        assert!(b.is_destroyed());
    }

    #[test]
    fn lands_exactly_on_top_with_zero_velocity() {
        let tuning = BarrelTuning::default();
        let platforms = vec![Platform::new(100.0, 758.0, 200.0, 20.0)]; // top 748
        let mut b = Barrel::new(0, 100.0, 690.0, 30.0, 30.0);
        let mut landed = false;
        for _ in 0..100 {
            b.update(&tuning);
            if b.try_snap_to_platform(&platforms) { landed = true; break; }
        }
        assert!(landed);
        assert_eq!(b.body.bottom(), 748.0);
        assert_eq!(b.vy, 0.0);

        // stays put on later ticks
        b.update(&tuning);
        assert!(b.try_snap_to_platform(&platforms));
        assert_eq!(b.body.bottom(), 748.0);
    }

    #[test]
    fn out_of_band_does_not_land() {
        let platforms = vec![Platform::new(100.0, 758.0, 200.0, 20.0)];
        let mut b = Barrel::new(0, 100.0, 600.0, 30.0, 30.0); // bottom 615, 133 above
        assert!(!b.try_snap_to_platform(&platforms));
        assert_eq!(b.body.y, 600.0);
    }

    #[test]
    fn eligibility_flag_cycle() {
        let mut b = Barrel::new(3, 0.0, 0.0, 30.0, 30.0);
        assert!(b.can_be_scored());
        b.mark_scored();
        assert!(!b.can_be_scored());
        b.reset_frame_flags();
        assert!(b.can_be_scored());
    }
}
