/// Static level geometry: platforms, ladders, and the two algorithms that
/// relate other bodies to them (platform snap, ladder linking).
///
/// Platforms and ladders are immutable once the level is loaded; every
/// dynamic entity reads them through a shared slice.

use crate::config::LadderLinkTuning;
use super::geometry::Body;

/// How close to a platform top counts as already resting on it.
pub const REST_TOLERANCE: f64 = 5.0;

#[derive(Clone, Debug)]
pub struct Platform {
    pub body: Body,
}

impl Platform {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Platform { body: Body::new(x, y, w, h) }
    }

    pub fn top(&self) -> f64 { self.body.top() }
}

#[derive(Clone, Debug)]
pub struct Ladder {
    pub body: Body,
    /// Index of the platform this ladder's top was bound to at load.
    pub anchor: Option<usize>,
}

impl Ladder {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Ladder { body: Body::new(x, y, w, h), anchor: None }
    }

    pub fn top(&self) -> f64 { self.body.top() }
    pub fn bottom(&self) -> f64 { self.body.bottom() }

    /// Bind this ladder's top edge to the most useful platform above its center.
    ///
    /// Candidates: platforms whose span contains the ladder's center and whose
    /// top is strictly above it, at most `search_radius` away. When the
    /// second-nearest lies within `gap_factor` ladder heights of the nearest,
    /// it wins: the nearer one is a thin ledge in the way.
    pub fn link_to_platform_above(&mut self, platforms: &[Platform], tuning: &LadderLinkTuning) -> Option<usize> {
        let anchor_y = self.body.y;
        let mut above: Vec<(usize, f64)> = platforms.iter()
            .enumerate()
            .filter(|(_, p)| (p.body.x - self.body.x).abs() < p.body.w / 2.0)
            .filter(|(_, p)| p.top() < anchor_y)
            .map(|(i, p)| (i, anchor_y - p.top()))
            .filter(|&(_, dist)| dist <= tuning.search_radius)
            .collect();
        // stable: equal distances keep list order
        above.sort_by(|a, b| a.1.total_cmp(&b.1));

        let &(nearest, _) = above.first()?;
        let chosen = match above.get(1) {
            Some(&(second, _))
                if (platforms[second].top() - platforms[nearest].top()).abs()
                    <= tuning.gap_factor * self.body.h => second,
            _ => nearest,
        };

        self.body.set_top(platforms[chosen].top());
        self.anchor = Some(chosen);
        Some(chosen)
    }
}

/// Read-only view of the level geometry handed to entity updates.
#[derive(Clone, Copy)]
pub struct TerrainView<'a> {
    pub platforms: &'a [Platform],
    pub ladders: &'a [Ladder],
}

/// Outcome of [`snap_to_platform_below`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Support {
    /// Bottom moved onto this platform's top.
    Snapped(usize),
    /// Nothing below, but already resting within tolerance.
    Resting,
    /// No platform supports the body; the caller's no-support reaction applies.
    Unsupported,
}

/// Drop `body` onto the nearest platform underneath it.
///
/// Among horizontally overlapping platforms whose top is at or below the
/// body's bottom, the smallest top wins (first in list order on ties).
pub fn snap_to_platform_below(body: &mut Body, platforms: &[Platform]) -> Support {
    let bottom = body.bottom();
    let mut best: Option<(usize, f64)> = None;
    for (i, p) in platforms.iter().enumerate() {
        if !body.overlaps_horizontally(&p.body) { continue; }
        let top = p.top();
        if top < bottom { continue; }
        if best.map_or(true, |(_, t)| top < t) {
            best = Some((i, top));
        }
    }

    if let Some((i, top)) = best {
        body.set_bottom(top);
        return Support::Snapped(i);
    }
    if is_resting(body, platforms) { Support::Resting } else { Support::Unsupported }
}

/// Is `body` resting (within [`REST_TOLERANCE`]) on any overlapping platform?
pub fn is_resting(body: &Body, platforms: &[Platform]) -> bool {
    platforms.iter().any(|p| {
        body.overlaps_horizontally(&p.body) && body.is_close_to_top_of(&p.body, REST_TOLERANCE)
    })
}

/// Link every ladder once at level load.
pub fn link_ladders(ladders: &mut [Ladder], platforms: &[Platform], tuning: &LadderLinkTuning) {
    for (i, ladder) in ladders.iter_mut().enumerate() {
        match ladder.link_to_platform_above(platforms, tuning) {
            Some(p) => log::debug!("ladder {i} anchored to platform {p} (top {:.1})", ladder.top()),
            None => log::debug!("ladder {i} left unanchored at y={:.1}", ladder.body.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link_tuning() -> LadderLinkTuning {
        LadderLinkTuning { search_radius: 100.0, gap_factor: 1.5 }
    }

    // ── snap_to_platform_below ──

    #[test]
    fn snaps_onto_nearest_platform_below() {
        let platforms = vec![
            Platform::new(100.0, 510.0, 200.0, 20.0), // top 500
            Platform::new(100.0, 410.0, 200.0, 20.0), // top 400
        ];
        let mut body = Body::new(100.0, 350.0, 30.0, 30.0); // bottom 365
        assert_eq!(snap_to_platform_below(&mut body, &platforms), Support::Snapped(1));
        assert_eq!(body.bottom(), 400.0);
    }

    #[test]
    fn platform_exactly_at_bottom_counts() {
        let platforms = vec![Platform::new(100.0, 410.0, 200.0, 20.0)];
        let mut body = Body::new(100.0, 385.0, 30.0, 30.0); // bottom 400
        assert_eq!(snap_to_platform_below(&mut body, &platforms), Support::Snapped(0));
        assert_eq!(body.bottom(), 400.0);
    }

    #[test]
    fn ignores_platforms_not_overlapping() {
        let platforms = vec![Platform::new(500.0, 410.0, 100.0, 20.0)];
        let mut body = Body::new(100.0, 350.0, 30.0, 30.0);
        assert_eq!(snap_to_platform_below(&mut body, &platforms), Support::Unsupported);
        assert_eq!(body.y, 350.0);
    }

    #[test]
    fn slightly_sunk_body_is_resting() {
        let platforms = vec![Platform::new(100.0, 410.0, 200.0, 20.0)];
        // bottom 403: below the top, so no candidate, but within tolerance
        let mut body = Body::new(100.0, 388.0, 30.0, 30.0);
        assert_eq!(snap_to_platform_below(&mut body, &platforms), Support::Resting);
        assert_eq!(body.y, 388.0);
    }

    #[test]
    fn equal_tops_first_platform_wins() {
        let platforms = vec![
            Platform::new(90.0, 410.0, 100.0, 20.0),
            Platform::new(110.0, 410.0, 100.0, 20.0),
        ];
        let mut body = Body::new(100.0, 300.0, 30.0, 30.0);
        assert_eq!(snap_to_platform_below(&mut body, &platforms), Support::Snapped(0));
    }

    // ── ladder linking ──

    #[test]
    fn ladder_prefers_nearer_when_gap_too_large() {
        let platforms = vec![
            Platform::new(100.0, 290.0, 200.0, 20.0), // top 280
            Platform::new(100.0, 210.0, 200.0, 20.0), // top 200
        ];
        let mut ladder = Ladder::new(100.0, 300.0, 30.0, 40.0);
        assert_eq!(ladder.link_to_platform_above(&platforms, &link_tuning()), Some(0));
        assert_eq!(ladder.top(), 280.0);
        assert_eq!(ladder.body.y, 300.0);
    }

    #[test]
    fn ladder_gap_exactly_at_threshold_prefers_farther() {
        let platforms = vec![
            Platform::new(100.0, 290.0, 200.0, 20.0), // top 280
            Platform::new(100.0, 230.0, 200.0, 20.0), // top 220, gap 60 = 1.5 * 40
        ];
        let mut ladder = Ladder::new(100.0, 300.0, 30.0, 40.0);
        assert_eq!(ladder.link_to_platform_above(&platforms, &link_tuning()), Some(1));
        assert_eq!(ladder.top(), 220.0);
        assert_eq!(ladder.body.y, 240.0);
        assert_eq!(ladder.anchor, Some(1));
    }

    #[test]
    fn ladder_without_candidates_stays_put() {
        let platforms = vec![
            Platform::new(400.0, 290.0, 100.0, 20.0), // not aligned
            Platform::new(100.0, 350.0, 200.0, 20.0), // below the center
            Platform::new(100.0, 150.0, 200.0, 20.0), // beyond the search radius
        ];
        let mut ladder = Ladder::new(100.0, 300.0, 30.0, 40.0);
        assert_eq!(ladder.link_to_platform_above(&platforms, &link_tuning()), None);
        assert_eq!(ladder.body.y, 300.0);
        assert_eq!(ladder.anchor, None);
    }

    #[test]
    fn link_ladders_binds_each_ladder() {
        let platforms = vec![
            Platform::new(100.0, 758.0, 300.0, 20.0), // top 748
            Platform::new(100.0, 658.0, 300.0, 20.0), // top 648
        ];
        let mut ladders = vec![Ladder::new(120.0, 700.0, 30.0, 100.0)];
        link_ladders(&mut ladders, &platforms, &link_tuning());
        assert_eq!(ladders[0].top(), 648.0);
        assert_eq!(ladders[0].bottom(), 748.0);
    }
}
