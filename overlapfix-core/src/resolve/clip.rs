use crate::analysis::bbox::Bbox;

/// Side of an actuator trimmed away to clear a valve.
///
/// The declaration order is the generation order and breaks exact area ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipSide {
    /// Keep the part left of the valve.
    CutRight,
    /// Keep the part right of the valve.
    CutLeft,
    /// Keep the part above the valve's `y_min`.
    CutBottom,
    /// Keep the part below the valve's `y_max`.
    CutTop,
}

impl ClipSide {
    pub const ALL: [ClipSide; 4] = [
        ClipSide::CutRight,
        ClipSide::CutLeft,
        ClipSide::CutBottom,
        ClipSide::CutTop,
    ];

    /// The remaining actuator after cutting this side at the valve edge.
    ///
    /// The result may be degenerate when the valve does not leave room on
    /// this side.
    pub fn apply(self, actuator: &Bbox, valve: &Bbox) -> Bbox {
        let (a, v) = (actuator, valve);
        match self {
            ClipSide::CutRight => Bbox::from_corners(a.min.x, a.min.y, v.min.x, a.max.y),
            ClipSide::CutLeft => Bbox::from_corners(v.max.x, a.min.y, a.max.x, a.max.y),
            ClipSide::CutBottom => Bbox::from_corners(a.min.x, a.min.y, a.max.x, v.min.y),
            ClipSide::CutTop => Bbox::from_corners(a.min.x, v.max.y, a.max.x, a.max.y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipCandidate {
    pub side: ClipSide,
    pub bbox: Bbox,
}

/// Non-degenerate clip candidates in generation order.
pub fn clip_candidates(actuator: &Bbox, valve: &Bbox) -> impl Iterator<Item = ClipCandidate> {
    let (actuator, valve) = (*actuator, *valve);
    ClipSide::ALL
        .into_iter()
        .map(move |side| ClipCandidate {
            side,
            bbox: side.apply(&actuator, &valve),
        })
        .filter(|candidate| !candidate.bbox.is_degenerate())
}

/// The largest valid candidate; the first one generated wins an exact tie.
pub fn best_candidate(actuator: &Bbox, valve: &Bbox) -> Option<ClipCandidate> {
    let mut best: Option<(ClipCandidate, f64)> = None;

    for candidate in clip_candidates(actuator, valve) {
        let area = candidate.bbox.area();
        match best {
            Some((_, best_area)) if area <= best_area => {}
            _ => best = Some((candidate, area)),
        }
    }

    best.map(|(candidate, _)| candidate)
}

/// Clips `actuator` so that it no longer overlaps `valve`.
///
/// Returns the actuator unchanged when the intersection is no wider or taller
/// than `epsilon` (touching boxes included), the largest single-side clip
/// otherwise, and `None` when every side is degenerate and the actuator is
/// fully consumed.
pub fn resolve_actuator_against_valve(actuator: &Bbox, valve: &Bbox, epsilon: f64) -> Option<Bbox> {
    if !actuator.overlaps(valve, epsilon) {
        return Some(*actuator);
    }

    best_candidate(actuator, valve).map(|candidate| candidate.bbox)
}
