use serde::{Deserialize, Serialize};

use crate::foundation::core::BoundingBox;

/// Snap distance used when the caller does not pick one.
pub const DEFAULT_SNAP_THRESHOLD: f64 = 5.0;

/// Direction of a snap guide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum SnapOrientation {
    Vertical,
    Horizontal,
}

/// Guide segment to show for a snapped edge or center.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapLine {
    /// Vertical lines mark an x match, horizontal lines a y match.
    #[serde(rename = "type")]
    pub orientation: SnapOrientation,
    /// x of a vertical line, y of a horizontal one.
    pub position: f64,
    /// Start of the segment along the other axis.
    pub min: f64,
    /// End of the segment along the other axis.
    pub max: f64,
}

/// Adjustment that snaps the active box, plus the guides to draw.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapResult {
    /// Horizontal adjustment.
    pub dx: f64,
    /// Vertical adjustment.
    pub dy: f64,
    /// At most one vertical and one horizontal guide.
    pub lines: Vec<SnapLine>,
}

#[derive(Clone, Copy)]
struct Candidate {
    diff: f64,
    delta: f64,
    line: SnapLine,
}

/// Nearest match of `active`'s start/center/end against every target's, under `threshold`.
fn best_on_axis(
    active: &BoundingBox,
    others: &[BoundingBox],
    threshold: f64,
    orientation: SnapOrientation,
) -> Option<Candidate> {
    let anchors = |b: &BoundingBox| match orientation {
        SnapOrientation::Vertical => [b.x, b.center_x(), b.right()],
        SnapOrientation::Horizontal => [b.y, b.center_y(), b.bottom()],
    };
    let extent = |a: &BoundingBox, t: &BoundingBox| match orientation {
        SnapOrientation::Vertical => (a.y.min(t.y), a.bottom().max(t.bottom())),
        SnapOrientation::Horizontal => (a.x.min(t.x), a.right().max(t.right())),
    };

    let mut best: Option<Candidate> = None;
    for target in others {
        for target_val in anchors(target) {
            for active_val in anchors(active) {
                let diff = (active_val - target_val).abs();
                let limit = best.map_or(threshold + 1.0, |b| b.diff);
                if diff < limit {
                    let (min, max) = extent(active, target);
                    best = Some(Candidate {
                        diff,
                        delta: target_val - active_val,
                        line: SnapLine {
                            orientation,
                            position: target_val,
                            min,
                            max,
                        },
                    });
                }
            }
        }
    }
    best
}

/// Snap `active` against `others`, independently on each axis.
///
/// The x and y matches may come from different targets. A match is accepted while the distance
/// stays below `threshold + 1`, so integral distances up to `threshold` snap.
pub fn get_snap_lines(active: &BoundingBox, others: &[BoundingBox], threshold: f64) -> SnapResult {
    let mut result = SnapResult::default();
    if let Some(c) = best_on_axis(active, others, threshold, SnapOrientation::Vertical) {
        result.dx = c.delta;
        result.lines.push(c.line);
    }
    if let Some(c) = best_on_axis(active, others, threshold, SnapOrientation::Horizontal) {
        result.dy = c.delta;
        result.lines.push(c.line);
    }
    result
}

#[cfg(test)]
#[path = "../../tests/unit/layout/snap.rs"]
mod tests;
