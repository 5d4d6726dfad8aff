use serde::{Deserialize, Serialize};

use crate::{
    foundation::{
        core::BoundingBox,
        error::{PosterError, PosterResult},
    },
    layout::bounds::{get_layer_bounds, move_layer},
    model::layer::Layer,
    surface::Surface,
};

/// Edge or center to line layers up on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum AlignType {
    Left,
    Center,
    Right,
    Top,
    Middle,
    Bottom,
}

impl std::str::FromStr for AlignType {
    type Err = PosterError;

    fn from_str(s: &str) -> PosterResult<Self> {
        match s {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            "top" => Ok(Self::Top),
            "middle" => Ok(Self::Middle),
            "bottom" => Ok(Self::Bottom),
            other => Err(PosterError::validation(format!(
                "unknown align type \"{other}\""
            ))),
        }
    }
}

/// Axis along which layers are spread evenly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum DistributeAxis {
    Horizontal,
    Vertical,
}

impl std::str::FromStr for DistributeAxis {
    type Err = PosterError;

    fn from_str(s: &str) -> PosterResult<Self> {
        match s {
            "horizontal" => Ok(Self::Horizontal),
            "vertical" => Ok(Self::Vertical),
            other => Err(PosterError::validation(format!(
                "unknown distribute axis \"{other}\""
            ))),
        }
    }
}

/// Offset that moves `b` onto the reference box `to` for `kind`.
fn align_delta(kind: AlignType, b: &BoundingBox, to: &BoundingBox) -> (f64, f64) {
    match kind {
        AlignType::Left => (to.x - b.x, 0.0),
        AlignType::Center => (to.center_x() - b.center_x(), 0.0),
        AlignType::Right => (to.right() - b.right(), 0.0),
        AlignType::Top => (0.0, to.y - b.y),
        AlignType::Middle => (0.0, to.center_y() - b.center_y()),
        AlignType::Bottom => (0.0, to.bottom() - b.bottom()),
    }
}

/// Align `targets`.
///
/// A single target aligns against the logical canvas `(0, 0, width, height)`; several targets
/// align against the union of their bounds.
pub fn align(
    surface: &mut dyn Surface,
    targets: &mut [&mut Layer],
    kind: AlignType,
    canvas_width: f64,
    canvas_height: f64,
) {
    let boxes: Vec<BoundingBox> = targets
        .iter()
        .map(|l| get_layer_bounds(surface, l))
        .collect();
    let reference = match boxes.as_slice() {
        [] => return,
        [_] => BoundingBox::new(0.0, 0.0, canvas_width, canvas_height),
        many => match BoundingBox::union_all(many) {
            Some(u) => u,
            None => return,
        },
    };
    for (layer, b) in targets.iter_mut().zip(&boxes) {
        let (dx, dy) = align_delta(kind, b, &reference);
        move_layer(layer, dx, dy);
    }
}

/// Spread `targets` so their centers are evenly spaced along `axis`.
///
/// Needs at least three targets; the outermost two stay where they are.
pub fn distribute(surface: &mut dyn Surface, targets: &mut [&mut Layer], axis: DistributeAxis) {
    if targets.len() < 3 {
        return;
    }
    let center = |b: &BoundingBox| match axis {
        DistributeAxis::Horizontal => b.center_x(),
        DistributeAxis::Vertical => b.center_y(),
    };
    let mut centers: Vec<(usize, f64)> = targets
        .iter()
        .enumerate()
        .map(|(i, l)| (i, center(&get_layer_bounds(surface, l))))
        .collect();
    centers.sort_by(|a, b| a.1.total_cmp(&b.1));

    let (Some(&(_, first)), Some(&(_, last))) = (centers.first(), centers.last()) else {
        return;
    };
    let step = (last - first) / (centers.len() - 1) as f64;
    for (rank, &(i, c)) in centers.iter().enumerate().take(centers.len() - 1).skip(1) {
        let delta = first + step * rank as f64 - c;
        match axis {
            DistributeAxis::Horizontal => move_layer(targets[i], delta, 0.0),
            DistributeAxis::Vertical => move_layer(targets[i], 0.0, delta),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/align.rs"]
mod tests;
