//! Batched Intersection over Union between sets of boxes.

use ndarray::{Array1, Array2, ArrayD};
use serde::{Deserialize, Serialize};
use snafu::ensure;

use crate::{
    analysis::bbox::{Bbox, BorderPixels},
    error::{Result, ShapeMismatchSnafu},
};

/// How two sets of boxes are paired up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IouMode {
    /// `i`-th box against `i`-th box; a set of length one is broadcast against the other.
    #[default]
    ElementWise,
    /// Every box of the first set against every box of the second set.
    Pairwise,
}

/// IoU of every box in `boxes1` against every box in `boxes2`.
///
/// Returns an `m x n` matrix where `result[[i, j]]` is the IoU of
/// `boxes1[i]` and `boxes2[j]`.
///
/// # Example
/// ```
/// use boxfilter_core::analysis::bbox::{Bbox, BorderPixels};
/// use boxfilter_core::analysis::iou::iou_pairwise;
///
/// let image = [Bbox::from_corners(0.0, 0.0, 10.0, 10.0)];
/// let boxes = [
///     Bbox::from_corners(0.0, 0.0, 10.0, 5.0),
///     Bbox::from_corners(20.0, 20.0, 30.0, 30.0),
/// ];
/// let matrix = iou_pairwise(&image, &boxes, BorderPixels::Half);
/// assert_eq!(matrix.shape(), &[1, 2]);
/// assert_eq!(matrix[[0, 0]], 0.5);
/// assert_eq!(matrix[[0, 1]], 0.0);
/// ```
pub fn iou_pairwise(boxes1: &[Bbox], boxes2: &[Bbox], border: BorderPixels) -> Array2<f32> {
    Array2::from_shape_fn((boxes1.len(), boxes2.len()), |(i, j)| {
        boxes1[i].iou_with(&boxes2[j], border)
    })
}

/// IoU of `boxes1[i]` against `boxes2[i]` for every `i`.
///
/// Either side may hold a single box, which is then broadcast against every
/// box of the other side. Any other length mismatch is an error.
///
/// # Example
/// ```
/// use boxfilter_core::analysis::bbox::{Bbox, BorderPixels};
/// use boxfilter_core::analysis::iou::iou_elementwise;
///
/// let image = [Bbox::from_corners(0.0, 0.0, 10.0, 10.0)];
/// let boxes = [
///     Bbox::from_corners(0.0, 0.0, 10.0, 10.0),
///     Bbox::from_corners(0.0, 0.0, 10.0, 5.0),
/// ];
/// let ious = iou_elementwise(&image, &boxes, BorderPixels::Half).unwrap();
/// assert_eq!(ious.to_vec(), vec![1.0, 0.5]);
/// ```
pub fn iou_elementwise(
    boxes1: &[Bbox],
    boxes2: &[Bbox],
    border: BorderPixels,
) -> Result<Array1<f32>> {
    let (left, right) = (boxes1.len(), boxes2.len());
    ensure!(
        left == right || left == 1 || right == 1,
        ShapeMismatchSnafu { left, right }
    );

    let len = if left == 0 || right == 0 { 0 } else { left.max(right) };
    // broadcast a singleton side by pinning its index to zero
    let pick = |boxes: &[Bbox], i: usize| if boxes.len() == 1 { boxes[0] } else { boxes[i] };

    Ok(Array1::from_shape_fn(len, |i| {
        pick(boxes1, i).iou_with(&pick(boxes2, i), border)
    }))
}

/// IoU between two sets of boxes in the requested [`IouMode`].
///
/// The result is one-dimensional for [`IouMode::ElementWise`] and an
/// `m x n` matrix for [`IouMode::Pairwise`].
pub fn iou(
    boxes1: &[Bbox],
    boxes2: &[Bbox],
    mode: IouMode,
    border: BorderPixels,
) -> Result<ArrayD<f32>> {
    match mode {
        IouMode::ElementWise => Ok(iou_elementwise(boxes1, boxes2, border)?.into_dyn()),
        IouMode::Pairwise => Ok(iou_pairwise(boxes1, boxes2, border).into_dyn()),
    }
}
