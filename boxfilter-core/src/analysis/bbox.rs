use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::BoxFilterError;

/// How the border pixels of a box count towards its measured width and height.
///
/// Pixel boxes are given by their corner coordinates, so the raw difference
/// `xmax - xmin` can be read in three ways:
/// - `Include`: both border rows/columns belong to the box, every extent gains one pixel.
/// - `Exclude`: neither border belongs to the box, every extent loses one pixel.
/// - `Half`: one of each pair of borders belongs to the box, the raw difference is used as is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderPixels {
    Include,
    Exclude,
    #[default]
    Half,
}

impl BorderPixels {
    /// The adjustment added to every raw `max - min` difference.
    ///
    /// # Example
    /// ```
    /// use boxfilter_core::analysis::bbox::BorderPixels;
    /// assert_eq!(BorderPixels::Include.offset(), 1.0);
    /// assert_eq!(BorderPixels::Exclude.offset(), -1.0);
    /// assert_eq!(BorderPixels::Half.offset(), 0.0);
    /// ```
    pub fn offset(self) -> f32 {
        match self {
            BorderPixels::Include => 1.0,
            BorderPixels::Exclude => -1.0,
            BorderPixels::Half => 0.0,
        }
    }
}

impl FromStr for BorderPixels {
    type Err = BoxFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "include" => Ok(BorderPixels::Include),
            "exclude" => Ok(BorderPixels::Exclude),
            "half" => Ok(BorderPixels::Half),
            other => Err(BoxFilterError::InvalidConfig {
                message: format!(
                    "border pixels must be one of 'include', 'exclude' or 'half', got '{other}'"
                ),
            }),
        }
    }
}

/// A 2D axis-aligned bounding box in pixel coordinates.
///
/// The origin is the top-left corner of the image with `y` growing downward,
/// so `min` is the top-left and `max` the bottom-right corner of the box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bbox {
    /// The top-left corner (`xmin`, `ymin`).
    pub min: Vec2,
    /// The bottom-right corner (`xmax`, `ymax`).
    pub max: Vec2,
}

impl Bbox {
    /// Creates a new bounding box from its two corners.
    ///
    /// No ordering is enforced: a box with `max < min` on either axis is
    /// degenerate but still representable, see [`Bbox::is_degenerate`].
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use boxfilter_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 5.0));
    /// ```
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Creates a bounding box from corner coordinates in `xmin, ymin, xmax, ymax` order.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use boxfilter_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::from_corners(10.0, 20.0, 50.0, 80.0);
    /// assert_eq!(bbox.min, Vec2::new(10.0, 20.0));
    /// assert_eq!(bbox.max, Vec2::new(50.0, 80.0));
    /// ```
    pub fn from_corners(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
        Self::new(Vec2::new(xmin, ymin), Vec2::new(xmax, ymax))
    }

    /// Width and height of the box after applying the border convention.
    ///
    /// The values are not floored at zero, so a degenerate box may report a
    /// negative extent.
    pub fn extent_with(&self, border: BorderPixels) -> Vec2 {
        self.max - self.min + Vec2::splat(border.offset())
    }

    /// Area of the box with no border adjustment, i.e. `(xmax - xmin) * (ymax - ymin)`.
    ///
    /// # Example
    /// ```
    /// use boxfilter_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::from_corners(10.0, 10.0, 50.0, 50.0);
    /// assert_eq!(bbox.area(), 1600.0);
    /// ```
    pub fn area(&self) -> f32 {
        self.area_with(BorderPixels::Half)
    }

    /// Area of the box under the given border convention.
    ///
    /// Computes `(xmax - xmin + d) * (ymax - ymin + d)` with `d` taken from
    /// [`BorderPixels::offset`]. Degenerate boxes are not special-cased here;
    /// callers that care reject them with [`Bbox::is_degenerate`] first.
    ///
    /// # Example
    /// ```
    /// use boxfilter_core::analysis::bbox::{Bbox, BorderPixels};
    /// let bbox = Bbox::from_corners(0.0, 0.0, 4.0, 3.0);
    /// assert_eq!(bbox.area_with(BorderPixels::Include), 20.0);
    /// assert_eq!(bbox.area_with(BorderPixels::Exclude), 6.0);
    /// ```
    pub fn area_with(&self, border: BorderPixels) -> f32 {
        let extent = self.extent_with(border);

        extent.x * extent.y
    }

    /// Calculates the center point of the bounding box.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use boxfilter_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::from_corners(0.0, 0.0, 4.0, 2.0);
    /// assert_eq!(bbox.center(), Vec2::new(2.0, 1.0));
    /// ```
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Returns `true` unless the box has a positive width and a positive height.
    ///
    /// A box with a NaN corner is degenerate.
    pub fn is_degenerate(&self) -> bool {
        !(self.max.x > self.min.x && self.max.y > self.min.y)
    }

    /// Calculates the overlap area between this box and another, without border adjustment.
    ///
    /// # Example
    /// ```
    /// use boxfilter_core::analysis::bbox::Bbox;
    /// let bbox1 = Bbox::from_corners(0.0, 0.0, 4.0, 4.0);
    /// let bbox2 = Bbox::from_corners(2.0, 2.0, 6.0, 6.0);
    /// assert_eq!(bbox1.intersection(&bbox2), 4.0); // 2x2 intersection area
    /// ```
    pub fn intersection(&self, other: &Self) -> f32 {
        self.intersection_with(other, BorderPixels::Half)
    }

    /// Calculates the overlap area between this box and another under a border convention.
    ///
    /// # Algorithm
    /// 1. Clip the two boxes against each other:
    ///    - maximum of the minimum corners is the overlap's top-left
    ///    - minimum of the maximum corners is the overlap's bottom-right
    /// 2. Apply the border offset to the overlap's width and height
    /// 3. Floor each extent at zero, so disjoint boxes give `0.0` and never a negative area
    ///
    /// # Example
    /// ```
    /// use boxfilter_core::analysis::bbox::{Bbox, BorderPixels};
    /// let bbox1 = Bbox::from_corners(0.0, 0.0, 4.0, 4.0);
    /// let bbox2 = Bbox::from_corners(2.0, 2.0, 6.0, 6.0);
    /// assert_eq!(bbox1.intersection_with(&bbox2, BorderPixels::Include), 9.0);
    /// assert_eq!(bbox1.intersection_with(&bbox2, BorderPixels::Exclude), 1.0);
    /// ```
    pub fn intersection_with(&self, other: &Self, border: BorderPixels) -> f32 {
        let overlap = Self::new(self.min.max(other.min), self.max.min(other.max));
        let extent = overlap.extent_with(border).max(Vec2::ZERO);

        extent.x * extent.y
    }

    /// Calculates the Intersection over Union (IoU) without border adjustment.
    ///
    /// # Example
    /// ```
    /// use boxfilter_core::analysis::bbox::Bbox;
    /// let bbox1 = Bbox::from_corners(0.0, 0.0, 2.0, 2.0);
    /// let bbox2 = Bbox::from_corners(0.0, 0.0, 2.0, 2.0);
    /// assert_eq!(bbox1.iou(&bbox2), 1.0); // Identical boxes
    /// ```
    pub fn iou(&self, other: &Self) -> f32 {
        self.iou_with(other, BorderPixels::Half)
    }

    /// Calculates the Intersection over Union (IoU) under a border convention.
    ///
    /// # Formula
    /// IoU = Intersection Area / Union Area
    /// Union Area = Area1 + Area2 - Intersection Area
    ///
    /// # Returns
    /// A value in `[0.0, 1.0]`. When the union is not strictly positive (two
    /// zero-area boxes, for instance) the result is `0.0` instead of a division fault.
    ///
    /// # Example
    /// ```
    /// use boxfilter_core::analysis::bbox::{Bbox, BorderPixels};
    /// let image = Bbox::from_corners(0.0, 0.0, 10.0, 10.0);
    /// let half = Bbox::from_corners(0.0, 0.0, 10.0, 5.0);
    /// assert_eq!(image.iou_with(&half, BorderPixels::Half), 0.5);
    /// let point = Bbox::from_corners(3.0, 3.0, 3.0, 3.0);
    /// assert_eq!(point.iou_with(&point, BorderPixels::Half), 0.0);
    /// ```
    pub fn iou_with(&self, other: &Self, border: BorderPixels) -> f32 {
        let intersection_area = self.intersection_with(other, border);
        let union_area =
            self.area_with(border) + other.area_with(border) - intersection_area;

        if union_area > 0.0 {
            (intersection_area / union_area).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
