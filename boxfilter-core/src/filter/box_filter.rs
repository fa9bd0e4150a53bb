use glam::Vec2;
use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt, ensure};
use tracing::*;

use crate::{
    analysis::{bbox::Bbox, iou::iou_elementwise},
    error::{ConfigBuildSnafu, InvalidRegionSnafu, MissingRegionSnafu, Result},
    filter::config::{
        BoxFilterConfig, BoxFilterConfigBuilder, BoxFilterSettings, OverlapCriterion,
    },
};

/// The frame boxes are judged against: an image or an augmentation patch,
/// anchored at the origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub height: f32,
    pub width: f32,
}

impl Region {
    pub fn new(height: f32, width: f32) -> Self {
        Self { height, width }
    }

    /// A region only exists when both dimensions are known.
    pub fn from_parts(height: Option<f32>, width: Option<f32>) -> Option<Self> {
        Some(Self::new(height?, width?))
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.height.is_finite() && self.width.is_finite() && self.height > 0.0 && self.width > 0.0,
            InvalidRegionSnafu {
                height: self.height,
                width: self.width,
            }
        );

        Ok(())
    }

    /// The region as the box `(0, 0, width, height)`.
    pub fn bbox(&self) -> Bbox {
        Bbox::new(Vec2::ZERO, Vec2::new(self.width, self.height))
    }

    /// The box spanned by the region's first and last pixel, `(0, 0, width - 1, height - 1)`.
    pub fn pixel_bounds(&self) -> Bbox {
        Bbox::new(Vec2::ZERO, Vec2::new(self.width - 1.0, self.height - 1.0))
    }
}

/// Keeps the boxes of a label table that are still valid for a region.
///
/// Every enabled check narrows one acceptance mask: degenerate boxes first,
/// then boxes below the minimum area, then boxes failing the overlap
/// criterion. The surviving rows are returned in their original order.
#[derive(Debug)]
pub struct BoxFilter {
    config: BoxFilterConfig,
}

impl BoxFilter {
    pub fn new(config: BoxFilterConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            "box filter ready: degenerate={} min_area={}({}) overlap={}({:?}, {:?}, border {:?})",
            config.check_degenerate,
            config.check_min_area,
            config.min_area,
            config.check_overlap,
            config.overlap_criterion,
            config.overlap_bounds,
            config.border_pixels,
        );

        Ok(Self { config })
    }

    pub fn from_builder(builder: BoxFilterConfigBuilder) -> Result<Self> {
        Self::new(builder.build().context(ConfigBuildSnafu)?)
    }

    /// Builds a filter from JSON settings, see [`BoxFilterSettings`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::new(BoxFilterSettings::from_json_str(json)?.into_config()?)
    }

    pub fn config(&self) -> &BoxFilterConfig {
        &self.config
    }

    /// Returns the rows of `labels` that pass every enabled check.
    ///
    /// `labels` is an `m x n` table whose columns are described by the
    /// configured column layout. `region` is required when overlap checking is
    /// enabled. The input is left untouched; a new table is returned.
    ///
    /// Takes `&mut self` because a generated overlap window draws a fresh
    /// `(lower, upper)` pair on every call. The `Area` and `Iou` criteria draw
    /// exactly once per call, also when `labels` has no rows, so a seeded
    /// generator advances in step with the calls.
    pub fn apply(&mut self, labels: ArrayView2<f32>, region: Option<Region>) -> Result<Array2<f32>> {
        let mask = self.mask(labels, region)?;

        let kept = mask
            .iter()
            .enumerate()
            .filter_map(|(idx, &keep)| keep.then_some(idx))
            .collect::<Vec<_>>();

        debug!("box filter kept {} of {} boxes", kept.len(), labels.nrows());

        Ok(labels.select(Axis(0), &kept))
    }

    /// The per-row acceptance mask behind [`BoxFilter::apply`].
    pub fn mask(&mut self, labels: ArrayView2<f32>, region: Option<Region>) -> Result<Vec<bool>> {
        let region = if self.config.check_overlap {
            let region = region.context(MissingRegionSnafu)?;
            region.validate()?;
            Some(region)
        } else {
            None
        };

        if labels.nrows() == 0 {
            if region.is_some() && self.config.overlap_criterion != OverlapCriterion::CenterPoint {
                let (lower, upper) = self.config.overlap_bounds.resolve();
                trace!("overlap window ({lower}, {upper}) drawn for an empty table");
            }
            return Ok(Vec::new());
        }

        let layout = self.config.column_layout;
        layout.check_width(labels.ncols())?;

        let boxes = labels
            .rows()
            .into_iter()
            .map(|row| layout.bbox(row))
            .collect::<Vec<_>>();
        let mut accept = vec![true; boxes.len()];

        if self.config.check_degenerate {
            for (idx, bbox) in boxes.iter().enumerate() {
                if bbox.is_degenerate() {
                    trace!("box {idx} rejected: degenerate {bbox:?}");
                    accept[idx] = false;
                }
            }
        }

        if self.config.check_min_area {
            let min_area = self.config.min_area;
            for (idx, bbox) in boxes.iter().enumerate() {
                if accept[idx] && !(bbox.area() >= min_area) {
                    trace!("box {idx} rejected: area {} below {min_area}", bbox.area());
                    accept[idx] = false;
                }
            }
        }

        if let Some(region) = region {
            self.overlap_mask(&boxes, region, &mut accept)?;
        }

        Ok(accept)
    }

    fn overlap_mask(&mut self, boxes: &[Bbox], region: Region, accept: &mut [bool]) -> Result<()> {
        let border = self.config.border_pixels;

        match self.config.overlap_criterion {
            OverlapCriterion::CenterPoint => {
                let last = Vec2::new(region.width - 1.0, region.height - 1.0);
                for (idx, bbox) in boxes.iter().enumerate() {
                    let center = bbox.center();
                    // inclusive on both ends: a center on the last pixel is inside
                    let inside = center.x >= 0.0
                        && center.x <= last.x
                        && center.y >= 0.0
                        && center.y <= last.y;
                    if accept[idx] && !inside {
                        trace!("box {idx} rejected: center {center} outside region");
                        accept[idx] = false;
                    }
                }
            }
            OverlapCriterion::Area => {
                let (lower, upper) = self.config.overlap_bounds.resolve();
                debug!("area overlap window ({lower}, {upper})");
                let bounds = region.pixel_bounds();
                for (idx, bbox) in boxes.iter().enumerate() {
                    if !accept[idx] {
                        continue;
                    }
                    let box_area = bbox.area_with(border);
                    let intersection = bbox.intersection_with(&bounds, border);
                    // a zero lower bound must still reject boxes that do not overlap at all
                    let lower_met = if lower == 0.0 {
                        intersection > 0.0
                    } else {
                        intersection >= lower * box_area
                    };
                    let upper_met = intersection <= upper * box_area;
                    if !(lower_met && upper_met) {
                        trace!("box {idx} rejected: overlap area {intersection} of {box_area}");
                        accept[idx] = false;
                    }
                }
            }
            OverlapCriterion::Iou => {
                let (lower, upper) = self.config.overlap_bounds.resolve();
                debug!("iou overlap window ({lower}, {upper})");
                let ious = iou_elementwise(&[region.bbox()], boxes, border)?;
                for (idx, &iou) in ious.iter().enumerate() {
                    // lower bound exclusive, upper bound inclusive
                    if accept[idx] && !(iou > lower && iou <= upper) {
                        trace!("box {idx} rejected: iou {iou} outside ({lower}, {upper}]");
                        accept[idx] = false;
                    }
                }
            }
        }

        Ok(())
    }
}
