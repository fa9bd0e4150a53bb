use std::str::FromStr;

use derive_builder::Builder;
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, ensure};

use crate::{
    analysis::{bbox::BorderPixels, layout::ColumnLayout},
    consts::{MIN_BOX_AREA, OVERLAP_BOUNDS},
    error::{BoxFilterError, ConfigParseSnafu, InvalidConfigSnafu, Result},
    filter::bound::{BoundGenerator, SampleSpaceBounds, UniformBounds, validate_bounds},
};

/// Decides when a box still overlaps the region enough to be kept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapCriterion {
    /// The box center lies inside the region.
    #[default]
    CenterPoint,
    /// The share of the box area inside the region falls in the overlap window.
    Area,
    /// The IoU of the box with the whole region falls in the overlap window.
    Iou,
}

impl FromStr for OverlapCriterion {
    type Err = BoxFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "center_point" => Ok(OverlapCriterion::CenterPoint),
            "area" => Ok(OverlapCriterion::Area),
            "iou" => Ok(OverlapCriterion::Iou),
            other => InvalidConfigSnafu {
                message: format!(
                    "overlap criterion must be one of 'iou', 'area' or 'center_point', got '{other}'"
                ),
            }
            .fail(),
        }
    }
}

/// The acceptance window of the area and IoU criteria.
#[derive(Debug)]
pub enum OverlapWindow {
    Fixed { lower: f32, upper: f32 },
    Generated(Box<dyn BoundGenerator>),
}

impl Default for OverlapWindow {
    fn default() -> Self {
        let (lower, upper) = OVERLAP_BOUNDS;
        OverlapWindow::Fixed { lower, upper }
    }
}

impl From<(f32, f32)> for OverlapWindow {
    fn from((lower, upper): (f32, f32)) -> Self {
        OverlapWindow::Fixed { lower, upper }
    }
}

impl From<Box<dyn BoundGenerator>> for OverlapWindow {
    fn from(generator: Box<dyn BoundGenerator>) -> Self {
        OverlapWindow::Generated(generator)
    }
}

impl OverlapWindow {
    pub fn fixed(lower: f32, upper: f32) -> Self {
        OverlapWindow::Fixed { lower, upper }
    }

    pub fn generated(generator: impl BoundGenerator + 'static) -> Self {
        OverlapWindow::Generated(Box::new(generator))
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            OverlapWindow::Fixed { lower, upper } => validate_bounds(*lower, *upper),
            // generators check their own ranges on construction
            OverlapWindow::Generated(_) => Ok(()),
        }
    }

    /// The window to use for one filter call.
    pub fn resolve(&mut self) -> (f32, f32) {
        match self {
            OverlapWindow::Fixed { lower, upper } => (*lower, *upper),
            OverlapWindow::Generated(generator) => generator.sample(),
        }
    }
}

#[derive(Debug, Builder)]
#[builder(pattern = "owned")]
pub struct BoxFilterConfig {
    /// Enforce `overlap_criterion` against the region.
    #[builder(default = "true")]
    pub check_overlap: bool,
    /// Drop boxes whose area is below `min_area`.
    #[builder(default = "true")]
    pub check_min_area: bool,
    /// Drop boxes with `xmax <= xmin` or `ymax <= ymin`.
    #[builder(default = "true")]
    pub check_degenerate: bool,
    #[builder(default)]
    pub overlap_criterion: OverlapCriterion,
    /// Only read by the `Area` and `Iou` criteria.
    #[builder(default, setter(into))]
    pub overlap_bounds: OverlapWindow,
    /// Minimum box area in pixels, measured without border adjustment.
    #[builder(default = "MIN_BOX_AREA")]
    pub min_area: f32,
    #[builder(default)]
    pub column_layout: ColumnLayout,
    /// Border convention of the `Area` and `Iou` criteria.
    #[builder(default)]
    pub border_pixels: BorderPixels,
}

impl Default for BoxFilterConfig {
    fn default() -> Self {
        Self {
            check_overlap: true,
            check_min_area: true,
            check_degenerate: true,
            overlap_criterion: OverlapCriterion::default(),
            overlap_bounds: OverlapWindow::default(),
            min_area: MIN_BOX_AREA,
            column_layout: ColumnLayout::default(),
            border_pixels: BorderPixels::default(),
        }
    }
}

impl BoxFilterConfig {
    pub fn builder() -> BoxFilterConfigBuilder {
        BoxFilterConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        self.overlap_bounds.validate()?;
        ensure!(
            self.min_area.is_finite() && self.min_area >= 0.0,
            InvalidConfigSnafu {
                message: format!("min area must be a non-negative number, got {}", self.min_area),
            }
        );
        self.column_layout.validate()
    }
}

/// Serializable description of an [`OverlapWindow`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlapBoundsSpec {
    Fixed {
        lower: f32,
        upper: f32,
    },
    Uniform {
        min: f32,
        max: f32,
        #[serde(default)]
        seed: Option<u64>,
    },
    SampleSpace {
        space: Vec<(Option<f32>, Option<f32>)>,
        #[serde(default)]
        weights: Option<Vec<f32>>,
        #[serde(default)]
        seed: Option<u64>,
    },
}

impl Default for OverlapBoundsSpec {
    fn default() -> Self {
        let (lower, upper) = OVERLAP_BOUNDS;
        OverlapBoundsSpec::Fixed { lower, upper }
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

impl OverlapBoundsSpec {
    pub fn into_window(self) -> Result<OverlapWindow> {
        let window = match self {
            OverlapBoundsSpec::Fixed { lower, upper } => OverlapWindow::Fixed { lower, upper },
            OverlapBoundsSpec::Uniform { min, max, seed } => {
                OverlapWindow::generated(UniformBounds::new(min, max, seeded_rng(seed))?)
            }
            OverlapBoundsSpec::SampleSpace {
                space,
                weights,
                seed,
            } => OverlapWindow::generated(SampleSpaceBounds::new(
                &space,
                weights.as_deref(),
                seeded_rng(seed),
            )?),
        };

        Ok(window)
    }
}

/// JSON-friendly mirror of [`BoxFilterConfig`]; every field is optional.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxFilterSettings {
    pub check_overlap: bool,
    pub check_min_area: bool,
    pub check_degenerate: bool,
    pub overlap_criterion: OverlapCriterion,
    pub overlap_bounds: OverlapBoundsSpec,
    pub min_area: f32,
    pub column_layout: ColumnLayout,
    pub border_pixels: BorderPixels,
}

impl Default for BoxFilterSettings {
    fn default() -> Self {
        Self {
            check_overlap: true,
            check_min_area: true,
            check_degenerate: true,
            overlap_criterion: OverlapCriterion::default(),
            overlap_bounds: OverlapBoundsSpec::default(),
            min_area: MIN_BOX_AREA,
            column_layout: ColumnLayout::default(),
            border_pixels: BorderPixels::default(),
        }
    }
}

impl BoxFilterSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context(ConfigParseSnafu { stage: "settings" })
    }

    pub fn into_config(self) -> Result<BoxFilterConfig> {
        Ok(BoxFilterConfig {
            check_overlap: self.check_overlap,
            check_min_area: self.check_min_area,
            check_degenerate: self.check_degenerate,
            overlap_criterion: self.overlap_criterion,
            overlap_bounds: self.overlap_bounds.into_window()?,
            min_area: self.min_area,
            column_layout: self.column_layout,
            border_pixels: self.border_pixels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::bound::FixedBounds;

    #[test]
    fn test_overlap_criterion_parse() {
        assert_eq!(
            "center_point".parse::<OverlapCriterion>().unwrap(),
            OverlapCriterion::CenterPoint
        );
        assert_eq!("area".parse::<OverlapCriterion>().unwrap(), OverlapCriterion::Area);
        assert_eq!("iou".parse::<OverlapCriterion>().unwrap(), OverlapCriterion::Iou);

        let err = "centre".parse::<OverlapCriterion>().unwrap_err();
        assert!(matches!(err, BoxFilterError::InvalidConfig { .. }));
    }

    #[test]
    fn test_builder_defaults() {
        let config = BoxFilterConfig::builder().build().unwrap();
        assert!(config.check_overlap);
        assert!(config.check_min_area);
        assert!(config.check_degenerate);
        assert_eq!(config.overlap_criterion, OverlapCriterion::CenterPoint);
        assert_eq!(config.min_area, 16.0);
        assert_eq!(config.border_pixels, BorderPixels::Half);
        assert_eq!(config.column_layout, ColumnLayout::default());
        assert!(matches!(
            config.overlap_bounds,
            OverlapWindow::Fixed { lower, upper } if lower == 0.3 && upper == 1.0
        ));
    }

    #[test]
    fn test_builder_overrides() {
        let config = BoxFilterConfig::builder()
            .overlap_criterion(OverlapCriterion::Iou)
            .overlap_bounds(OverlapWindow::fixed(0.5, 0.9))
            .check_min_area(false)
            .border_pixels(BorderPixels::Include)
            .build()
            .unwrap();
        assert_eq!(config.overlap_criterion, OverlapCriterion::Iou);
        assert!(!config.check_min_area);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_window() {
        let config = BoxFilterConfig::builder()
            .overlap_bounds(OverlapWindow::fixed(0.9, 0.1))
            .build()
            .unwrap();
        assert!(matches!(
            config.validate(),
            Err(BoxFilterError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_negative_min_area() {
        let config = BoxFilterConfig::builder().min_area(-1.0).build().unwrap();
        assert!(matches!(
            config.validate(),
            Err(BoxFilterError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_window_resolve() {
        let mut fixed = OverlapWindow::from((0.2_f32, 0.8_f32));
        assert_eq!(fixed.resolve(), (0.2, 0.8));

        let mut generated = OverlapWindow::generated(FixedBounds::new(0.4, 0.6).unwrap());
        assert!(generated.validate().is_ok());
        assert_eq!(generated.resolve(), (0.4, 0.6));
    }

    #[test]
    fn test_settings_from_json() {
        let settings = BoxFilterSettings::from_json_str(
            r#"{
                "overlap_criterion": "area",
                "overlap_bounds": {"kind": "fixed", "lower": 0.0, "upper": 1.0},
                "border_pixels": "include",
                "min_area": 4.0
            }"#,
        )
        .unwrap();
        assert_eq!(settings.overlap_criterion, OverlapCriterion::Area);
        assert_eq!(settings.border_pixels, BorderPixels::Include);
        assert!(settings.check_degenerate);

        let config = settings.into_config().unwrap();
        assert_eq!(config.min_area, 4.0);
        assert!(matches!(
            config.overlap_bounds,
            OverlapWindow::Fixed { lower, upper } if lower == 0.0 && upper == 1.0
        ));
    }

    #[test]
    fn test_settings_generated_bounds() {
        let settings = BoxFilterSettings::from_json_str(
            r#"{
                "overlap_criterion": "iou",
                "overlap_bounds": {
                    "kind": "sample_space",
                    "space": [[null, null], [0.3, null], [null, 0.7]],
                    "seed": 5
                }
            }"#,
        )
        .unwrap();
        let mut config = settings.into_config().unwrap();
        let (lower, upper) = config.overlap_bounds.resolve();
        assert!(lower <= upper);
    }

    #[test]
    fn test_settings_unknown_criterion() {
        let err = BoxFilterSettings::from_json_str(r#"{"overlap_criterion": "centre"}"#)
            .unwrap_err();
        assert!(matches!(err, BoxFilterError::ConfigParse { .. }));
    }

    #[test]
    fn test_settings_invalid_generator() {
        let settings = BoxFilterSettings::from_json_str(
            r#"{"overlap_bounds": {"kind": "uniform", "min": 0.9, "max": 0.1}}"#,
        )
        .unwrap();
        assert!(settings.into_config().is_err());
    }
}
