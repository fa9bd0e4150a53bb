use snafu::prelude::*;

use crate::filter::config::BoxFilterConfigBuilderError;

pub type Result<T, E = BoxFilterError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum BoxFilterError {
    #[snafu(display("Invalid box filter config: {}", message))]
    InvalidConfig { message: String },
    #[snafu(display(
        "Invalid overlap bounds ({}, {}): need 0 <= lower <= upper",
        lower,
        upper
    ))]
    InvalidBounds { lower: f32, upper: f32 },
    #[snafu(display("Invalid column layout: {}", message))]
    InvalidLayout { message: String },
    #[snafu(display("Overlap check is enabled but no region height/width was given"))]
    MissingRegion,
    #[snafu(display("Region must be a positive rectangle, got {}x{}", height, width))]
    InvalidRegion { height: f32, width: f32 },
    #[snafu(display("Column {} is out of range for labels with {} columns", column, columns))]
    ColumnOutOfRange { column: usize, columns: usize },
    #[snafu(display("Element-wise IoU needs equal or broadcastable lengths, got {} and {}", left, right))]
    ShapeMismatch { left: usize, right: usize },
    #[snafu(display("Build box filter config error: {}", source))]
    ConfigBuild { source: BoxFilterConfigBuilderError },
    #[snafu(display("Parse box filter settings error at stage `{}`: {}", stage, source))]
    ConfigParse {
        source: serde_json::Error,
        stage: String,
    },
}
