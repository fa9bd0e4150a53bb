pub mod bound;
pub mod box_filter;
pub mod config;

pub use bound::{BoundGenerator, FixedBounds, SampleSpaceBounds, UniformBounds};
pub use box_filter::{BoxFilter, Region};
pub use config::{
    BoxFilterConfig, BoxFilterConfigBuilder, BoxFilterSettings, OverlapBoundsSpec,
    OverlapCriterion, OverlapWindow,
};
