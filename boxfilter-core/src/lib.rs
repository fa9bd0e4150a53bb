pub mod analysis;
pub mod consts;
pub mod error;
pub mod filter;

// Re-export commonly used types
pub use analysis::{
    bbox::{Bbox, BorderPixels},
    iou::IouMode,
    layout::ColumnLayout,
};
pub use error::BoxFilterError;
pub use filter::{BoxFilter, BoxFilterConfig, OverlapCriterion, OverlapWindow, Region};
