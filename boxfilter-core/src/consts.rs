/// Default column holding the class id of a label row.
pub const CLASS_ID_COLUMN: usize = 0;

/// Default columns holding the box corners of a label row.
///
/// The default label format is `[class_id, xmin, ymin, xmax, ymax]`.
pub const XMIN_COLUMN: usize = 1;
pub const YMIN_COLUMN: usize = 2;
pub const XMAX_COLUMN: usize = 3;
pub const YMAX_COLUMN: usize = 4;

/// Minimum box area in pixels for a box to remain a useful training example.
///
/// An object covering only a handful of pixels after a crop or resize is
/// no longer recognizable, so such boxes are dropped from the ground truth.
pub const MIN_BOX_AREA: f32 = 16.0;

/// Default acceptance window `(lower, upper)` for the area and IoU overlap criteria.
pub const OVERLAP_BOUNDS: (f32, f32) = (0.3, 1.0);

/// Lower bound used by a bound sample space entry that leaves it open.
pub const OPEN_LOWER_BOUND: f32 = 0.0;

/// Upper bound used by a bound sample space entry that leaves it open.
pub const OPEN_UPPER_BOUND: f32 = 1.0;
