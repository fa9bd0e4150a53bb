pub mod bbox;
pub mod iou;
pub mod layout;
