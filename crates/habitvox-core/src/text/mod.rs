//! Transcript interpretation: answer classification and goal segmentation.

mod classify;
mod segment;

pub use classify::{Classification, classify_response, is_decline};
pub use segment::extract_goals;
