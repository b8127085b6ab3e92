//! Speech recognizer adapters

mod segmented;

pub use segmented::{SegmentTiming, SegmentedRecognizer};
