//! Recording domain module

mod duration;

pub use duration::{
    Duration, DEFAULT_INTERIM_INTERVAL_SECS, DEFAULT_MAX_DURATION_SECS,
    DEFAULT_SEGMENT_LENGTH_SECS,
};
