//! Hour-bucketed source rotation.

use chrono::{Local, Timelike};
use kizashi_core::SourceDescriptor;

/// Index of the source for `hour` when each source owns `bucket_hours`
/// consecutive hours: `(hour / bucket_hours) % count`.
///
/// Returns `None` when there are no sources. A zero bucket is treated as one
/// hour wide.
///
/// # Examples
///
/// ```
/// use kizashi_bot::rotation_index;
///
/// assert_eq!(rotation_index(0, 3, 3), Some(0));
/// assert_eq!(rotation_index(5, 3, 3), Some(1));
/// assert_eq!(rotation_index(9, 3, 3), Some(0));
/// assert_eq!(rotation_index(9, 3, 0), None);
/// ```
pub fn rotation_index(hour: u32, bucket_hours: u32, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let bucket = (hour / bucket_hours.max(1)) as usize;
    Some(bucket % count)
}

/// Deterministic rotation through sources by wall-clock hour.
///
/// Carries no state between cycles: the same hour always picks the same
/// source.
#[derive(Debug, Clone)]
pub struct SourceRotation {
    sources: Vec<SourceDescriptor>,
    bucket_hours: u32,
}

impl SourceRotation {
    /// Rotation over `sources` with buckets of `bucket_hours`.
    pub fn new(sources: Vec<SourceDescriptor>, bucket_hours: u32) -> Self {
        Self {
            sources,
            bucket_hours,
        }
    }

    /// Source for a given hour of the day.
    pub fn pick(&self, hour: u32) -> Option<&SourceDescriptor> {
        rotation_index(hour, self.bucket_hours, self.sources.len()).map(|i| &self.sources[i])
    }

    /// Source for the current local hour.
    pub fn current(&self) -> Option<&SourceDescriptor> {
        self.pick(Local::now().hour())
    }

    /// All sources in rotation order.
    pub fn sources(&self) -> &[SourceDescriptor] {
        &self.sources
    }
}
