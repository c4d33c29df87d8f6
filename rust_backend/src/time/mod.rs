//! Time bucketing for periodic reports.
//!
//! A [`TimeWindowIndex`] partitions the timeline into ordered, closed,
//! non-overlapping day ranges and maps acquisition timestamps onto them.

pub mod windows;

pub use windows::{TimeWindow, TimeWindowIndex, WINDOW_FORMAT};
