//! Completeness tracking over a fixed universe of declared indices.
//!
//! The aggregator advances a [`CompletionTracker`] each time a region is
//! started. Indices jumped over are reported by [`CompletionTracker::advance`],
//! indices never reached by [`CompletionTracker::remaining`]; together they
//! name every declared region that must still be reported empty.

use crate::error::{AggregatorError, AggregatorResult};

/// Cursor over the index universe `[0, size)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionTracker {
    size: usize,
    cursor: Option<usize>,
}

impl CompletionTracker {
    /// Creates a tracker positioned before index 0.
    pub fn new(size: usize) -> Self {
        Self { size, cursor: None }
    }

    /// Moves the cursor to `target`, returning the skipped indices in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use region_stats::completion::CompletionTracker;
    ///
    /// let mut tracker = CompletionTracker::new(5);
    /// assert_eq!(tracker.advance(2).unwrap(), vec![0, 1]);
    /// assert_eq!(tracker.advance(3).unwrap(), Vec::<usize>::new());
    /// assert_eq!(tracker.remaining(), vec![4]);
    /// ```
    pub fn advance(&mut self, target: usize) -> AggregatorResult<Vec<usize>> {
        if target >= self.size {
            return Err(AggregatorError::OutOfRange {
                target,
                size: self.size,
            });
        }

        let first = match self.cursor {
            Some(cursor) if target <= cursor => {
                return Err(AggregatorError::NotIncreasing { target, cursor });
            }
            Some(cursor) => cursor + 1,
            None => 0,
        };

        self.cursor = Some(target);
        Ok((first..target).collect())
    }

    /// Indices after the cursor, without moving it.
    pub fn remaining(&self) -> Vec<usize> {
        let first = self.cursor.map_or(0, |cursor| cursor + 1);
        (first..self.size).collect()
    }

    pub fn reset(&mut self) {
        self.cursor = None;
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn size(&self) -> usize {
        self.size
    }
}
