//! Offset / limit resolution for group queries
//!
//! Callers page with `(offset, limit)` where `limit == -1` means "everything
//! from `offset` on". Substrate ranges are inclusive rank pairs, so the
//! translation lives here, in one place.

use devicedir_core::{Error, Result};

/// Limit value selecting every remaining record
pub const UNLIMITED: i64 = -1;

/// A resolved, non-empty rank window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RankRange {
    start: usize,
    /// Inclusive end rank; `None` runs to the end of the group
    stop: Option<usize>,
}

impl RankRange {
    /// Resolve `(offset, limit)`
    ///
    /// Returns `Ok(None)` when the window is empty (`limit == 0`); a Redis
    /// stop rank of `offset - 1` would otherwise read as "to the end".
    pub(crate) fn resolve(offset: usize, limit: i64) -> Result<Option<Self>> {
        if isize::try_from(offset).is_err() {
            return Err(Error::invalid_input(format!("offset {} out of range", offset)));
        }
        match limit {
            UNLIMITED => Ok(Some(RankRange {
                start: offset,
                stop: None,
            })),
            0 => Ok(None),
            n if n > 0 => {
                let count = usize::try_from(n).unwrap_or(usize::MAX);
                let stop = offset.saturating_add(count - 1).min(isize::MAX as usize);
                Ok(Some(RankRange {
                    start: offset,
                    stop: Some(stop),
                }))
            }
            n => Err(Error::invalid_input(format!(
                "limit must be -1 or non-negative, got {}",
                n
            ))),
        }
    }

    /// Inclusive `(start, stop)` ranks for `ZRANGE` / `ZREVRANGE`
    pub(crate) fn ranks(&self) -> (isize, isize) {
        let stop = match self.stop {
            Some(stop) => stop as isize,
            None => -1,
        };
        (self.start as isize, stop)
    }

    /// Apply the window to an already-ordered listing
    pub(crate) fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let take = match self.stop {
            Some(stop) => stop - self.start + 1,
            None => usize::MAX,
        };
        items.into_iter().skip(self.start).take(take).collect()
    }
}
