// Time window domain model - maps timestamps onto fixed-size display slots
use crate::domain::error::ConfigurationError;

pub const DEFAULT_MIN_SLOT_SIZE_MS: i64 = 5_000;
pub const DEFAULT_IDEAL_SLOT_COUNT: u64 = 200;

/// A display range split into evenly sized slots.
///
/// `window_index` may return an index outside `[0, slot_count)` for
/// timestamps outside the window; `None` means the timestamp has no slot at
/// all. `timestamps` must yield exactly `slot_count` values in ascending
/// order and may be called any number of times.
pub trait TimeWindow {
    fn slot_count(&self) -> u64;

    fn window_index(&self, timestamp: i64) -> Option<i64>;

    fn timestamps(&self) -> impl Iterator<Item = i64> + '_;
}

/// Half-open `[from, to)` range in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    from: i64,
    to: i64,
}

impl Range {
    pub fn new(from: i64, to: i64) -> Result<Self, ConfigurationError> {
        if to < from {
            return Err(ConfigurationError::InvertedRange { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> i64 {
        self.from
    }

    pub fn to(&self) -> i64 {
        self.to
    }

    pub fn span_ms(&self) -> u64 {
        self.to.abs_diff(self.from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedTimeWindow {
    start: i64,
    slot_size: i64,
    slot_count: u64,
}

impl FixedTimeWindow {
    /// Builds a window whose first slot starts at `range.from()` rounded down
    /// to a multiple of `slot_size`.
    pub fn new(range: Range, slot_size: i64) -> Result<Self, ConfigurationError> {
        if slot_size <= 0 {
            return Err(ConfigurationError::NonPositiveSlotSize(slot_size));
        }

        let start = range
            .from()
            .checked_sub(range.from().rem_euclid(slot_size))
            .ok_or(ConfigurationError::UnalignedStart {
                from: range.from(),
                slot_size,
            })?;
        let slot_count = range.to().abs_diff(start).div_ceil(slot_size as u64);

        Ok(Self {
            start,
            slot_size,
            slot_count,
        })
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn slot_size(&self) -> i64 {
        self.slot_size
    }
}

impl TimeWindow for FixedTimeWindow {
    fn slot_count(&self) -> u64 {
        self.slot_count
    }

    fn window_index(&self, timestamp: i64) -> Option<i64> {
        let offset = timestamp as i128 - self.start as i128;
        i64::try_from(offset.div_euclid(self.slot_size as i128)).ok()
    }

    fn timestamps(&self) -> impl Iterator<Item = i64> + '_ {
        // Every representative timestamp lies below `to`, so the narrowing cast is exact.
        (0..self.slot_count)
            .map(move |i| (self.start as i128 + i as i128 * self.slot_size as i128) as i64)
    }
}

/// Picks a slot size for a range so that a chart gets close to, but not
/// more than, `ideal_slot_count` points. Slot sizes are multiples of
/// `min_slot_size`. The ideal count is at least 2, since aligning the start
/// to a slot boundary can add one slot.
#[derive(Debug, Clone, Copy)]
pub struct SlotSizeSampler {
    min_slot_size: i64,
    ideal_slot_count: u64,
}

impl Default for SlotSizeSampler {
    fn default() -> Self {
        Self {
            min_slot_size: DEFAULT_MIN_SLOT_SIZE_MS,
            ideal_slot_count: DEFAULT_IDEAL_SLOT_COUNT,
        }
    }
}

impl SlotSizeSampler {
    pub fn new(min_slot_size: i64, ideal_slot_count: u64) -> Result<Self, ConfigurationError> {
        if min_slot_size <= 0 {
            return Err(ConfigurationError::NonPositiveSlotSize(min_slot_size));
        }
        Ok(Self {
            min_slot_size,
            ideal_slot_count: ideal_slot_count.max(2),
        })
    }

    fn slot_size_for(&self, span_ms: u64, slots: u64) -> i64 {
        let min = self.min_slot_size as u64;
        let multiples = span_ms.div_ceil(slots).div_ceil(min).max(1);
        multiples
            .checked_mul(min)
            .and_then(|size| i64::try_from(size).ok())
            .unwrap_or(i64::MAX)
    }

    pub fn window(&self, range: Range) -> Result<FixedTimeWindow, ConfigurationError> {
        let ideal = self.ideal_slot_count;
        let window = FixedTimeWindow::new(range, self.slot_size_for(range.span_ms(), ideal))?;
        if window.slot_count() <= ideal {
            return Ok(window);
        }
        // An unaligned start costs at most one extra slot, so size for one fewer.
        FixedTimeWindow::new(range, self.slot_size_for(range.span_ms(), ideal - 1))
    }
}
