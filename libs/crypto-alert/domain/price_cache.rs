//! Circular Price Cache
//!
//! Fixed-capacity ring of samples indexed by `tick mod capacity`. Because
//! the sampling cadence is fixed (one tick per minute), the tick counter
//! encodes time: the sample taken N minutes ago lives at
//! `(tick - N) mod capacity`.
//!
//! Each slot remembers the tick it was written on. A lagged lookup only
//! returns a sample when the slot really holds tick `tick - window`, so a
//! tick skipped after a transient fetch failure shows up as a gap instead
//! of silently resolving to a sample from an earlier lap.
//!
//! With `window == capacity` the lagged slot is the slot the current tick
//! was just written into, so the entry displaced by the latest `put` is kept
//! aside until the next write.

use thiserror::Error;

use super::sample::Sample;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("window {window} is out of range, expected 1..={capacity}")]
    WindowOutOfRange { window: usize, capacity: usize },
}

/// Contents of the slot `window` ticks before the current tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LaggedSample {
    /// The sample written exactly at `tick - window`
    Available(Sample),

    /// `tick < window`: the lagged tick does not exist yet
    InsufficientHistory,

    /// The lagged tick exists but was never written (skipped tick)
    Missing { lagged_tick: u64 },
}

impl LaggedSample {
    pub fn sample(&self) -> Option<&Sample> {
        match self {
            LaggedSample::Available(sample) => Some(sample),
            _ => None,
        }
    }
}

/// Result of `get_current_and_lagged`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheLookup {
    /// Sample written at the requested tick, if any
    pub current: Option<Sample>,
    pub lagged: LaggedSample,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    tick: u64,
    sample: Sample,
}

/// Ring buffer of samples with O(1) "N ticks ago" lookup
#[derive(Debug, Clone)]
pub struct CircularPriceCache {
    slots: Vec<Option<Slot>>,
    filled: usize,
    displaced: Option<Slot>,
}

impl CircularPriceCache {
    /// Create an empty cache. A zero capacity is bumped to one slot;
    /// `MonitorConfig` rejects it before it gets here.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity.max(1)],
            filled: 0,
            displaced: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots written at least once
    pub fn filled_slots(&self) -> usize {
        self.filled
    }

    /// True once every slot has been written at least once
    pub fn is_warm(&self) -> bool {
        self.filled == self.capacity()
    }

    /// Slot that `tick` maps to
    pub fn slot_index(&self, tick: u64) -> usize {
        (tick % self.capacity() as u64) as usize
    }

    /// Slot holding the sample `window` ticks before `tick`.
    ///
    /// Uses a euclidean remainder, so a negative `tick - window` wraps to
    /// the end of the ring instead of producing a negative index.
    pub fn lagged_slot_index(&self, tick: u64, window: usize) -> usize {
        let lagged = tick as i128 - window as i128;
        lagged.rem_euclid(self.capacity() as i128) as usize
    }

    /// Write `sample` into the slot for `tick`, overwriting whatever was there
    pub fn put(&mut self, tick: u64, sample: Sample) {
        let index = self.slot_index(tick);
        if self.slots[index].is_none() {
            self.filled += 1;
        }
        self.displaced = self.slots[index].replace(Slot { tick, sample });
    }

    /// Sample written at exactly `tick`, if that slot has not been reused
    pub fn get(&self, tick: u64) -> Option<Sample> {
        self.slots[self.slot_index(tick)]
            .filter(|slot| slot.tick == tick)
            .map(|slot| slot.sample)
    }

    /// Current sample and the sample `window` ticks earlier
    pub fn get_current_and_lagged(&self, tick: u64, window: usize) -> Result<CacheLookup, CacheError> {
        let capacity = self.capacity();
        if window == 0 || window > capacity {
            return Err(CacheError::WindowOutOfRange { window, capacity });
        }

        let current = self.get(tick);

        let lagged = match tick.checked_sub(window as u64) {
            None => LaggedSample::InsufficientHistory,
            Some(lagged_tick) => [self.slots[self.lagged_slot_index(tick, window)], self.displaced]
                .into_iter()
                .flatten()
                .find(|slot| slot.tick == lagged_tick)
                .map(|slot| LaggedSample::Available(slot.sample))
                .unwrap_or(LaggedSample::Missing { lagged_tick }),
        };

        Ok(CacheLookup { current, lagged })
    }
}

// =============================================================================
// Tests
// =============================================================================
