// In-memory snapshot history: fixed-capacity FIFO behind a single mutex.
// The sampler is the only writer; readers get a point-in-time copy taken under
// the same lock. Snapshots are shared as Arc so a copy never clones metric data.
// Nothing survives a restart.

mod series;

pub use series::HistorySeries;

use crate::models::Snapshot;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Two hours at the default 30 s sampling interval.
pub const DEFAULT_HISTORY_SIZE: usize = 240;

pub struct HistoryRepo {
    capacity: usize,
    buffer: Mutex<VecDeque<Arc<Snapshot>>>,
}

impl Default for HistoryRepo {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}

impl HistoryRepo {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            buffer: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append, evicting the oldest snapshot when full. Returns the new length.
    pub fn push(&self, snapshot: Snapshot) -> usize {
        let mut buffer = self.lock();
        if self.capacity == 0 {
            return 0;
        }
        if buffer.len() >= self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(Arc::new(snapshot));
        buffer.len()
    }

    /// Chronological copy of the buffer; later appends are not visible through it.
    pub fn read_history(&self) -> Vec<Arc<Snapshot>> {
        self.lock().iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.lock().back().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Snapshots are immutable, so a panic while the lock was held cannot have
    // left a half-written entry behind.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Arc<Snapshot>>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
