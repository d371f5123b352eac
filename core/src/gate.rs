// Concurrency Gate
// Caps the number of hands in flight

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// The gate's semaphore was closed
#[derive(Debug, thiserror::Error)]
#[error("hand gate is closed")]
pub struct GateClosed;

#[derive(Default)]
struct GateStats {
  in_flight: AtomicUsize,
  peak: AtomicUsize,
}

/// Counting admission gate for hands. Cloning shares the same slots.
#[derive(Clone)]
pub struct HandGate {
  semaphore: Arc<Semaphore>,
  stats: Arc<GateStats>,
  capacity: usize,
}

impl HandGate {
  /// Gate with `capacity` slots (at least one)
  pub fn new(capacity: usize) -> Self {
    let capacity = capacity.clamp(1, Semaphore::MAX_PERMITS);
    Self {
      semaphore: Arc::new(Semaphore::new(capacity)),
      stats: Arc::new(GateStats::default()),
      capacity,
    }
  }

  /// Wait for a free slot. Waiters are admitted in FIFO order; the slot is
  /// released when the returned permit is dropped.
  pub async fn acquire(&self) -> Result<HandPermit, GateClosed> {
    let permit = Arc::clone(&self.semaphore)
      .acquire_owned()
      .await
      .map_err(|_| GateClosed)?;

    let now = self.stats.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
    self.stats.peak.fetch_max(now, Ordering::AcqRel);

    Ok(HandPermit {
      _permit: permit,
      stats: Arc::clone(&self.stats),
    })
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Slots currently held
  pub fn in_flight(&self) -> usize {
    self.stats.in_flight.load(Ordering::Acquire)
  }

  /// Highest number of slots held at once since the gate was created
  pub fn peak(&self) -> usize {
    self.stats.peak.load(Ordering::Acquire)
  }

  /// Reject current and future waiters. Permits already handed out stay
  /// valid until dropped.
  pub fn close(&self) {
    self.semaphore.close();
  }

  pub fn is_closed(&self) -> bool {
    self.semaphore.is_closed()
  }
}

/// An occupied gate slot
pub struct HandPermit {
  _permit: OwnedSemaphorePermit,
  stats: Arc<GateStats>,
}

impl Drop for HandPermit {
  fn drop(&mut self) {
    // Runs before the semaphore permit is returned, so `in_flight` never
    // exceeds capacity.
    self.stats.in_flight.fetch_sub(1, Ordering::AcqRel);
  }
}
