use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Condvar, Mutex};

/// Counting semaphore bounding the number of frames in flight.
///
/// The renderer acquires one permit before writing a ring slot and recording a
/// frame. The permit is returned by a [`Releaser`] from the GPU completion
/// callback of that frame's submission, never from the submitting thread.
///
/// There is no timeout: a GPU that never completes stalls `acquire` forever.
pub struct FrameScheduler {
    shared: Arc<Shared>,
}

/// Release handle captured by completion callbacks.
///
/// Holds only the shared counter, so a pending callback never keeps the
/// renderer alive or touches its resources.
#[derive(Clone)]
pub struct Releaser {
    shared: Arc<Shared>,
}

struct Shared {
    capacity: usize,
    available: Mutex<usize>,
    freed: Condvar,
    acquired: AtomicU64,
    released: AtomicU64,
}

impl Shared {
    fn release(&self) {
        {
            let mut available = self.available.lock();
            if *available >= self.capacity {
                log::error!(
                    "frame scheduler released with no frame in flight (capacity {})",
                    self.capacity
                );
                return;
            }
            *available += 1;
        }
        self.released.fetch_add(1, Ordering::Relaxed);
        self.freed.notify_one();
    }
}

impl FrameScheduler {
    /// Creates a scheduler with `capacity` free slots. `capacity` must be non-zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "FrameScheduler requires a non-zero capacity");
        Self {
            shared: Arc::new(Shared {
                capacity,
                available: Mutex::new(capacity),
                freed: Condvar::new(),
                acquired: AtomicU64::new(0),
                released: AtomicU64::new(0),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        *self.shared.available.lock()
    }

    /// Frames acquired but not yet released.
    pub fn in_flight(&self) -> usize {
        self.shared.capacity - self.available()
    }

    /// Total permits handed out since construction.
    pub fn acquired_total(&self) -> u64 {
        self.shared.acquired.load(Ordering::Relaxed)
    }

    /// Total permits returned since construction.
    pub fn released_total(&self) -> u64 {
        self.shared.released.load(Ordering::Relaxed)
    }

    /// Blocks until a slot is free, then takes it.
    ///
    /// Only valid when completions are delivered by another thread.
    #[cfg(test)]
    pub(crate) fn acquire(&self) {
        let mut available = self.shared.available.lock();
        while *available == 0 {
            self.shared.freed.wait(&mut available);
        }
        *available -= 1;
        self.shared.acquired.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a slot if one is free.
    pub fn try_acquire(&self) -> bool {
        let mut available = self.shared.available.lock();
        if *available == 0 {
            return false;
        }
        *available -= 1;
        self.shared.acquired.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Like [`acquire`](Self::acquire), but calls `drive` while no slot is free.
    ///
    /// wgpu only delivers completion callbacks while the device is polled, so the
    /// renderer passes a closure that blocks on the oldest outstanding submission.
    pub fn acquire_with<F>(&self, mut drive: F)
    where
        F: FnMut(),
    {
        while !self.try_acquire() {
            drive();
        }
    }

    /// Blocks until every acquired slot has been released, calling `drive` in between.
    pub fn wait_idle_with<F>(&self, mut drive: F)
    where
        F: FnMut(),
    {
        while self.available() < self.shared.capacity {
            drive();
        }
    }

    /// Returns one slot. Releasing more than was acquired is logged and ignored.
    pub fn release(&self) {
        self.shared.release();
    }

    /// Handle for completion callbacks.
    pub fn releaser(&self) -> Releaser {
        Releaser {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Releaser {
    pub fn release(&self) {
        self.shared.release();
    }
}
