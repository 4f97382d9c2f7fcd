//! Fixed-capacity rings of per-frame resources.

/// Default number of frames in flight.
pub const FRAMES_IN_FLIGHT: usize = 3;

/// Upper bound accepted by `RendererConfig::validate`.
pub const MAX_FRAMES_IN_FLIGHT: usize = 8;

/// Owned ring of `len` interchangeable slots, selected by `frame_index mod len`.
///
/// The ring only maps frame indices to slots. It performs no synchronization:
/// the `FrameScheduler` guarantees a slot is not reused while the GPU reads it.
#[derive(Debug)]
pub struct BufferRing<T> {
    slots: Box<[T]>,
}

impl<T> BufferRing<T> {
    /// Builds a ring of `len` slots, calling `make` with each slot index in order.
    ///
    /// `len` must be non-zero.
    pub fn from_fn(len: usize, make: impl FnMut(usize) -> T) -> Self {
        assert!(len > 0, "BufferRing requires at least one slot");
        Self {
            slots: (0..len).map(make).collect(),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Index of the slot used by `frame_index`.
    #[inline]
    pub fn slot_index(&self, frame_index: u64) -> usize {
        (frame_index % self.slots.len() as u64) as usize
    }

    #[inline]
    pub fn slot(&self, frame_index: u64) -> &T {
        &self.slots[self.slot_index(frame_index)]
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter()
    }
}

/// Byte size of a ring slot holding `count` records of `T`.
#[inline]
pub fn array_slot_size<T>(count: usize) -> u64 {
    (count * std::mem::size_of::<T>()) as u64
}

/// Byte size of a ring slot holding a single `T`.
#[inline]
pub fn block_slot_size<T>() -> u64 {
    std::mem::size_of::<T>() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{CameraRecord, InstanceRecord};

    // ── indexing ──────────────────────────────────────────────────────────

    #[test]
    fn slot_wraps_modulo_len() {
        let ring = BufferRing::from_fn(3, |i| i);
        let picked: Vec<usize> = (0..7).map(|f| *ring.slot(f)).collect();
        assert_eq!(picked, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn slot_index_handles_large_frame_counters() {
        let ring = BufferRing::from_fn(3, |i| i);
        assert_eq!(ring.slot_index(u64::MAX), (u64::MAX % 3) as usize);
    }

    #[test]
    #[should_panic]
    fn empty_ring_is_rejected() {
        let _ = BufferRing::from_fn(0, |i| i);
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn array_slot_scales_with_count() {
        assert_eq!(array_slot_size::<InstanceRecord>(1), 128);
        assert_eq!(array_slot_size::<InstanceRecord>(1000), 128_000);
    }

    #[test]
    fn camera_slot_holds_one_record() {
        assert_eq!(block_slot_size::<CameraRecord>(), 176);
    }
}
