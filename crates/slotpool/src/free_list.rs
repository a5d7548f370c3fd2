//! Lock-free stack of unused slot indices.
//!
//! The head is a single `AtomicU64` packing `(generation << 32) | index`.
//! Every successful pop or push increments the generation, so a delayed
//! compare-and-swap against a head value read long ago cannot succeed after
//! other threads have cycled the same index through the list (the classic
//! ABA hazard on an index stack). The per-slot `next_free` links live in the
//! slots themselves and are only meaningful while a slot is on the list.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::slot::Slot;

/// Pack a slot index and a generation counter into one head word.
fn pack(index: u32, generation: u32) -> u64 {
    (u64::from(generation) << 32) | u64::from(index)
}

/// Split a head word back into `(index, generation)`.
fn unpack(word: u64) -> (u32, u32) {
    ((word & 0xFFFF_FFFF) as u32, (word >> 32) as u32)
}

/// ABA-protected Treiber stack over the pool's slot indices.
///
/// The stack stores no nodes of its own: index `i`'s successor is
/// `slots[i].next_free`, written while `i` is being pushed and read only by
/// the thread that subsequently pops `i`.
pub(crate) struct FreeList {
    /// `(generation << 32) | top_index`; `top_index == sentinel` when empty.
    head: AtomicU64,
    /// One past the largest valid index, i.e. the pool capacity.
    sentinel: u32,
}

impl FreeList {
    /// Create a list covering indices `0..capacity`.
    ///
    /// The caller is responsible for having chained the slots' `next_free`
    /// links as `0 -> 1 -> .. -> sentinel` beforehand.
    pub(crate) fn new(capacity: u32) -> Self {
        let top = if capacity == 0 { capacity } else { 0 };
        Self {
            head: AtomicU64::new(pack(top, 0)),
            sentinel: capacity,
        }
    }

    /// Pop an unused index, or `None` when the list is empty.
    ///
    /// Emptiness is only an approximate "pool is full" signal: slots that
    /// are mid-erase have left the occupied set but are not yet back on the
    /// list.
    pub(crate) fn pop<T>(&self, slots: &[Slot<T>]) -> Option<u32> {
        let mut head = self.head.load(Ordering::Relaxed);
        loop {
            let (top, generation) = unpack(head);
            if top == self.sentinel {
                return None;
            }
            // Plain load: only the thread whose CAS below succeeds may
            // interpret this value, and a stale read just fails the CAS.
            let next = slots[top as usize].next_free();
            let replacement = pack(next, generation.wrapping_add(1));
            match self.head.compare_exchange_weak(
                head,
                replacement,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Some(top),
                Err(observed) => head = observed,
            }
        }
    }

    /// Return `index` to the list.
    pub(crate) fn push<T>(&self, slots: &[Slot<T>], index: u32) {
        let mut head = self.head.load(Ordering::Relaxed);
        loop {
            let (top, generation) = unpack(head);
            slots[index as usize].set_next_free(top);
            let replacement = pack(index, generation.wrapping_add(1));
            match self.head.compare_exchange_weak(
                head,
                replacement,
                Ordering::Release,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(observed) => head = observed,
            }
        }
    }
}
