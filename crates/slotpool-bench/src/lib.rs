//! Benchmark fixtures for the slotpool crate.
//!
//! Provides pre-populated pools so the criterion benches measure the
//! operation under test rather than setup noise.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use slotpool::SlotPool;

/// Build a pool of `capacity` slots with `live` elements already inserted.
///
/// Elements are the values `0..live`, occupying indices `0..live` (inserts
/// into a fresh pool drain the initial free-list chain in order).
///
/// # Panics
///
/// Panics if `live > capacity` or the capacity is rejected.
pub fn filled_pool(capacity: usize, live: usize) -> SlotPool<u64> {
    assert!(live <= capacity, "cannot fill past capacity");
    let pool = SlotPool::new(capacity).expect("benchmark capacity");
    for value in 0..live as u64 {
        pool.insert(value).expect("pool has room");
    }
    pool
}
