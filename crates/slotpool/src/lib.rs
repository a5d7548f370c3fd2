//! Fixed-capacity lock-free slot pool with in-place element storage.
//!
//! [`SlotPool`] is a concurrent container for handle tables, object pools,
//! and ID-indexed registries with bounded memory: capacity is fixed at
//! construction, elements live inside the pool's own storage (no
//! per-element heap allocation), and insertion, removal, and lookup are all
//! safe to call from many threads without a mutual-exclusion lock anywhere.
//!
//! # Architecture
//!
//! ```text
//! SlotPool<T>
//! ├── FreeList              (one AtomicU64: generation << 32 | top index)
//! └── Box<[Slot<T>]>        (N cells, allocated as one block)
//!     ├── state: AtomicU64     (2-bit lifecycle phase + ABA guard)
//!     ├── next_free: AtomicU32 (successor while on the free list)
//!     └── value: UnsafeCell<MaybeUninit<T>>
//! ```
//!
//! Each slot cycles through `EMPTY -> INIT -> READY -> REMOVING -> EMPTY`,
//! every transition a compare-and-swap against the current (phase, guard)
//! pair with the guard strictly increasing. The free list issues unused
//! indices through an ABA-guarded Treiber stack. Together these make a
//! freed slot safely reusable by any thread while readers can never
//! mistake a recycled slot for the occupant they originally observed.
//!
//! # Progress and ordering
//!
//! Operations never block and never suspend: the only waiting is bounded
//! compare-and-swap retry, giving the usual lock-free guarantee (some
//! thread always makes progress) rather than per-call wait-freedom.
//! Publication is a release store of `READY` paired with acquire loads on
//! every read path, so an observed-live element is always fully
//! constructed.
//!
//! # Safety policy
//!
//! This crate contains `unsafe` code, confined to the storage cell
//! (`slot.rs`) and the façade paths that hold an exclusive lifecycle
//! window (`pool.rs`). Every unsafe block carries a `SAFETY:` comment
//! naming the window or contract that justifies it. The one unsafe public
//! item is [`SlotPool::get_ref`], whose caller assumes the original
//! transient-reference contract: the borrow dies before any concurrent
//! erase of that index.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod error;
mod free_list;
pub mod pool;
mod slot;

// Public re-exports for the primary API surface.
pub use error::PoolError;
pub use pool::{Iter, SlotPool, MAX_CAPACITY};
