//! The public pool: composes the free list and the slot state machines.
//!
//! [`SlotPool`] owns a fixed slice of slots and one free-list head. Inserts
//! pop an index (gaining exclusive use of that slot), construct the element
//! in place, and publish it; removals win the slot back, move the element
//! out, and return the index to the free list. Lookups and scans observe
//! only slots whose state word decodes to `READY`.
//!
//! All operations take `&self`, are lock-free (bounded compare-and-swap
//! retry loops, no mutual exclusion, no internal threads), and return
//! synchronously. The pool as a whole is not linearizable: [`SlotPool::len`]
//! and the scans observe each slot independently while other threads mutate
//! the rest.

use crate::error::PoolError;
use crate::free_list::FreeList;
use crate::slot::Slot;

/// Largest supported capacity.
///
/// The free-list head word packs the slot index into 32 bits, with the
/// capacity itself used as the empty sentinel.
pub const MAX_CAPACITY: usize = u32::MAX as usize;

/// Fixed-capacity lock-free pool storing elements in place.
///
/// Capacity is chosen at construction and immutable afterwards; no element
/// ever lives on its own heap allocation. Indices returned by
/// [`SlotPool::insert`] are stable until erased, after which they may be
/// reused by later inserts. Element order is unspecified.
///
/// # Concurrency
///
/// Every operation takes `&self` and may be called from any number of
/// threads. An element constructed before its `READY` publication is fully
/// visible to any thread that subsequently observes the slot live, and a
/// slot freed by one thread can be reused by another without the new
/// occupant ever observing the prior occupant's data. Individual slot
/// transitions are linearizable; cross-slot observations ([`SlotPool::len`],
/// [`SlotPool::for_each`]) are not.
pub struct SlotPool<T> {
    slots: Box<[Slot<T>]>,
    free: FreeList,
}

impl<T> SlotPool<T> {
    /// Create a pool with room for exactly `capacity` elements.
    ///
    /// The backing storage for all slots is allocated upfront as one block.
    /// Returns [`PoolError::CapacityTooLarge`] if `capacity` cannot be
    /// packed into the free-list head word (see [`MAX_CAPACITY`]).
    pub fn new(capacity: usize) -> Result<Self, PoolError> {
        if capacity > MAX_CAPACITY {
            return Err(PoolError::CapacityTooLarge {
                requested: capacity,
                max: MAX_CAPACITY,
            });
        }
        let sentinel = capacity as u32;
        let mut slots = Vec::with_capacity(capacity);
        for i in 0..capacity {
            let next = if i + 1 < capacity {
                (i + 1) as u32
            } else {
                sentinel
            };
            slots.push(Slot::new(next));
        }
        Ok(Self {
            slots: slots.into_boxed_slice(),
            free: FreeList::new(sentinel),
        })
    }

    /// Insert `value`, returning the index it now occupies.
    ///
    /// `None` means the pool is full (the free list was empty) or the slot
    /// claim was lost to a racing operation; either way nothing changed and
    /// no capacity was consumed.
    pub fn insert(&self, value: T) -> Option<usize> {
        self.insert_with(|_| value)
    }

    /// Insert an element built by `build`, which receives the index the
    /// element will occupy.
    ///
    /// The closure runs inside the slot's exclusive initialization window,
    /// before the element becomes visible to any other thread. If `build`
    /// panics, the slot and its index are restored to the free list before
    /// the panic resumes, so a failing constructor never costs capacity.
    pub fn insert_with<F>(&self, build: F) -> Option<usize>
    where
        F: FnOnce(usize) -> T,
    {
        let index = self.free.pop(&self.slots)?;
        let slot = &self.slots[index as usize];
        let Some(init_word) = slot.begin_insert() else {
            // Lost the claim despite holding a popped index. Hand the index
            // straight back so effective capacity never shrinks.
            self.free.push(&self.slots, index);
            return None;
        };
        let mut rollback = InsertRollback {
            pool: self,
            index,
            init_word,
            armed: true,
        };
        let value = build(index as usize);
        rollback.armed = false;
        // SAFETY: we won the EMPTY -> INIT transition above and have not yet
        // published, so this thread has exclusive access to the cell.
        unsafe { slot.write(value) };
        slot.publish(init_word);
        Some(index as usize)
    }

    /// Remove the element at `index`, returning it by value.
    ///
    /// `None` if `index` is out of range or the slot holds no live element
    /// (including when a racing removal won the slot first); the losing call
    /// has no side effects.
    pub fn remove(&self, index: usize) -> Option<T> {
        let slot = self.slots.get(index)?;
        let removing_word = slot.begin_remove()?;
        // SAFETY: winning READY -> REMOVING grants exclusive access to the
        // initialized element, and we take it exactly once.
        let value = unsafe { slot.take() };
        slot.retire(removing_word);
        self.free.push(&self.slots, index as u32);
        Some(value)
    }

    /// Erase the element at `index`.
    ///
    /// `true` iff a live element was removed. Out-of-range indices and
    /// already-empty slots return `false` with no side effects; of two
    /// erasures racing on the same index, exactly one returns `true`.
    pub fn erase(&self, index: usize) -> bool {
        self.remove(index).is_some()
    }

    /// Read the element at `index` by value.
    ///
    /// O(1). The copy is guard-validated: it is returned only if the slot's
    /// state word was bit-identical before and after the copy, so a
    /// concurrent erase or reuse can never produce a torn value. `None` if
    /// `index` is out of range or the slot is not live.
    pub fn get(&self, index: usize) -> Option<T>
    where
        T: Copy,
    {
        self.slots.get(index)?.read_copy()
    }

    /// Whether `index` currently holds a live element.
    ///
    /// The answer is only a snapshot: a concurrent erase or insert may
    /// change it before the caller acts on it.
    pub fn contains(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|slot| slot.is_ready())
    }

    /// Borrow the element at `index`.
    ///
    /// This is the reference-returning lookup for element types that cannot
    /// be copied out. `None` if `index` is out of range or not live.
    ///
    /// # Safety
    ///
    /// The caller must guarantee that no thread erases (or removes) `index`
    /// for as long as the returned reference lives. The pool cannot detect a
    /// violation; a concurrent erase would drop the element under the
    /// borrow.
    pub unsafe fn get_ref(&self, index: usize) -> Option<&T> {
        let slot = self.slots.get(index)?;
        if slot.is_ready() {
            // SAFETY: READY observed with acquire ordering; the caller's
            // contract keeps the slot live for the borrow's lifetime.
            Some(unsafe { slot.value_ref() })
        } else {
            None
        }
    }

    /// Find the index of an element equal to `value`.
    ///
    /// O(capacity) scan; each slot is observed independently.
    pub fn find(&self, value: &T) -> Option<usize>
    where
        T: Copy + PartialEq,
    {
        self.find_where(|candidate| candidate == value).map(|(index, _)| index)
    }

    /// Find the first live element satisfying `pred`, returning its index
    /// and the observed value.
    ///
    /// O(capacity) scan over guard-validated copies; concurrent mutation
    /// during the scan may or may not be observed.
    pub fn find_where<P>(&self, mut pred: P) -> Option<(usize, T)>
    where
        T: Copy,
        P: FnMut(&T) -> bool,
    {
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(value) = slot.read_copy() {
                if pred(&value) {
                    return Some((index, value));
                }
            }
        }
        None
    }

    /// Visit every slot observed live during the scan with `(index, value)`.
    ///
    /// There is no snapshot isolation: elements inserted or erased while the
    /// scan runs may or may not be visited.
    pub fn for_each<F>(&self, mut visit: F)
    where
        T: Copy,
        F: FnMut(usize, T),
    {
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(value) = slot.read_copy() {
                visit(index, value);
            }
        }
    }

    /// Iterator over `(index, value)` for every slot observed live.
    ///
    /// Same observation semantics as [`SlotPool::for_each`].
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            pool: self,
            index: 0,
        }
    }

    /// Number of live elements.
    ///
    /// O(capacity) scan, deliberately uncached: a shared counter would put
    /// a contended atomic on every insert and erase. Under concurrent
    /// mutation the count is a per-slot snapshot, not a linearizable total.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_ready()).count()
    }

    /// Whether no slot currently holds a live element.
    pub fn is_empty(&self) -> bool {
        !self.slots.iter().any(|slot| slot.is_ready())
    }

    /// The fixed capacity chosen at construction.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl<T> Drop for SlotPool<T> {
    /// Drops every live element in place, then releases the slot slice as
    /// one block.
    fn drop(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.drop_live();
        }
    }
}

/// Iterator over the live `(index, value)` pairs of a [`SlotPool`].
///
/// Created by [`SlotPool::iter`]. Each yielded value is an independently
/// guard-validated copy; the iterator holds no lock and freezes nothing.
pub struct Iter<'a, T> {
    pool: &'a SlotPool<T>,
    index: usize,
}

impl<T: Copy> Iterator for Iter<'_, T> {
    type Item = (usize, T);

    fn next(&mut self) -> Option<(usize, T)> {
        while self.index < self.pool.slots.len() {
            let index = self.index;
            self.index += 1;
            if let Some(value) = self.pool.slots[index].read_copy() {
                return Some((index, value));
            }
        }
        None
    }
}

/// Restores a claimed slot if the caller's constructor unwinds between the
/// `EMPTY -> INIT` win and publication.
struct InsertRollback<'a, T> {
    pool: &'a SlotPool<T>,
    index: u32,
    init_word: u64,
    armed: bool,
}

impl<T> Drop for InsertRollback<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            let slot = &self.pool.slots[self.index as usize];
            slot.abort_insert(self.init_word);
            self.pool.free.push(&self.pool.slots, self.index);
        }
    }
}
