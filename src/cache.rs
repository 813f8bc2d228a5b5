//! Lookaside cache over exact-match lookups.
use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Slot value marking an empty bucket. No slab ever hands out this id.
const VACANT: usize = usize::MAX;

/// Direct-mapped cache of most-recently-matched node ids.
///
/// Exactly one slot per hash bucket: a colliding store simply evicts the
/// previous occupant, so correctness never depends on occupancy. Each slot
/// is a single aligned word updated with relaxed atomic loads and stores;
/// readers sharing the tree under a read lock may race on a slot and lose
/// updates, but can never observe a torn value. A hit is only trusted after
/// the caller re-checks the live node's key, so a stale, vacated or reused
/// id costs a miss, never a wrong result.
pub struct Lookaside {
	slots: Box<[AtomicUsize]>,
	mask: usize,
	hasher: RandomState
}

impl Lookaside {
	/// Create a cache with at least `buckets` slots, rounded up to a power
	/// of two.
	pub fn new(buckets: usize) -> Lookaside {
		let n = buckets.max(1).next_power_of_two();
		let slots: Vec<AtomicUsize> = (0..n).map(|_| AtomicUsize::new(VACANT)).collect();
		Lookaside {
			slots: slots.into_boxed_slice(),
			mask: n - 1,
			hasher: RandomState::new()
		}
	}

	/// Number of slots.
	#[inline]
	pub fn buckets(&self) -> usize {
		self.slots.len()
	}

	/// The slot index selected by `probe`.
	#[inline]
	pub fn slot<P: Hash>(&self, probe: &P) -> usize {
		let mut h = self.hasher.build_hasher();
		probe.hash(&mut h);
		(h.finish() as usize) & self.mask
	}

	/// The node id held by `slot`, if any.
	#[inline]
	pub fn load(&self, slot: usize) -> Option<usize> {
		match self.slots[slot].load(Ordering::Relaxed) {
			VACANT => None,
			id => Some(id)
		}
	}

	/// Record `id` as the most recent match for `slot`.
	#[inline]
	pub fn store(&self, slot: usize, id: usize) {
		self.slots[slot].store(id, Ordering::Relaxed)
	}

	/// Empty every slot.
	pub fn clear(&self) {
		for slot in self.slots.iter() {
			slot.store(VACANT, Ordering::Relaxed)
		}
	}
}

impl Clone for Lookaside {
	/// A cloned cache starts cold: its content is a performance artifact of
	/// the tree it was attached to.
	fn clone(&self) -> Lookaside {
		Lookaside::new(self.slots.len())
	}
}

impl fmt::Debug for Lookaside {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("Lookaside")
			.field("buckets", &self.slots.len())
			.finish()
	}
}
