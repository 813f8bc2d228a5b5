//! Reader/writer locking shim over the tree core.
use parking_lot::RwLock;
use crate::{
	generic::{
		key::{Direction, TreeKey},
		node::Node,
		tree::{AvlTree, DuplicatePolicy, InsertError, Reject}
	},
	Store,
	StoreMut
};

/// A tree behind a reader/writer lock.
///
/// Every operation holds the lock for its whole duration: shared mode for
/// lookups and enumeration, exclusive mode for mutations. Guards are
/// scoped, so the lock is released on every exit path, misses included.
/// Concurrent readers may still update an attached lookaside cache; its
/// slots are single atomic words, so they never observe a torn entry.
///
/// The core itself is free of synchronization; this wrapper is the only
/// place a lock appears.
///
/// # Example
///
/// ```
/// use avl_slab::RwAvlMap;
///
/// let map: RwAvlMap<u32, String> = RwAvlMap::new();
/// map.insert(1, "one".to_string()).unwrap();
///
/// assert_eq!(map.get(&1), Some("one".to_string()));
/// assert_eq!(map.read(|tree| tree.len()), 1);
/// ```
pub struct RwTree<K, V, C, D = Reject> {
	inner: RwLock<AvlTree<K, V, C, D>>
}

impl<K, V, C, D> RwTree<K, V, C, D> {
	/// Create a new empty locked tree.
	pub fn new() -> RwTree<K, V, C, D>
	where
		C: Default
	{
		RwTree {
			inner: RwLock::new(AvlTree::new())
		}
	}

	/// Create a new empty locked tree with a lookaside cache of at least
	/// `buckets` slots.
	pub fn with_cache(buckets: usize) -> RwTree<K, V, C, D>
	where
		C: Default
	{
		RwTree {
			inner: RwLock::new(AvlTree::with_cache(buckets))
		}
	}

	/// Wrap an existing tree.
	pub fn from_tree(tree: AvlTree<K, V, C, D>) -> RwTree<K, V, C, D> {
		RwTree {
			inner: RwLock::new(tree)
		}
	}

	/// Unwrap the tree, discarding the lock.
	pub fn into_inner(self) -> AvlTree<K, V, C, D> {
		self.inner.into_inner()
	}

	pub fn len(&self) -> usize {
		self.inner.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.read().is_empty()
	}

	/// Run `f` under the shared lock, e.g. to enumerate.
	pub fn read<R>(&self, f: impl FnOnce(&AvlTree<K, V, C, D>) -> R) -> R {
		f(&self.inner.read())
	}

	/// Run `f` under the exclusive lock.
	pub fn write<R>(&self, f: impl FnOnce(&mut AvlTree<K, V, C, D>) -> R) -> R {
		f(&mut self.inner.write())
	}
}

impl<K: TreeKey, V, C: Store<Node<K, V>>, D> RwTree<K, V, C, D> {
	/// Shared-mode exact-match presence check.
	pub fn contains(&self, probe: &K::Probe) -> bool {
		self.inner.read().contains(probe)
	}
}

impl<K: TreeKey, V: Clone, C: Store<Node<K, V>>, D> RwTree<K, V, C, D> {
	/// Shared-mode exact-match lookup.
	pub fn get(&self, probe: &K::Probe) -> Option<V> {
		self.inner.read().get(probe).cloned()
	}

	/// Shared-mode exact-match lookup returning the key as well.
	pub fn get_key_value(&self, probe: &K::Probe) -> Option<(K, V)> {
		self.inner
			.read()
			.get_key_value(probe)
			.map(|(key, value)| (*key, value.clone()))
	}

	/// Shared-mode best-fit lookup.
	pub fn get_best_fit(&self, probe: &K::Probe, direction: Direction) -> Option<(K, V)> {
		self.inner
			.read()
			.get_best_fit(probe, direction)
			.map(|(key, value)| (*key, value.clone()))
	}

	/// Shared-mode lookup reporting the last node visited as well.
	pub fn get_with_parent(&self, probe: &K::Probe) -> (Option<(K, V)>, Option<(K, V)>) {
		let guard = self.inner.read();
		let (hit, last) = guard.get_with_parent(probe);
		(
			hit.map(|(key, value)| (*key, value.clone())),
			last.map(|(key, value)| (*key, value.clone()))
		)
	}
}

impl<K: TreeKey, V, C: StoreMut<Node<K, V>>, D: DuplicatePolicy> RwTree<K, V, C, D> {
	/// Exclusive-mode insertion.
	pub fn insert(&self, key: K, value: V) -> Result<(), InsertError<V>> {
		self.inner.write().insert(key, value)
	}

	/// Exclusive-mode exact-match removal.
	pub fn remove(&self, probe: &K::Probe) -> Option<V> {
		self.inner.write().remove(probe)
	}

	/// Exclusive-mode best-fit removal.
	pub fn remove_best_fit(&self, probe: &K::Probe, direction: Direction) -> Option<(K, V)> {
		self.inner.write().remove_best_fit(probe, direction)
	}

	/// Exclusive-mode clear.
	pub fn clear(&self) {
		self.inner.write().clear()
	}
}

impl<K, V, C: Default, D> Default for RwTree<K, V, C, D> {
	fn default() -> RwTree<K, V, C, D> {
		RwTree::new()
	}
}
