use std::cmp::Ordering;
use std::fmt;
use std::iter::{FromIterator, FusedIterator};
use std::marker::PhantomData;
use std::mem;
use smallvec::SmallVec;
use crate::{
	cache::Lookaside,
	generic::{
		key::{Arrangement, Direction, TreeKey},
		node::{Node, Side}
	},
	Store,
	StoreMut
};

mod ext;

pub use ext::*;

/// Descent path entries kept inline before spilling to the heap.
///
/// An AVL tree stays below this depth until it holds a few million entries.
const PATH_DEPTH: usize = 32;

/// A root-to-node descent path: each entry is a node id and the side taken
/// out of it.
type Path = SmallVec<[(usize, Side); PATH_DEPTH]>;

/// Duplicate-key policy, selected at instantiation time.
pub trait DuplicatePolicy {
	/// Whether an equal key chains under the existing node instead of being
	/// rejected.
	const CHAIN: bool;
}

/// Reject insertion of a key already present.
pub enum Reject {}

impl DuplicatePolicy for Reject {
	const CHAIN: bool = false;
}

/// Chain values with an equal key under the existing node, leaving the tree
/// shape untouched.
pub enum Chain {}

impl DuplicatePolicy for Chain {
	const CHAIN: bool = true;
}

/// A rejected insertion. The value that was not inserted is handed back.
#[derive(Debug, PartialEq, Eq)]
pub enum InsertError<V> {
	/// The key is already present and the policy rejects duplicates.
	Duplicate(V),
	/// The interval key intersects an existing interval without matching it
	/// exactly.
	Overlap(V),
	/// The key fails its well-formedness check.
	MalformedKey(V)
}

impl<V> InsertError<V> {
	/// Recover the value that was not inserted.
	pub fn into_value(self) -> V {
		match self {
			InsertError::Duplicate(value) => value,
			InsertError::Overlap(value) => value,
			InsertError::MalformedKey(value) => value
		}
	}
}

impl<V> fmt::Display for InsertError<V> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			InsertError::Duplicate(_) => write!(f, "key is already present"),
			InsertError::Overlap(_) => write!(f, "interval intersects an existing key"),
			InsertError::MalformedKey(_) => write!(f, "key is not well formed")
		}
	}
}

impl<V: fmt::Debug> std::error::Error for InsertError<V> {}

/// An ordered map built on an AVL tree whose nodes live in an external
/// [`Store`].
///
/// The tree core is specialized over three capabilities: the key
/// representation ([`TreeKey`]: scalar or interval), the node store (any
/// arena handing out stable `usize` ids) and the duplicate policy
/// ([`Reject`] or [`Chain`]). All specializations share the same descent,
/// rotation and rebalancing code.
///
/// Every public operation leaves the structural invariants intact: search
/// order under the configured comparator, and for every node a height
/// difference of at most one between its subtrees.
///
/// # Basic usage
///
/// ```
/// use avl_slab::{AvlMap, Direction};
///
/// let mut map: AvlMap<u32, &str> = AvlMap::new();
/// map.insert(10, "ten").unwrap();
/// map.insert(20, "twenty").unwrap();
/// map.insert(30, "thirty").unwrap();
///
/// assert_eq!(map.get(&20), Some(&"twenty"));
/// assert_eq!(map.get_best_fit(&15, Direction::Above), Some((&20, &"twenty")));
/// assert_eq!(map.remove(&10), Some("ten"));
/// assert_eq!(map.len(), 2);
/// ```
///
/// # Lookaside cache
///
/// A tree created with [`with_cache`](AvlTree::with_cache) keeps a small
/// direct-mapped cache of recently matched nodes consulted by exact-match
/// lookups. The cache changes the cost of a lookup, never its result.
pub struct AvlTree<K, V, C, D = Reject> {
	/// Allocated and free nodes.
	nodes: C,

	/// Root node id.
	root: Option<usize>,

	/// Number of entries, chained duplicates included.
	len: usize,

	/// Lookaside cache consulted by exact-match lookups.
	cache: Option<Lookaside>,

	k: PhantomData<K>,
	v: PhantomData<V>,
	d: PhantomData<D>
}

impl<K, V, C, D> AvlTree<K, V, C, D> {
	/// Create a new empty tree.
	pub fn new() -> AvlTree<K, V, C, D>
	where
		C: Default
	{
		AvlTree {
			nodes: Default::default(),
			root: None,
			len: 0,
			cache: None,
			k: PhantomData,
			v: PhantomData,
			d: PhantomData
		}
	}

	/// Create a new empty tree with a lookaside cache of at least `buckets`
	/// slots (rounded up to a power of two).
	pub fn with_cache(buckets: usize) -> AvlTree<K, V, C, D>
	where
		C: Default
	{
		AvlTree {
			cache: Some(Lookaside::new(buckets)),
			..AvlTree::new()
		}
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.root.is_none()
	}

	/// Number of entries, chained duplicates included.
	#[inline]
	pub fn len(&self) -> usize {
		self.len
	}

	/// The node store backing this tree.
	#[inline]
	pub fn storage(&self) -> &C {
		&self.nodes
	}

	/// Disassemble the tree into its store, root id and entry count.
	///
	/// Together with [`from_raw_parts`](AvlTree::from_raw_parts) this lets a
	/// tree handle be rebuilt over storage that moved: because links are
	/// store ids, relocation needs no fix-up pass.
	pub fn into_raw_parts(self) -> (C, Option<usize>, usize) {
		(self.nodes, self.root, self.len)
	}

	/// Rebuild a tree handle over existing storage, e.g. after the backing
	/// arena was cloned, moved or attached from a shared mapping.
	///
	/// The parts must originate from [`into_raw_parts`](AvlTree::into_raw_parts)
	/// of a tree over the same logical content; lookups on the rebuilt
	/// handle return exactly what they returned before the handoff.
	pub fn from_raw_parts(nodes: C, root: Option<usize>, len: usize) -> AvlTree<K, V, C, D> {
		AvlTree {
			nodes,
			root,
			len,
			cache: None,
			k: PhantomData,
			v: PhantomData,
			d: PhantomData
		}
	}
}

impl<K: TreeKey, V, C: Store<Node<K, V>>, D> AvlTree<K, V, C, D> {
	/// Get the node associated to the given `id`.
	///
	/// Panics if `id` is not occupied.
	#[inline]
	fn node_ref(&self, id: usize) -> &Node<K, V> {
		self.nodes.get(id).unwrap()
	}

	#[inline]
	fn entry(&self, id: usize) -> (&K, &V) {
		let node = self.node_ref(id);
		(node.key(), node.value())
	}

	/// Plain ordered descent to the node matching `probe`.
	fn search(&self, probe: &K::Probe) -> Option<usize> {
		let mut id = self.root?;
		loop {
			let node = self.node_ref(id);
			match node.key().compare(probe) {
				Ordering::Greater => id = node.left()?,
				Ordering::Less => id = node.right()?,
				Ordering::Equal => return Some(id)
			}
		}
	}

	/// Exact-match lookup through the lookaside cache when one is attached.
	///
	/// A cached id is trusted only after comparing the live node's key, so a
	/// slot holding a vacated or reused id falls through to the descent. A
	/// successful descent overwrites the slot.
	fn locate(&self, probe: &K::Probe) -> Option<usize> {
		let cache = match &self.cache {
			Some(cache) => cache,
			None => return self.search(probe)
		};
		let slot = cache.slot(probe);
		if let Some(id) = cache.load(slot) {
			if let Some(node) = self.nodes.get(id) {
				if node.key().compare(probe) == Ordering::Equal {
					return Some(id);
				}
			}
		}
		let found = self.search(probe);
		if let Some(id) = found {
			cache.store(slot, id);
		}
		found
	}

	/// Returns a reference to the value matching `probe` exactly.
	///
	/// For interval keys, any contained point matches.
	///
	/// # Example
	///
	/// ```
	/// use avl_slab::AvlMap;
	///
	/// let mut map: AvlMap<u32, &str> = AvlMap::new();
	/// map.insert(1, "a").unwrap();
	/// assert_eq!(map.get(&1), Some(&"a"));
	/// assert_eq!(map.get(&2), None);
	/// ```
	#[inline]
	pub fn get(&self, probe: &K::Probe) -> Option<&V> {
		self.locate(probe).map(|id| self.node_ref(id).value())
	}

	/// Returns the key-value pair matching `probe` exactly.
	#[inline]
	pub fn get_key_value(&self, probe: &K::Probe) -> Option<(&K, &V)> {
		self.locate(probe).map(|id| self.entry(id))
	}

	/// Returns `true` if an entry matches `probe` exactly.
	#[inline]
	pub fn contains(&self, probe: &K::Probe) -> bool {
		self.locate(probe).is_some()
	}

	/// Exact-match lookup that also reports the last node visited on the
	/// search path, even on a miss.
	///
	/// The second component is the would-be parent: the entry a caller
	/// chasing a failed lookup with an insertion would attach under. It is
	/// `None` only when the tree is empty or the match sits at the root.
	///
	/// # Example
	///
	/// ```
	/// use avl_slab::AvlMap;
	///
	/// let mut map: AvlMap<u32, &str> = AvlMap::new();
	/// map.insert(10, "a").unwrap();
	/// map.insert(20, "b").unwrap();
	///
	/// let (hit, last) = map.get_with_parent(&15);
	/// assert_eq!(hit, None);
	/// assert!(last.is_some());
	/// ```
	pub fn get_with_parent(&self, probe: &K::Probe) -> (Option<(&K, &V)>, Option<(&K, &V)>) {
		let mut parent = None;
		let mut cur = self.root;
		while let Some(id) = cur {
			let node = self.node_ref(id);
			match node.key().compare(probe) {
				Ordering::Greater => {
					parent = Some(id);
					cur = node.left();
				}
				Ordering::Less => {
					parent = Some(id);
					cur = node.right();
				}
				Ordering::Equal => {
					return (Some(self.entry(id)), parent.map(|p| self.entry(p)));
				}
			}
		}
		(None, parent.map(|p| self.entry(p)))
	}

	/// Internal best-fit descent returning the matched node id.
	fn best_fit_id(&self, probe: &K::Probe, direction: Direction) -> Option<usize> {
		let mut id = self.root?;
		let mut last_turn = None;
		loop {
			let node = self.node_ref(id);
			match (node.key().compare(probe), direction) {
				(Ordering::Equal, _) => return Some(id),
				(Ordering::Greater, Direction::Above) => match node.left() {
					Some(left) => {
						last_turn = Some(id);
						id = left;
					}
					None => return Some(id)
				},
				(Ordering::Greater, Direction::Below) => match node.left() {
					Some(left) => id = left,
					None => return last_turn
				},
				(Ordering::Less, Direction::Above) => match node.right() {
					Some(right) => id = right,
					None => return last_turn
				},
				(Ordering::Less, Direction::Below) => match node.right() {
					Some(right) => {
						last_turn = Some(id);
						id = right;
					}
					None => return Some(id)
				}
			}
		}
	}

	/// Returns the entry whose key fits `probe` best in the given direction.
	///
	/// [`Direction::Above`] finds the smallest key greater than or equal to
	/// the probe, [`Direction::Below`] the largest key less than or equal to
	/// it. An exact match wins in either direction. Returns `None` when no
	/// qualifying entry exists.
	///
	/// # Example
	///
	/// ```
	/// use avl_slab::{AvlMap, Direction};
	///
	/// let mut map: AvlMap<u32, ()> = AvlMap::new();
	/// for key in [10, 20, 30] {
	///     map.insert(key, ()).unwrap();
	/// }
	///
	/// assert_eq!(map.get_best_fit(&15, Direction::Above).map(|(k, _)| *k), Some(20));
	/// assert_eq!(map.get_best_fit(&15, Direction::Below).map(|(k, _)| *k), Some(10));
	/// assert_eq!(map.get_best_fit(&20, Direction::Above).map(|(k, _)| *k), Some(20));
	/// assert_eq!(map.get_best_fit(&35, Direction::Above), None);
	/// assert_eq!(map.get_best_fit(&5, Direction::Below), None);
	/// ```
	#[inline]
	pub fn get_best_fit(&self, probe: &K::Probe, direction: Direction) -> Option<(&K, &V)> {
		self.best_fit_id(probe, direction).map(|id| self.entry(id))
	}

	/// Returns the entry with the smallest key.
	pub fn first_key_value(&self) -> Option<(&K, &V)> {
		let mut id = self.root?;
		while let Some(left) = self.node_ref(id).left() {
			id = left;
		}
		Some(self.entry(id))
	}

	/// Returns the entry with the largest key.
	pub fn last_key_value(&self) -> Option<(&K, &V)> {
		let mut id = self.root?;
		while let Some(right) = self.node_ref(id).right() {
			id = right;
		}
		Some(self.entry(id))
	}

	/// In-order enumeration of every entry, ascending by key, chained
	/// duplicates adjacent to their in-tree entry.
	///
	/// The iterator is lazy, finite and restartable (call `iter` again);
	/// the shared borrow it holds statically rules out mutation while it is
	/// in progress.
	#[inline]
	pub fn iter(&self) -> Iter<K, V, C, D> {
		Iter::new(self)
	}
}

impl<K: TreeKey, V, C: StoreMut<Node<K, V>>, D: DuplicatePolicy> AvlTree<K, V, C, D> {
	/// Get the node associated to the given `id` mutably.
	///
	/// Panics if `id` is not occupied.
	#[inline]
	fn node_mut(&mut self, id: usize) -> &mut Node<K, V> {
		self.nodes.get_mut(id).unwrap()
	}

	#[inline]
	fn height_of(&self, link: Option<usize>) -> u8 {
		match link {
			Some(id) => self.node_ref(id).height(),
			None => 0
		}
	}

	/// Recompute the recorded height of `id` from its children.
	fn fix_height(&mut self, id: usize) {
		let (left, right) = {
			let node = self.node_ref(id);
			(node.left(), node.right())
		};
		let height = 1 + self.height_of(left).max(self.height_of(right));
		self.node_mut(id).set_height(height);
	}

	/// Rotate the subtree rooted at `id` towards `side`, returning the id
	/// of the new subtree root. The child opposite to `side` must exist.
	fn rotate(&mut self, id: usize, side: Side) -> usize {
		let pivot = self.node_ref(id).child(side.opposite()).unwrap();
		let inner = self.node_ref(pivot).child(side);
		self.node_mut(id).set_child(side.opposite(), inner);
		self.node_mut(pivot).set_child(side, Some(id));
		self.fix_height(id);
		self.fix_height(pivot);
		pivot
	}

	/// Restore the AVL invariant at `id` with a single or double rotation,
	/// returning the id of the subtree root afterwards.
	fn rebalance(&mut self, id: usize) -> usize {
		let (left, right) = {
			let node = self.node_ref(id);
			(node.left(), node.right())
		};
		let lh = self.height_of(left);
		let rh = self.height_of(right);
		if lh > rh + 1 {
			let l = left.unwrap();
			let l_node = self.node_ref(l);
			if self.height_of(l_node.left()) < self.height_of(l_node.right()) {
				let new_left = self.rotate(l, Side::Left);
				self.node_mut(id).set_child(Side::Left, Some(new_left));
			}
			self.rotate(id, Side::Right)
		} else if rh > lh + 1 {
			let r = right.unwrap();
			let r_node = self.node_ref(r);
			if self.height_of(r_node.right()) < self.height_of(r_node.left()) {
				let new_right = self.rotate(r, Side::Right);
				self.node_mut(id).set_child(Side::Right, Some(new_right));
			}
			self.rotate(id, Side::Left)
		} else {
			self.fix_height(id);
			id
		}
	}

	/// Walk `path` from the deepest entry back to the root, restoring the
	/// AVL invariant at every ancestor and relinking rotated subtrees.
	fn rebalance_path(&mut self, path: &Path) {
		for i in (0..path.len()).rev() {
			let (id, _) = path[i];
			let new_root = self.rebalance(id);
			if i == 0 {
				self.root = Some(new_root);
			} else {
				let (parent, side) = path[i - 1];
				self.node_mut(parent).set_child(side, Some(new_root));
			}
		}
	}

	/// Ordered descent to `probe` recording the path taken.
	fn descend(&self, probe: &K::Probe) -> Option<(usize, Path)> {
		let mut path = Path::new();
		let mut cur = self.root;
		loop {
			let id = cur?;
			let (order, left, right) = {
				let node = self.node_ref(id);
				(node.key().compare(probe), node.left(), node.right())
			};
			match order {
				Ordering::Greater => {
					path.push((id, Side::Left));
					cur = left;
				}
				Ordering::Less => {
					path.push((id, Side::Right));
					cur = right;
				}
				Ordering::Equal => return Some((id, path))
			}
		}
	}

	/// Insert `value` under `key`.
	///
	/// The key is validated first; a rejected call leaves the tree exactly
	/// as it was and hands the value back inside the error. An equal key is
	/// rejected under the [`Reject`] policy and chained under the existing
	/// node (tree shape untouched) under [`Chain`]. An interval key
	/// intersecting an existing one without matching it exactly is always
	/// rejected.
	///
	/// # Example
	///
	/// ```
	/// use avl_slab::{AvlMap, InsertError};
	///
	/// let mut map: AvlMap<u32, &str> = AvlMap::new();
	/// assert!(map.insert(1, "a").is_ok());
	/// assert_eq!(map.insert(1, "b"), Err(InsertError::Duplicate("b")));
	/// assert_eq!(map.get(&1), Some(&"a"));
	/// ```
	pub fn insert(&mut self, key: K, value: V) -> Result<(), InsertError<V>> {
		if !key.well_formed() {
			return Err(InsertError::MalformedKey(value));
		}
		let mut path = Path::new();
		let mut cur = self.root;
		while let Some(id) = cur {
			let (arrangement, left, right) = {
				let node = self.node_ref(id);
				(node.key().arrange(&key), node.left(), node.right())
			};
			match arrangement {
				Arrangement::After => {
					path.push((id, Side::Left));
					cur = left;
				}
				Arrangement::Before => {
					path.push((id, Side::Right));
					cur = right;
				}
				Arrangement::Equal => {
					return if D::CHAIN {
						self.node_mut(id).push_chain(value);
						self.len += 1;
						Ok(())
					} else {
						Err(InsertError::Duplicate(value))
					};
				}
				Arrangement::Conflict => return Err(InsertError::Overlap(value))
			}
		}
		let id = self.nodes.insert(Node::new(key, value));
		match path.last().copied() {
			Some((parent, side)) => self.node_mut(parent).set_child(side, Some(id)),
			None => self.root = Some(id)
		}
		self.len += 1;
		self.rebalance_path(&path);
		Ok(())
	}

	/// Detach `target` from the tree and hand its payload back. `path` is
	/// the descent path from the root down to, excluding, `target`.
	fn remove_node(&mut self, target: usize, mut path: Path) -> (K, V, SmallVec<[V; 1]>) {
		let (left, right) = {
			let node = self.node_ref(target);
			(node.left(), node.right())
		};
		let removed = match (left, right) {
			(Some(_), Some(right)) => {
				// Two children: splice out the in-order successor and move
				// its payload into the target's slot, which keeps its links
				// and height.
				path.push((target, Side::Right));
				let mut succ = right;
				while let Some(left) = self.node_ref(succ).left() {
					path.push((succ, Side::Left));
					succ = left;
				}
				let succ_right = self.node_ref(succ).right();
				let (parent, side) = *path.last().unwrap();
				self.node_mut(parent).set_child(side, succ_right);
				let (key, value, chain) = self.nodes.remove(succ).into_parts();
				self.node_mut(target).replace_parts(key, value, chain)
			}
			(child, None) | (None, child) => {
				match path.last().copied() {
					Some((parent, side)) => self.node_mut(parent).set_child(side, child),
					None => self.root = child
				}
				self.nodes.remove(target).into_parts()
			}
		};
		self.len -= 1;
		self.rebalance_path(&path);
		removed
	}

	/// Remove the entry matching `probe` exactly, returning its value.
	///
	/// A node owning chained duplicates gives up its own value and promotes
	/// the most recently chained one in its place, leaving the tree shape
	/// untouched. Otherwise the node is spliced out and every ancestor up
	/// to the root is rebalanced.
	///
	/// # Example
	///
	/// ```
	/// use avl_slab::AvlMap;
	///
	/// let mut map: AvlMap<u32, &str> = AvlMap::new();
	/// map.insert(1, "a").unwrap();
	/// assert_eq!(map.remove(&1), Some("a"));
	/// assert_eq!(map.remove(&1), None);
	/// ```
	pub fn remove(&mut self, probe: &K::Probe) -> Option<V> {
		let (target, path) = self.descend(probe)?;
		let node = self.node_mut(target);
		if let Some(head) = node.pop_chain() {
			let value = mem::replace(node.value_mut(), head);
			self.len -= 1;
			return Some(value);
		}
		let (_, value, _) = self.remove_node(target, path);
		Some(value)
	}

	/// Remove the best fitting entry for `probe` in the given direction,
	/// returning its key and value.
	///
	/// Equivalent to [`get_best_fit`](AvlTree::get_best_fit) followed by a
	/// removal, except that a duplicate chained under the matched node is
	/// popped first: no relinking, no rebalance.
	pub fn remove_best_fit(&mut self, probe: &K::Probe, direction: Direction) -> Option<(K, V)> {
		let id = self.best_fit_id(probe, direction)?;
		let node = self.node_mut(id);
		if let Some(head) = node.pop_chain() {
			let key = *node.key();
			self.len -= 1;
			return Some((key, head));
		}
		let matched = self.node_ref(id).key().probe();
		let (target, path) = self.descend(&matched)?;
		let (key, value, _) = self.remove_node(target, path);
		Some((key, value))
	}

	/// Remove every entry and empty the cache.
	pub fn clear(&mut self) {
		self.root = None;
		self.len = 0;
		self.nodes.clear();
		if let Some(cache) = &self.cache {
			cache.clear();
		}
	}
}

impl<K, V, C: Clone, D> Clone for AvlTree<K, V, C, D> {
	/// An attached lookaside cache is cloned cold.
	fn clone(&self) -> AvlTree<K, V, C, D> {
		AvlTree {
			nodes: self.nodes.clone(),
			root: self.root,
			len: self.len,
			cache: self.cache.clone(),
			k: PhantomData,
			v: PhantomData,
			d: PhantomData
		}
	}
}

impl<K, V, C: Default, D> Default for AvlTree<K, V, C, D> {
	fn default() -> AvlTree<K, V, C, D> {
		AvlTree::new()
	}
}

impl<K, V, C, D> fmt::Debug for AvlTree<K, V, C, D>
where
	K: TreeKey + fmt::Debug,
	V: fmt::Debug,
	C: Store<Node<K, V>>
{
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_map().entries(self.iter()).finish()
	}
}

impl<K, V, C, D> PartialEq for AvlTree<K, V, C, D>
where
	K: TreeKey + PartialEq,
	V: PartialEq,
	C: Store<Node<K, V>>
{
	fn eq(&self, other: &AvlTree<K, V, C, D>) -> bool {
		self.len() == other.len()
			&& self
				.iter()
				.zip(other.iter())
				.all(|((k1, v1), (k2, v2))| k1 == k2 && v1 == v2)
	}
}

impl<K, V, C, D> Eq for AvlTree<K, V, C, D>
where
	K: TreeKey + Eq,
	V: Eq,
	C: Store<Node<K, V>>
{
}

impl<K, V, C> Extend<(K, V)> for AvlTree<K, V, C, Chain>
where
	K: TreeKey,
	C: StoreMut<Node<K, V>>
{
	/// Insert every entry under the chaining policy.
	///
	/// Malformed or overlapping interval keys are skipped.
	fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
		for (key, value) in iter {
			let _ = self.insert(key, value);
		}
	}
}

impl<K, V, C> FromIterator<(K, V)> for AvlTree<K, V, C, Chain>
where
	K: TreeKey,
	C: StoreMut<Node<K, V>> + Default
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> AvlTree<K, V, C, Chain> {
		let mut tree = AvlTree::new();
		tree.extend(iter);
		tree
	}
}

/// Lazy in-order enumeration of a tree.
///
/// Ascending key order; chained duplicates follow their in-tree entry.
pub struct Iter<'a, K, V, C, D = Reject> {
	tree: &'a AvlTree<K, V, C, D>,

	/// Nodes whose left spine has been pushed, deepest last.
	stack: Vec<usize>,

	/// Node being emitted and the position in its duplicate chain.
	chain: Option<(usize, usize)>,

	remaining: usize
}

impl<'a, K: TreeKey, V, C: Store<Node<K, V>>, D> Iter<'a, K, V, C, D> {
	fn new(tree: &'a AvlTree<K, V, C, D>) -> Iter<'a, K, V, C, D> {
		let mut iter = Iter {
			tree,
			stack: Vec::new(),
			chain: None,
			remaining: tree.len()
		};
		iter.push_left(tree.root);
		iter
	}

	fn push_left(&mut self, mut link: Option<usize>) {
		let tree = self.tree;
		while let Some(id) = link {
			self.stack.push(id);
			link = tree.node_ref(id).left();
		}
	}
}

impl<'a, K: TreeKey, V, C: Store<Node<K, V>>, D> Iterator for Iter<'a, K, V, C, D> {
	type Item = (&'a K, &'a V);

	fn next(&mut self) -> Option<(&'a K, &'a V)> {
		let tree = self.tree;
		if let Some((id, i)) = self.chain {
			let node = tree.node_ref(id);
			if i < node.chain().len() {
				self.chain = Some((id, i + 1));
				self.remaining -= 1;
				return Some((node.key(), &node.chain()[i]));
			}
			self.chain = None;
		}
		let id = self.stack.pop()?;
		let node = tree.node_ref(id);
		self.push_left(node.right());
		self.chain = Some((id, 0));
		self.remaining -= 1;
		Some((node.key(), node.value()))
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		(self.remaining, Some(self.remaining))
	}
}

impl<'a, K: TreeKey, V, C: Store<Node<K, V>>, D> ExactSizeIterator for Iter<'a, K, V, C, D> {}

impl<'a, K: TreeKey, V, C: Store<Node<K, V>>, D> FusedIterator for Iter<'a, K, V, C, D> {}

impl<'a, K: TreeKey, V, C: Store<Node<K, V>>, D> IntoIterator for &'a AvlTree<K, V, C, D> {
	type Item = (&'a K, &'a V);
	type IntoIter = Iter<'a, K, V, C, D>;

	fn into_iter(self) -> Iter<'a, K, V, C, D> {
		self.iter()
	}
}

/// Owning in-order enumeration; drains the store as it goes.
pub struct IntoIter<K: TreeKey, V, C> {
	nodes: C,
	order: std::vec::IntoIter<usize>,
	chain: Option<(K, smallvec::IntoIter<[V; 1]>)>
}

impl<K: TreeKey, V, C: StoreMut<Node<K, V>>> Iterator for IntoIter<K, V, C> {
	type Item = (K, V);

	fn next(&mut self) -> Option<(K, V)> {
		if let Some((key, chain)) = &mut self.chain {
			if let Some(value) = chain.next() {
				return Some((*key, value));
			}
			self.chain = None;
		}
		let id = self.order.next()?;
		let (key, value, chain) = self.nodes.remove(id).into_parts();
		self.chain = Some((key, chain.into_iter()));
		Some((key, value))
	}
}

impl<K: TreeKey, V, C: StoreMut<Node<K, V>>> FusedIterator for IntoIter<K, V, C> {}

impl<K: TreeKey, V, C: StoreMut<Node<K, V>>, D> IntoIterator for AvlTree<K, V, C, D> {
	type Item = (K, V);
	type IntoIter = IntoIter<K, V, C>;

	fn into_iter(self) -> IntoIter<K, V, C> {
		let mut order = Vec::with_capacity(self.len());
		let mut stack = Vec::new();
		let mut link = self.root;
		loop {
			while let Some(id) = link {
				stack.push(id);
				link = self.node_ref(id).left();
			}
			match stack.pop() {
				Some(id) => {
					order.push(id);
					link = self.node_ref(id).right();
				}
				None => break
			}
		}
		IntoIter {
			nodes: self.nodes,
			order: order.into_iter(),
			chain: None
		}
	}
}
