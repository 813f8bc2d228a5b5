use crate::{
	generic::{
		key::{Arrangement, TreeKey},
		node::Node,
		tree::AvlTree
	},
	Store
};

/// Extension methods.
///
/// This trait can be imported to access the internal structure of the tree:
/// node ids, raw nodes and the invariant checker. These methods are not
/// intended for everyday use, but extensions and tests build on them.
pub trait AvlExt<K, V> {
	/// Get the root node id.
	///
	/// Returns `None` if the tree is empty.
	fn root_id(&self) -> Option<usize>;

	/// Get the node associated to the given `id`.
	///
	/// Panics if `id` is not occupied.
	fn node(&self, id: usize) -> &Node<K, V>;

	/// Height of the whole tree; 0 when empty.
	fn height(&self) -> u8;

	/// Check every structural invariant, panicking on the first violation.
	///
	/// Checked for every reachable node: search ordering under the key's
	/// comparator, key well-formedness, recorded height consistency, the
	/// AVL balance bound, and that the entry count matches `len`.
	fn validate(&self);
}

impl<K: TreeKey, V, C: Store<Node<K, V>>, D> AvlExt<K, V> for AvlTree<K, V, C, D> {
	fn root_id(&self) -> Option<usize> {
		self.root
	}

	fn node(&self, id: usize) -> &Node<K, V> {
		self.node_ref(id)
	}

	fn height(&self) -> u8 {
		match self.root {
			Some(id) => self.node_ref(id).height(),
			None => 0
		}
	}

	fn validate(&self) {
		let count = match self.root {
			Some(id) => validate_in(self, id, None, None).1,
			None => 0
		};
		assert_eq!(count, self.len(), "entry count out of sync");
	}
}

/// Check the subtree rooted at `id` against the bounds inherited from its
/// ancestors, returning its height and entry count.
fn validate_in<K, V, C, D>(
	tree: &AvlTree<K, V, C, D>,
	id: usize,
	lower: Option<&K>,
	upper: Option<&K>
) -> (u8, usize)
where
	K: TreeKey,
	C: Store<Node<K, V>>
{
	let node = tree.node(id);
	let key = node.key();
	assert!(key.well_formed(), "malformed key in tree");
	if let Some(lower) = lower {
		assert_eq!(
			lower.arrange(key),
			Arrangement::Before,
			"ordering violated left of node {}",
			id
		);
	}
	if let Some(upper) = upper {
		assert_eq!(
			upper.arrange(key),
			Arrangement::After,
			"ordering violated right of node {}",
			id
		);
	}
	let (lh, lc) = match node.left() {
		Some(left) => validate_in(tree, left, lower, Some(key)),
		None => (0, 0)
	};
	let (rh, rc) = match node.right() {
		Some(right) => validate_in(tree, right, Some(key), upper),
		None => (0, 0)
	};
	assert!(
		lh.max(rh) - lh.min(rh) <= 1,
		"balance violated at node {} ({} vs {})",
		id,
		lh,
		rh
	);
	assert_eq!(node.height(), 1 + lh.max(rh), "height out of sync at node {}", id);
	(node.height(), lc + rc + 1 + node.chain().len())
}
