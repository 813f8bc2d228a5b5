use smallvec::SmallVec;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Side of a child link.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
	Left,
	Right
}

impl Side {
	#[inline]
	pub fn opposite(self) -> Side {
		match self {
			Side::Left => Side::Right,
			Side::Right => Side::Left
		}
	}
}

/// A tree node.
///
/// Child links are ids into the [`Store`](crate::Store) the tree was built
/// on; a node never holds an absolute reference to another node. Values
/// sharing this node's key hang off it as an owned sequence (the duplicate
/// chain) without participating in the tree shape.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Node<K, V> {
	key: K,
	value: V,

	/// Height of the subtree rooted here; a leaf has height 1.
	height: u8,

	left: Option<usize>,
	right: Option<usize>,

	/// Values chained under this node by the `Chain` duplicate policy.
	chain: SmallVec<[V; 1]>
}

impl<K, V> Node<K, V> {
	/// Create a detached leaf node.
	#[inline]
	pub fn new(key: K, value: V) -> Node<K, V> {
		Node {
			key,
			value,
			height: 1,
			left: None,
			right: None,
			chain: SmallVec::new()
		}
	}

	#[inline]
	pub fn key(&self) -> &K {
		&self.key
	}

	#[inline]
	pub fn value(&self) -> &V {
		&self.value
	}

	#[inline]
	pub fn value_mut(&mut self) -> &mut V {
		&mut self.value
	}

	#[inline]
	pub fn height(&self) -> u8 {
		self.height
	}

	#[inline]
	pub fn set_height(&mut self, height: u8) {
		self.height = height
	}

	#[inline]
	pub fn left(&self) -> Option<usize> {
		self.left
	}

	#[inline]
	pub fn right(&self) -> Option<usize> {
		self.right
	}

	#[inline]
	pub fn child(&self, side: Side) -> Option<usize> {
		match side {
			Side::Left => self.left,
			Side::Right => self.right
		}
	}

	#[inline]
	pub fn set_child(&mut self, side: Side, link: Option<usize>) {
		match side {
			Side::Left => self.left = link,
			Side::Right => self.right = link
		}
	}

	/// The duplicate chain, most recently inserted value last.
	#[inline]
	pub fn chain(&self) -> &[V] {
		&self.chain
	}

	/// Chain `value` under this node.
	#[inline]
	pub fn push_chain(&mut self, value: V) {
		self.chain.push(value)
	}

	/// Unlink the most recently chained value, if any.
	#[inline]
	pub fn pop_chain(&mut self) -> Option<V> {
		self.chain.pop()
	}

	/// Take the payload out of a detached node.
	#[inline]
	pub fn into_parts(self) -> (K, V, SmallVec<[V; 1]>) {
		(self.key, self.value, self.chain)
	}

	/// Replace the payload in place, handing the previous one back.
	///
	/// Links and height are untouched: this is how a node slot changes
	/// identity when its in-order successor is spliced out.
	#[inline]
	pub fn replace_parts(
		&mut self,
		key: K,
		value: V,
		chain: SmallVec<[V; 1]>
	) -> (K, V, SmallVec<[V; 1]>) {
		(
			std::mem::replace(&mut self.key, key),
			std::mem::replace(&mut self.value, value),
			std::mem::replace(&mut self.chain, chain)
		)
	}
}
