#[cfg(feature = "std-slab")]
use slab::Slab;

/// Read access to the arena holding the nodes of a tree.
///
/// Nodes are addressed by the stable `usize` ids handed out by
/// [`StoreMut::insert`]. Ids never encode an address, so they survive any
/// relocation of the backing storage: a tree built over a `Store` can be
/// moved, cloned or reattached from a shared mapping and every link stays
/// valid.
pub trait Store<T> {
	/// Get the element with the given `id`, if the slot is occupied.
	fn get(&self, id: usize) -> Option<&T>;
}

/// Write access to the arena holding the nodes of a tree.
///
/// The tree core never allocates through any other channel: every node it
/// links was handed to it by [`insert`](StoreMut::insert) and every node it
/// unlinks is handed back through [`remove`](StoreMut::remove).
pub trait StoreMut<T>: Store<T> {
	/// Drop every element and free all slots.
	fn clear(&mut self);

	/// Get the element with the given `id` mutably.
	fn get_mut(&mut self, id: usize) -> Option<&mut T>;

	/// Place `t` in a free slot and return its id.
	fn insert(&mut self, t: T) -> usize;

	/// Free the slot `id`, handing its content back.
	///
	/// Panics if the slot is vacant.
	fn remove(&mut self, id: usize) -> T;
}

impl<'a, T, C: Store<T>> Store<T> for &'a C {
	fn get(&self, id: usize) -> Option<&T> {
		C::get(*self, id)
	}
}

impl<'a, T, C: Store<T>> Store<T> for &'a mut C {
	fn get(&self, id: usize) -> Option<&T> {
		C::get(*self, id)
	}
}

impl<'a, T, C: StoreMut<T>> StoreMut<T> for &'a mut C {
	fn clear(&mut self) {
		C::clear(*self)
	}

	fn get_mut(&mut self, id: usize) -> Option<&mut T> {
		C::get_mut(*self, id)
	}

	fn insert(&mut self, t: T) -> usize {
		C::insert(*self, t)
	}

	fn remove(&mut self, id: usize) -> T {
		C::remove(*self, id)
	}
}

#[cfg(feature = "std-slab")]
impl<T> Store<T> for Slab<T> {
	fn get(&self, id: usize) -> Option<&T> {
		self.get(id)
	}
}

#[cfg(feature = "std-slab")]
impl<T> StoreMut<T> for Slab<T> {
	fn clear(&mut self) {
		self.clear()
	}

	fn get_mut(&mut self, id: usize) -> Option<&mut T> {
		self.get_mut(id)
	}

	fn insert(&mut self, t: T) -> usize {
		self.insert(t)
	}

	fn remove(&mut self, id: usize) -> T {
		self.remove(id)
	}
}
