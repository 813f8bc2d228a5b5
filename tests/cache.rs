use rand::{rngs::SmallRng, Rng, SeedableRng};
use avl_slab::{AvlExt, AvlMap, Direction};

const SEED: u64 = 0xcac4e;

/// The lookaside cache changes lookup cost, never lookup results: the same
/// operation sequence against a cached and an uncached tree must produce
/// identical outputs at every step.
#[test]
fn cache_is_invisible() {
	let mut rng = SmallRng::seed_from_u64(SEED);
	let mut cached: AvlMap<u32, u32> = AvlMap::with_cache(64);
	let mut plain: AvlMap<u32, u32> = AvlMap::new();

	for _ in 0..3000 {
		let key = rng.gen_range(0..300);
		match rng.gen_range(0..5) {
			0 | 1 => {
				assert_eq!(
					cached.insert(key, key * 3).is_ok(),
					plain.insert(key, key * 3).is_ok()
				);
			}
			// Removal may leave a stale id in a cache slot; the key check
			// on the next hit has to shrug it off.
			2 => assert_eq!(cached.remove(&key), plain.remove(&key)),
			3 => assert_eq!(cached.get(&key), plain.get(&key)),
			_ => {
				assert_eq!(
					cached.get_best_fit(&key, Direction::Above),
					plain.get_best_fit(&key, Direction::Above)
				);
				assert_eq!(
					cached.get_best_fit(&key, Direction::Below),
					plain.get_best_fit(&key, Direction::Below)
				);
			}
		}
		assert_eq!(cached.len(), plain.len());
	}
	cached.validate();
	assert_eq!(cached, plain);
}

/// Repeated hits on the same key keep answering correctly through the
/// cached path, including after the entry is removed and reinserted with a
/// different value and a (possibly) different node id.
#[test]
fn stale_slots_never_lie() {
	let mut map: AvlMap<u32, u32> = AvlMap::with_cache(8);
	for key in 0..32u32 {
		map.insert(key, key).unwrap();
	}

	// Warm the slot.
	assert_eq!(map.get(&17), Some(&17));
	assert_eq!(map.get(&17), Some(&17));

	assert_eq!(map.remove(&17), Some(17));
	assert_eq!(map.get(&17), None);

	map.insert(17, 1717).unwrap();
	assert_eq!(map.get(&17), Some(&1717));
	map.validate();
}

#[test]
fn cached_misses() {
	let map: AvlMap<u32, u32> = AvlMap::with_cache(16);
	assert_eq!(map.get(&7), None);

	let mut map = map;
	map.insert(7, 7).unwrap();
	// A miss never poisons the slot for the following hit.
	assert_eq!(map.get(&7), Some(&7));
}

#[test]
fn clear_empties_cache() {
	let mut map: AvlMap<u32, u32> = AvlMap::with_cache(16);
	for key in 0..16u32 {
		map.insert(key, key).unwrap();
		let _ = map.get(&key);
	}

	map.clear();
	assert_eq!(map.get(&3), None);

	map.insert(3, 33).unwrap();
	assert_eq!(map.get(&3), Some(&33));
}
