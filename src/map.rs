use alloc::vec::Vec;
use core::{
    borrow::Borrow,
    fmt::{self, Debug},
    ops::{Bound, Index, RangeBounds},
};

use log::{debug, error};

use crate::{
    error::InvariantError,
    iter::{IntoIter, Iter, IterMut, Keys, Range, Values, ValuesMut},
    node::NIL,
    tree::RbTree,
};

/// An ordered map backed by a red-black tree stored in an index arena.
///
/// Lookups, inserts and removals are O(log n). Entries iterate in ascending
/// key order, and every node caches its subtree size so [`rank`] and
/// [`select`] are O(log n) as well.
///
/// A map built with [`with_verification`] re-checks every red-black
/// invariant after each mutation and panics on the first violation. That
/// check is O(n) and meant for tests and diagnostics only.
///
/// [`rank`]: RbMap::rank
/// [`select`]: RbMap::select
/// [`with_verification`]: RbMap::with_verification
///
/// # Examples
///
/// ```
/// use rb_map::RbMap;
///
/// let mut map = RbMap::new();
/// map.put(20, "b");
/// map.put(10, "a");
/// map.put(30, "c");
///
/// assert_eq!(map.get(&10), Some(&"a"));
/// assert_eq!(map.key_list(), [10, 20, 30]);
///
/// map.remove(&20);
/// assert_eq!(map.len(), 2);
/// ```
#[derive(Clone)]
pub struct RbMap<K, V> {
    tree: RbTree<K, V>,

    /// Post-mutation invariant check, installed in diagnostic mode
    verifier: Option<fn(&RbTree<K, V>)>,
}

fn assert_invariants<K: Ord + Debug, V>(tree: &RbTree<K, V>) {
    if let Err(err) = tree.verify() {
        error!("red-black invariant violated: {err}");
        panic!("red-black invariant violated: {err}");
    }
}

impl<K, V> RbMap<K, V> {
    /// Creates an empty map.
    pub const fn new() -> Self {
        Self {
            tree: RbTree::new(),
            verifier: None,
        }
    }

    /// Creates an empty map whose arena can hold `capacity` entries before
    /// reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tree: RbTree::with_capacity(capacity),
            verifier: None,
        }
    }

    /// Returns the number of entries.
    #[inline]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the map holds no entries.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.tree.len() == 0
    }

    /// Number of entries the arena can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.tree.store.capacity()
    }

    /// Returns `true` if invariants are re-checked after every mutation.
    #[inline]
    pub const fn is_verifying(&self) -> bool {
        self.verifier.is_some()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        debug!("clearing map with {} entries", self.len());
        self.tree.clear();
        self.after_mutation();
    }

    /// In-order iterator over `(key, value)` pairs.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.tree)
    }

    /// In-order iterator over `(key, &mut value)` pairs.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.tree)
    }

    /// In-order iterator over the keys.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys(self.iter())
    }

    /// Iterator over the values, in key order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values(self.iter())
    }

    /// Mutable iterator over the values, in key order.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut(self.iter_mut())
    }

    /// Collects the keys in ascending order.
    pub fn key_list(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.keys().cloned().collect()
    }

    /// Collects the values in key order.
    pub fn value_list(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.values().cloned().collect()
    }

    /// Entry with the smallest key.
    pub fn min(&self) -> Option<(&K, &V)> {
        self.entry_at(self.tree.first())
    }

    /// Entry with the largest key.
    pub fn max(&self) -> Option<(&K, &V)> {
        self.entry_at(self.tree.last())
    }

    /// Entry at zero-based position `k` in key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_map::RbMap;
    ///
    /// let map: RbMap<_, _> = [(30, 'c'), (10, 'a'), (20, 'b')].into_iter().collect();
    /// assert_eq!(map.select(1), Some((&20, &'b')));
    /// assert_eq!(map.select(3), None);
    /// ```
    pub fn select(&self, k: usize) -> Option<(&K, &V)> {
        self.entry_at(self.tree.select(k))
    }

    /// Number of nodes on the longest root-to-node path. Zero when empty.
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Number of black nodes on every root-to-leaf path. Zero when empty.
    pub fn black_height(&self) -> usize {
        self.tree.black_height()
    }

    /// Removes and returns the entry with the smallest key.
    pub fn pop_min(&mut self) -> Option<(K, V)> {
        self.pop_at(self.tree.first())
    }

    /// Removes and returns the entry with the largest key.
    pub fn pop_max(&mut self) -> Option<(K, V)> {
        self.pop_at(self.tree.last())
    }

    fn pop_at(&mut self, idx: usize) -> Option<(K, V)> {
        if idx == NIL {
            return None;
        }
        let entry = self.tree.remove_at(idx);
        self.after_mutation();
        Some(entry)
    }

    fn entry_at(&self, idx: usize) -> Option<(&K, &V)> {
        if idx == NIL {
            return None;
        }
        let node = self.tree.store.node(idx);
        Some((&node.key, &node.value))
    }

    #[inline]
    fn after_mutation(&self) {
        if let Some(check) = self.verifier {
            check(&self.tree);
        }
    }
}

impl<K: Ord + Debug, V> RbMap<K, V> {
    /// Creates an empty map in diagnostic mode: every invariant is re-checked
    /// after each `put`, `remove` and `clear`, panicking on a violation.
    pub fn with_verification() -> Self {
        let mut map = Self::new();
        map.set_verification(true);
        map
    }

    /// Turns post-mutation verification on or off. Turning it on checks the
    /// current tree right away.
    pub fn set_verification(&mut self, enabled: bool) {
        debug!("invariant verification {}", if enabled { "on" } else { "off" });
        if enabled {
            self.verifier = Some(assert_invariants::<K, V>);
            self.after_mutation();
        } else {
            self.verifier = None;
        }
    }
}

impl<K: Ord, V> RbMap<K, V> {
    /// Inserts `value` under `key`, returning the value it replaced.
    ///
    /// An existing equal key keeps its slot and stored key; only the value is
    /// overwritten and the tree shape is left as is.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let old = self.tree.insert(key, value);
        self.after_mutation();
        old
    }

    /// Alias of [`put`](RbMap::put), matching the std map naming.
    #[inline]
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.put(key, value)
    }

    /// Returns the value stored under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// Returns the stored key and value equal to `key`.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entry_at(self.tree.find(key))
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.tree.find(key) {
            NIL => None,
            idx => Some(&mut self.tree.store.node_mut(idx).value),
        }
    }

    /// Returns `true` if an entry is stored under `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find(key) != NIL
    }

    /// Removes the entry under `key` and returns its value. Removing a missing
    /// key is a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes the entry under `key` and returns it.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let entry = self.tree.remove(key)?;
        self.after_mutation();
        Some(entry)
    }

    /// Number of keys strictly less than `key`.
    pub fn rank<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.rank(key)
    }

    /// In-order iterator over the entries whose keys fall in `range`.
    ///
    /// # Panics
    ///
    /// Panics if the start of the range is greater than its end, or if both
    /// ends are equal and excluded.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_map::RbMap;
    ///
    /// let map: RbMap<i32, ()> = (1..=9).map(|k| (k, ())).collect();
    /// let keys: Vec<_> = map.range(3..6).map(|(k, _)| *k).collect();
    /// assert_eq!(keys, [3, 4, 5]);
    /// ```
    pub fn range<Q, R>(&self, range: R) -> Range<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        R: RangeBounds<Q>,
    {
        let (start, end) = (range.start_bound(), range.end_bound());
        match (start, end) {
            (Bound::Excluded(s), Bound::Excluded(e)) if s == e => {
                panic!("range start and end are equal and excluded in RbMap")
            }
            (
                Bound::Included(s) | Bound::Excluded(s),
                Bound::Included(e) | Bound::Excluded(e),
            ) if s > e => panic!("range start is greater than range end in RbMap"),
            _ => {}
        }

        let front = self.tree.lower_bound(start);
        let back = self.tree.upper_bound(end);
        Range(Iter::span(&self.tree, front, back))
    }

    /// Re-derives every red-black invariant and reports the first violation.
    ///
    /// Checks that the root is black, that no red node has a red child, that
    /// black height is uniform, that keys are strictly ordered, and that parent
    /// links, cached subtree sizes and the length all agree. O(n).
    pub fn verify(&self) -> Result<(), InvariantError<'_, K>> {
        self.tree.verify()
    }
}

impl<K, V> Default for RbMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Debug, V: Debug> Debug for RbMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for RbMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for RbMap<K, V> {}

impl<K, Q, V> Index<&Q> for RbMap<K, V>
where
    K: Ord + Borrow<Q>,
    Q: Ord + ?Sized,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if `key` is not present.
    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key not found in RbMap"),
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for RbMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = RbMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for RbMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for RbMap<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<'a, K, V> IntoIterator for &'a RbMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut RbMap<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V> IntoIterator for RbMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::{format, string::String, vec};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;
    use std::collections::BTreeMap;

    fn init_logger() {
        let _ = simplelog::TestLogger::init(
            simplelog::LevelFilter::Trace,
            simplelog::Config::default(),
        );
    }

    fn checked(keys: &[i32]) -> RbMap<i32, i32> {
        init_logger();
        let mut map = RbMap::with_verification();
        for &key in keys {
            map.put(key, key * 10);
        }
        map
    }

    #[test]
    fn test_map_creation() {
        let map = RbMap::<i32, i32>::new();
        assert_eq!(map.len(), 0);
        assert!(map.is_empty());
        assert!(!map.is_verifying());
        assert!(map.min().is_none());
        assert!(map.max().is_none());
        assert!(map.key_list().is_empty());
        assert_eq!(map.verify(), Ok(()));
    }

    #[test]
    fn test_with_capacity() {
        let map = RbMap::<u8, u8>::with_capacity(64);
        assert!(map.capacity() >= 64);
        assert!(map.is_empty());
    }

    #[test]
    fn test_ascending_triple_ends_rooted_at_middle() {
        let map = checked(&[10, 20, 30]);
        assert_eq!(map.key_list(), [10, 20, 30]);
        assert_eq!(map.tree.store.node(map.tree.root).key, 20);
    }

    #[test]
    fn test_ascending_one_to_seven() {
        let map = checked(&[1, 2, 3, 4, 5, 6, 7]);
        // Height in edges is at most 3.
        assert!(map.height() - 1 <= 3);
        assert!(map.tree.store.is_black(map.tree.root));
        assert_eq!(map.get(&4), Some(&40));
    }

    #[test]
    fn test_remove_with_two_children() {
        let mut map = checked(&[5, 3, 8, 1, 4, 7, 9]);
        assert_eq!(map.remove(&3), Some(30));
        assert_eq!(map.key_list(), [1, 4, 5, 7, 8, 9]);

        assert_eq!(map.remove(&100), None);
        assert_eq!(map.len(), 6);
    }

    #[test]
    fn test_upsert_keeps_len() {
        let mut map = checked(&[]);
        assert_eq!(map.put(1, 1), None);
        assert_eq!(map.put(1, 2), Some(1));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1), Some(&2));
    }

    #[test]
    fn test_get_and_contains() {
        let map = checked(&[2, 4, 6]);
        assert!(map.contains_key(&4));
        assert!(!map.contains_key(&5));
        assert_eq!(map.get(&6), Some(&60));
        assert_eq!(map.get(&7), None);
        assert_eq!(map.get_key_value(&2), Some((&2, &20)));
        assert_eq!(map[&4], 40);
    }

    #[test]
    #[should_panic(expected = "key not found in RbMap")]
    fn test_index_missing_key() {
        let map = checked(&[1]);
        let _value = map[&2];
    }

    #[test]
    fn test_get_mut() {
        let mut map = checked(&[1, 2, 3]);
        if let Some(value) = map.get_mut(&2) {
            *value = -1;
        }
        assert_eq!(map.get(&2), Some(&-1));
        assert!(map.get_mut(&9).is_none());
    }

    #[test]
    fn test_borrowed_lookup() {
        let mut map = RbMap::new();
        map.put(String::from("pear"), 3);
        map.put(String::from("apple"), 1);
        map.put(String::from("fig"), 2);

        assert_eq!(map.get("fig"), Some(&2));
        assert!(map.contains_key("apple"));
        assert_eq!(map.remove("pear"), Some(3));
        assert_eq!(map.key_list(), ["apple", "fig"]);
    }

    #[test]
    fn test_min_max_and_pop() {
        let mut map = checked(&[5, 1, 9, 3, 7]);
        assert_eq!(map.min(), Some((&1, &10)));
        assert_eq!(map.max(), Some((&9, &90)));

        assert_eq!(map.pop_min(), Some((1, 10)));
        assert_eq!(map.pop_max(), Some((9, 90)));
        assert_eq!(map.key_list(), [3, 5, 7]);

        map.clear();
        assert_eq!(map.pop_min(), None);
        assert_eq!(map.pop_max(), None);
    }

    #[test]
    fn test_clear() {
        let mut map = checked(&[1, 2, 3, 4]);
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.get(&1), None);

        map.put(9, 9);
        assert_eq!(map.key_list(), [9]);
    }

    #[test]
    fn test_value_list_in_key_order() {
        let mut map = RbMap::with_verification();
        map.put(3, 'c');
        map.put(1, 'a');
        map.put(2, 'b');
        assert_eq!(map.value_list(), ['a', 'b', 'c']);
        assert_eq!(map.values().rev().copied().collect::<String>(), "cba");
    }

    #[test]
    fn test_iter_mut_and_values_mut() {
        let mut map = checked(&[3, 1, 2]);
        for (key, value) in map.iter_mut() {
            *value += *key;
        }
        assert_eq!(map.value_list(), [11, 22, 33]);

        for value in map.values_mut() {
            *value = 0;
        }
        assert!(map.values().all(|&v| v == 0));
    }

    #[test]
    fn test_into_iter_owned() {
        let map = checked(&[4, 2, 8, 6]);
        let entries: Vec<(i32, i32)> = map.into_iter().collect();
        assert_eq!(entries, [(2, 20), (4, 40), (6, 60), (8, 80)]);
    }

    #[test]
    fn test_range_bounds() {
        let map = checked(&[10, 20, 30, 40, 50]);
        let keys = |r: Range<'_, i32, i32>| r.map(|(k, _)| *k).collect::<Vec<_>>();

        assert_eq!(keys(map.range(20..40)), [20, 30]);
        assert_eq!(keys(map.range(20..=40)), [20, 30, 40]);
        assert_eq!(keys(map.range(..25)), [10, 20]);
        assert_eq!(keys(map.range(35..)), [40, 50]);
        assert_eq!(keys(map.range(..)), [10, 20, 30, 40, 50]);
        assert_eq!(keys(map.range(21..29)), Vec::<i32>::new());
        assert_eq!(keys(map.range(60..)), Vec::<i32>::new());
        assert_eq!(
            keys(map.range((Bound::Excluded(10), Bound::Excluded(50)))),
            [20, 30, 40]
        );
        assert_eq!(map.range(15..45).rev().next(), Some((&40, &400)));
    }

    #[test]
    #[should_panic(expected = "range start is greater than range end in RbMap")]
    fn test_range_inverted_panics() {
        let map = checked(&[1, 2, 3]);
        let _ = map.range(3..1);
    }

    #[test]
    #[should_panic(expected = "range start and end are equal and excluded in RbMap")]
    fn test_range_equal_excluded_panics() {
        let map = checked(&[1, 2, 3]);
        let _ = map.range((Bound::Excluded(2), Bound::Excluded(2)));
    }

    #[test]
    fn test_rank_and_select() {
        let map = checked(&[40, 10, 30, 20]);
        assert_eq!(map.rank(&10), 0);
        assert_eq!(map.rank(&25), 2);
        assert_eq!(map.rank(&99), 4);
        assert_eq!(map.select(0), Some((&10, &100)));
        assert_eq!(map.select(3), Some((&40, &400)));
        assert_eq!(map.select(4), None);
    }

    #[test]
    fn test_debug_and_eq() {
        let a: RbMap<i32, char> = RbMap::from([(2, 'b'), (1, 'a')]);
        let mut b = RbMap::new();
        b.put(1, 'a');
        b.put(2, 'b');

        assert_eq!(a, b);
        assert_eq!(format!("{a:?}"), "{1: 'a', 2: 'b'}");

        b.put(3, 'c');
        assert_ne!(a, b);
    }

    #[test]
    fn test_extend_and_from_iter() {
        let mut map: RbMap<i32, i32> = (0..5).map(|i| (i, i)).collect();
        map.extend(vec![(5, 5), (0, 100)]);
        assert_eq!(map.len(), 6);
        assert_eq!(map.get(&0), Some(&100));
    }

    #[test]
    fn test_verification_toggle() {
        let mut map = RbMap::<i32, ()>::new();
        map.set_verification(true);
        assert!(map.is_verifying());
        map.put(1, ());
        map.set_verification(false);
        assert!(!map.is_verifying());
    }

    #[test]
    #[should_panic(expected = "red-black invariant violated: map reports 5 entries but holds 1")]
    fn test_verification_panics_on_corruption() {
        let mut map = checked(&[1]);
        map.tree.len = 5;
        map.put(1, 11);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut a = checked(&[1, 2, 3]);
        let b = a.clone();
        a.remove(&2);
        assert_eq!(b.key_list(), [1, 2, 3]);
        assert_eq!(a.key_list(), [1, 3]);
    }

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::from_seed([
            0x55, 0xEF, 0xE0, 0x3C, 0x71, 0xDA, 0xFC, 0xAB, 0x5C, 0x1A, 0x9F, 0xEB, 0xA4, 0x9E,
            0x61, 0xE6, 0x1E, 0x7E, 0x29, 0x77, 0x38, 0x9A, 0xF5, 0x67, 0xF5, 0xDD, 0x07, 0x06,
            0xAE, 0xE4, 0x5A, 0xDC,
        ])
    }

    // h <= 2 * log2(n + 1), i.e. 2^h <= (n + 1)^2
    fn assert_balanced(map: &RbMap<u32, u32>) {
        let n = map.len() as u128 + 1;
        assert!(
            1u128 << map.height() <= n * n,
            "height {} too large for {} entries",
            map.height(),
            map.len()
        );
    }

    #[test]
    fn test_matches_btreemap_under_random_churn() {
        init_logger();
        let mut rng = rng();
        let mut map = RbMap::with_verification();
        let mut model = BTreeMap::new();

        for step in 0..4_000u32 {
            let key = rng.gen_range(0..512u32);
            if rng.gen_bool(0.6) {
                assert_eq!(map.put(key, step), model.insert(key, step), "put {key}");
            } else {
                assert_eq!(map.remove(&key), model.remove(&key), "remove {key}");
            }

            assert_eq!(map.len(), model.len());
            assert_eq!(map.iter().count(), map.len());
            assert_balanced(&map);
        }

        assert!(map.iter().eq(model.iter()));
        assert!(map.keys().zip(map.keys().skip(1)).all(|(a, b)| a < b));
    }

    #[test]
    fn test_order_statistics_under_random_churn() {
        let mut rng = rng();
        let mut map = RbMap::new();
        let mut model = BTreeMap::new();

        for _ in 0..2_000 {
            let key = rng.gen_range(0..1_000u32);
            if rng.gen_bool(0.7) {
                map.put(key, key);
                model.insert(key, key);
            } else {
                map.remove(&key);
                model.remove(&key);
            }
        }
        assert_eq!(map.verify(), Ok(()));

        for (pos, (key, value)) in model.iter().enumerate() {
            assert_eq!(map.rank(key), pos);
            assert_eq!(map.select(pos), Some((key, value)));
        }
        for probe in 0..1_000u32 {
            assert_eq!(map.rank(&probe), model.range(..probe).count());
        }
    }

    #[test]
    fn test_ranges_match_btreemap() {
        let mut rng = rng();
        let map: RbMap<u32, u32> = (0..300).map(|_| rng.gen_range(0..600u32)).map(|k| (k, k)).collect();
        let model: BTreeMap<u32, u32> = map.iter().map(|(k, v)| (*k, *v)).collect();

        for _ in 0..500 {
            let a = rng.gen_range(0..650u32);
            let b = rng.gen_range(a..=650u32);
            assert!(map.range(a..b).eq(model.range(a..b)), "{a}..{b}");
            assert!(map.range(a..=b).eq(model.range(a..=b)), "{a}..={b}");
            assert!(map.range(a..).rev().eq(model.range(a..).rev()), "{a}..");
            assert!(map.range(..b).eq(model.range(..b)), "..{b}");
        }
    }

    #[test]
    fn test_balance_bound_for_sorted_inserts() {
        let mut map = RbMap::new();
        for key in 0..10_000u32 {
            map.put(key, key);
        }
        assert_balanced(&map);
        assert_eq!(map.verify(), Ok(()));

        for key in (0..10_000u32).rev().step_by(2) {
            map.remove(&key);
        }
        assert_eq!(map.len(), 5_000);
        assert_balanced(&map);
        assert_eq!(map.verify(), Ok(()));
    }

    #[test]
    fn test_black_height_is_uniform() {
        let mut rng = rng();
        let mut map = RbMap::new();
        for _ in 0..1_000 {
            let key = rng.gen_range(0..10_000u32);
            map.put(key, key);
        }
        // Every leftmost/rightmost path sees the same number of blacks.
        let mut right_blacks = 0;
        let mut idx = map.tree.root;
        while idx != NIL {
            if map.tree.store.is_black(idx) {
                right_blacks += 1;
            }
            idx = map.tree.store.right(idx);
        }
        assert_eq!(map.black_height(), right_blacks);
        assert_eq!(map.verify(), Ok(()));
    }

    #[test]
    fn test_arena_does_not_grow_under_churn() {
        let mut map = RbMap::with_capacity(128);
        for key in 0..128u32 {
            map.put(key, key);
        }
        let slots = map.tree.store.slot_count();

        let mut rng = rng();
        for _ in 0..5_000 {
            let out = rng.gen_range(0..128u32);
            if let Some(value) = map.remove(&out) {
                map.put(out + 1_000, value);
                map.remove(&(out + 1_000));
                map.put(out, value);
            }
        }
        assert_eq!(map.len(), 128);
        assert_eq!(map.tree.store.slot_count(), slots);
    }
}
