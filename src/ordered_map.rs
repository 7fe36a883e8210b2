use core::{borrow::Borrow, fmt};

use crate::utils::RbTree;

/// An ordered key-value map backed by a red-black tree.
///
/// Insertion, lookup and removal cost O(log n) in the worst case. Keys are
/// ordered by their [`Ord`] implementation, which must be a consistent total
/// order that does not change while the key is stored.
///
/// Values are only handed out by reference tied to a borrow of the map, so no
/// reference can outlive a mutating call that may relocate entries.
///
/// Debug builds re-verify every red-black invariant after each insert and
/// remove, an O(n) walk, while the map holds at most 4096 entries. Release
/// builds never run the check.
///
/// # Example
///
/// ```
/// use rbmap::OrderedMap;
///
/// let mut map = OrderedMap::new();
/// map.insert(3, "three");
/// map.insert(1, "one");
/// map.insert(2, "two");
///
/// assert_eq!(map.size(), 3);
/// assert_eq!(map.search(&2), Some(&"two"));
/// assert_eq!(map.min(), Some((&1, &"one")));
/// assert_eq!(map.successor(&1), Some((&2, &"two")));
///
/// map.remove(&2);
/// assert_eq!(map.search(&2), None);
/// ```
#[derive(Clone)]
pub struct OrderedMap<K, V> {
    /// Arena backed tree holding every entry
    tree: RbTree<K, V>,
}

impl<K, V> OrderedMap<K, V> {
    /// Creates an empty map.
    ///
    /// # Returns
    ///
    /// * `Self` - A map of size 0
    pub const fn new() -> Self {
        Self {
            tree: RbTree::new(),
        }
    }

    /// Creates an empty map with room for `capacity` entries before the node
    /// arena reallocates.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of entries to pre-allocate
    ///
    /// # Returns
    ///
    /// * `Self` - A map of size 0
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tree: RbTree::with_capacity(capacity),
        }
    }

    /// Returns the number of entries in the map
    ///
    /// # Returns
    ///
    /// * `usize` - The number of live entries
    #[inline]
    pub fn size(&self) -> usize {
        self.tree.len()
    }

    /// Returns the number of entries in the map. Same as [`OrderedMap::size`].
    #[inline]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the map holds no entries
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of entries the map can hold without reallocating
    #[inline]
    pub fn capacity(&self) -> usize {
        self.tree.capacity()
    }

    /// Reserves room for at least `additional` more entries.
    pub fn reserve(&mut self, additional: usize) {
        self.tree.reserve(additional);
    }

    /// Shrinks the node arena as much as possible.
    pub fn shrink_to_fit(&mut self) {
        self.tree.shrink_to_fit();
    }

    /// Removes every entry, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the entry with the smallest key
    ///
    /// # Returns
    ///
    /// * `Option<(&K, &V)>` - The first entry, or `None` if the map is empty
    pub fn min(&self) -> Option<(&K, &V)> {
        self.tree.first().map(|idx| self.tree.entry_at(idx))
    }

    /// Returns the entry with the largest key
    ///
    /// # Returns
    ///
    /// * `Option<(&K, &V)>` - The last entry, or `None` if the map is empty
    pub fn max(&self) -> Option<(&K, &V)> {
        self.tree.last().map(|idx| self.tree.entry_at(idx))
    }
}

impl<K: Ord, V> OrderedMap<K, V> {
    /// Looks up the value stored under `key`.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to look for, or any borrowed form of it
    ///
    /// # Returns
    ///
    /// * `Option<&V>` - The stored value, or `None` if the key is absent
    pub fn search<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree
            .find_node(key)
            .map(|idx| self.tree.entry_at(idx).1)
    }

    /// Looks up the value stored under `key`. Same as [`OrderedMap::search`].
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key)
    }

    /// Looks up the value stored under `key` for in-place modification.
    ///
    /// Changing the value never affects the position of the entry.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to look for, or any borrowed form of it
    ///
    /// # Returns
    ///
    /// * `Option<&mut V>` - The stored value, or `None` if the key is absent
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let idx = self.tree.find_node(key)?;
        Some(self.tree.value_at_mut(idx))
    }

    /// Same as [`OrderedMap::get_mut`].
    #[inline]
    pub fn search_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_mut(key)
    }

    /// Returns `true` if an entry is stored under `key`
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find_node(key).is_some()
    }

    /// Inserts `value` under `key`.
    ///
    /// If the key is already present its value is overwritten in place and the
    /// shape of the tree is left untouched.
    ///
    /// # Arguments
    ///
    /// * `key` - The ordering key
    /// * `value` - The payload to store
    ///
    /// # Returns
    ///
    /// * `Option<V>` - The value previously stored under `key`, if any
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.tree.insert(key, value)
    }

    /// Removes the entry stored under `key`. Removing an absent key is a no-op.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to remove, or any borrowed form of it
    ///
    /// # Returns
    ///
    /// * `Option<V>` - The removed value, or `None` if the key was absent
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.remove(key).map(|(_, value)| value)
    }

    /// Returns the entry that comes right before `key` in key order.
    ///
    /// # Arguments
    ///
    /// * `key` - A key stored in the map
    ///
    /// # Returns
    ///
    /// * `Option<(&K, &V)>` - The previous entry, or `None` if `key` is absent
    ///   or is the smallest key
    pub fn predecessor<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let idx = self.tree.find_node(key)?;
        self.tree
            .predecessor(idx)
            .map(|prev| self.tree.entry_at(prev))
    }

    /// Returns the entry that comes right after `key` in key order.
    ///
    /// # Arguments
    ///
    /// * `key` - A key stored in the map
    ///
    /// # Returns
    ///
    /// * `Option<(&K, &V)>` - The next entry, or `None` if `key` is absent or
    ///   is the largest key
    pub fn successor<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let idx = self.tree.find_node(key)?;
        self.tree
            .successor(idx)
            .map(|next| self.tree.entry_at(next))
    }

    #[cfg(test)]
    pub(crate) fn tree(&self) -> &RbTree<K, V> {
        &self.tree
    }
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.tree.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for OrderedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.tree.iter().eq(other.tree.iter())
    }
}

impl<K: Eq, V: Eq> Eq for OrderedMap<K, V> {}

impl<K: Ord, V> Extend<(K, V)> for OrderedMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}
