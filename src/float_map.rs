use num_traits::float::FloatCore;
use ordered_float::OrderedFloat;

use crate::OrderedMap;

/// An [`OrderedMap`] keyed by floating point numbers.
///
/// Raw floats are not [`Ord`], so keys are wrapped in [`OrderedFloat`], which
/// gives them a total order: `-0.0` and `0.0` are the same key, and every NaN is
/// one key that sorts above all other values including infinity.
///
/// # Example
///
/// ```
/// use rbmap::FloatMap;
///
/// let mut prices: FloatMap<f64, &str> = FloatMap::new();
/// prices.insert_float(101.5, "ask");
/// prices.insert_float(99.25, "bid");
///
/// assert_eq!(prices.search_float(99.25), Some(&"bid"));
/// assert_eq!(prices.min().map(|(price, _)| price.into_inner()), Some(99.25));
/// ```
pub type FloatMap<F, V> = OrderedMap<OrderedFloat<F>, V>;

impl<F: FloatCore, V> OrderedMap<OrderedFloat<F>, V> {
    /// Inserts `value` under the float `key`, overwriting any previous value.
    ///
    /// # Returns
    ///
    /// * `Option<V>` - The value previously stored under `key`, if any
    pub fn insert_float(&mut self, key: F, value: V) -> Option<V> {
        self.insert(OrderedFloat(key), value)
    }

    /// Looks up the value stored under the float `key`.
    pub fn search_float(&self, key: F) -> Option<&V> {
        self.search(&OrderedFloat(key))
    }

    /// Returns `true` if an entry is stored under the float `key`
    pub fn contains_float(&self, key: F) -> bool {
        self.contains_key(&OrderedFloat(key))
    }

    /// Removes the entry stored under the float `key`.
    ///
    /// # Returns
    ///
    /// * `Option<V>` - The removed value, or `None` if the key was absent
    pub fn remove_float(&mut self, key: F) -> Option<V> {
        self.remove(&OrderedFloat(key))
    }
}
