use num_traits::float::FloatCore;
use ordered_float::OrderedFloat;

use crate::RbMap;

/// An [`RbMap`] keyed by floating point numbers.
///
/// Keys are wrapped in [`OrderedFloat`], which gives floats a total order
/// (NaN sorts above every other value and equals itself), so every float,
/// NaN included, is a valid key.
pub type FloatMap<T, V> = RbMap<OrderedFloat<T>, V>;

impl<T: FloatCore, V> RbMap<OrderedFloat<T>, V> {
    /// Inserts `value` under the float `key`.
    #[inline]
    pub fn put_float(&mut self, key: T, value: V) -> Option<V> {
        self.put(OrderedFloat(key), value)
    }

    /// Returns the value stored under the float `key`.
    #[inline]
    pub fn get_float(&self, key: T) -> Option<&V> {
        self.get(&OrderedFloat(key))
    }

    /// Removes the entry under the float `key`, returning its value.
    #[inline]
    pub fn remove_float(&mut self, key: T) -> Option<V> {
        self.remove(&OrderedFloat(key))
    }

    /// Key at the `q`-th quantile of the stored keys, using the lower
    /// nearest rank.
    ///
    /// `q` is clamped to `[0, 1]`.
    ///
    /// # Arguments
    ///
    /// * `q` - The quantile to look up
    ///
    /// # Returns
    ///
    /// * `Option<T>` - The key, or `None` if the map is empty
    pub fn quantile(&self, q: f64) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let clamped_q = q.clamp(0.0, 1.0);
        let target_index = if clamped_q >= 1.0 {
            self.len() - 1
        } else if clamped_q <= 0.0 {
            0
        } else {
            let exact_position = clamped_q * (self.len() - 1) as f64;
            exact_position.floor() as usize
        };

        self.select(target_index).map(|(key, _)| key.into_inner())
    }

    /// Key at the `p`-th percentile, `p` in `[0, 100]`.
    #[inline]
    pub fn percentile(&self, p: f64) -> Option<T> {
        self.quantile(p / 100.0)
    }

    /// Lower median of the stored keys.
    #[inline]
    pub fn median(&self) -> Option<T> {
        self.quantile(0.5)
    }

    /// Quantile of the stored keys, linearly interpolated between the two
    /// keys that bracket position `q * (len - 1)`.
    ///
    /// # Arguments
    ///
    /// * `q` - The quantile to calculate, clamped to `[0, 1]`
    ///
    /// # Returns
    ///
    /// * `Option<T>` - The interpolated key, or `None` if the map is empty
    pub fn interpolated_quantile(&self, q: f64) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let pos = q.clamp(0.0, 1.0) * (self.len() - 1) as f64;
        let lower_index = pos.floor() as usize;
        let upper_index = pos.ceil() as usize;

        let lower_value = self.select(lower_index)?.0.into_inner();
        if lower_index == upper_index {
            return Some(lower_value);
        }

        let upper_value = self.select(upper_index)?.0.into_inner();
        let weight = T::from(pos - lower_index as f64)?;
        Some(lower_value + weight * (upper_value - lower_value))
    }
}
