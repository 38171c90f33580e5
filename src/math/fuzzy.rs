//! Tolerance-keyed maps.
//!
//! Keys are fixed-size float tuples. Two keys match when every component
//! differs by at most the map's tolerance. Keys are bucketed on a grid whose
//! cell size equals the tolerance, so a lookup only has to visit the 3^N
//! neighbouring cells.
//!
//! Matching is not transitive: `a ~ b` and `b ~ c` does not imply `a ~ c`.
//! The first stored key that matches wins, so a chain of near-equal points
//! inserted in sequence can drift by up to one tolerance per link.

use std::collections::HashMap;

use super::{Point3, Vector3, POINT_TOLERANCE};

/// A map from approximate `[f64; N]` keys to values.
#[derive(Debug, Clone)]
pub struct FuzzyMap<const N: usize, V> {
    tolerance: f64,
    buckets: HashMap<[i64; N], Vec<usize>>,
    keys: Vec<[f64; N]>,
    values: Vec<V>,
}

impl<const N: usize, V> FuzzyMap<N, V> {
    /// Creates an empty map with the given matching tolerance.
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            buckets: HashMap::new(),
            keys: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Number of distinct entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value whose key matches `key`, if any.
    #[must_use]
    pub fn get(&self, key: &[f64; N]) -> Option<&V> {
        self.find(key).map(|slot| &self.values[slot])
    }

    /// Returns the existing value for `key`, or inserts the one produced by `make`.
    pub fn get_or_insert_with(&mut self, key: [f64; N], make: impl FnOnce() -> V) -> &mut V {
        let slot = match self.find(&key) {
            Some(slot) => slot,
            None => self.insert_new(key, make()),
        };
        &mut self.values[slot]
    }

    /// Consumes the map, returning values in insertion order.
    #[must_use]
    pub fn into_values(self) -> Vec<V> {
        self.values
    }

    fn insert_new(&mut self, key: [f64; N], value: V) -> usize {
        let slot = self.values.len();
        self.buckets.entry(self.cell(&key)).or_default().push(slot);
        self.keys.push(key);
        self.values.push(value);
        slot
    }

    fn find(&self, key: &[f64; N]) -> Option<usize> {
        let center = self.cell(key);
        let mut best: Option<usize> = None;
        for offset in 0..3usize.pow(u32::try_from(N).unwrap_or(0)) {
            let mut cell = center;
            let mut rest = offset;
            for c in &mut cell {
                #[allow(clippy::cast_possible_wrap)]
                let delta = (rest % 3) as i64 - 1;
                *c += delta;
                rest /= 3;
            }
            let Some(slots) = self.buckets.get(&cell) else {
                continue;
            };
            for &slot in slots {
                if self.matches(&self.keys[slot], key) && best.is_none_or(|b| slot < b) {
                    best = Some(slot);
                }
            }
        }
        best
    }

    fn matches(&self, a: &[f64; N], b: &[f64; N]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() <= self.tolerance)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell(&self, key: &[f64; N]) -> [i64; N] {
        let mut cell = [0i64; N];
        for (c, k) in cell.iter_mut().zip(key) {
            *c = (k / self.tolerance).floor() as i64;
        }
        cell
    }
}

/// Caches output handles by approximate 3D position.
///
/// Used so each model vertex is emitted once even when adjacent faces
/// evaluate it with slightly different rounding.
#[derive(Debug, Clone)]
pub struct PointCache<H> {
    map: FuzzyMap<3, H>,
}

impl<H: Copy> PointCache<H> {
    /// Creates an empty cache using [`POINT_TOLERANCE`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_tolerance(POINT_TOLERANCE)
    }

    /// Creates an empty cache with a custom tolerance.
    #[must_use]
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            map: FuzzyMap::new(tolerance),
        }
    }

    /// Returns the handle cached for `point`, if any.
    #[must_use]
    pub fn get(&self, point: &Point3) -> Option<H> {
        self.map.get(&[point.x, point.y, point.z]).copied()
    }

    /// Returns the cached handle for `point`, creating it with `make` when absent.
    pub fn get_or_insert_with(&mut self, point: &Point3, make: impl FnOnce() -> H) -> H {
        *self.map.get_or_insert_with([point.x, point.y, point.z], make)
    }

    /// Number of distinct points cached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<H: Copy> Default for PointCache<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Key identifying a plane by its unit normal and signed distance from the origin.
#[must_use]
pub fn plane_key(normal: &Vector3, point_on_plane: &Point3) -> [f64; 4] {
    let d = normal.dot(&point_on_plane.coords);
    [normal.x, normal.y, normal.z, d]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn near_points_share_a_handle() {
        let mut cache = PointCache::new();
        let a = cache.get_or_insert_with(&Point3::new(1.0, 2.0, 3.0), || 7usize);
        let b = cache.get_or_insert_with(&Point3::new(1.0 + 4e-7, 2.0, 3.0 - 4e-7), || 8usize);
        assert_eq!(a, 7);
        assert_eq!(b, 7);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn points_straddling_a_cell_boundary_match() {
        let mut cache = PointCache::with_tolerance(1e-3);
        cache.get_or_insert_with(&Point3::new(0.0009999, 0.0, 0.0), || 1u32);
        assert_eq!(cache.get(&Point3::new(0.0010001, 0.0, 0.0)), Some(1));
    }

    #[test]
    fn distant_points_get_distinct_handles() {
        let mut cache = PointCache::new();
        cache.get_or_insert_with(&Point3::new(0.0, 0.0, 0.0), || 0usize);
        cache.get_or_insert_with(&Point3::new(0.0, 0.0, 1e-3), || 1usize);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn matching_is_not_transitive() {
        let mut map: FuzzyMap<1, usize> = FuzzyMap::new(1.0);
        map.get_or_insert_with([0.0], || 0);
        map.get_or_insert_with([0.9], || 1);
        // 1.8 is within tolerance of nothing stored (0.9 matched 0.0 and was not stored)
        map.get_or_insert_with([1.8], || 2);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&[0.95]), Some(&0));
    }

    #[test]
    fn plane_keys_group_coplanar_offsets() {
        let mut map: FuzzyMap<4, Vec<usize>> = FuzzyMap::new(1e-6);
        let n = Vector3::z();
        map.get_or_insert_with(plane_key(&n, &Point3::new(0.0, 0.0, 2.0)), Vec::new)
            .push(0);
        map.get_or_insert_with(plane_key(&n, &Point3::new(5.0, -3.0, 2.0)), Vec::new)
            .push(1);
        map.get_or_insert_with(plane_key(&n, &Point3::new(0.0, 0.0, 3.0)), Vec::new)
            .push(2);
        let groups: Vec<_> = map.into_values();
        assert_eq!(groups, vec![vec![0, 1], vec![2]]);
    }
}
