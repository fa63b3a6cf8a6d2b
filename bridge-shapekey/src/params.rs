//! Transfer parameters and the distance falloff curve.

use hashbrown::HashSet;

/// Parameters for a shape-key transfer operation.
///
/// Use the builder methods to configure the transfer.
///
/// # Examples
///
/// ```
/// use bridge_shapekey::TransferParams;
///
/// let params = TransferParams::new()
///     .with_distance_threshold(0.5)
///     .with_falloff(2.0)
///     .with_overwrite_existing(true);
///
/// assert!(params.overwrite_existing);
/// ```
///
/// ## Selective transfer
///
/// ```
/// use bridge_shapekey::TransferParams;
///
/// let params = TransferParams::new()
///     .with_selected_keys(["smile", "blink"].into_iter().map(String::from));
///
/// assert!(params.is_selected("smile"));
/// assert!(!params.is_selected("frown"));
/// ```
#[derive(Debug, Clone)]
pub struct TransferParams {
    /// Use the identity vertex mapping when source and target vertex counts
    /// match. Faster, and exact for truly matching topology.
    pub use_topology_fast_path: bool,

    /// Maximum distance for vertex matching. `0.0` means unlimited; any
    /// positive value zeroes out deltas for target vertices farther than
    /// this from the source surface.
    pub distance_threshold: f64,

    /// Falloff exponent over normalized distance. `0.0` gives a hard cutoff
    /// at the threshold; larger values fade deltas out more aggressively as
    /// vertices approach it.
    pub falloff: f64,

    /// Replace target keys that share a name with an incoming key. When
    /// `false`, conflicting keys are skipped and reported.
    pub overwrite_existing: bool,

    /// Optional subset of source key names to transfer. `None` transfers
    /// all keys.
    pub selected_keys: Option<HashSet<String>>,
}

impl Default for TransferParams {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferParams {
    /// Create default parameters: topology fast path enabled, unlimited
    /// distance, no falloff, no overwriting, all keys selected.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            use_topology_fast_path: true,
            distance_threshold: 0.0,
            falloff: 0.0,
            overwrite_existing: false,
            selected_keys: None,
        }
    }

    /// Sets whether the identity mapping is used for matching vertex counts.
    #[must_use]
    pub const fn with_topology_fast_path(mut self, enabled: bool) -> Self {
        self.use_topology_fast_path = enabled;
        self
    }

    /// Sets the maximum matching distance. Negative values are clamped to 0.
    #[must_use]
    pub fn with_distance_threshold(mut self, threshold: f64) -> Self {
        self.distance_threshold = threshold.max(0.0);
        self
    }

    /// Sets the falloff exponent. Negative values are clamped to 0.
    #[must_use]
    pub fn with_falloff(mut self, falloff: f64) -> Self {
        self.falloff = falloff.max(0.0);
        self
    }

    /// Sets whether conflicting target keys are replaced.
    #[must_use]
    pub const fn with_overwrite_existing(mut self, overwrite: bool) -> Self {
        self.overwrite_existing = overwrite;
        self
    }

    /// Restricts the transfer to the given key names.
    #[must_use]
    pub fn with_selected_keys(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.selected_keys = Some(names.into_iter().collect());
        self
    }

    /// Clears the selection so all source keys are transferred.
    #[must_use]
    pub fn with_all_keys(mut self) -> Self {
        self.selected_keys = None;
        self
    }

    /// Returns whether a key name is in the transfer selection.
    #[must_use]
    pub fn is_selected(&self, name: &str) -> bool {
        self.selected_keys
            .as_ref()
            .is_none_or(|keys| keys.contains(name))
    }

    /// Delta weight for a vertex matched at `distance` from the source
    /// surface.
    ///
    /// With no threshold every match has full weight. Otherwise the weight
    /// is 1 at distance 0, 0 at and beyond the threshold, and follows
    /// `(1 - d/threshold)^falloff` in between (a falloff of 0 keeps full
    /// weight all the way to the cutoff). Monotone non-increasing in
    /// distance.
    ///
    /// # Example
    ///
    /// ```
    /// use bridge_shapekey::TransferParams;
    ///
    /// let params = TransferParams::new()
    ///     .with_distance_threshold(2.0)
    ///     .with_falloff(1.0);
    ///
    /// assert!((params.falloff_weight(0.0) - 1.0).abs() < 1e-10);
    /// assert!((params.falloff_weight(1.0) - 0.5).abs() < 1e-10);
    /// assert!(params.falloff_weight(2.0).abs() < 1e-10);
    /// ```
    #[must_use]
    pub fn falloff_weight(&self, distance: f64) -> f64 {
        if self.distance_threshold <= 0.0 {
            return 1.0;
        }
        if distance >= self.distance_threshold {
            return 0.0;
        }
        if self.falloff <= 0.0 {
            return 1.0;
        }
        (1.0 - distance / self.distance_threshold).powf(self.falloff)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_params() {
        let params = TransferParams::default();
        assert!(params.use_topology_fast_path);
        assert_eq!(params.distance_threshold, 0.0);
        assert_eq!(params.falloff, 0.0);
        assert!(!params.overwrite_existing);
        assert!(params.selected_keys.is_none());
        assert!(params.is_selected("anything"));
    }

    #[test]
    fn negative_values_clamped() {
        let params = TransferParams::new()
            .with_distance_threshold(-1.0)
            .with_falloff(-0.5);
        assert_eq!(params.distance_threshold, 0.0);
        assert_eq!(params.falloff, 0.0);
    }

    #[test]
    fn no_threshold_means_full_weight() {
        let params = TransferParams::new();
        assert_eq!(params.falloff_weight(0.0), 1.0);
        assert_eq!(params.falloff_weight(1e9), 1.0);
    }

    #[test]
    fn zero_falloff_is_hard_cutoff() {
        let params = TransferParams::new().with_distance_threshold(1.0);
        assert_eq!(params.falloff_weight(0.999), 1.0);
        assert_eq!(params.falloff_weight(1.0), 0.0);
        assert_eq!(params.falloff_weight(5.0), 0.0);
    }

    #[test]
    fn falloff_curve_boundaries() {
        let params = TransferParams::new()
            .with_distance_threshold(4.0)
            .with_falloff(2.0);
        assert_relative_eq!(params.falloff_weight(0.0), 1.0, epsilon = 1e-10);
        assert_relative_eq!(params.falloff_weight(2.0), 0.25, epsilon = 1e-10);
        assert_relative_eq!(params.falloff_weight(4.0), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn falloff_monotone_non_increasing() {
        let params = TransferParams::new()
            .with_distance_threshold(1.0)
            .with_falloff(3.0);
        let mut previous = params.falloff_weight(0.0);
        for i in 1..=20 {
            let w = params.falloff_weight(f64::from(i) * 0.06);
            assert!(w <= previous);
            previous = w;
        }
    }

    #[test]
    fn selection_filters_names() {
        let params =
            TransferParams::new().with_selected_keys(["a".to_string(), "b".to_string()]);
        assert!(params.is_selected("a"));
        assert!(!params.is_selected("c"));

        let params = params.with_all_keys();
        assert!(params.is_selected("c"));
    }
}
