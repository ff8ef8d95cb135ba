use std::collections::BTreeMap;

/// Counters and per-draw distributions recorded by the controller.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metrics {
    counters: BTreeMap<String, u64>,
    distributions: BTreeMap<String, Distribution>,
}

/// Running summary of observed sizes, e.g. features matched per draw.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Distribution {
    pub samples: u64,
    pub total: u64,
    /// Smallest and largest observation; `None` until the first sample.
    pub range: Option<(u64, u64)>,
}

impl Distribution {
    pub fn observe(&mut self, value: u64) {
        self.samples += 1;
        self.total += value;
        self.range = Some(match self.range {
            Some((lo, hi)) => (lo.min(value), hi.max(value)),
            None => (value, value),
        });
    }

    pub fn mean(&self) -> Option<f64> {
        (self.samples > 0).then(|| self.total as f64 / self.samples as f64)
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or_default()
    }

    /// Adds `by` to `name`. A zero increment does not create the counter.
    pub fn inc_counter(&mut self, name: impl Into<String>, by: u64) {
        if by > 0 {
            *self.counters.entry(name.into()).or_default() += by;
        }
    }

    pub fn observe(&mut self, name: impl Into<String>, value: u64) {
        self.distributions
            .entry(name.into())
            .or_default()
            .observe(value);
    }

    pub fn distribution(&self, name: &str) -> Option<&Distribution> {
        self.distributions.get(name)
    }

    /// Counter names in sorted order.
    pub fn counter_names(&self) -> impl Iterator<Item = &str> {
        self.counters.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::{Distribution, Metrics};

    #[test]
    fn zero_increments_leave_no_counter() {
        let mut m = Metrics::new();
        m.inc_counter("selection.geometry_errors", 1);
        m.inc_counter("selection.geometry_errors", 2);
        m.inc_counter("selection.data_shape_errors", 0);
        m.inc_counter("command.draw", 1);
        assert_eq!(m.counter("selection.geometry_errors"), 3);
        assert_eq!(m.counter("selection.data_shape_errors"), 0);
        assert_eq!(
            m.counter_names().collect::<Vec<_>>(),
            vec!["command.draw", "selection.geometry_errors"]
        );
    }

    #[test]
    fn distribution_tracks_range_and_mean() {
        let mut d = Distribution::default();
        assert_eq!(d.mean(), None);
        assert_eq!(d.range, None);
        for v in [4, 0, 8] {
            d.observe(v);
        }
        assert_eq!((d.samples, d.total, d.range), (3, 12, Some((0, 8))));
        assert_eq!(d.mean(), Some(4.0));
    }

    #[test]
    fn observations_are_keyed_by_name() {
        let mut m = Metrics::new();
        m.observe("selection.features_matched", 2);
        m.observe("selection.features_matched", 6);
        assert_eq!(m.distribution("selection.features_matched").and_then(|d| d.mean()), Some(4.0));
        assert!(m.distribution("selection.features_tested").is_none());
    }
}
