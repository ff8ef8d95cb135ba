pub struct Statistics;

impl Statistics {
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let mut sum = 0.0;
        for &v in values {
            sum += v;
        }
        Some(sum / values.len() as f64)
    }

    pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
        let first = *values.first()?;
        let mut min = first;
        let mut max = first;
        for &v in values.iter().skip(1) {
            min = min.min(v);
            max = max.max(v);
        }
        Some((min, max))
    }

    /// Position and value of the first maximum. Later equal values never
    /// replace it; NaN is skipped.
    pub fn argmax_first(values: impl IntoIterator<Item = f64>) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, v) in values.into_iter().enumerate() {
            if v.is_nan() {
                continue;
            }
            if best.is_none_or(|(_, bv)| v > bv) {
                best = Some((i, v));
            }
        }
        best
    }
}

/// Running maximum that remembers which item attained it.
#[derive(Debug, Clone, PartialEq)]
pub struct MaxWithProvenance<T> {
    pub value: f64,
    pub source: T,
}

impl<T> MaxWithProvenance<T> {
    pub fn new(value: f64, source: T) -> Self {
        Self { value, source }
    }

    /// Replaces the current maximum only on a strictly greater value.
    pub fn offer(&mut self, value: f64, source: impl FnOnce() -> T) -> bool {
        if value > self.value {
            self.value = value;
            self.source = source();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MaxWithProvenance, Statistics};
    use approx::assert_relative_eq;

    #[test]
    fn mean_works() {
        let m = Statistics::mean(&[1.0, 2.0, 3.0]).unwrap();
        assert_relative_eq!(m, 2.0);
        assert_eq!(Statistics::mean(&[]), None);
    }

    #[test]
    fn min_max_works() {
        assert_eq!(Statistics::min_max(&[3.0, -1.0, 7.5]), Some((-1.0, 7.5)));
        assert_eq!(Statistics::min_max(&[]), None);
    }

    #[test]
    fn argmax_keeps_first_of_ties() {
        assert_eq!(
            Statistics::argmax_first([1.0, 9.0, f64::NAN, 9.0, 2.0]),
            Some((1, 9.0))
        );
        assert_eq!(Statistics::argmax_first([f64::NAN]), None);
    }

    #[test]
    fn max_with_provenance_ignores_ties() {
        let mut m = MaxWithProvenance::new(10.0, "CityA");
        assert!(!m.offer(10.0, || "CityB"));
        assert!(m.offer(25.0, || "CityC"));
        assert_eq!(m, MaxWithProvenance::new(25.0, "CityC"));
    }
}
