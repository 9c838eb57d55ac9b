//! Linear axis mapping shared by the dashboard charts

use chrono::NaiveDateTime;

/// Errors from chart layout
///
/// All of these are local to a single chart: the caller logs the error and
/// skips the affected chart, the rest of the dashboard still renders.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// Axis domain has zero or negative span
    DegenerateDomain { min: f64, max: f64 },
    /// Interval ends before it starts (epoch millis)
    InvalidInterval { start: f64, end: f64 },
}

impl std::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutError::DegenerateDomain { min, max } => {
                write!(f, "degenerate axis domain [{}, {}]", min, max)
            }
            LayoutError::InvalidInterval { start, end } => {
                write!(f, "interval ends before it starts ({} > {})", start, end)
            }
        }
    }
}

impl std::error::Error for LayoutError {}

/// Linear mapping from a domain (epoch millis for time axes, plain counts
/// otherwise) onto a fixed pixel range
#[derive(Debug, Clone, Copy)]
pub struct AxisMapper {
    domain_min: f64,
    domain_max: f64,
    range_min: f64,
    range_max: f64,
}

impl AxisMapper {
    /// Build a mapper over `[domain_min, domain_max]` -> `[range_min, range_max]`.
    ///
    /// A degenerate domain (`domain_max <= domain_min`) is an error rather
    /// than a collapse-to-`range_min` fallback; callers skip the dependent
    /// chart instead of drawing from a zero-span scale.
    pub fn build(
        domain_min: f64,
        domain_max: f64,
        range_min: f64,
        range_max: f64,
    ) -> Result<Self, LayoutError> {
        if !(domain_max > domain_min) {
            return Err(LayoutError::DegenerateDomain {
                min: domain_min,
                max: domain_max,
            });
        }
        Ok(AxisMapper {
            domain_min,
            domain_max,
            range_min,
            range_max,
        })
    }

    /// Build a time-axis mapper from two instants
    pub fn from_time_range(
        start: NaiveDateTime,
        end: NaiveDateTime,
        range_min: f64,
        range_max: f64,
    ) -> Result<Self, LayoutError> {
        Self::build(
            start.and_utc().timestamp_millis() as f64,
            end.and_utc().timestamp_millis() as f64,
            range_min,
            range_max,
        )
    }

    /// Map a domain value to its pixel position
    pub fn map(&self, value: f64) -> f64 {
        self.range_min
            + (value - self.domain_min) / (self.domain_max - self.domain_min)
                * (self.range_max - self.range_min)
    }

    /// `n` evenly spaced domain values spanning the domain, both boundaries
    /// included. Identical inputs always produce identical sequences.
    pub fn ticks(&self, n: usize) -> Vec<f64> {
        match n {
            0 => Vec::new(),
            1 => vec![self.domain_min],
            _ => {
                let step = (self.domain_max - self.domain_min) / (n - 1) as f64;
                (0..n)
                    .map(|i| {
                        if i == n - 1 {
                            self.domain_max
                        } else {
                            self.domain_min + step * i as f64
                        }
                    })
                    .collect()
            }
        }
    }

    pub fn domain_min(&self) -> f64 {
        self.domain_min
    }

    pub fn domain_max(&self) -> f64 {
        self.domain_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_maps_domain_endpoints_to_range_endpoints() {
        let m = AxisMapper::build(10.0, 30.0, 0.0, 1000.0).unwrap();
        assert_eq!(m.map(10.0), 0.0);
        assert_eq!(m.map(30.0), 1000.0);
        assert_eq!(m.map(20.0), 500.0);
    }

    #[test]
    fn test_nonzero_range_offset() {
        let m = AxisMapper::build(0.0, 10.0, 24.0, 124.0).unwrap();
        assert_eq!(m.map(0.0), 24.0);
        assert_eq!(m.map(10.0), 124.0);
        assert_eq!(m.map(5.0), 74.0);
    }

    #[test]
    fn test_degenerate_domain_is_an_error() {
        let err = AxisMapper::build(5.0, 5.0, 0.0, 100.0).unwrap_err();
        assert_eq!(err, LayoutError::DegenerateDomain { min: 5.0, max: 5.0 });
        assert!(AxisMapper::build(6.0, 5.0, 0.0, 100.0).is_err());
    }

    #[test]
    fn test_ticks_count_order_and_bounds() {
        let m = AxisMapper::build(0.0, 120.0, 0.0, 1.0).unwrap();
        let ticks = m.ticks(13);
        assert_eq!(ticks.len(), 13);
        for pair in ticks.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        assert_eq!(ticks[0], 0.0);
        assert_eq!(ticks[12], 120.0);
        for t in &ticks {
            assert!(*t >= 0.0 && *t <= 120.0);
        }
    }

    #[test]
    fn test_ticks_deterministic() {
        let m = AxisMapper::build(3.0, 17.0, 0.0, 1.0).unwrap();
        assert_eq!(m.ticks(7), m.ticks(7));
    }

    #[test]
    fn test_ticks_degenerate_counts() {
        let m = AxisMapper::build(2.0, 4.0, 0.0, 1.0).unwrap();
        assert!(m.ticks(0).is_empty());
        assert_eq!(m.ticks(1), vec![2.0]);
        assert_eq!(m.ticks(2), vec![2.0, 4.0]);
    }

    #[test]
    fn test_time_range_mapper() {
        let day = NaiveDate::from_ymd_opt(2011, 3, 1).unwrap();
        let t1 = day.and_hms_opt(8, 0, 0).unwrap();
        let t2 = day.and_hms_opt(9, 0, 0).unwrap();
        let m = AxisMapper::from_time_range(t1, t2, 0.0, 3600.0).unwrap();
        assert_eq!(m.map(t1.and_utc().timestamp_millis() as f64), 0.0);
        let mid = day.and_hms_opt(8, 30, 0).unwrap();
        assert_eq!(m.map(mid.and_utc().timestamp_millis() as f64), 1800.0);
    }

    #[test]
    fn test_time_range_same_instant_is_degenerate() {
        let day = NaiveDate::from_ymd_opt(2011, 3, 1).unwrap();
        let t = day.and_hms_opt(8, 0, 0).unwrap();
        assert!(AxisMapper::from_time_range(t, t, 0.0, 100.0).is_err());
    }
}
