//! Bucketed distribution metrics
//!
//! A [`MetricDistribution`] maps bucket lower bounds to counts. A value lands in
//! the bucket of the greatest bound that does not exceed it; values below the
//! first bound land in the first bucket. Merging sums counts bucket by bucket
//! and keeps every bucket of both sides, so merge is associative and
//! commutative and the merged total is the sum of the input totals.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MetricDistribution {
    buckets: BTreeMap<u32, u64>,
}

impl MetricDistribution {
    /// An all-zero distribution with one bucket per limit.
    pub fn with_limits(limits: &[u32]) -> Self {
        Self { buckets: limits.iter().map(|&l| (l, 0)).collect() }
    }

    pub fn from_values(limits: &[u32], values: impl IntoIterator<Item = u32>) -> Self {
        let mut dist = Self::with_limits(limits);
        for v in values {
            dist.add_value(v);
        }
        dist
    }

    /// Count one occurrence of `value`. With no buckets at all, the value opens its own bucket.
    pub fn add_value(&mut self, value: u32) {
        let bucket = self
            .buckets
            .range(..=value)
            .next_back()
            .or_else(|| self.buckets.iter().next())
            .map_or(value, |(&bound, _)| bound);
        *self.buckets.entry(bucket).or_insert(0) += 1;
    }

    pub fn merge(&mut self, other: &Self) {
        for (&bound, &count) in &other.buckets {
            *self.buckets.entry(bound).or_insert(0) += count;
        }
    }

    #[must_use]
    pub fn merged(mut self, other: &Self) -> Self {
        self.merge(other);
        self
    }

    pub fn count(&self, bucket: u32) -> u64 {
        self.buckets.get(&bucket).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.buckets.values().sum()
    }

    pub fn buckets(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.buckets.iter().map(|(&b, &c)| (b, c))
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Renders as `1=3;2=0;4=1`.
impl fmt::Display for MetricDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (bound, count)) in self.buckets().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{bound}={count}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: &[u32] = &[1, 2, 4, 6, 8, 10, 12];

    #[test]
    fn test_with_limits_is_zeroed() {
        let d = MetricDistribution::with_limits(LIMITS);
        assert_eq!(d.buckets().count(), LIMITS.len());
        assert_eq!(d.total(), 0);
        assert!(!d.is_empty());
    }

    #[test]
    fn test_values_land_in_greatest_lower_bound() {
        let d = MetricDistribution::from_values(LIMITS, [1, 2, 3, 5, 12, 40]);
        assert_eq!(d.count(1), 1);
        assert_eq!(d.count(2), 2);
        assert_eq!(d.count(4), 1);
        assert_eq!(d.count(12), 2);
        assert_eq!(d.total(), 6);
    }

    #[test]
    fn test_values_below_first_bound_use_first_bucket() {
        let d = MetricDistribution::from_values(&[5, 10], [0, 3]);
        assert_eq!(d.count(5), 2);
    }

    #[test]
    fn test_add_value_without_buckets_opens_bucket() {
        let mut d = MetricDistribution::default();
        d.add_value(7);
        assert_eq!(d.count(7), 1);
    }

    #[test]
    fn test_merge_keeps_all_buckets_and_sums_totals() {
        let a = MetricDistribution::from_values(&[1, 4], [1, 5]);
        let b = MetricDistribution::from_values(&[1, 10], [2, 11, 11]);
        let merged = a.clone().merged(&b);
        assert_eq!(merged.count(1), 2);
        assert_eq!(merged.count(4), 1);
        assert_eq!(merged.count(10), 2);
        assert_eq!(merged.total(), a.total() + b.total());
    }

    #[test]
    fn test_merge_is_commutative_and_associative() {
        let a = MetricDistribution::from_values(LIMITS, [1, 3, 9]);
        let b = MetricDistribution::from_values(LIMITS, [2, 2]);
        let c = MetricDistribution::from_values(&[1, 20], [25]);
        let ab_c = a.clone().merged(&b).merged(&c);
        let a_bc = a.clone().merged(&b.clone().merged(&c));
        let cba = c.clone().merged(&b).merged(&a);
        assert_eq!(ab_c, a_bc);
        assert_eq!(ab_c, cba);
        assert_eq!(ab_c.total(), 6);
    }

    #[test]
    fn test_display_format() {
        let d = MetricDistribution::from_values(&[1, 2, 4], [1, 1, 5]);
        assert_eq!(d.to_string(), "1=2;2=0;4=1");
        assert_eq!(MetricDistribution::default().to_string(), "");
    }

    #[test]
    fn test_serializes_as_map() {
        let d = MetricDistribution::from_values(&[1, 2], [2]);
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, r#"{"1":0,"2":1}"#);
    }
}
