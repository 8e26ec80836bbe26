//! Counts high-purity bins per completeness bucket for every method in an
//! AMBER run. This is the table behind all stacked bar figures.

use std::collections::BTreeMap;

use polars::prelude::*;
use tracing::{debug, info};

use crate::data_handling::amber_genome::AmberGenomeResults;
use crate::models::{
    AmberError, AmberResult, BinMetric, Bucket, BucketCounts, BucketTable, DEFAULT_MIN_PURITY,
};

/// Purity cut-off applied before bucketing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketThresholds {
    pub min_purity: f64,
}

impl BucketThresholds {
    /// Rejects NaN and anything outside [0, 1].
    pub fn new(min_purity: f64) -> AmberResult<Self> {
        if !(0.0..=1.0).contains(&min_purity) {
            return Err(AmberError::InvalidThreshold(min_purity));
        }
        Ok(Self { min_purity })
    }
}

impl Default for BucketThresholds {
    fn default() -> Self {
        Self {
            min_purity: DEFAULT_MIN_PURITY,
        }
    }
}

/// Number of purity-qualifying bins whose completeness strictly exceeds each
/// of [0.9, 0.8, 0.7, 0.6, 0.5].
pub fn cumulative_counts(bins: &[BinMetric], thresholds: &BucketThresholds) -> [u32; 5] {
    let mut cumulative = [0u32; 5];
    for bin in bins.iter().filter(|b| b.purity >= thresholds.min_purity) {
        for bucket in Bucket::ALL {
            if bin.completeness > bucket.threshold() {
                cumulative[bucket.index()] += 1;
            }
        }
    }
    cumulative
}

/// Turns cumulative counts into exclusive buckets by subtracting every higher
/// bucket already assigned.
fn exclusive_counts(cumulative: [u32; 5]) -> BucketCounts {
    let mut buckets = [0u32; 5];
    let mut assigned = 0u32;
    for (bucket, total) in buckets.iter_mut().zip(cumulative) {
        // cumulative counts never decrease as the threshold drops
        *bucket = total - assigned;
        assigned += *bucket;
    }
    BucketCounts(buckets)
}

pub fn bucket_counts(bins: &[BinMetric], thresholds: &BucketThresholds) -> BucketCounts {
    exclusive_counts(cumulative_counts(bins, thresholds))
}

/// Bucket table for every method directory under `<amber_path>/genome`.
///
/// Any missing directory, metrics file or column aborts the whole table.
pub fn get_number_of_genomes_per_completeness(
    results: &AmberGenomeResults,
    thresholds: &BucketThresholds,
) -> AmberResult<BucketTable> {
    let mut table = BTreeMap::new();
    for method in results.methods()? {
        let bins = method.bin_metrics()?;
        let counts = bucket_counts(&bins, thresholds);
        debug!("{}: {:?} of {} bins", method.label, counts.0, bins.len());
        table.insert(method.label, counts);
    }
    info!(
        "Bucketed {} methods (purity >= {})",
        table.len(),
        thresholds.min_purity
    );
    Ok(BucketTable(table))
}

/// One row per method, one `u32` column per bucket.
pub fn table_to_dataframe(table: &BucketTable) -> PolarsResult<DataFrame> {
    let methods: Vec<&str> = table.0.keys().map(String::as_str).collect();
    let mut columns: Vec<Column> = vec![Series::new("method".into(), methods).into()];
    for bucket in Bucket::ALL {
        let values: Vec<u32> = table.0.values().map(|c| c.get(bucket)).collect();
        columns.push(Series::new(bucket.label().into(), values).into());
    }
    DataFrame::new(columns)
}
