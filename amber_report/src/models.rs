use std::collections::BTreeMap;
use std::path::PathBuf;

use polars::prelude::*;
use thiserror::Error;

/// AMBER column holding the bp-weighted completeness of a bin.
pub const COMPLETENESS_COLUMN: &str = "Completeness (bp)";
/// AMBER column holding the bp-weighted purity of a bin.
pub const PURITY_COLUMN: &str = "Purity (bp)";
/// File AMBER writes for every method under `genome/<method>/`.
pub const METRICS_FILE: &str = "metrics_per_bin.tsv";
/// AMBER's reference "method"; it is not a binner.
pub const GOLD_STANDARD: &str = "Gold standard";

/// Completeness cut-offs, highest first. A bin lands in the first one it exceeds.
pub const COMPLETENESS_THRESHOLDS: [f64; 5] = [0.9, 0.8, 0.7, 0.6, 0.5];
pub const DEFAULT_MIN_PURITY: f64 = 0.95;

#[derive(Debug, Error)]
pub enum AmberError {
    #[error("AMBER genome directory not found: {0}")]
    MissingGenomeDir(PathBuf),

    #[error("metrics table for method `{method}` not found at {path}")]
    MissingMetrics { method: String, path: PathBuf },

    #[error("column `{column}` missing from {path}")]
    MissingColumn { column: String, path: PathBuf },

    #[error("column `{column}` in {path} is not numeric: {reason}")]
    NonNumericColumn {
        column: String,
        path: PathBuf,
        reason: String,
    },

    #[error("method `{0}` not present in the AMBER results")]
    UnknownMethod(String),

    #[error("unknown figure preset `{0}`")]
    UnknownFigure(String),

    #[error("invalid figure definition: {0}")]
    InvalidFigure(String),

    #[error("purity cut-off must lie in [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("invalid parameter grid: {0}")]
    InvalidGrid(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type AmberResult<T> = Result<T, AmberError>;

/// Anything that can be loaded as a raw frame.
pub trait Dataset {
    fn load(&self) -> AmberResult<DataFrame>;
}

/// One row of `metrics_per_bin.tsv`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinMetric {
    pub completeness: f64,
    pub purity: f64,
}

impl BinMetric {
    /// Missing values (null or NaN) count as zero.
    pub fn from_raw(completeness: Option<f64>, purity: Option<f64>) -> Self {
        Self {
            completeness: zero_fill(completeness),
            purity: zero_fill(purity),
        }
    }
}

fn zero_fill(value: Option<f64>) -> f64 {
    match value {
        Some(v) if !v.is_nan() => v,
        _ => 0.0,
    }
}

/// One completeness bucket, named after its lower bound in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum Bucket {
    #[serde(rename = ">90")]
    Over90,
    #[serde(rename = ">80")]
    Over80,
    #[serde(rename = ">70")]
    Over70,
    #[serde(rename = ">60")]
    Over60,
    #[serde(rename = ">50")]
    Over50,
}

impl Bucket {
    pub const ALL: [Bucket; 5] = [
        Bucket::Over90,
        Bucket::Over80,
        Bucket::Over70,
        Bucket::Over60,
        Bucket::Over50,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Bucket::Over90 => ">90",
            Bucket::Over80 => ">80",
            Bucket::Over70 => ">70",
            Bucket::Over60 => ">60",
            Bucket::Over50 => ">50",
        }
    }

    pub fn threshold(self) -> f64 {
        COMPLETENESS_THRESHOLDS[self.index()]
    }
}

/// Exclusive bin counts per completeness bucket, ordered [>90, >80, >70, >60, >50].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketCounts(pub [u32; 5]);

impl BucketCounts {
    pub fn get(&self, bucket: Bucket) -> u32 {
        self.0[bucket.index()]
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

/// Method label -> bucket counts, sorted by label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketTable(pub BTreeMap<String, BucketCounts>);

impl BucketTable {
    pub fn get(&self, method: &str) -> AmberResult<&BucketCounts> {
        self.0
            .get(method)
            .ok_or_else(|| AmberError::UnknownMethod(method.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_are_zero_filled() {
        let m = BinMetric::from_raw(None, Some(f64::NAN));
        assert_eq!(m, BinMetric { completeness: 0.0, purity: 0.0 });
        let m = BinMetric::from_raw(Some(0.7), Some(0.99));
        assert_eq!(m, BinMetric { completeness: 0.7, purity: 0.99 });
    }

    #[test]
    fn total_sums_all_buckets() {
        assert_eq!(BucketCounts([3, 0, 2, 1, 4]).total(), 10);
    }

    #[test]
    fn bucket_labels_follow_thresholds() {
        assert_eq!(Bucket::Over70.label(), ">70");
        assert_eq!(Bucket::Over70.threshold(), 0.7);
        assert_eq!(
            serde_json::to_string(&Bucket::Over90).unwrap(),
            "\">90\""
        );
    }

    #[test]
    fn unknown_method_lookup_fails() {
        let table = BucketTable::default();
        assert!(matches!(
            table.get("VAMB"),
            Err(AmberError::UnknownMethod(m)) if m == "VAMB"
        ));
    }
}
