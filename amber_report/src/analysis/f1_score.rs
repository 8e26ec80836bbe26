use std::collections::BTreeMap;

use polars::prelude::*;
use tracing::{info, warn};

use crate::data_handling::amber_genome::AmberGenomeResults;
use crate::models::{AmberError, AmberResult, BinMetric, GOLD_STANDARD};

/// Bins below either bound are left out of the F1 distribution.
pub const F1_MIN_COMPLETENESS: f64 = 0.5;
pub const F1_MIN_PURITY: f64 = 0.5;

/// Harmonic mean of completeness and purity for bins passing both 0.5 bounds.
///
/// A zero-filled missing value fails the bound and drops the bin, so missing
/// data never shows up as an F1 of zero.
pub fn bin_f1_scores(bins: &[BinMetric]) -> Vec<f64> {
    bins.iter()
        .filter(|b| b.completeness >= F1_MIN_COMPLETENESS && b.purity >= F1_MIN_PURITY)
        .map(|b| 2.0 * b.completeness * b.purity / (b.completeness + b.purity))
        .collect()
}

/// Per-method F1 values, skipping AMBER's gold standard.
///
/// With `methods` given, only those are returned (every one must exist).
pub fn f1_scores_per_method(
    results: &AmberGenomeResults,
    methods: Option<&[String]>,
) -> AmberResult<BTreeMap<String, Vec<f64>>> {
    let mut scores = BTreeMap::new();
    for method in results.methods()? {
        if method.label == GOLD_STANDARD {
            continue;
        }
        if let Some(wanted) = methods {
            if !wanted.contains(&method.label) {
                continue;
            }
        }
        let f1 = bin_f1_scores(&method.bin_metrics()?);
        if f1.is_empty() {
            warn!("{} has no bins with completeness and purity >= 0.5", method.label);
        }
        scores.insert(method.label, f1);
    }

    if let Some(wanted) = methods {
        if let Some(missing) = wanted.iter().find(|m| !scores.contains_key(*m)) {
            return Err(AmberError::UnknownMethod(missing.clone()));
        }
    }
    info!("Computed F1 distributions for {} methods", scores.len());
    Ok(scores)
}

#[derive(Debug, Clone, PartialEq)]
pub struct F1Summary {
    pub count: usize,
    pub min: f64,
    pub median: f64,
    pub mean: f64,
    pub max: f64,
}

pub fn summarize(values: &[f64]) -> Option<F1Summary> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    Some(F1Summary {
        count: n,
        min: sorted[0],
        median,
        mean: sorted.iter().sum::<f64>() / n as f64,
        max: sorted[n - 1],
    })
}

/// Long format: one row per (method, bin) pair.
pub fn scores_to_dataframe(scores: &BTreeMap<String, Vec<f64>>) -> PolarsResult<DataFrame> {
    let mut methods = Vec::new();
    let mut values = Vec::new();
    for (method, f1) in scores {
        for &v in f1 {
            methods.push(method.as_str());
            values.push(v);
        }
    }
    DataFrame::new(vec![
        Series::new("method".into(), methods).into(),
        Series::new("F1".into(), values).into(),
    ])
}

/// One row per method with its distribution summary; empty methods get a
/// count of 0 and null statistics.
pub fn summary_to_dataframe(scores: &BTreeMap<String, Vec<f64>>) -> PolarsResult<DataFrame> {
    let summaries: Vec<(&str, Option<F1Summary>)> = scores
        .iter()
        .map(|(m, v)| (m.as_str(), summarize(v)))
        .collect();
    let stat = |f: fn(&F1Summary) -> f64| -> Vec<Option<f64>> {
        summaries.iter().map(|(_, s)| s.as_ref().map(f)).collect()
    };

    DataFrame::new(vec![
        Series::new(
            "method".into(),
            summaries.iter().map(|(m, _)| *m).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            "count".into(),
            summaries
                .iter()
                .map(|(_, s)| s.as_ref().map_or(0, |s| s.count as u32))
                .collect::<Vec<u32>>(),
        )
        .into(),
        Series::new("min".into(), stat(|s| s.min)).into(),
        Series::new("median".into(), stat(|s| s.median)).into(),
        Series::new("mean".into(), stat(|s| s.mean)).into(),
        Series::new("max".into(), stat(|s| s.max)).into(),
    ])
}
