use polars::prelude::*;
use tracing::info;

use crate::figures::{Comparison, FigureSpec, PanelSpec};
use crate::models::{AmberError, AmberResult, Bucket, BucketTable};

/// The slice of the bucket table one figure panel draws.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PanelTable {
    pub title: Option<String>,
    pub methods: Vec<String>,
    pub labels: Vec<String>,
    pub buckets: Vec<Bucket>,
    /// `counts[row][col]`, rows follow `labels`, columns follow `buckets`.
    pub counts: Vec<Vec<u32>>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ComparisonResult {
    pub description: String,
    /// `None` when the baseline has no >90% bins.
    pub improvement: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FigureReport {
    pub name: String,
    pub panels: Vec<PanelTable>,
    pub comparisons: Vec<ComparisonResult>,
}

/// Picks the panel's methods in order, renames them and keeps only its buckets.
pub fn select_panel(table: &BucketTable, panel: &PanelSpec) -> AmberResult<PanelTable> {
    let mut counts = Vec::with_capacity(panel.methods.len());
    for method in &panel.methods {
        let row = table.get(&method.id)?;
        counts.push(panel.buckets.iter().map(|&b| row.get(b)).collect());
    }
    Ok(PanelTable {
        title: panel.title.clone(),
        methods: panel.methods.iter().map(|m| m.id.clone()).collect(),
        labels: panel.methods.iter().map(|m| m.display().to_string()).collect(),
        buckets: panel.buckets.clone(),
        counts,
    })
}

impl PanelTable {
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = vec![Series::new("method".into(), &self.labels).into()];
        for (col, bucket) in self.buckets.iter().enumerate() {
            let values: Vec<u32> = self.counts.iter().map(|row| row[col]).collect();
            columns.push(Series::new(bucket.label().into(), values).into());
        }
        DataFrame::new(columns)
    }
}

/// `(subject - baseline) / baseline`.
pub fn relative_improvement(subject: u32, baseline: u32) -> Option<f64> {
    if baseline == 0 {
        return None;
    }
    Some((subject as f64 - baseline as f64) / baseline as f64)
}

/// Improvement of the largest value over the second largest.
pub fn best_over_second(values: &[u32]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    match sorted.as_slice() {
        [.., second, best] => relative_improvement(*best, *second),
        _ => None,
    }
}

pub fn evaluate_comparison(
    table: &BucketTable,
    panels: &[PanelTable],
    comparison: &Comparison,
) -> AmberResult<ComparisonResult> {
    let over90 = |id: &str| -> AmberResult<u32> { Ok(table.get(id)?.get(Bucket::Over90)) };

    let result = match comparison {
        Comparison::BestOverSecond { panel } => {
            let panel = panels.get(*panel).ok_or_else(|| {
                AmberError::InvalidFigure(format!("no panel {panel} in a {}-panel figure", panels.len()))
            })?;
            let values = panel
                .methods
                .iter()
                .map(|id| over90(id.as_str()))
                .collect::<AmberResult<Vec<u32>>>()?;
            ComparisonResult {
                description: "Improvement of best binner over second best".to_string(),
                improvement: best_over_second(&values),
            }
        }
        Comparison::Pairwise { subject, baseline } => ComparisonResult {
            description: format!("Improvement of {subject} over {baseline}"),
            improvement: relative_improvement(over90(subject.as_str())?, over90(baseline.as_str())?),
        },
        Comparison::MeanOver { subject, baselines } => {
            let target = over90(subject.as_str())?;
            let mut improvements = Vec::with_capacity(baselines.len());
            for baseline in baselines {
                improvements.push(relative_improvement(target, over90(baseline.as_str())?));
            }
            // any undefined ratio makes the mean undefined
            let improvement = improvements
                .into_iter()
                .collect::<Option<Vec<f64>>>()
                .filter(|v| !v.is_empty())
                .map(|v| v.iter().sum::<f64>() / v.len() as f64);
            ComparisonResult {
                description: format!(
                    "Average improvement of {subject} over {}",
                    baselines.join(", ")
                ),
                improvement,
            }
        }
    };

    match result.improvement {
        Some(ratio) => info!("{}: {:.2}%", result.description, ratio * 100.0),
        None => info!("{}: undefined (zero baseline)", result.description),
    }
    Ok(result)
}

pub fn run_figure(table: &BucketTable, figure: &FigureSpec) -> AmberResult<FigureReport> {
    let panels = figure
        .panels
        .iter()
        .map(|p| select_panel(table, p))
        .collect::<AmberResult<Vec<_>>>()?;
    let comparisons = figure
        .comparisons
        .iter()
        .map(|c| evaluate_comparison(table, &panels, c))
        .collect::<AmberResult<Vec<_>>>()?;
    Ok(FigureReport {
        name: figure.name.clone(),
        panels,
        comparisons,
    })
}
