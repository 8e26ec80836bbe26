use std::fs;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::{debug, error, info};

use crate::helper_functions::read_tsv;
use crate::models::{
    AmberError, AmberResult, BinMetric, Dataset, COMPLETENESS_COLUMN, METRICS_FILE, PURITY_COLUMN,
};

/// An AMBER output directory; per-method results live under `genome/`.
pub struct AmberGenomeResults {
    pub amber_path: PathBuf,
}

/// One method's `genome/<method>/` directory.
#[derive(Debug, Clone)]
pub struct MethodResult {
    pub label: String,
    pub path: PathBuf,
}

impl AmberGenomeResults {
    pub fn new(amber_path: impl Into<PathBuf>) -> Self {
        Self {
            amber_path: amber_path.into(),
        }
    }

    pub fn genome_path(&self) -> PathBuf {
        self.amber_path.join("genome")
    }

    /// Immediate subdirectories of `genome/`, sorted by label.
    pub fn methods(&self) -> AmberResult<Vec<MethodResult>> {
        let genome_path = self.genome_path();
        if !genome_path.is_dir() {
            error!("AMBER genome directory missing: {}", genome_path.display());
            return Err(AmberError::MissingGenomeDir(genome_path));
        }

        let mut methods = Vec::new();
        for entry in fs::read_dir(&genome_path)? {
            let entry = entry?;
            // follows symlinks, so linked method directories are kept
            if !entry.path().is_dir() {
                continue;
            }
            let label = entry.file_name().to_string_lossy().into_owned();
            methods.push(MethodResult {
                label,
                path: entry.path(),
            });
        }
        methods.sort_by(|a, b| a.label.cmp(&b.label));

        info!(
            "Found {} method result sets under {}",
            methods.len(),
            genome_path.display()
        );
        Ok(methods)
    }
}

impl MethodResult {
    pub fn metrics_path(&self) -> PathBuf {
        self.path.join(METRICS_FILE)
    }

    /// Typed view of the metrics table, one record per bin in file order.
    pub fn bin_metrics(&self) -> AmberResult<Vec<BinMetric>> {
        let df = self.load()?;
        let path = self.metrics_path();
        let completeness = float_column(&df, COMPLETENESS_COLUMN, &path)?;
        let purity = float_column(&df, PURITY_COLUMN, &path)?;

        let bins: Vec<BinMetric> = completeness
            .f64()?
            .into_iter()
            .zip(purity.f64()?.into_iter())
            .map(|(c, p)| BinMetric::from_raw(c, p))
            .collect();
        debug!("{}: {} bins", self.label, bins.len());
        Ok(bins)
    }
}

impl Dataset for MethodResult {
    fn load(&self) -> AmberResult<DataFrame> {
        let path = self.metrics_path();
        if !path.is_file() {
            error!("No {} for method {}", METRICS_FILE, self.label);
            return Err(AmberError::MissingMetrics {
                method: self.label.clone(),
                path,
            });
        }
        debug!("Reading data from {}", path.display());
        Ok(read_tsv(&path)?)
    }
}

/// Fetches `name` and casts it to `Float64`; values that are present but do
/// not parse as numbers are an error, not a silent null.
fn float_column(df: &DataFrame, name: &str, path: &Path) -> AmberResult<Series> {
    let column = df.column(name).map_err(|_| AmberError::MissingColumn {
        column: name.to_string(),
        path: path.to_path_buf(),
    })?;
    column
        .as_materialized_series()
        .strict_cast(&DataType::Float64)
        .map_err(|e| AmberError::NonNumericColumn {
            column: name.to_string(),
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Lays out `<root>/genome/<method>/metrics_per_bin.tsv` with the given
    /// (completeness, purity) rows.
    pub(crate) fn write_method(root: &Path, method: &str, bins: &[(f64, f64)]) {
        let mut body = String::from("BINID\tMost abundant genome\tPurity (bp)\tCompleteness (bp)\n");
        for (i, (completeness, purity)) in bins.iter().enumerate() {
            body.push_str(&format!("bin.{i}\tgenome_{i}\t{purity}\t{completeness}\n"));
        }
        write_raw(root, method, &body);
    }

    pub(crate) fn write_raw(root: &Path, method: &str, body: &str) {
        let dir = root.join("genome").join(method);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(METRICS_FILE), body).unwrap();
    }

    #[test]
    fn lists_only_directories() {
        let root = tempfile::tempdir().unwrap();
        write_method(root.path(), "VAMB", &[(0.9, 1.0)]);
        write_method(root.path(), "Maxbin2", &[(0.9, 1.0)]);
        fs::write(root.path().join("genome").join("summary.tsv"), "x").unwrap();

        let labels: Vec<String> = AmberGenomeResults::new(root.path())
            .methods()
            .unwrap()
            .into_iter()
            .map(|m| m.label)
            .collect();
        assert_eq!(labels, vec!["Maxbin2", "VAMB"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_method_dir_is_listed() {
        let root = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        write_method(root.path(), "VAMB", &[(0.9, 1.0)]);
        write_method(elsewhere.path(), "SemiBin_200", &[(0.95, 1.0)]);
        std::os::unix::fs::symlink(
            elsewhere.path().join("genome").join("SemiBin_200"),
            root.path().join("genome").join("SemiBin_200"),
        )
        .unwrap();

        let methods = AmberGenomeResults::new(root.path()).methods().unwrap();
        let labels: Vec<&str> = methods.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["SemiBin_200", "VAMB"]);
        assert_eq!(
            methods[0].bin_metrics().unwrap(),
            vec![BinMetric { completeness: 0.95, purity: 1.0 }]
        );
    }

    #[test]
    fn missing_genome_dir_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let err = AmberGenomeResults::new(root.path().join("nope"))
            .methods()
            .unwrap_err();
        assert!(matches!(err, AmberError::MissingGenomeDir(_)));
    }

    #[test]
    fn reads_bins_in_file_order() {
        let root = tempfile::tempdir().unwrap();
        write_method(root.path(), "SemiBin_200", &[(0.95, 1.0), (0.42, 0.8)]);
        let method = &AmberGenomeResults::new(root.path()).methods().unwrap()[0];
        let bins = method.bin_metrics().unwrap();
        assert_eq!(
            bins,
            vec![
                BinMetric { completeness: 0.95, purity: 1.0 },
                BinMetric { completeness: 0.42, purity: 0.8 },
            ]
        );
    }

    #[test]
    fn empty_cells_become_zero() {
        let root = tempfile::tempdir().unwrap();
        write_raw(
            root.path(),
            "VAMB",
            "BINID\tPurity (bp)\tCompleteness (bp)\nb1\t\t0.9\nb2\t0.97\t\nb3\t0.99\t0.91\n",
        );
        let method = &AmberGenomeResults::new(root.path()).methods().unwrap()[0];
        let bins = method.bin_metrics().unwrap();
        assert_eq!(bins[0], BinMetric { completeness: 0.9, purity: 0.0 });
        assert_eq!(bins[1], BinMetric { completeness: 0.0, purity: 0.97 });
        assert_eq!(bins[2], BinMetric { completeness: 0.91, purity: 0.99 });
    }

    #[test]
    fn missing_metrics_file_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("genome").join("VAMB")).unwrap();
        let method = &AmberGenomeResults::new(root.path()).methods().unwrap()[0];
        assert!(matches!(
            method.bin_metrics(),
            Err(AmberError::MissingMetrics { method, .. }) if method == "VAMB"
        ));
    }

    #[test]
    fn missing_column_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        write_raw(root.path(), "VAMB", "BINID\tPurity (bp)\nb1\t0.99\n");
        let method = &AmberGenomeResults::new(root.path()).methods().unwrap()[0];
        assert!(matches!(
            method.bin_metrics(),
            Err(AmberError::MissingColumn { column, .. }) if column == COMPLETENESS_COLUMN
        ));
    }

    #[test]
    fn text_in_numeric_column_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        write_raw(
            root.path(),
            "VAMB",
            "BINID\tPurity (bp)\tCompleteness (bp)\nb1\thigh\t0.9\n",
        );
        let method = &AmberGenomeResults::new(root.path()).methods().unwrap()[0];
        assert!(matches!(
            method.bin_metrics(),
            Err(AmberError::NonNumericColumn { column, .. }) if column == PURITY_COLUMN
        ));
    }
}
