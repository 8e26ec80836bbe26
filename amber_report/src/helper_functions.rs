use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::models::AmberResult;

/// Reads a tab-separated table with a header row.
///
/// The whole file is scanned for schema inference so that a column starting
/// with integer-looking values (`1`, `0`) still comes back as floats.
pub fn read_tsv(file_path: &Path) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .map_parse_options(|opts| opts.with_separator(b'\t'))
        .try_into_reader_with_file_path(Some(PathBuf::from(file_path)))?
        .finish()
}

/// Writes `df` as TSV, creating parent directories as needed.
pub fn dataframe_to_tsv(df: &mut DataFrame, path: &Path) -> AmberResult<()> {
    ensure_parent(path)?;
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b'\t')
        .finish(df)?;
    info!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

pub fn write_json<T: Serialize>(value: &T, path: &Path) -> AmberResult<()> {
    ensure_parent(path)?;
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    info!("Wrote {}", path.display());
    Ok(())
}

fn ensure_parent(path: &Path) -> AmberResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn tsv_round_trip_keeps_float_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("table.tsv");
        let mut df = df![
            "method" => &["VAMB", "Maxbin2"],
            "Purity (bp)" => &[1.0, 0.5]
        ]
        .unwrap();
        dataframe_to_tsv(&mut df, &path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("method\tPurity (bp)\n"));

        let back = read_tsv(&path).unwrap();
        assert_eq!(back.shape(), (2, 2));
        assert_eq!(back.column("Purity (bp)").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn integer_looking_prefix_is_inferred_as_float() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.tsv");
        let mut body = String::from("BINID\tPurity (bp)\n");
        for i in 0..150 {
            body.push_str(&format!("bin{i}\t1\n"));
        }
        body.push_str("bin150\t0.25\n");
        fs::write(&path, body).unwrap();

        let df = read_tsv(&path).unwrap();
        assert_eq!(df.column("Purity (bp)").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn json_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("summary.json");
        write_json(&serde_json::json!({"panels": []}), &path).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"panels\": []"));
    }
}
