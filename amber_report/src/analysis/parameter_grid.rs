//! Must-link / cannot-link sweep: runs are named `<column>_<row>` and the
//! grid holds each run's >90% bin count.

use polars::prelude::*;

use crate::models::{AmberError, AmberResult, Bucket, BucketTable};

pub const DEFAULT_COLUMNS: [&str; 4] = ["1", "50", "400", "1000"];
pub const DEFAULT_ROWS: [&str; 3] = ["1000", "4000", "10000"];

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGrid {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    /// `values[row][column]`
    pub values: Vec<Vec<u32>>,
}

pub fn build_grid(
    table: &BucketTable,
    columns: &[String],
    rows: &[String],
) -> AmberResult<ParameterGrid> {
    if columns.is_empty() || rows.is_empty() {
        return Err(AmberError::InvalidGrid(
            "need at least one row and one column value".to_string(),
        ));
    }

    let mut values = Vec::with_capacity(rows.len());
    for row in rows {
        let mut line = Vec::with_capacity(columns.len());
        for column in columns {
            let method = format!("{column}_{row}");
            line.push(table.get(&method)?.get(Bucket::Over90));
        }
        values.push(line);
    }
    Ok(ParameterGrid {
        rows: rows.to_vec(),
        columns: columns.to_vec(),
        values,
    })
}

impl ParameterGrid {
    /// Row labels go in the first column, named `row`.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut frame: Vec<Column> = vec![Series::new("row".into(), &self.rows).into()];
        for (idx, column) in self.columns.iter().enumerate() {
            let values: Vec<u32> = self.values.iter().map(|r| r[idx]).collect();
            frame.push(Series::new(column.as_str().into(), values).into());
        }
        DataFrame::new(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BucketCounts;

    fn owned(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn sweep_table() -> BucketTable {
        let mut table = BucketTable::default();
        let mut n = 0;
        for column in DEFAULT_COLUMNS {
            for row in DEFAULT_ROWS {
                n += 1;
                table
                    .0
                    .insert(format!("{column}_{row}"), BucketCounts([n, 1, 0, 0, 0]));
            }
        }
        table
    }

    #[test]
    fn grid_is_rows_by_columns() {
        let grid = build_grid(&sweep_table(), &owned(&DEFAULT_COLUMNS), &owned(&DEFAULT_ROWS))
            .unwrap();
        assert_eq!(grid.values.len(), 3);
        assert_eq!(grid.values[0], vec![1, 4, 7, 10]);
        assert_eq!(grid.values[2], vec![3, 6, 9, 12]);

        let df = grid.to_dataframe().unwrap();
        assert_eq!(df.shape(), (3, 5));
        let names: Vec<&str> = df.get_column_names().iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["row", "1", "50", "400", "1000"]);
    }

    #[test]
    fn missing_combination_is_an_error() {
        let err = build_grid(&sweep_table(), &owned(&["2"]), &owned(&["1000"])).unwrap_err();
        assert!(matches!(err, AmberError::UnknownMethod(m) if m == "2_1000"));
    }

    #[test]
    fn empty_axes_are_rejected() {
        let err = build_grid(&sweep_table(), &[], &owned(&DEFAULT_ROWS)).unwrap_err();
        assert!(matches!(err, AmberError::InvalidGrid(_)));
    }
}
