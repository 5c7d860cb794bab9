use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{FareError, Result};

/// Historical trip records, held column-wise with an inferred type per column.
#[derive(Debug, Clone)]
pub struct TripDataset {
    columns: Vec<Column>,
    rows: usize,
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnKind {
    /// Every non-empty cell parsed as a number. Empty or NaN cells are `None`.
    Numeric(Vec<Option<f64>>),
    /// Timestamps, flags and anything else that is not a number.
    Text,
}

impl TripDataset {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            FareError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to open dataset {}: {e}", path.display()),
            ))
        })?;
        Self::from_reader(file)
    }

    /// Reads comma-separated records with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        let mut rows = 0usize;
        for record in rdr.records() {
            let record = record?;
            for (col, cell) in cells.iter_mut().zip(record.iter()) {
                col.push(cell.to_string());
            }
            rows += 1;
        }

        let columns = headers
            .into_iter()
            .zip(cells)
            .map(|(name, values)| Column {
                name,
                kind: infer_kind(&values),
            })
            .collect();

        Ok(Self { columns, rows })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Values of a numeric column with no gaps.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<f64>> {
        let column = self
            .column(name)
            .ok_or_else(|| FareError::SchemaMismatch(format!("dataset has no column `{name}`")))?;
        column.dense_values()
    }
}

impl Column {
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, ColumnKind::Numeric(_))
    }

    pub fn dense_values(&self) -> Result<Vec<f64>> {
        match &self.kind {
            ColumnKind::Numeric(values) => values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    v.ok_or_else(|| FareError::MissingValue {
                        column: self.name.clone(),
                        row: i + 1,
                    })
                })
                .collect(),
            ColumnKind::Text => Err(FareError::SchemaMismatch(format!("column `{}` is not numeric", self.name))),
        }
    }
}

fn infer_kind(values: &[String]) -> ColumnKind {
    let mut parsed = Vec::with_capacity(values.len());
    for v in values {
        if v.is_empty() {
            parsed.push(None);
            continue;
        }
        match v.parse::<f64>() {
            Ok(x) if x.is_finite() => parsed.push(Some(x)),
            Ok(_) => parsed.push(None),
            Err(_) => return ColumnKind::Text,
        }
    }
    ColumnKind::Numeric(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
tpep_pickup_datetime,VendorID,store_and_fwd_flag,fare_amount,tip_amount
2024-01-01 09:00:00,1,N,10.5,
2024-01-01 10:00:00,2,Y,7.0,1.5
";

    #[test]
    fn infers_column_kinds() {
        let ds = TripDataset::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(ds.rows(), 2);
        let kinds: Vec<bool> = ds.columns().iter().map(Column::is_numeric).collect();
        assert_eq!(kinds, vec![false, true, false, true, true]);
        assert_eq!(ds.numeric_values("fare_amount").unwrap(), vec![10.5, 7.0]);
    }

    #[test]
    fn gaps_in_numeric_columns_are_reported() {
        let ds = TripDataset::from_reader(CSV.as_bytes()).unwrap();
        match ds.numeric_values("tip_amount") {
            Err(FareError::MissingValue { column, row }) => {
                assert_eq!(column, "tip_amount");
                assert_eq!(row, 1);
            }
            other => panic!("expected missing value, got {other:?}"),
        }
    }

    #[test]
    fn ragged_rows_fail_to_parse() {
        let bad = "a,b\n1,2\n3\n";
        assert!(matches!(TripDataset::from_reader(bad.as_bytes()), Err(FareError::Csv(_))));
    }

    #[test]
    fn header_only_file_has_no_rows() {
        let ds = TripDataset::from_reader("fare_amount,extra\n".as_bytes()).unwrap();
        assert_eq!(ds.rows(), 0);
    }
}
