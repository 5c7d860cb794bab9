use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{FareError, Result};

/// Per-feature standardisation, `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Fits on the columns of `x` using the population standard deviation.
    /// Constant columns get a scale of 1 so they transform to 0.
    pub fn fit(x: &DMatrix<f64>) -> Result<Self> {
        if x.nrows() == 0 {
            return Err(FareError::EmptyDataset);
        }
        let mut mean = Vec::with_capacity(x.ncols());
        let mut scale = Vec::with_capacity(x.ncols());
        for col in x.column_iter() {
            let m = col.mean();
            let std = col.variance().sqrt();
            mean.push(m);
            scale.push(if std > 0.0 && std.is_finite() { std } else { 1.0 });
        }
        Ok(Self { mean, scale })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.n_features() {
            return Err(FareError::SchemaMismatch(format!(
                "scaler expects {} features, got {}",
                self.n_features(),
                row.len()
            )));
        }
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }

    pub fn transform(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        if x.ncols() != self.n_features() {
            return Err(FareError::SchemaMismatch(format!(
                "scaler expects {} features, got {}",
                self.n_features(),
                x.ncols()
            )));
        }
        let mut out = x.clone();
        for (j, mut col) in out.column_iter_mut().enumerate() {
            let (m, s) = (self.mean[j], self.scale[j]);
            col.apply(|v| *v = (*v - m) / s);
        }
        Ok(out)
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.mean.len() != self.scale.len() {
            return Err(FareError::SchemaMismatch(format!(
                "scaler has {} means but {} scales",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
            return Err(FareError::SchemaMismatch("scaler has a zero or non-finite scale".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standardises_columns() {
        let x = DMatrix::from_row_slice(4, 2, &[1.0, 7.0, 2.0, 7.0, 3.0, 7.0, 4.0, 7.0]);
        let scaler = StandardScaler::fit(&x).unwrap();
        assert_eq!(scaler.mean, vec![2.5, 7.0]);
        assert!((scaler.scale[0] - 1.25f64.sqrt()).abs() < 1e-12);
        // constant column keeps unit scale
        assert_eq!(scaler.scale[1], 1.0);

        let z = scaler.transform(&x).unwrap();
        let col0 = z.column(0);
        assert!(col0.mean().abs() < 1e-12);
        assert!((col0.variance() - 1.0).abs() < 1e-12);
        assert!(z.column(1).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn row_and_matrix_transforms_agree() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, -2.0, 4.0, 0.5, 9.0, 3.0]);
        let scaler = StandardScaler::fit(&x).unwrap();
        let z = scaler.transform(&x).unwrap();
        let row = scaler.transform_row(&[4.0, 0.5]).unwrap();
        assert!((row[0] - z[(1, 0)]).abs() < 1e-12);
        assert!((row[1] - z[(1, 1)]).abs() < 1e-12);
    }

    #[test]
    fn wrong_width_is_a_schema_mismatch() {
        let scaler = StandardScaler {
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 1.0],
        };
        assert!(matches!(scaler.transform_row(&[1.0]), Err(FareError::SchemaMismatch(_))));
    }
}
