use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{FareError, Result};

const RCOND: f64 = 1e-10;

/// Ordinary least squares with an intercept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    /// Fits `y ≈ x·w + b` by centring both sides and solving the centred
    /// system with an SVD. Singular values below `RCOND` times the largest are
    /// dropped, so collinear columns (a full set of one-hot indicators, a
    /// constant column) yield the minimum-norm solution instead of an error.
    pub fn fit(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<Self> {
        let n = x.nrows();
        if n == 0 {
            return Err(FareError::EmptyDataset);
        }
        if y.len() != n {
            return Err(FareError::Fit(format!("{} feature rows but {} labels", n, y.len())));
        }

        let x_mean: Vec<f64> = x.column_iter().map(|c| c.mean()).collect();
        let y_mean = y.mean();

        let mut xc = x.clone();
        for (j, mut col) in xc.column_iter_mut().enumerate() {
            let m = x_mean[j];
            col.apply(|v| *v -= m);
        }
        let yc = y.map(|v| v - y_mean);

        let svd = xc.svd(true, true);
        let max_sv = svd.singular_values.iter().copied().fold(0.0, f64::max);
        let eps = (max_sv * RCOND).max(f64::MIN_POSITIVE);
        let w = svd.solve(&yc, eps).map_err(|e| FareError::Fit(e.to_string()))?;

        let coefficients: Vec<f64> = w.iter().copied().collect();
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(FareError::Fit("solution has non-finite coefficients".into()));
        }
        let intercept = y_mean - x_mean.iter().zip(&coefficients).map(|(m, c)| m * c).sum::<f64>();

        Ok(Self {
            coefficients,
            intercept,
        })
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    pub fn predict_row(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.n_features() {
            return Err(FareError::SchemaMismatch(format!(
                "model expects {} features, got {}",
                self.n_features(),
                row.len()
            )));
        }
        Ok(self.intercept + row.iter().zip(&self.coefficients).map(|(x, w)| x * w).sum::<f64>())
    }

    pub fn predict(&self, x: &DMatrix<f64>) -> Result<DVector<f64>> {
        if x.ncols() != self.n_features() {
            return Err(FareError::SchemaMismatch(format!(
                "model expects {} features, got {}",
                self.n_features(),
                x.ncols()
            )));
        }
        let w = DVector::from_column_slice(&self.coefficients);
        Ok((x * w).add_scalar(self.intercept))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_exact_linear_relation() {
        // y = 3*x0 - 2*x1 + 4
        let rows = [(0.0, 1.0), (1.0, 0.0), (2.0, 5.0), (3.0, -1.0), (4.0, 2.5)];
        let x = DMatrix::from_row_iterator(rows.len(), 2, rows.iter().flat_map(|(a, b)| [*a, *b]));
        let y = DVector::from_iterator(rows.len(), rows.iter().map(|(a, b)| 3.0 * a - 2.0 * b + 4.0));

        let model = LinearModel::fit(&x, &y).unwrap();
        assert!((model.coefficients[0] - 3.0).abs() < 1e-9);
        assert!((model.coefficients[1] + 2.0).abs() < 1e-9);
        assert!((model.intercept - 4.0).abs() < 1e-9);
        assert!((model.predict_row(&[10.0, 1.0]).unwrap() - 32.0).abs() < 1e-9);
    }

    #[test]
    fn collinear_columns_still_fit() {
        // two indicator columns that always sum to one, plus a constant column
        let x = DMatrix::from_row_slice(4, 3, &[1.0, 0.0, 5.0, 0.0, 1.0, 5.0, 1.0, 0.0, 5.0, 0.0, 1.0, 5.0]);
        let y = DVector::from_column_slice(&[10.0, 20.0, 10.0, 20.0]);

        let model = LinearModel::fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        for (p, t) in pred.iter().zip(y.iter()) {
            assert!((p - t).abs() < 1e-9, "{p} vs {t}");
        }
        assert!(model.coefficients[2].abs() < 1e-9);
    }

    #[test]
    fn width_mismatch_is_reported() {
        let model = LinearModel {
            coefficients: vec![1.0, 2.0],
            intercept: 0.0,
        };
        assert!(matches!(model.predict_row(&[1.0, 2.0, 3.0]), Err(FareError::SchemaMismatch(_))));
    }
}
