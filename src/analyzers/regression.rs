//! Dense ordinary least squares for small design matrices.

use crate::error::{AnalysisError, Result};

/// Relative pivot size below which the normal equations count as singular.
const SINGULAR_TOLERANCE: f64 = 1e-10;

/// Coefficients of a fitted linear model.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub coefficients: Vec<f64>,
}

impl OlsFit {
    /// Fits `response ~ design` by solving the normal equations.
    ///
    /// Every row of `design` must have the same width, which is the number of
    /// parameters. An intercept is only present if the caller includes a
    /// constant column.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InsufficientData`] when there are fewer rows
    /// than parameters or the columns are linearly dependent.
    pub fn fit(design: &[Vec<f64>], response: &[f64]) -> Result<Self> {
        let params = design.first().map_or(0, Vec::len);

        if params == 0 || design.len() != response.len() {
            return Err(AnalysisError::InsufficientData(format!(
                "design has {} rows for {} observations",
                design.len(),
                response.len()
            )));
        }
        if design.len() < params {
            return Err(AnalysisError::InsufficientData(format!(
                "{} observations cannot determine {params} parameters",
                design.len()
            )));
        }

        // Augmented [X'X | X'y].
        let mut system = vec![vec![0.0; params + 1]; params];
        for (row, y) in design.iter().zip(response) {
            if row.len() != params {
                return Err(AnalysisError::InsufficientData(
                    "design rows differ in width".to_string(),
                ));
            }
            for i in 0..params {
                for j in 0..params {
                    system[i][j] += row[i] * row[j];
                }
                system[i][params] += row[i] * y;
            }
        }

        let coefficients = solve(system)?;
        Ok(Self { coefficients })
    }

    /// Fitted values for each row of `design`.
    pub fn predict(&self, design: &[Vec<f64>]) -> Vec<f64> {
        design
            .iter()
            .map(|row| row.iter().zip(&self.coefficients).map(|(x, b)| x * b).sum())
            .collect()
    }
}

/// Gauss-Jordan elimination with partial pivoting on an augmented matrix.
fn solve(mut system: Vec<Vec<f64>>) -> Result<Vec<f64>> {
    let n = system.len();
    let scale = (0..n)
        .map(|i| system[i][i].abs())
        .fold(0.0_f64, f64::max)
        .max(1.0);

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&a, &b| system[a][col].abs().total_cmp(&system[b][col].abs()))
            .unwrap_or(col);

        if system[pivot][col].abs() < SINGULAR_TOLERANCE * scale {
            return Err(AnalysisError::InsufficientData(
                "regressors are linearly dependent".to_string(),
            ));
        }
        system.swap(col, pivot);

        let lead = system[col][col];
        for value in system[col].iter_mut() {
            *value /= lead;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = system[row][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..=n {
                system[row][k] -= factor * system[col][k];
            }
        }
    }

    Ok(system.into_iter().map(|row| row[n]).collect())
}
