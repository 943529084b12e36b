//! Per-feature min/max normalization of series batches.
//!
//! The engine only ever sees normalized data: inputs are mapped into `[0, 1]`
//! before a forward pass, and the sigmoid output is mapped back to raw units
//! with the target scaler afterwards.

use crate::api::error::{LstmError, LstmResult};
use crate::api::types::Series;

/// Stores `(min, range)` per feature, `range = max - min`.
///
/// A constant feature (or one with no values) gets range `1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    params: Vec<(f64, f64)>,
}

impl MinMaxScaler {
    /// Fit one `(min, range)` pair per input feature over every timestep of
    /// every series.
    pub fn fit(inputs: &[Series<f64>]) -> LstmResult<Self> {
        let n_features = inputs
            .first()
            .map(Series::n_features)
            .ok_or_else(|| LstmError::InvalidConfig("cannot fit a scaler on an empty batch".into()))?;
        for (s, series) in inputs.iter().enumerate() {
            if series.n_features() != n_features {
                return Err(LstmError::shape(
                    format!("feature count of series {}", s),
                    n_features,
                    series.n_features(),
                ));
            }
        }

        let params = (0..n_features)
            .map(|f| min_range(inputs.iter().flat_map(|series| series.feature(f).iter().copied())))
            .collect();
        Ok(Self { params })
    }

    /// Fit a single-feature scaler over all target values.
    pub fn fit_targets(targets: &[Vec<f64>]) -> Self {
        Self {
            params: vec![min_range(targets.iter().flatten().copied())],
        }
    }

    pub fn n_features(&self) -> usize {
        self.params.len()
    }

    /// Per-feature `(min, range)` pairs.
    pub fn params(&self) -> &[(f64, f64)] {
        &self.params
    }

    pub fn transform(&self, inputs: &[Series<f64>]) -> LstmResult<Vec<Series<f64>>> {
        inputs
            .iter()
            .map(|series| self.map_series(series, |x, (min, range)| (x - min) / range))
            .collect()
    }

    pub fn inverse_transform(&self, inputs: &[Series<f64>]) -> LstmResult<Vec<Series<f64>>> {
        inputs
            .iter()
            .map(|series| self.map_series(series, |x, (min, range)| x * range + min))
            .collect()
    }

    /// Normalize target sequences with a scaler from [`MinMaxScaler::fit_targets`].
    pub fn transform_targets(&self, targets: &[Vec<f64>]) -> LstmResult<Vec<Vec<f64>>> {
        let (min, range) = self.single()?;
        Ok(targets
            .iter()
            .map(|t| t.iter().map(|&x| (x - min) / range).collect())
            .collect())
    }

    /// Map predictions back to raw target units.
    pub fn inverse_targets(&self, predictions: &[Vec<f64>]) -> LstmResult<Vec<Vec<f64>>> {
        let (min, range) = self.single()?;
        Ok(predictions
            .iter()
            .map(|p| p.iter().map(|&x| x * range + min).collect())
            .collect())
    }

    fn single(&self) -> LstmResult<(f64, f64)> {
        match self.params.as_slice() {
            [pair] => Ok(*pair),
            other => Err(LstmError::shape("target scaler features", 1, other.len())),
        }
    }

    fn map_series(
        &self,
        series: &Series<f64>,
        f: impl Fn(f64, (f64, f64)) -> f64,
    ) -> LstmResult<Series<f64>> {
        if series.n_features() != self.params.len() {
            return Err(LstmError::shape(
                "scaler feature count",
                self.params.len(),
                series.n_features(),
            ));
        }
        let n_steps = series.n_steps();
        let data = series
            .as_slice()
            .iter()
            .enumerate()
            .map(|(i, &x)| f(x, self.params[i / n_steps.max(1)]))
            .collect();
        Series::from_vec(data, series.n_features(), n_steps)
    }
}

fn min_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
        (lo.min(x), hi.max(x))
    });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let range = max - min;
    (min, if range == 0.0 { 1.0 } else { range })
}
