use crate::api::error::{LstmError, LstmResult};

/// One multivariate time series, `n_features x n_steps`.
///
/// Values are stored feature-major: row `f` holds every timestep of
/// feature `f`. Series in a batch are independent and may differ in length.
#[derive(Debug, Clone, PartialEq)]
pub struct Series<T = f64> {
    n_features: usize,
    n_steps: usize,
    data: Vec<T>,
}

impl<T: Copy> Series<T> {
    /// Build a series from feature-major data.
    pub fn from_vec(data: Vec<T>, n_features: usize, n_steps: usize) -> LstmResult<Self> {
        let expected = n_features * n_steps;
        if data.len() != expected {
            return Err(LstmError::shape("series data", expected, data.len()));
        }
        Ok(Self {
            n_features,
            n_steps,
            data,
        })
    }

    /// Build a series from one row per feature. Every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> LstmResult<Self> {
        let n_features = rows.len();
        let n_steps = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n_features * n_steps);
        for row in rows {
            if row.len() != n_steps {
                return Err(LstmError::shape("series row", n_steps, row.len()));
            }
            data.extend(row);
        }
        Ok(Self {
            n_features,
            n_steps,
            data,
        })
    }

    /// A single-feature series.
    pub fn univariate(values: Vec<T>) -> Self {
        Self {
            n_features: 1,
            n_steps: values.len(),
            data: values,
        }
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    pub fn is_empty(&self) -> bool {
        self.n_steps == 0
    }

    pub fn get(&self, feature: usize, step: usize) -> T {
        self.data[feature * self.n_steps + step]
    }

    /// All timesteps of one feature.
    pub fn feature(&self, feature: usize) -> &[T] {
        let start = feature * self.n_steps;
        &self.data[start..start + self.n_steps]
    }

    /// Copy the input vector `x[step]` into `out` (length `n_features`).
    pub fn gather_step(&self, step: usize, out: &mut [T]) {
        for (f, slot) in out.iter_mut().enumerate() {
            *slot = self.data[f * self.n_steps + step];
        }
    }

    /// The input vector `x[step]`.
    pub fn step(&self, step: usize) -> Vec<T> {
        (0..self.n_features).map(|f| self.get(f, step)).collect()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Element-wise conversion, e.g. lifting `f64` inputs into a dual-number type.
    pub fn map<U: Copy>(&self, f: impl FnMut(T) -> U) -> Series<U> {
        Series {
            n_features: self.n_features,
            n_steps: self.n_steps,
            data: self.data.iter().copied().map(f).collect(),
        }
    }
}

/// Cell states recorded by the generic forward path: `[series][step][unit]`.
pub type CellTrace<T> = Vec<Vec<Vec<T>>>;
