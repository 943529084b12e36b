use crate::api::error::LstmResult;
use crate::api::loss::LossStrategy;
use super::{check_lengths, check_step};

/// Mean squared error over the timesteps of one series.
#[derive(Debug, Clone, Copy, Default)]
pub struct MseLoss;

impl MseLoss {
    pub fn new() -> Self {
        Self
    }
}

impl LossStrategy for MseLoss {
    fn loss(&self, y_true: &[f64], y_pred: &[f64]) -> LstmResult<f64> {
        check_lengths(y_true, y_pred)?;
        if y_pred.is_empty() {
            return Ok(0.0);
        }
        let sq: f64 = y_pred.iter().zip(y_true).map(|(p, y)| (p - y).powi(2)).sum();
        Ok(sq / y_pred.len() as f64)
    }

    /// d(MSE)/d(pred_t) = 2 * (pred_t - target_t) / n
    fn deriv(&self, y_true: &[f64], y_pred: &[f64], t: usize) -> LstmResult<f64> {
        check_lengths(y_true, y_pred)?;
        check_step(y_pred, t)?;
        Ok(2.0 * (y_pred[t] - y_true[t]) / y_pred.len() as f64)
    }
}
