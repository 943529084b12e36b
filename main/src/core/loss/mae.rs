use crate::api::error::LstmResult;
use crate::api::loss::LossStrategy;
use super::{check_lengths, check_step};

/// Mean absolute error over the timesteps of one series.
///
/// The subgradient at `pred == target` is taken as 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaeLoss;

impl MaeLoss {
    pub fn new() -> Self {
        Self
    }
}

impl LossStrategy for MaeLoss {
    fn loss(&self, y_true: &[f64], y_pred: &[f64]) -> LstmResult<f64> {
        check_lengths(y_true, y_pred)?;
        if y_pred.is_empty() {
            return Ok(0.0);
        }
        let abs: f64 = y_pred.iter().zip(y_true).map(|(p, y)| (p - y).abs()).sum();
        Ok(abs / y_pred.len() as f64)
    }

    fn deriv(&self, y_true: &[f64], y_pred: &[f64], t: usize) -> LstmResult<f64> {
        check_lengths(y_true, y_pred)?;
        check_step(y_pred, t)?;
        let diff = y_pred[t] - y_true[t];
        let sign = if diff > 0.0 {
            1.0
        } else if diff < 0.0 {
            -1.0
        } else {
            0.0
        };
        Ok(sign / y_pred.len() as f64)
    }
}
