use crate::api::error::LstmResult;

/// Loss consumed by the backward pass.
///
/// `deriv` is the derivative of the loss of one series with respect to the
/// prediction at timestep `t`. `deriv_activation` carries an upstream
/// derivative through the output sigmoid; `y_pred` is the activated value.
pub trait LossStrategy: Sync {
    fn loss(&self, y_true: &[f64], y_pred: &[f64]) -> LstmResult<f64>;

    fn deriv(&self, y_true: &[f64], y_pred: &[f64], t: usize) -> LstmResult<f64>;

    fn deriv_activation(&self, y_pred: f64, upstream: f64) -> f64 {
        upstream * y_pred * (1.0 - y_pred)
    }
}
