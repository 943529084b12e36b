pub mod mae;
pub mod mse;

use crate::api::error::{LstmError, LstmResult};

pub(crate) fn check_lengths(y_true: &[f64], y_pred: &[f64]) -> LstmResult<()> {
    if y_true.len() != y_pred.len() {
        return Err(LstmError::dimension("loss target length", y_pred.len(), y_true.len()));
    }
    Ok(())
}

pub(crate) fn check_step(y_pred: &[f64], t: usize) -> LstmResult<()> {
    if t >= y_pred.len() {
        return Err(LstmError::dimension("loss timestep bound", y_pred.len(), t));
    }
    Ok(())
}
