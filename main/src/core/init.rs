use crate::api::config::WeightInit;
use crate::api::error::{LstmError, LstmResult};
use crate::core::layout::{Gate, WeightLayout};
use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

/// Sample a fresh parameter vector for `layout`.
///
/// When `forget_bias` is set, the forget-gate bias block is filled with that
/// constant instead of being sampled.
pub fn initial_weights<R: Rng + ?Sized>(
    layout: &WeightLayout,
    init: &WeightInit,
    forget_bias: Option<f64>,
    rng: &mut R,
) -> LstmResult<Vec<f64>> {
    let n = layout.param_count();
    let mut params: Vec<f64> = match *init {
        WeightInit::Normal { std } => {
            let normal = Normal::new(0.0, std)
                .map_err(|e| LstmError::InvalidConfig(format!("normal init: {}", e)))?;
            (0..n).map(|_| normal.sample(rng)).collect()
        }
        WeightInit::Uniform { limit } => {
            if !(limit.is_finite() && limit > 0.0) {
                return Err(LstmError::InvalidConfig(format!(
                    "uniform init limit must be finite and > 0, got {}",
                    limit
                )));
            }
            let uniform = Uniform::new(-limit, limit);
            (0..n).map(|_| uniform.sample(rng)).collect()
        }
    };

    if let Some(bias) = forget_bias {
        let mut views = layout.views_mut(&mut params)?;
        views.gate_mut(Gate::Forget).b.fill(bias);
    }
    log::debug!(
        "initialized {} LSTM parameters (n_var={}, n_hid={}, init={:?})",
        n,
        layout.n_var(),
        layout.n_hid(),
        init
    );
    Ok(params)
}
