//! Call-level entry points.
//!
//! Each entry point validates its arguments, copies the caller's weights into
//! a scratch vector, applies the dropout mask to the copy, and runs the
//! forward (and, for gradients, backward) engine on it. The caller's vector is
//! only ever read.

use crate::api::dropout::DropoutMask;
use crate::api::error::{LstmError, LstmResult};
use crate::api::loss::LossStrategy;
use crate::api::scalar::Scalar;
use crate::api::types::{CellTrace, Series};
use crate::core::backward::{backward, check_targets};
use crate::core::forward::{check_inputs, forward_fast, forward_generic};
use crate::core::layout::WeightLayout;

/// Owned copy of `weights` with `mask` applied.
pub fn masked_copy(weights: &[f64], layout: &WeightLayout, mask: &DropoutMask) -> LstmResult<Vec<f64>> {
    layout.check(weights.len())?;
    mask.validate(layout.n_hid())?;
    let mut scratch = weights.to_vec();
    mask.apply(&mut layout.views_mut(&mut scratch)?)?;
    Ok(scratch)
}

/// Predictions of the fast path under `mask`.
pub fn predict(
    weights: &[f64],
    layout: &WeightLayout,
    mask: &DropoutMask,
    inputs: &[Series<f64>],
) -> LstmResult<Vec<Vec<f64>>> {
    check_inputs(layout.n_var(), inputs)?;
    let scratch = masked_copy(weights, layout, mask)?;
    forward_fast(&layout.views(&scratch)?, inputs)
}

/// Predictions of the generic path under `mask`, optionally recording cell states.
pub fn predict_generic<T: Scalar>(
    weights: &[f64],
    layout: &WeightLayout,
    mask: &DropoutMask,
    inputs: &[Series<T>],
    trace: Option<&mut CellTrace<T>>,
) -> LstmResult<Vec<Vec<T>>> {
    check_inputs(layout.n_var(), inputs)?;
    let scratch = masked_copy(weights, layout, mask)?;
    forward_generic(&layout.views(&scratch)?, inputs, trace)
}

/// Raw loss gradient of every series, computed with the masked weights.
///
/// Neither masked nor negated; feed the result to [`reduce_gradients`].
pub fn per_sample_gradients<L: LossStrategy + ?Sized>(
    weights: &[f64],
    layout: &WeightLayout,
    mask: &DropoutMask,
    inputs: &[Series<f64>],
    targets: &[Vec<f64>],
    loss: &L,
    parallel_threshold: usize,
) -> LstmResult<Vec<Vec<f64>>> {
    check_inputs(layout.n_var(), inputs)?;
    check_targets(inputs, targets)?;
    let scratch = masked_copy(weights, layout, mask)?;
    backward(&layout.views(&scratch)?, inputs, targets, loss, parallel_threshold)
}

/// Sum per-sample gradients, re-apply `mask`, and negate.
///
/// The result is a descent direction in parameter-vector order. An empty
/// slice gives the zero vector.
pub fn reduce_gradients(
    layout: &WeightLayout,
    mask: &DropoutMask,
    per_sample: &[Vec<f64>],
) -> LstmResult<Vec<f64>> {
    let mut total = layout.zeros();
    for (s, grad) in per_sample.iter().enumerate() {
        if grad.len() != total.len() {
            return Err(LstmError::shape(
                format!("gradient of sample {}", s),
                total.len(),
                grad.len(),
            ));
        }
        for (acc, &g) in total.iter_mut().zip(grad) {
            *acc += g;
        }
    }
    mask.apply(&mut layout.views_mut(&mut total)?)?;
    for v in total.iter_mut() {
        *v = -*v;
    }
    Ok(total)
}

/// Descent direction (negative loss gradient) for a batch under `mask`.
pub fn gradient<L: LossStrategy + ?Sized>(
    weights: &[f64],
    layout: &WeightLayout,
    mask: &DropoutMask,
    inputs: &[Series<f64>],
    targets: &[Vec<f64>],
    loss: &L,
    parallel_threshold: usize,
) -> LstmResult<Vec<f64>> {
    let per_sample = per_sample_gradients(
        weights,
        layout,
        mask,
        inputs,
        targets,
        loss,
        parallel_threshold,
    )?;
    log::debug!(
        "lstm gradient: series={} steps={} dropped={:?}",
        inputs.len(),
        inputs.iter().map(Series::n_steps).sum::<usize>(),
        mask,
    );
    reduce_gradients(layout, mask, &per_sample)
}

/// Summed loss of a batch under `mask`.
pub fn batch_loss<L: LossStrategy + ?Sized>(
    weights: &[f64],
    layout: &WeightLayout,
    mask: &DropoutMask,
    inputs: &[Series<f64>],
    targets: &[Vec<f64>],
    loss: &L,
) -> LstmResult<f64> {
    check_targets(inputs, targets)?;
    let predictions = predict(weights, layout, mask, inputs)?;
    predictions
        .iter()
        .zip(targets)
        .map(|(y_pred, y_true)| loss.loss(y_true, y_pred))
        .sum()
}
