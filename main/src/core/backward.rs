//! Backpropagation through time.
//!
//! One caching forward sweep per series, then an explicit reverse-time loop
//! over the cached activations. Each series accumulates into its own
//! gradient vector (same layout as the parameters), so samples can be
//! processed on the rayon pool without any shared mutable state. The
//! per-sample vectors are summed in sample order after the map joins.

use crate::api::error::{LstmError, LstmResult};
use crate::api::loss::LossStrategy;
use crate::api::types::Series;
use crate::core::forward::check_inputs;
use crate::core::layout::WeightViews;
use crate::core::ops::{self, GateActs};
use rayon::prelude::*;
use std::time::Instant;

/// Activations of one series. Rows of `c` and `h` are indexed `0..=T`
/// with row 0 the zero initial state; gate rows are indexed `0..T`.
struct Trajectory {
    n_hid: usize,
    block_in: Vec<f64>,
    in_gate: Vec<f64>,
    fg_gate: Vec<f64>,
    out_gate: Vec<f64>,
    c: Vec<f64>,
    h: Vec<f64>,
    y: Vec<f64>,
}

impl Trajectory {
    fn row(data: &[f64], n_hid: usize, t: usize) -> &[f64] {
        &data[t * n_hid..(t + 1) * n_hid]
    }

    /// Cell state after `t` steps.
    fn c(&self, t: usize) -> &[f64] {
        Self::row(&self.c, self.n_hid, t)
    }

    /// Hidden state after `t` steps.
    fn h(&self, t: usize) -> &[f64] {
        Self::row(&self.h, self.n_hid, t)
    }
}

/// Forward sweep over one series keeping every activation.
fn forward_cached(weights: &WeightViews<'_>, series: &Series<f64>) -> Trajectory {
    let n_hid = weights.n_hid;
    let steps = series.n_steps();
    let mut traj = Trajectory {
        n_hid,
        block_in: vec![0.0; steps * n_hid],
        in_gate: vec![0.0; steps * n_hid],
        fg_gate: vec![0.0; steps * n_hid],
        out_gate: vec![0.0; steps * n_hid],
        c: vec![0.0; (steps + 1) * n_hid],
        h: vec![0.0; (steps + 1) * n_hid],
        y: Vec::with_capacity(steps),
    };

    let mut x = vec![0.0; weights.n_var];
    for t in 0..steps {
        series.gather_step(t, &mut x);
        let gates = t * n_hid..(t + 1) * n_hid;
        let (c_done, c_rest) = traj.c.split_at_mut((t + 1) * n_hid);
        let (h_done, h_rest) = traj.h.split_at_mut((t + 1) * n_hid);
        ops::cell_step(
            weights,
            &x,
            &h_done[t * n_hid..],
            &c_done[t * n_hid..],
            GateActs {
                block_in: &mut traj.block_in[gates.clone()],
                in_gate: &mut traj.in_gate[gates.clone()],
                fg_gate: &mut traj.fg_gate[gates.clone()],
                out_gate: &mut traj.out_gate[gates],
            },
            &mut c_rest[..n_hid],
            &mut h_rest[..n_hid],
        );
        traj.y.push(ops::project(weights, &h_rest[..n_hid]));
    }
    traj
}

/// Gradient of one series' loss with respect to every parameter.
///
/// `weights` are the (already masked) weights the forward pass ran with.
/// The result is the raw gradient: not masked, not negated.
pub(crate) fn sample_gradient<L: LossStrategy + ?Sized>(
    weights: &WeightViews<'_>,
    series: &Series<f64>,
    target: &[f64],
    loss: &L,
) -> LstmResult<Vec<f64>> {
    let layout = weights.layout();
    if series.is_empty() {
        return Ok(layout.zeros());
    }
    let (n_var, n_hid) = (weights.n_var, weights.n_hid);
    let steps = series.n_steps();
    let traj = forward_cached(weights, series);

    let mut grad = layout.zeros();
    let mut g = layout.views_mut(&mut grad)?;

    // Pre-activation derivatives of the step after the current one.
    let mut d_next = [vec![0.0; n_hid], vec![0.0; n_hid], vec![0.0; n_hid], vec![0.0; n_hid]];
    let mut d_cur = d_next.clone();
    let mut dc_next = vec![0.0; n_hid];
    let mut dc = vec![0.0; n_hid];
    let mut fg_next = vec![0.0; n_hid];
    let mut dh = vec![0.0; n_hid];
    let mut x = vec![0.0; n_var];

    for t in (0..steps).rev() {
        let y = traj.y[t];
        let dy = loss.deriv(target, &traj.y, t)?;
        let dy2 = loss.deriv_activation(y, dy);

        let h_t = traj.h(t + 1);
        let h_prev = traj.h(t);
        let c_t = traj.c(t + 1);
        let c_prev = traj.c(t);
        let row = t * n_hid..(t + 1) * n_hid;
        let block_in = &traj.block_in[row.clone()];
        let in_gate = &traj.in_gate[row.clone()];
        let fg_gate = &traj.fg_gate[row.clone()];
        let out_gate = &traj.out_gate[row];

        // Output head.
        for (dw, &hk) in g.proj_w.iter_mut().zip(h_t) {
            *dw += dy2 * hk;
        }
        *g.proj_b += dy2;

        // dh = w_proj * dy2 + sum_g R_g^T dA_g[t+1]
        for (k, dh_k) in dh.iter_mut().enumerate() {
            *dh_k = weights.proj_w[k] * dy2;
        }
        for (gate, d) in weights.gates.iter().zip(&d_next) {
            for (i, &d_i) in d.iter().enumerate() {
                if d_i == 0.0 {
                    continue;
                }
                let r_row = &gate.r[i * n_hid..(i + 1) * n_hid];
                for (dh_k, &r_ik) in dh.iter_mut().zip(r_row) {
                    *dh_k += r_ik * d_i;
                }
            }
        }

        for k in 0..n_hid {
            let tanh_c = c_t[k].tanh();
            dc[k] = dh[k] * out_gate[k] * (1.0 - tanh_c * tanh_c) + dc_next[k] * fg_next[k];

            d_cur[0][k] = dc[k] * in_gate[k] * (1.0 - block_in[k] * block_in[k]);
            d_cur[1][k] = dc[k] * block_in[k] * in_gate[k] * (1.0 - in_gate[k]);
            d_cur[2][k] = dc[k] * c_prev[k] * fg_gate[k] * (1.0 - fg_gate[k]);
            d_cur[3][k] = dh[k] * tanh_c * out_gate[k] * (1.0 - out_gate[k]);
        }

        series.gather_step(t, &mut x);
        for (gate, d) in g.gates.iter_mut().zip(&d_cur) {
            for (i, &d_i) in d.iter().enumerate() {
                gate.b[i] += d_i;
                let w_row = &mut gate.w[i * n_var..(i + 1) * n_var];
                for (dw, &xj) in w_row.iter_mut().zip(&x) {
                    *dw += d_i * xj;
                }
                // h[-1] is zero: the first step feeds nothing back into R.
                if t > 0 {
                    let r_row = &mut gate.r[i * n_hid..(i + 1) * n_hid];
                    for (dr, &hk) in r_row.iter_mut().zip(h_prev) {
                        *dr += d_i * hk;
                    }
                }
            }
        }

        std::mem::swap(&mut d_next, &mut d_cur);
        std::mem::swap(&mut dc_next, &mut dc);
        fg_next.copy_from_slice(fg_gate);
    }

    Ok(grad)
}

/// Targets must pair one-to-one with series and match their lengths.
pub(crate) fn check_targets(inputs: &[Series<f64>], targets: &[Vec<f64>]) -> LstmResult<()> {
    if inputs.len() != targets.len() {
        return Err(LstmError::dimension("target count", inputs.len(), targets.len()));
    }
    for (s, (series, target)) in inputs.iter().zip(targets).enumerate() {
        if series.n_steps() != target.len() {
            return Err(LstmError::dimension(
                format!("target length of series {}", s),
                series.n_steps(),
                target.len(),
            ));
        }
    }
    Ok(())
}

/// Raw per-sample gradients for a batch, one vector per series.
///
/// Batches of at least `parallel_threshold` series are mapped on the rayon
/// pool. The result is ordered by sample either way.
pub fn backward<L: LossStrategy + ?Sized>(
    weights: &WeightViews<'_>,
    inputs: &[Series<f64>],
    targets: &[Vec<f64>],
    loss: &L,
    parallel_threshold: usize,
) -> LstmResult<Vec<Vec<f64>>> {
    check_inputs(weights.n_var, inputs)?;
    check_targets(inputs, targets)?;
    let _t = if log::log_enabled!(log::Level::Trace) { Some(Instant::now()) } else { None };

    let parallel = inputs.len() >= parallel_threshold.max(1);
    let run = |(series, target): (&Series<f64>, &Vec<f64>)| {
        sample_gradient(weights, series, target, loss)
    };
    let grads: LstmResult<Vec<Vec<f64>>> = if parallel {
        inputs.par_iter().zip(targets.par_iter()).map(run).collect()
    } else {
        inputs.iter().zip(targets.iter()).map(run).collect()
    };

    if let Some(t) = _t {
        log::trace!(
            "[perf] lstm::backward series={} parallel={} {:.3}ms",
            inputs.len(),
            parallel,
            t.elapsed().as_secs_f64() * 1000.0
        );
    }
    grads
}
