use crate::api::error::{LstmError, LstmResult};
use crate::api::scalar::Scalar;
use crate::api::types::{CellTrace, Series};
use crate::core::layout::WeightViews;
use crate::core::ops::{self, GateActs};
use std::time::Instant;

/// Every series must carry `n_var` features.
pub(crate) fn check_inputs<T: Copy>(n_var: usize, inputs: &[Series<T>]) -> LstmResult<()> {
    for (s, series) in inputs.iter().enumerate() {
        if series.n_features() != n_var {
            return Err(LstmError::shape(
                format!("feature count of series {}", s),
                n_var,
                series.n_features(),
            ));
        }
    }
    Ok(())
}

/// Fast inference path: one prediction per timestep per series.
///
/// State buffers are allocated once per series and reused across timesteps.
pub fn forward_fast(weights: &WeightViews<'_>, inputs: &[Series<f64>]) -> LstmResult<Vec<Vec<f64>>> {
    check_inputs(weights.n_var, inputs)?;
    let _t = if log::log_enabled!(log::Level::Trace) { Some(Instant::now()) } else { None };

    let n_hid = weights.n_hid;
    let mut x = vec![0.0; weights.n_var];
    let mut acts = [vec![0.0; n_hid], vec![0.0; n_hid], vec![0.0; n_hid], vec![0.0; n_hid]];
    let (mut h, mut h_next) = (vec![0.0; n_hid], vec![0.0; n_hid]);
    let (mut c, mut c_next) = (vec![0.0; n_hid], vec![0.0; n_hid]);

    let mut outputs = Vec::with_capacity(inputs.len());
    for series in inputs {
        if series.is_empty() {
            outputs.push(Vec::new());
            continue;
        }
        h.fill(0.0);
        c.fill(0.0);
        let mut y = Vec::with_capacity(series.n_steps());
        for t in 0..series.n_steps() {
            series.gather_step(t, &mut x);
            let [block_in, in_gate, fg_gate, out_gate] = &mut acts;
            ops::cell_step(
                weights,
                &x,
                &h,
                &c,
                GateActs {
                    block_in: block_in.as_mut_slice(),
                    in_gate: in_gate.as_mut_slice(),
                    fg_gate: fg_gate.as_mut_slice(),
                    out_gate: out_gate.as_mut_slice(),
                },
                &mut c_next,
                &mut h_next,
            );
            std::mem::swap(&mut h, &mut h_next);
            std::mem::swap(&mut c, &mut c_next);
            y.push(ops::project(weights, &h));
        }
        outputs.push(y);
    }

    if let Some(t) = _t {
        log::trace!(
            "[perf] lstm::forward_fast series={} n_hid={} {:.3}ms",
            inputs.len(),
            n_hid,
            t.elapsed().as_secs_f64() * 1000.0
        );
    }
    Ok(outputs)
}

/// Generic forward path over any [`Scalar`] element type.
///
/// Runs the same recurrence as [`forward_fast`] with the same summation
/// order, so for `f64` the two agree exactly. When `trace` is given it is
/// cleared and filled with the cell state of every timestep of every series.
pub fn forward_generic<T: Scalar>(
    weights: &WeightViews<'_>,
    inputs: &[Series<T>],
    mut trace: Option<&mut CellTrace<T>>,
) -> LstmResult<Vec<Vec<T>>> {
    check_inputs(weights.n_var, inputs)?;
    let [bi, ig, fg, og] = &weights.gates;
    let n_hid = weights.n_hid;

    if let Some(trace) = trace.as_mut() {
        trace.clear();
    }

    let mut outputs = Vec::with_capacity(inputs.len());
    for series in inputs {
        let mut h = vec![T::zero(); n_hid];
        let mut c = vec![T::zero(); n_hid];
        let mut y = Vec::with_capacity(series.n_steps());
        let mut cells = Vec::new();

        for t in 0..series.n_steps() {
            let x = series.step(t);
            let block_in = ops::gate_preact_generic(bi, &x, &h);
            let in_gate = ops::gate_preact_generic(ig, &x, &h);
            let fg_gate = ops::gate_preact_generic(fg, &x, &h);
            let out_gate = ops::gate_preact_generic(og, &x, &h);

            c = (0..n_hid)
                .map(|i| {
                    block_in[i].tanh() * in_gate[i].sigmoid() + fg_gate[i].sigmoid() * c[i]
                })
                .collect();
            h = (0..n_hid).map(|i| c[i].tanh() * out_gate[i].sigmoid()).collect();
            y.push(ops::project_generic(weights, &h));

            if trace.is_some() {
                cells.push(c.clone());
            }
        }

        if let Some(trace) = trace.as_mut() {
            trace.push(cells);
        }
        outputs.push(y);
    }
    Ok(outputs)
}
