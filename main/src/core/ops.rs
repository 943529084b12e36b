//! Gate kernels shared by the forward and backward passes.
//!
//! Every dot product here and in the generic path accumulates in the same
//! order: `W[i,:] . x`, then `R[i,:] . h`, then `+ b[i]`. Keeping that order
//! fixed is what makes the `f64` fast path and the generic path agree bit for bit.

use crate::api::scalar::Scalar;
use crate::core::layout::{GateView, WeightViews};

/// `1 / (1 + e^-x)`, same formula as [`Scalar::sigmoid`].
#[inline]
pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// `out[i] = W[i,:] . x + R[i,:] . h + b[i]`
#[inline]
pub(crate) fn gate_preact(gate: &GateView<'_>, x: &[f64], h: &[f64], out: &mut [f64]) {
    let n_var = x.len();
    let n_hid = h.len();
    for (i, slot) in out.iter_mut().enumerate() {
        let w_row = &gate.w[i * n_var..(i + 1) * n_var];
        let r_row = &gate.r[i * n_hid..(i + 1) * n_hid];
        let mut acc = 0.0;
        for (&xj, &wj) in x.iter().zip(w_row) {
            acc += xj * wj;
        }
        for (&hk, &rk) in h.iter().zip(r_row) {
            acc += hk * rk;
        }
        *slot = acc + gate.b[i];
    }
}

/// Generic counterpart of [`gate_preact`]; allocates its output.
pub(crate) fn gate_preact_generic<T: Scalar>(gate: &GateView<'_>, x: &[T], h: &[T]) -> Vec<T> {
    let n_var = x.len();
    let n_hid = h.len();
    (0..gate.b.len())
        .map(|i| {
            let w_row = &gate.w[i * n_var..(i + 1) * n_var];
            let r_row = &gate.r[i * n_hid..(i + 1) * n_hid];
            let mut acc = T::zero();
            for (&xj, &wj) in x.iter().zip(w_row) {
                acc = acc + xj * wj;
            }
            for (&hk, &rk) in h.iter().zip(r_row) {
                acc = acc + hk * rk;
            }
            acc + gate.b[i]
        })
        .collect()
}

/// Output head `sig(w_proj . h + b_proj)`.
#[inline]
pub(crate) fn project(weights: &WeightViews<'_>, h: &[f64]) -> f64 {
    let mut acc = 0.0;
    for (&hk, &wk) in h.iter().zip(weights.proj_w) {
        acc += hk * wk;
    }
    sigmoid(acc + *weights.proj_b)
}

pub(crate) fn project_generic<T: Scalar>(weights: &WeightViews<'_>, h: &[T]) -> T {
    let mut acc = T::zero();
    for (&hk, &wk) in h.iter().zip(weights.proj_w) {
        acc = acc + hk * wk;
    }
    (acc + *weights.proj_b).sigmoid()
}

/// Gate activations of one timestep, each `n_hid` long.
pub(crate) struct GateActs<'a> {
    pub block_in: &'a mut [f64],
    pub in_gate: &'a mut [f64],
    pub fg_gate: &'a mut [f64],
    pub out_gate: &'a mut [f64],
}

/// One cell update: fills the gate activations, `c` and `h` from `x`,
/// `h_prev` and `c_prev`. `h`/`c` must not alias the previous state.
pub(crate) fn cell_step(
    weights: &WeightViews<'_>,
    x: &[f64],
    h_prev: &[f64],
    c_prev: &[f64],
    acts: GateActs<'_>,
    c: &mut [f64],
    h: &mut [f64],
) {
    let [bi, ig, fg, og] = &weights.gates;
    gate_preact(bi, x, h_prev, acts.block_in);
    gate_preact(ig, x, h_prev, acts.in_gate);
    gate_preact(fg, x, h_prev, acts.fg_gate);
    gate_preact(og, x, h_prev, acts.out_gate);

    for i in 0..h.len() {
        let block_in = acts.block_in[i].tanh();
        let in_gate = sigmoid(acts.in_gate[i]);
        let fg_gate = sigmoid(acts.fg_gate[i]);
        let out_gate = sigmoid(acts.out_gate[i]);
        acts.block_in[i] = block_in;
        acts.in_gate[i] = in_gate;
        acts.fg_gate[i] = fg_gate;
        acts.out_gate[i] = out_gate;

        c[i] = block_in * in_gate + fg_gate * c_prev[i];
        h[i] = c[i].tanh() * out_gate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::WeightLayout;

    #[test]
    fn preact_matches_manual_sum() {
        let layout = WeightLayout::new(2, 2);
        let params: Vec<f64> = (0..layout.param_count()).map(|i| 0.1 * i as f64).collect();
        let views = layout.views(&params).unwrap();
        let x = [1.0, -1.0];
        let h = [0.5, 0.25];
        let mut out = [0.0; 2];
        gate_preact(&views.gates[0], &x, &h, &mut out);

        let g = &views.gates[0];
        let expected0 = g.w[0] * 1.0 + g.w[1] * -1.0 + g.r[0] * 0.5 + g.r[1] * 0.25 + g.b[0];
        assert!((out[0] - expected0).abs() < 1e-12);

        let generic = gate_preact_generic(&views.gates[0], &x[..], &h[..]);
        assert_eq!(generic, out.to_vec());
    }

    #[test]
    fn zero_weights_give_half_gates() {
        let layout = WeightLayout::new(1, 3);
        let params = layout.zeros();
        let views = layout.views(&params).unwrap();
        let (mut bi, mut ig, mut fg, mut og) = ([0.0; 3], [0.0; 3], [0.0; 3], [0.0; 3]);
        let (mut c, mut h) = ([9.0; 3], [9.0; 3]);
        cell_step(
            &views,
            &[1.0],
            &[0.0; 3],
            &[0.0; 3],
            GateActs {
                block_in: &mut bi,
                in_gate: &mut ig,
                fg_gate: &mut fg,
                out_gate: &mut og,
            },
            &mut c,
            &mut h,
        );
        assert_eq!(bi, [0.0; 3]);
        assert_eq!(ig, [0.5; 3]);
        assert_eq!(c, [0.0; 3]);
        assert_eq!(h, [0.0; 3]);
        assert_eq!(project(&views, &h), 0.5);
    }
}
