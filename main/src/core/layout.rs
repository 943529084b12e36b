use crate::api::error::{LstmError, LstmResult};

/// The four gated blocks of the cell, in parameter-vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    BlockInput,
    Input,
    Forget,
    Output,
}

impl Gate {
    pub const ALL: [Gate; 4] = [Gate::BlockInput, Gate::Input, Gate::Forget, Gate::Output];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Decomposition of the flat parameter vector into 14 blocks.
///
/// Per gate, in [`Gate::ALL`] order: input weight `W` (`n_hid x n_var`),
/// recurrent weight `R` (`n_hid x n_hid`), bias `b` (`n_hid`). Then the
/// projection weight (`n_hid`) and the projection bias (1). Matrices are
/// row-major with row `i` belonging to hidden unit `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightLayout {
    n_var: usize,
    n_hid: usize,
}

/// Read-only view of one gate's blocks.
#[derive(Debug, Clone, Copy)]
pub struct GateView<'a> {
    pub w: &'a [f64],
    pub r: &'a [f64],
    pub b: &'a [f64],
}

/// Mutable view of one gate's blocks.
#[derive(Debug)]
pub struct GateViewMut<'a> {
    pub w: &'a mut [f64],
    pub r: &'a mut [f64],
    pub b: &'a mut [f64],
}

/// The 14 blocks of a parameter (or gradient) vector, borrowed in place.
#[derive(Debug, Clone, Copy)]
pub struct WeightViews<'a> {
    pub n_var: usize,
    pub n_hid: usize,
    pub gates: [GateView<'a>; 4],
    pub proj_w: &'a [f64],
    pub proj_b: &'a f64,
}

/// Mutable counterpart of [`WeightViews`]; writes go to the backing vector.
#[derive(Debug)]
pub struct WeightViewsMut<'a> {
    pub n_var: usize,
    pub n_hid: usize,
    pub gates: [GateViewMut<'a>; 4],
    pub proj_w: &'a mut [f64],
    pub proj_b: &'a mut f64,
}

impl WeightLayout {
    pub fn new(n_var: usize, n_hid: usize) -> Self {
        Self { n_var, n_hid }
    }

    pub fn n_var(&self) -> usize {
        self.n_var
    }

    pub fn n_hid(&self) -> usize {
        self.n_hid
    }

    /// Parameters belonging to one gate: `W`, `R` and `b`.
    pub fn gate_len(&self) -> usize {
        self.n_hid * self.n_var + self.n_hid * self.n_hid + self.n_hid
    }

    /// `4*(n_var*n_hid + n_hid*n_hid + n_hid) + n_hid + 1`
    pub fn param_count(&self) -> usize {
        self.block_lengths().iter().sum()
    }

    /// Lengths of the 14 blocks in vector order.
    pub fn block_lengths(&self) -> [usize; 14] {
        let (w, r, b) = (self.n_hid * self.n_var, self.n_hid * self.n_hid, self.n_hid);
        [w, r, b, w, r, b, w, r, b, w, r, b, self.n_hid, 1]
    }

    /// Offset of a gate's first parameter (its `W` block).
    pub fn gate_offset(&self, gate: Gate) -> usize {
        gate.index() * self.gate_len()
    }

    /// Offset of the projection weight block.
    pub fn proj_offset(&self) -> usize {
        4 * self.gate_len()
    }

    pub fn check(&self, len: usize) -> LstmResult<()> {
        let expected = self.param_count();
        if len != expected {
            return Err(LstmError::shape("parameter vector", expected, len));
        }
        Ok(())
    }

    pub fn zeros(&self) -> Vec<f64> {
        vec![0.0; self.param_count()]
    }

    pub fn views<'a>(&self, params: &'a [f64]) -> LstmResult<WeightViews<'a>> {
        self.check(params.len())?;
        let (bi, rest) = self.split_gate(params);
        let (ig, rest) = self.split_gate(rest);
        let (fg, rest) = self.split_gate(rest);
        let (og, rest) = self.split_gate(rest);
        let (proj_w, rest) = rest.split_at(self.n_hid);
        Ok(WeightViews {
            n_var: self.n_var,
            n_hid: self.n_hid,
            gates: [bi, ig, fg, og],
            proj_w,
            proj_b: &rest[0],
        })
    }

    pub fn views_mut<'a>(&self, params: &'a mut [f64]) -> LstmResult<WeightViewsMut<'a>> {
        self.check(params.len())?;
        let (bi, rest) = self.split_gate_mut(params);
        let (ig, rest) = self.split_gate_mut(rest);
        let (fg, rest) = self.split_gate_mut(rest);
        let (og, rest) = self.split_gate_mut(rest);
        let (proj_w, rest) = rest.split_at_mut(self.n_hid);
        Ok(WeightViewsMut {
            n_var: self.n_var,
            n_hid: self.n_hid,
            gates: [bi, ig, fg, og],
            proj_w,
            proj_b: &mut rest[0],
        })
    }

    fn split_gate<'a>(&self, params: &'a [f64]) -> (GateView<'a>, &'a [f64]) {
        let (w, rest) = params.split_at(self.n_hid * self.n_var);
        let (r, rest) = rest.split_at(self.n_hid * self.n_hid);
        let (b, rest) = rest.split_at(self.n_hid);
        (GateView { w, r, b }, rest)
    }

    fn split_gate_mut<'a>(&self, params: &'a mut [f64]) -> (GateViewMut<'a>, &'a mut [f64]) {
        let (w, rest) = params.split_at_mut(self.n_hid * self.n_var);
        let (r, rest) = rest.split_at_mut(self.n_hid * self.n_hid);
        let (b, rest) = rest.split_at_mut(self.n_hid);
        (GateViewMut { w, r, b }, rest)
    }
}

impl<'a> WeightViews<'a> {
    pub fn layout(&self) -> WeightLayout {
        WeightLayout::new(self.n_var, self.n_hid)
    }

    pub fn gate(&self, gate: Gate) -> &GateView<'a> {
        &self.gates[gate.index()]
    }
}

impl<'a> WeightViewsMut<'a> {
    pub fn gate_mut(&mut self, gate: Gate) -> &mut GateViewMut<'a> {
        &mut self.gates[gate.index()]
    }
}
