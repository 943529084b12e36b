use crate::api::dropout::{DropoutMask, DropoutPolicy};
use crate::api::error::{LstmError, LstmResult};
use crate::core::layout::WeightViewsMut;
use rand::Rng;

impl DropoutPolicy {
    /// Evaluation policy matching training with `RandomMasking(n_dropout)`:
    /// scale the masked blocks by the expected fraction of kept units.
    pub fn inverted_scale(n_hid: usize, n_dropout: usize) -> Self {
        if n_dropout == 0 || n_hid == 0 {
            DropoutPolicy::NoDropouts
        } else {
            DropoutPolicy::UniformScale((n_hid - n_dropout.min(n_hid)) as f64 / n_hid as f64)
        }
    }

    /// Draw the mask for one call. `RandomMasking` must leave at least one unit.
    pub fn draw<R: Rng + ?Sized>(&self, n_hid: usize, rng: &mut R) -> LstmResult<DropoutMask> {
        match *self {
            DropoutPolicy::NoDropouts => Ok(DropoutMask::Keep),
            DropoutPolicy::RandomMasking(n_drop) => {
                if n_drop >= n_hid {
                    return Err(LstmError::InvalidDropoutCount {
                        requested: n_drop,
                        n_hid,
                    });
                }
                let mut indices = rand::seq::index::sample(rng, n_hid, n_drop).into_vec();
                indices.sort_unstable();
                Ok(DropoutMask::Drop(indices))
            }
            DropoutPolicy::UniformScale(factor) => {
                let mask = DropoutMask::Scale(factor);
                mask.validate(n_hid)?;
                Ok(mask)
            }
        }
    }
}

impl DropoutMask {
    /// Check the mask against a hidden size before anything is mutated.
    ///
    /// `Drop` indices must be in range, strictly ascending, and leave at
    /// least one unit; a `Scale` factor must be finite.
    pub fn validate(&self, n_hid: usize) -> LstmResult<()> {
        match self {
            DropoutMask::Keep => {}
            DropoutMask::Drop(indices) => {
                if let Some(&bad) = indices.iter().find(|&&i| i >= n_hid) {
                    return Err(LstmError::shape("dropout index bound", n_hid, bad));
                }
                if let Some(pair) = indices.windows(2).find(|pair| pair[0] >= pair[1]) {
                    return Err(LstmError::InvalidConfig(format!(
                        "dropout indices must be ascending and distinct, got {} after {}",
                        pair[1], pair[0]
                    )));
                }
                if !indices.is_empty() && indices.len() >= n_hid {
                    return Err(LstmError::InvalidDropoutCount {
                        requested: indices.len(),
                        n_hid,
                    });
                }
            }
            DropoutMask::Scale(factor) => {
                if !factor.is_finite() {
                    return Err(LstmError::InvalidConfig(format!(
                        "dropout scale must be finite, got {}",
                        factor
                    )));
                }
            }
        }
        Ok(())
    }

    /// Mask the four recurrent matrices (rows of the dropped units) and the
    /// projection weight (entries of the dropped units).
    ///
    /// Applied to weights before a forward pass, and again to the summed
    /// gradient: both masking and scaling are linear in the weights, so the
    /// same operation is the chain rule back through it.
    pub fn apply(&self, views: &mut WeightViewsMut<'_>) -> LstmResult<()> {
        let n_hid = views.n_hid;
        self.validate(n_hid)?;
        match self {
            DropoutMask::Keep => {}
            DropoutMask::Drop(indices) => {
                for &unit in indices {
                    for gate in views.gates.iter_mut() {
                        gate.r[unit * n_hid..(unit + 1) * n_hid].fill(0.0);
                    }
                    views.proj_w[unit] = 0.0;
                }
            }
            DropoutMask::Scale(factor) => {
                let factor = *factor;
                for gate in views.gates.iter_mut() {
                    gate.r.iter_mut().for_each(|v| *v *= factor);
                }
                views.proj_w.iter_mut().for_each(|v| *v *= factor);
            }
        }
        Ok(())
    }
}
