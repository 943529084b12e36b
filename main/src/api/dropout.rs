/// How hidden units are masked for one forward or forward+backward call.
///
/// A policy is drawn once per call into a [`DropoutMask`]; the mask is what
/// actually touches the weights, so a forward pass and the gradient of that
/// same pass always see the same units dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropoutPolicy {
    /// Leave the weights untouched.
    NoDropouts,
    /// Zero the recurrent rows and projection entries of this many hidden
    /// units, sampled uniformly without replacement.
    RandomMasking(usize),
    /// Multiply the recurrent matrices and projection weight by a constant.
    /// Compensates at evaluation time for training with `RandomMasking`.
    UniformScale(f64),
}

/// A concrete draw of a [`DropoutPolicy`].
#[derive(Debug, Clone, PartialEq)]
pub enum DropoutMask {
    Keep,
    /// Dropped hidden-unit indices, ascending and distinct.
    Drop(Vec<usize>),
    Scale(f64),
}

impl DropoutMask {
    /// Indices of the dropped units, empty unless this is a `Drop` mask.
    pub fn dropped(&self) -> &[usize] {
        match self {
            DropoutMask::Drop(indices) => indices,
            _ => &[],
        }
    }
}
