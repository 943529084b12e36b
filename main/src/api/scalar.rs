//! Element type of the generic forward path.

use num_traits::{One, Zero};
use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Numeric type the generic recurrence runs on.
///
/// The element type of a computation is the type of `input * weight`: inputs
/// are `Self`, weights are always `f64`. Implementing this for a dual-number
/// type lets the forward pass carry derivatives with respect to the inputs
/// without touching the recurrence itself.
pub trait Scalar:
    Copy
    + Debug
    + Send
    + Sync
    + Zero
    + One
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Mul<f64, Output = Self>
    + Add<f64, Output = Self>
{
    fn exp(self) -> Self;

    fn tanh(self) -> Self;

    /// Logistic sigmoid `1 / (1 + e^-x)`.
    fn sigmoid(self) -> Self {
        Self::one() / (Self::one() + (-self).exp())
    }
}

impl Scalar for f64 {
    fn exp(self) -> f64 {
        f64::exp(self)
    }

    fn tanh(self) -> f64 {
        f64::tanh(self)
    }
}
