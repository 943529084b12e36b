#![allow(dead_code)]

use num_traits::{One, Zero};
use rustml_lstm::{Scalar, Series, WeightLayout};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Deterministic, well-spread parameter vector: `w[i] = 0.5 * sin(0.37 i)`.
pub fn sine_weights(layout: &WeightLayout) -> Vec<f64> {
    (0..layout.param_count())
        .map(|i| (i as f64 * 0.37).sin() * 0.5)
        .collect()
}

/// A few multivariate series of different lengths.
pub fn toy_batch(n_var: usize) -> (Vec<Series<f64>>, Vec<Vec<f64>>) {
    let lengths = [4usize, 3, 5];
    let mut inputs = Vec::new();
    let mut targets = Vec::new();
    for (s, &len) in lengths.iter().enumerate() {
        let rows = (0..n_var)
            .map(|f| {
                (0..len)
                    .map(|t| ((s * 7 + f * 3 + t) as f64 * 0.61).cos() * 0.8)
                    .collect()
            })
            .collect();
        inputs.push(Series::from_rows(rows).unwrap());
        targets.push((0..len).map(|t| 0.2 + 0.1 * ((s + t) % 6) as f64).collect());
    }
    (inputs, targets)
}

/// Assert that two f64 slices are element-wise close within a tolerance.
pub fn assert_f64_near(actual: &[f64], expected: &[f64], tolerance: f64, msg: &str) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "{}: length mismatch (actual={}, expected={})",
        msg,
        actual.len(),
        expected.len()
    );
    for (i, (&a, &e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            (a - e).abs() <= tolerance,
            "{}: element [{}] mismatch: actual={}, expected={}, diff={}, tolerance={}",
            msg,
            i,
            a,
            e,
            (a - e).abs(),
            tolerance
        );
    }
}

/// Forward-mode dual number `re + eps * ε`, `ε² = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dual {
    pub re: f64,
    pub eps: f64,
}

impl Dual {
    pub fn new(re: f64, eps: f64) -> Self {
        Self { re, eps }
    }

    pub fn constant(re: f64) -> Self {
        Self { re, eps: 0.0 }
    }

    pub fn variable(re: f64) -> Self {
        Self { re, eps: 1.0 }
    }
}

impl Add for Dual {
    type Output = Dual;
    fn add(self, rhs: Dual) -> Dual {
        Dual::new(self.re + rhs.re, self.eps + rhs.eps)
    }
}

impl Sub for Dual {
    type Output = Dual;
    fn sub(self, rhs: Dual) -> Dual {
        Dual::new(self.re - rhs.re, self.eps - rhs.eps)
    }
}

impl Mul for Dual {
    type Output = Dual;
    fn mul(self, rhs: Dual) -> Dual {
        Dual::new(self.re * rhs.re, self.re * rhs.eps + self.eps * rhs.re)
    }
}

impl Div for Dual {
    type Output = Dual;
    fn div(self, rhs: Dual) -> Dual {
        Dual::new(
            self.re / rhs.re,
            (self.eps * rhs.re - self.re * rhs.eps) / (rhs.re * rhs.re),
        )
    }
}

impl Neg for Dual {
    type Output = Dual;
    fn neg(self) -> Dual {
        Dual::new(-self.re, -self.eps)
    }
}

impl Mul<f64> for Dual {
    type Output = Dual;
    fn mul(self, rhs: f64) -> Dual {
        Dual::new(self.re * rhs, self.eps * rhs)
    }
}

impl Add<f64> for Dual {
    type Output = Dual;
    fn add(self, rhs: f64) -> Dual {
        Dual::new(self.re + rhs, self.eps)
    }
}

impl Zero for Dual {
    fn zero() -> Self {
        Dual::constant(0.0)
    }

    fn is_zero(&self) -> bool {
        self.re == 0.0 && self.eps == 0.0
    }
}

impl One for Dual {
    fn one() -> Self {
        Dual::constant(1.0)
    }
}

impl Scalar for Dual {
    fn exp(self) -> Dual {
        let e = self.re.exp();
        Dual::new(e, self.eps * e)
    }

    fn tanh(self) -> Dual {
        let t = self.re.tanh();
        Dual::new(t, self.eps * (1.0 - t * t))
    }
}
