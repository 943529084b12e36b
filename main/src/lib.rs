//! # RustML LSTM
//!
//! Single-layer LSTM with a scalar sigmoid output, trained by hand-derived
//! backpropagation through time.
//!
//! This crate provides:
//! - The packed parameter layout (14 blocks in one flat `Vec<f64>`)
//! - A fast `f64` forward pass and a generic forward pass over any [`Scalar`]
//! - Analytic gradients with per-sample accumulation on the rayon pool
//! - Dropout masking applied identically to a forward pass and its gradient
//! - Min/max normalization of series batches
//!
//! ## Example
//!
//! ```rust
//! use rustml_lstm::{Lstm, LstmConfig, MseLoss, Series};
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! let model = Lstm::init(LstmConfig::new(1, 4), &mut rng).unwrap();
//! let inputs = vec![Series::univariate(vec![0.1, 0.2, 0.3])];
//! let targets = vec![vec![0.2, 0.3, 0.4]];
//!
//! let predictions = model.predict(&inputs).unwrap();
//! assert_eq!(predictions[0].len(), 3);
//!
//! let step = model.gradient(&inputs, &targets, &MseLoss, &mut rng).unwrap();
//! assert_eq!(step.len(), model.layout().param_count());
//! ```

pub mod api;
mod core;
mod saf;

pub use saf::*;
