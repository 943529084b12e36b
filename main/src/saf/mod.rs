// SAF (Simple API Facade): re-exports for convenient access

// API traits and types
pub use crate::api::config::{LstmConfig, WeightInit};
pub use crate::api::dropout::{DropoutMask, DropoutPolicy};
pub use crate::api::error::{LstmError, LstmResult};
pub use crate::api::loss::LossStrategy;
pub use crate::api::scalar::Scalar;
pub use crate::api::types::{CellTrace, Series};

// Weight layout
pub use crate::core::layout::{Gate, GateView, GateViewMut, WeightLayout, WeightViews, WeightViewsMut};

// Forward and backward engines
pub use crate::core::backward::backward;
pub use crate::core::forward::{forward_fast, forward_generic};
pub use crate::core::engine::{
    batch_loss, gradient, masked_copy, per_sample_gradients, predict, predict_generic,
    reduce_gradients,
};

// Loss functions
pub use crate::core::loss::mae::MaeLoss;
pub use crate::core::loss::mse::MseLoss;

// Model
pub use crate::core::init::initial_weights;
pub use crate::core::model::Lstm;

// Normalization
pub use crate::core::data::scaler::MinMaxScaler;
