pub mod config;
pub mod dropout;
pub mod error;
pub mod loss;
pub mod scalar;
pub mod types;
