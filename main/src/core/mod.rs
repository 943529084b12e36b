pub mod backward;
pub mod data;
pub mod dropout;
pub mod engine;
pub mod forward;
pub mod init;
pub mod layout;
pub mod loss;
pub mod model;
pub mod ops;
