pub mod config;
pub mod error;
pub mod generator;
pub mod model;
pub mod store;
pub mod validate;
pub mod writer;
