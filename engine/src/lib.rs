// Engine library root: amount-aware request building, the province table and
// the local fraud-check history.

pub mod config;
pub mod data;
pub mod error;
pub mod services;

pub use shared::utils::amount_format;
