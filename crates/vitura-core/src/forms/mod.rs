//! Forms backed by the entity stores.

mod prescription;

pub use prescription::*;
