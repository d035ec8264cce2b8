//! Domain models for the clinic data-sync layer.

mod entity;
mod patient;
mod prescription;

pub use entity::*;
pub use patient::*;
pub use prescription::*;
