//! taxonomy-kit domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `model`: Taxonomy documents and store record shapes
//! - `ports`: Trait definitions for the record store and clock
//! - `usecases`: Active taxonomy resolution, publishing and rule classification

pub mod model;
pub mod ports;
pub mod usecases;

#[cfg(test)]
mod testing;

pub use model::*;
pub use ports::*;
