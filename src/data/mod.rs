//! Synthetic dataset generation.

pub mod generator;

pub use generator::{Product, generate_table};
