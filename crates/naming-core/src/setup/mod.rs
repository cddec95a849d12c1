//! World Setup
//!
//! Grid construction and agent spawning for both model variants.

pub mod population;

pub use population::*;
