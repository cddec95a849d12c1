//! ECS Components
//!
//! Per-agent components and the engine-wide simulation state.

pub mod agent;
pub mod world;

pub use agent::*;
pub use world::*;
