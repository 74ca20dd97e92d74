//! Minigame manifest registry.

mod descriptor;
mod registry;

pub use descriptor::{ExecutionMode, GameDescriptor};
pub use registry::ManifestRegistry;
