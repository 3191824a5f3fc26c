// Library interface for aqua-license
pub mod commands;
pub mod output;

// Re-export commonly used items
pub use aqua_license_core::{AquaError, Result};
