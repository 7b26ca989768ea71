// All core functionality is in textpin-core
// This CLI acts as a thin wrapper around the core library

// CLI-specific modules
pub mod paths;

// Re-export core types for convenience
pub use textpin_core::*;
