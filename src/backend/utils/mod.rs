//! Utility modules for the backend.

/// Runtime configuration.
pub mod config;
/// Human-readable byte sizes.
pub mod formater;
/// File system helpers.
pub mod system;
