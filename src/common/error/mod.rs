//! Unified error types for quince.
//!
//! Every fallible operation in the converter reports through a single error
//! enum. Conditions the converter is expected to recover from (unknown
//! elements, malformed custom properties) are not errors at all: they are
//! logged and handled by passthrough or by returning `None`.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
