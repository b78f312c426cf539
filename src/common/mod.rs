//! Common types and utilities shared by the package and translator layers.

// Submodule declarations
pub mod error;
pub mod hash;
pub mod id;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, Result};
pub use xml::{Element, XmlNode};
