//! Office Open XML (OOXML) support.
//!
//! The implementation is organized into layers:
//!
//! 1. **OPC Layer** (`opc`): parts, relationships and content types of a
//!    package, independent of the document format
//! 2. **Package metadata** (`metadata`, `custom_properties`): the core and
//!    custom document property parts
//! 3. **WordprocessingML** (`docx`): conversion between the main document
//!    part and the Document Tree
pub mod custom_properties;
pub mod docx;
pub mod metadata;
pub mod opc;

// Re-export commonly used types from OPC layer
pub use opc::{Package, PartRecord, Relationship};
