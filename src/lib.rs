//! Quince - lossless conversion between WordprocessingML packages and a
//! typed document tree
//!
//! A .docx package arrives as a list of `{ path, content }` part records
//! (the ZIP container itself is handled by the caller). Quince parses the
//! XML parts, turns the main document body into a [`DocNode`] tree that an
//! editor can work with, and writes an edited tree back into the package
//! without losing anything it did not understand.
//!
//! # Features
//!
//! - **Lossless round trip**: unrecognized elements travel through the tree
//!   as opaque subtrees and are written back byte for byte
//! - **Tables**: grid reconstruction, merged cells and style inheritance
//! - **Relationships**: id-allocating merge for links and images added by
//!   the editor
//! - **Document identity**: stable identifiers from the vendor document id,
//!   a custom-property GUID and the creation timestamp
//!
//! # Example
//!
//! ```rust
//! use quince::{ConvertOptions, Converter, DocNode, Node};
//!
//! # fn main() -> Result<(), quince::Error> {
//! let mut converter = Converter::new_document(ConvertOptions::default());
//!
//! // Replace the body with a single paragraph
//! let tree: DocNode = Node::new("doc")
//!     .with_child(
//!         Node::new("paragraph")
//!             .with_child(Node::new("run").with_child(Node::new("text").with_text("Hello"))),
//!     )
//!     .into();
//! let records = converter.export(&tree)?;
//!
//! // Read it back
//! let reloaded = Converter::from_records(records, ConvertOptions::default());
//! assert_eq!(reloaded.to_document_tree()?.plain_text(), "Hello");
//! # Ok(())
//! # }
//! ```

/// Shared building blocks: errors, the XML element tree, ids and hashes.
pub mod common;

/// Conversion options.
pub mod config;

/// OOXML packaging and WordprocessingML conversion.
pub mod ooxml;

pub use common::error::{Error, Result};
pub use common::xml::{Element, XmlNode};
pub use config::ConvertOptions;
pub use ooxml::docx::{Converter, DocNode, Node, Value, convert_all};
pub use ooxml::opc::{Package, PartRecord};
