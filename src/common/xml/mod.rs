//! Generic namespaced-XML support.
//!
//! Parts are held as a small owned element tree ([`Element`]) so translators
//! can inspect and rebuild them freely. Namespace prefixes are kept verbatim
//! on names; [`matches_local`] is the single place where prefixes are
//! tolerated during lookups.

pub mod element;
pub mod escape;
pub mod name;
pub mod parser;
pub mod whitespace;
pub mod writer;

pub use element::{Element, XmlNode};
pub use escape::{escape_xml, unescape_xml};
pub use name::{local_name, matches_local, prefix, qualified};
pub use parser::parse;
pub use writer::{serialize, serialize_document};
