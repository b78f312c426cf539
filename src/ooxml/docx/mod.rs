/// WordprocessingML (.docx) conversion.
///
/// This module converts the main document part of a .docx package into a
/// Document Tree and back.
///
/// # Architecture
///
/// - `node`: the Document Tree (`DocNode`, `Node`, `Value`)
/// - `registry`: compile-time maps from element names and node kinds to
///   translators
/// - `paragraph`, `hyperlink`, `table`, ...: one translator module per
///   element family
/// - `identity`, `settings`: document identity resolution
/// - `export`: writing an edited tree back into the package
/// - `converter`: the `Converter` façade tying it together
///
/// # Example
///
/// ```rust
/// use quince::ooxml::docx::{Converter, DocNode, Node};
/// use quince::ooxml::opc::PartRecord;
/// use quince::ConvertOptions;
///
/// let records = vec![PartRecord::new(
///     "word/document.xml",
///     r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Hi</w:t></w:r></w:p></w:body></w:document>"#,
/// )];
/// let mut converter = Converter::from_records(records, ConvertOptions::default());
/// let tree = converter.to_document_tree()?;
/// assert_eq!(tree.plain_text(), "Hi");
///
/// let records = converter.export(&tree)?;
/// assert_eq!(records.len(), 1);
/// # Ok::<(), quince::Error>(())
/// ```
pub mod bookmark;
pub mod comment;
pub mod context;
pub mod converter;
pub mod document;
pub mod drawing;
pub mod export;
pub mod field;
pub mod format;
pub mod hyperlink;
pub mod identity;
pub mod node;
pub mod paragraph;
pub mod registry;
pub mod revision;
pub mod settings;
pub mod styles;
pub mod table;
pub mod template;

pub use converter::{Converter, convert_all};
pub use identity::{DocumentIdentity, IdentitySource, SystemSource};
pub use node::{DocNode, Node, Value};
