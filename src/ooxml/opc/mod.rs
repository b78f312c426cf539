/// Open Packaging Conventions (OPC) layer.
///
/// A [`Package`] is the set of named parts making up one document, as
/// handed over by the archive reader. XML parts are parsed into element
/// trees up front; a part that fails to parse is kept as raw text and does
/// not prevent the rest of the package from loading.
///
/// - `packuri`: part-name arithmetic (relationship part names, target
///   resolution)
/// - `rel`: relationship records and the id-allocating merge
/// - `content_types`: `[Content_Types].xml` overrides
pub mod constants;
pub mod content_types;
pub mod package;
pub mod packuri;
pub mod rel;

// Re-export commonly used types
pub use package::{Package, Part, PartRecord};
pub use rel::{MergeOutcome, Relationship, merge};
