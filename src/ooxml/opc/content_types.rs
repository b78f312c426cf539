/// Maintenance of the `[Content_Types].xml` part.
///
/// Only `Override` entries are touched: one is added when the converter
/// creates a part, and removed when it deletes one.
use crate::common::xml::{Element, qualified};
use crate::ooxml::opc::constants::namespace;

/// An empty `<Types>` root.
pub fn empty_types() -> Element {
    Element::new("Types").with_attr("xmlns", namespace::OPC_CONTENT_TYPES)
}

/// Normalize a member name to the `/PartName` form used by overrides.
fn part_name(member: &str) -> String {
    if member.starts_with('/') {
        member.to_string()
    } else {
        format!("/{}", member)
    }
}

/// Content type registered for `member`, if an override exists.
pub fn override_for<'a>(types: &'a Element, member: &str) -> Option<&'a str> {
    let wanted = part_name(member);
    types
        .children_named("Override")
        .find(|o| o.attr("PartName") == Some(wanted.as_str()))
        .and_then(|o| o.attr("ContentType"))
}

/// Add or update the override for `member`.
pub fn set_override(types: &mut Element, member: &str, content_type: &str) {
    let wanted = part_name(member);
    if let Some(existing) = types
        .elements_mut()
        .find(|o| o.is("Override") && o.attr("PartName") == Some(wanted.as_str()))
    {
        existing.set_attr("ContentType", content_type);
        return;
    }
    let name = qualified(types.prefix(), "Override");
    types.push(
        Element::new(name)
            .with_attr("PartName", wanted)
            .with_attr("ContentType", content_type),
    );
}

/// Remove the override for `member`. Returns whether one was removed.
pub fn remove_override(types: &mut Element, member: &str) -> bool {
    let wanted = part_name(member);
    let before = types.children.len();
    types.children.retain(|c| {
        !matches!(c.as_element(), Some(o) if o.is("Override") && o.attr("PartName") == Some(wanted.as_str()))
    });
    before != types.children.len()
}

/// Ensure a `Default` entry exists for a file extension.
pub fn ensure_default(types: &mut Element, extension: &str, content_type: &str) {
    let exists = types
        .children_named("Default")
        .any(|d| d.attr("Extension").is_some_and(|e| e.eq_ignore_ascii_case(extension)));
    if !exists {
        let name = qualified(types.prefix(), "Default");
        types.push(
            Element::new(name)
                .with_attr("Extension", extension)
                .with_attr("ContentType", content_type),
        );
    }
}
