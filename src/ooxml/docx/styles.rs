/// Styles - lookup of named table styles in `word/styles.xml`.
///
/// Table translators use this to resolve borders, cell margins, fonts and
/// justification that a table inherits from its style rather than setting
/// directly.
use crate::common::xml::Element;
use crate::ooxml::opc::Package;
use crate::ooxml::opc::constants::{part_name, relationship_type};

/// Effective properties of a table style after applying its `basedOn` parent.
///
/// `table_properties` and `run_properties` hold the parent's children first
/// and then the style's own, so the last matching child wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStyle {
    pub style_id: String,
    pub table_properties: Element,
    pub run_properties: Element,
}

/// Member name of the styles part used by `document_part`.
pub fn styles_part(package: &Package, document_part: &str) -> String {
    package
        .related_part(document_part, relationship_type::STYLES)
        .unwrap_or_else(|| part_name::STYLES.to_string())
}

/// `w:style` element with the given `w:styleId`.
pub fn find_style<'a>(styles: &'a Element, style_id: &str) -> Option<&'a Element> {
    styles
        .children_named("style")
        .find(|s| s.attr_local("styleId") == Some(style_id))
}

/// Resolve a table style, merging a single level of `basedOn` inheritance.
pub fn table_style(styles: &Element, style_id: &str) -> Option<TableStyle> {
    let style = find_style(styles, style_id)?;
    let base = style
        .child_val("basedOn")
        .filter(|b| *b != style_id)
        .and_then(|b| find_style(styles, b));

    let mut table_properties = Element::new("w:tblPr");
    let mut run_properties = Element::new("w:rPr");
    for source in base.into_iter().chain(std::iter::once(style)) {
        if let Some(tbl_pr) = source.child("tblPr") {
            table_properties.children.extend(tbl_pr.children.iter().cloned());
        }
        if let Some(r_pr) = source.child("rPr") {
            run_properties.children.extend(r_pr.children.iter().cloned());
        }
    }
    Some(TableStyle {
        style_id: style_id.to_string(),
        table_properties,
        run_properties,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::xml::parse;
    use crate::ooxml::docx::format::last_child;

    const STYLES: &str = r#"<w:styles>
<w:style w:type="table" w:styleId="TableNormal"><w:tblPr><w:tblCellMar><w:left w:w="108" w:type="dxa"/></w:tblCellMar><w:jc w:val="left"/></w:tblPr></w:style>
<w:style w:type="table" w:styleId="Grid"><w:basedOn w:val="TableNormal"/><w:rPr><w:rFonts w:ascii="Arial"/></w:rPr><w:tblPr><w:tblBorders><w:top w:val="single" w:sz="4"/></w:tblBorders><w:jc w:val="center"/></w:tblPr></w:style>
<w:style w:type="table" w:styleId="Loop"><w:basedOn w:val="Loop"/></w:style>
</w:styles>"#;

    #[test]
    fn test_base_properties_come_first() {
        let styles = parse(STYLES).unwrap();
        let style = table_style(&styles, "Grid").unwrap();
        let names: Vec<_> = style.table_properties.elements().map(Element::local_name).collect();
        assert_eq!(names, ["tblCellMar", "jc", "tblBorders", "jc"]);
        assert_eq!(
            last_child(&style.table_properties, "jc").and_then(|j| j.attr_local("val")),
            Some("center")
        );
        assert!(style.run_properties.child("rFonts").is_some());
    }

    #[test]
    fn test_missing_and_self_based_styles() {
        let styles = parse(STYLES).unwrap();
        assert!(table_style(&styles, "Nope").is_none());
        let style = table_style(&styles, "Loop").unwrap();
        assert!(style.table_properties.children.is_empty());
    }

    #[test]
    fn test_styles_part_default() {
        assert_eq!(styles_part(&Package::new(), "word/document.xml"), "word/styles.xml");
    }
}
