use quince::common::xml::serialize;
use quince::ooxml::custom_properties;
use quince::ooxml::docx::node::kind;
use quince::ooxml::opc::constants::{part_name, relationship_type};
use quince::{ConvertOptions, Converter, DocNode, Node, PartRecord};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/comments.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.comments+xml"/><Override PartName="/word/commentsExtended.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.commentsExtended+xml"/><Override PartName="/word/settings.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml"/><Override PartName="/docProps/custom.xml" ContentType="application/vnd.openxmlformats-officedocument.custom-properties+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/custom-properties" Target="docProps/custom.xml"/></Relationships>"#;

const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:w14="http://schemas.microsoft.com/office/word/2010/wordml" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture"><w:body><w:p w14:paraId="1A2B3C4D"><w:pPr><w:pStyle w:val="Heading1"/><w:jc w:val="center"/></w:pPr><w:bookmarkStart w:id="0" w:name="_Top"/><w:r><w:rPr><w:b/><w:sz w:val="32"/></w:rPr><w:t xml:space="preserve">Quarterly </w:t></w:r><w:r><w:t>report</w:t></w:r><w:bookmarkEnd w:id="0"/></w:p><w:p><w:commentRangeStart w:id="1"/><w:r><w:t>See </w:t></w:r><w:hyperlink r:id="rId4" w:history="1"><w:r><w:t>the site</w:t></w:r></w:hyperlink><w:commentRangeEnd w:id="1"/><w:r><w:commentReference w:id="1"/></w:r><w:ins w:id="2" w:author="Ada" w:date="2024-01-01T00:00:00Z"><w:r><w:t>added</w:t></w:r></w:ins><w:del w:id="3" w:author="Ada" w:date="2024-01-01T00:00:00Z"><w:r><w:delText> </w:delText></w:r></w:del></w:p><w:sdt><w:sdtPr><w:alias w:val="Box"/></w:sdtPr><w:sdtContent><w:p><w:r><w:t>inside</w:t></w:r></w:p></w:sdtContent></w:sdt><w:tbl><w:tblPr><w:tblW w:w="0" w:type="auto"/></w:tblPr><w:tblGrid><w:gridCol w:w="2000"/><w:gridCol w:w="3000"/></w:tblGrid><w:tr><w:tc><w:tcPr><w:tcW w:w="2000" w:type="dxa"/><w:vMerge w:val="restart"/></w:tcPr><w:p><w:r><w:t>A</w:t></w:r></w:p></w:tc><w:tc><w:tcPr><w:tcW w:w="3000" w:type="dxa"/></w:tcPr><w:p><w:r><w:t>B</w:t></w:r></w:p></w:tc></w:tr><w:tr><w:tc><w:tcPr><w:tcW w:w="2000" w:type="dxa"/><w:vMerge/></w:tcPr><w:p/></w:tc><w:tc><w:tcPr><w:tcW w:w="3000" w:type="dxa"/></w:tcPr><w:p><w:r><w:t>C</w:t></w:r></w:p></w:tc></w:tr></w:tbl><w:p><w:r><w:drawing><wp:inline><wp:extent cx="914400" cy="457200"/><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic><pic:blipFill><a:blip r:embed="rId5"/></pic:blipFill></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p><w:sectPr><w:pgSz w:w="12240" w:h="15840"/></w:sectPr></w:body></w:document>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings" Target="settings.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments" Target="comments.xml"/><Relationship Id="rId3" Type="http://schemas.microsoft.com/office/2011/relationships/commentsExtended" Target="commentsExtended.xml"/><Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/><Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/><Relationship Id="rId6" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="comments.xml"/></Relationships>"#;

const SETTINGS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:w15="http://schemas.microsoft.com/office/word/2012/wordml"><w15:docId w15:val="{MICROSOFT-GUID-123}"/></w:settings>"#;

const CUSTOM: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<op:Properties xmlns:op="http://schemas.openxmlformats.org/officeDocument/2006/custom-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes"><op:property fmtid="{D5CDD505-2E9C-101B-9397-08002B2CF9AE}" pid="2" name="DocumentGuid"><vt:lpwstr>CUSTOM-GUID</vt:lpwstr></op:property></op:Properties>"#;

const BROKEN_FOOTER: &str = "<w:ftr><w:p></w:ftr>";

fn records() -> Vec<PartRecord> {
    vec![
        PartRecord::new("[Content_Types].xml", CONTENT_TYPES),
        PartRecord::new("_rels/.rels", PACKAGE_RELS),
        PartRecord::new("word/document.xml", DOCUMENT),
        PartRecord::new("word/_rels/document.xml.rels", DOCUMENT_RELS),
        PartRecord::new("word/settings.xml", SETTINGS),
        PartRecord::new("word/comments.xml", "<w:comments/>"),
        PartRecord::new("word/commentsExtended.xml", "<w15:commentsEx/>"),
        PartRecord::new("word/footer1.xml", BROKEN_FOOTER),
        PartRecord::new("word/media/image1.png", "\u{89}PNG"),
        PartRecord::new("docProps/custom.xml", CUSTOM),
    ]
}

fn content_of<'a>(records: &'a [PartRecord], path: &str) -> Option<&'a str> {
    records
        .iter()
        .find(|r| r.path == path)
        .map(|r| r.content.as_str())
}

/// Copy of `node` without any comment marker.
fn without_comments(node: &DocNode) -> Option<DocNode> {
    match node {
        DocNode::Known(n) if kind::COMMENT_MARKERS.contains(&n.kind.as_str()) => None,
        DocNode::Known(n) => {
            let mut copy = n.clone();
            copy.content = n.content.iter().filter_map(without_comments).collect();
            Some(copy.into())
        },
        DocNode::Opaque(_) => Some(node.clone()),
    }
}

#[test]
fn test_tree_survives_export() {
    let mut converter = Converter::from_records(records(), ConvertOptions::default());
    let tree = converter.to_document_tree().unwrap();
    assert_eq!(tree.plain_text(), "Quarterly reportSee the siteadded ABC");

    let exported = converter.export(&tree).unwrap();
    let reloaded = Converter::from_records(exported.clone(), ConvertOptions::default());
    assert_eq!(reloaded.to_document_tree().unwrap(), tree);

    // Exporting the same tree again changes nothing
    let mut reloaded = reloaded;
    assert_eq!(reloaded.export(&tree).unwrap(), exported);
}

#[test]
fn test_unsupported_content_passes_through() {
    let converter = Converter::from_records(records(), ConvertOptions::default());
    let tree = converter.to_document_tree().unwrap();
    let DocNode::Known(doc) = &tree else {
        panic!("body should be a known node");
    };
    let sdt = doc
        .content
        .iter()
        .find_map(|n| match n {
            DocNode::Opaque(el) if el.is("sdt") => Some(el),
            _ => None,
        })
        .unwrap();
    assert_eq!(
        serialize(sdt),
        r#"<w:sdt><w:sdtPr><w:alias w:val="Box"/></w:sdtPr><w:sdtContent><w:p><w:r><w:t>inside</w:t></w:r></w:p></w:sdtContent></w:sdt>"#
    );
}

#[test]
fn test_malformed_part_kept_verbatim() {
    let mut converter = Converter::from_records(records(), ConvertOptions::default());
    let tree = converter.to_document_tree().unwrap();
    let exported = converter.export(&tree).unwrap();
    assert_eq!(content_of(&exported, "word/footer1.xml"), Some(BROKEN_FOOTER));
    assert_eq!(content_of(&exported, "word/media/image1.png"), Some("\u{89}PNG"));
}

#[test]
fn test_comments_kept_while_referenced() {
    let mut converter = Converter::from_records(records(), ConvertOptions::default());
    let tree = converter.to_document_tree().unwrap();
    let exported = converter.export(&tree).unwrap();
    assert!(content_of(&exported, part_name::COMMENTS).is_some());
    assert!(content_of(&exported, part_name::COMMENTS_EXTENDED).is_some());
}

#[test]
fn test_comment_parts_pruned_after_last_comment_removed() {
    let mut converter = Converter::from_records(records(), ConvertOptions::default());
    let tree = without_comments(&converter.to_document_tree().unwrap()).unwrap();
    let exported = converter.export(&tree).unwrap();

    assert!(content_of(&exported, part_name::COMMENTS).is_none());
    assert!(content_of(&exported, part_name::COMMENTS_EXTENDED).is_none());
    let types = content_of(&exported, "[Content_Types].xml").unwrap();
    assert!(!types.contains("/word/comments.xml"));
    assert!(types.contains("/word/document.xml"));

    let rels = converter.package().relationships(part_name::DOCUMENT);
    assert!(!rels.iter().any(|r| r.rel_type == relationship_type::COMMENTS));
    assert!(!rels.iter().any(|r| r.rel_type == relationship_type::COMMENTS_EXTENDED));
    // A footer pointing at a same-named file stays
    assert!(
        rels.iter()
            .any(|r| r.rel_type == relationship_type::FOOTER && r.target == "comments.xml")
    );
    assert_eq!(rels.len(), 4);
}

#[test]
fn test_new_content_gets_fresh_relationship_ids() {
    let mut converter = Converter::from_records(records(), ConvertOptions::default());
    let mut tree = converter.to_document_tree().unwrap();
    let DocNode::Known(doc) = &mut tree else {
        panic!("body should be a known node");
    };
    let link = Node::new(kind::LINK)
        .with_attr("href", "https://other.example")
        .with_child(Node::new(kind::RUN).with_child(Node::new(kind::TEXT).with_text("more")));
    let image = Node::new(kind::IMAGE).with_attr("src", "media/image2.png");
    doc.content.insert(
        0,
        Node::new(kind::PARAGRAPH)
            .with_child(link)
            .with_child(Node::new(kind::RUN).with_child(image))
            .into(),
    );
    converter.export(&tree).unwrap();

    let rels = converter.package().relationships(part_name::DOCUMENT);
    let ids: Vec<&str> = rels.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["rId1", "rId2", "rId3", "rId4", "rId5", "rId6", "rId7", "rId8"]);
    assert_eq!(rels[6].target, "https://other.example");
    assert!(rels[6].is_external());
    assert_eq!(rels[7].target, "media/image2.png");

    // Reloading resolves the new link through the written relationship
    let reloaded = Converter::from_records(converter.package().to_records(), ConvertOptions::default());
    let tree = reloaded.to_document_tree().unwrap();
    let DocNode::Known(doc) = &tree else {
        panic!("body should be a known node");
    };
    let DocNode::Known(first) = &doc.content[0] else {
        panic!("first block should be a paragraph");
    };
    let DocNode::Known(link) = &first.content[0] else {
        panic!("first inline should be a link");
    };
    assert_eq!(link.str_attr("href"), Some("https://other.example"));
    assert_eq!(link.str_attr("rId"), Some("rId7"));
}

#[test]
fn test_identity_from_package() {
    let mut converter = Converter::from_records(records(), ConvertOptions::default())
        .with_source_bytes(b"raw archive bytes".to_vec());
    assert_eq!(converter.guid(), Some("MICROSOFT-GUID-123"));
    assert_eq!(converter.created(), None);

    let first = converter.document_identifier();
    assert!(first.starts_with("HASH-"));
    assert!(converter.is_modified());
    assert!(converter.created().is_some());
    // The vendor id was already known; the custom property is untouched
    assert_eq!(
        custom_properties::get(converter.package(), "DocumentGuid").as_deref(),
        Some("CUSTOM-GUID")
    );

    let second = converter.document_identifier();
    assert_ne!(first, second);
    assert_eq!(second, converter.document_identifier());
}

#[test]
fn test_new_document_export() {
    let mut converter = Converter::new_document(ConvertOptions::default());
    assert!(converter.created().is_some());
    let tree: DocNode = Node::new(kind::DOC)
        .with_child(
            Node::new(kind::PARAGRAPH)
                .with_child(Node::new(kind::RUN).with_child(Node::new(kind::TEXT).with_text("Hello"))),
        )
        .into();
    let exported = converter.export(&tree).unwrap();
    for path in [
        "[Content_Types].xml",
        "_rels/.rels",
        "word/document.xml",
        "word/styles.xml",
        "word/settings.xml",
        "docProps/core.xml",
    ] {
        assert!(content_of(&exported, path).is_some(), "missing {}", path);
    }
    let reloaded = Converter::from_records(exported, ConvertOptions::default());
    assert_eq!(reloaded.created(), converter.created());
    assert_eq!(reloaded.to_document_tree().unwrap().plain_text(), "Hello");
}
