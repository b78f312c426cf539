/// Part-name helpers.
///
/// Parts are addressed by their zip member name, i.e. the pack URI with the
/// leading slash stripped (`word/document.xml`). Relationship targets are
/// relative to the directory of the source part unless they start with `/`.

/// The member name of the content types part.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// The member name of the package-level relationships part.
pub const PACKAGE_RELS_PART: &str = "_rels/.rels";

/// Directory portion of a member name (`word/document.xml` → `word`).
///
/// Returns an empty string for parts at the package root.
pub fn base_dir(member: &str) -> &str {
    match member.rfind('/') {
        Some(pos) => &member[..pos],
        None => "",
    }
}

/// File name portion of a member name (`word/document.xml` → `document.xml`).
pub fn filename(member: &str) -> &str {
    match member.rfind('/') {
        Some(pos) => &member[pos + 1..],
        None => member,
    }
}

/// Extension without the leading period (`word/media/image1.png` → `png`).
pub fn ext(member: &str) -> &str {
    let name = filename(member);
    match name.rfind('.') {
        Some(pos) => &name[pos + 1..],
        None => "",
    }
}

/// Member name of the relationships part for `member`.
///
/// The package itself (empty member name) maps to `_rels/.rels`.
///
/// ```
/// use quince::ooxml::opc::packuri::rels_part_for;
/// assert_eq!(rels_part_for("word/document.xml"), "word/_rels/document.xml.rels");
/// assert_eq!(rels_part_for(""), "_rels/.rels");
/// ```
pub fn rels_part_for(member: &str) -> String {
    let dir = base_dir(member);
    let name = filename(member);
    if dir.is_empty() {
        format!("_rels/{}.rels", name)
    } else {
        format!("{}/_rels/{}.rels", dir, name)
    }
}

/// Resolve a relationship target against its source part.
///
/// Absolute targets (`/word/x.xml`) are taken from the package root; relative
/// ones are joined with the source part's directory and normalized.
///
/// ```
/// use quince::ooxml::opc::packuri::resolve_target;
/// assert_eq!(resolve_target("word/document.xml", "media/a.png"), "word/media/a.png");
/// assert_eq!(resolve_target("word/document.xml", "../docProps/custom.xml"), "docProps/custom.xml");
/// assert_eq!(resolve_target("", "word/document.xml"), "word/document.xml");
/// ```
pub fn resolve_target(source_member: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return normalize_path(absolute);
    }
    let dir = base_dir(source_member);
    if dir.is_empty() {
        normalize_path(target)
    } else {
        normalize_path(&format!("{}/{}", dir, target))
    }
}

/// Relative reference from `source_member`'s directory to `target_member`.
///
/// ```
/// use quince::ooxml::opc::packuri::relative_ref;
/// assert_eq!(relative_ref("word/document.xml", "word/comments.xml"), "comments.xml");
/// assert_eq!(relative_ref("word/document.xml", "docProps/core.xml"), "../docProps/core.xml");
/// ```
pub fn relative_ref(source_member: &str, target_member: &str) -> String {
    let from_parts: Vec<&str> = base_dir(source_member)
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    let to_parts: Vec<&str> = target_member.split('/').filter(|s| !s.is_empty()).collect();

    let common = from_parts
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = String::new();
    for _ in common..from_parts.len() {
        result.push_str("../");
    }
    for (i, part) in to_parts.iter().enumerate().skip(common) {
        if i > common {
            result.push('/');
        }
        result.push_str(part);
    }
    result
}

/// Resolve `.` and `..` segments; never climbs above the package root.
fn normalize_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {},
            ".." => {
                parts.pop();
            },
            _ => parts.push(part),
        }
    }
    parts.join("/")
}
