/// Remove `<html ...>`, `</html>`, `<body ...>` and `</body>` tag markers so
/// the markup can be embedded in the preview body.
///
/// Only the markers go; everything between them stays. Matching is ASCII
/// case-insensitive and a tag runs to the first `>`. Unbalanced or malformed
/// markup is passed through untouched.
pub fn strip_document_wrappers(markup: &str) -> String {
    strip_tag(&strip_tag(markup, "html"), "body")
}

fn strip_tag(source: &str, tag: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(open) = rest.find('<') {
        let (before, candidate) = rest.split_at(open);
        out.push_str(before);
        match marker_len(candidate, tag) {
            Some(len) => rest = candidate.get(len..).unwrap_or_default(),
            None => {
                out.push('<');
                rest = candidate.get(1..).unwrap_or_default();
            }
        }
    }
    out.push_str(rest);
    out
}

/// Byte length of the tag marker at the start of `candidate`, if it is one.
fn marker_len(candidate: &str, tag: &str) -> Option<usize> {
    let after_open = candidate.get(1..)?;
    let name_start = usize::from(after_open.starts_with('/'));
    let name = after_open.get(name_start..name_start + tag.len())?;
    if !name.eq_ignore_ascii_case(tag) {
        return None;
    }
    let tail_start = 1 + name_start + tag.len();
    let close = candidate.get(tail_start..)?.find('>')?;
    Some(tail_start + close + 1)
}
