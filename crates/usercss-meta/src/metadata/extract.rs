//! Locating the `==UserStyle==` block inside a source file.

use std::borrow::Cow;
use std::ops::Range;

const OPEN_MARKER: &str = "==userstyle==";
const CLOSE_MARKER: &str = "==/userstyle==";

/// The metadata block of a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaSource<'a> {
    /// Text from the opening marker through the closing marker.
    pub text: &'a str,
    /// Byte offset of `text` inside the source.
    pub offset: usize,
    /// Byte range of the whole comment holding the block.
    pub comment: Range<usize>,
}

/// Replace `\r\n` and lone `\r` with `\n`.
///
/// Error offsets refer to the normalized text, so callers should normalize
/// once and keep the result.
pub fn normalize_line_endings(source: &str) -> Cow<'_, str> {
    if !source.contains('\r') {
        return Cow::Borrowed(source);
    }
    Cow::Owned(source.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Find the first block comment that holds a `==UserStyle==` block.
///
/// Markers are matched case-insensitively and may sit anywhere inside the
/// comment. An unterminated comment runs to the end of the source. Later
/// matching comments are ignored.
pub fn find_meta_source(source: &str) -> Option<MetaSource<'_>> {
    let mut from = 0;
    while let Some(found) = source[from..].find("/*") {
        let start = from + found;
        let body_start = start + 2;
        let end = source[body_start..]
            .find("*/")
            .map_or(source.len(), |i| body_start + i + 2);
        if let Some((open, close)) = find_markers(&source[start..end]) {
            return Some(MetaSource {
                text: &source[start + open..start + close],
                offset: start + open,
                comment: start..end,
            });
        }
        from = end;
    }
    None
}

/// Relative range of the block inside `comment`: opening marker start to
/// closing marker end.
fn find_markers(comment: &str) -> Option<(usize, usize)> {
    // ASCII lowercasing keeps byte offsets intact
    let lower = comment.to_ascii_lowercase();
    let open = lower.find(OPEN_MARKER)?;
    let after_open = open + OPEN_MARKER.len();
    let close = lower[after_open..].find(CLOSE_MARKER)?;
    Some((open, after_open + close + CLOSE_MARKER.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_block_and_offsets() {
        let source = "a{}\n/* ==UserStyle==\n@name x\n==/UserStyle== */\nb{}";
        let meta = find_meta_source(source).unwrap();
        assert!(meta.text.starts_with("==UserStyle=="));
        assert!(meta.text.ends_with("==/UserStyle=="));
        assert_eq!(&source[meta.offset..meta.offset + 13], "==UserStyle==");
        assert_eq!(&source[meta.comment.clone()], "/* ==UserStyle==\n@name x\n==/UserStyle== */");
    }

    #[test]
    fn markers_are_case_insensitive() {
        let meta = find_meta_source("/*! ==userstyle==\n==/USERSTYLE== */").unwrap();
        assert_eq!(meta.offset, 4);
    }

    #[test]
    fn first_matching_comment_wins() {
        let source = "/* plain */ /* ==UserStyle== @name a ==/UserStyle== */ /* ==UserStyle== @name b ==/UserStyle== */";
        let meta = find_meta_source(source).unwrap();
        assert!(meta.text.contains("@name a"));
        assert_eq!(meta.comment.start, 12);
    }

    #[test]
    fn markers_must_share_a_comment() {
        assert!(find_meta_source("/* ==UserStyle== */ /* ==/UserStyle== */").is_none());
        assert!(find_meta_source("no comments").is_none());
    }

    #[test]
    fn unterminated_comment_runs_to_end() {
        let meta = find_meta_source("/* ==UserStyle==\n==/UserStyle==").unwrap();
        assert_eq!(meta.comment, 0..31);
    }

    #[test]
    fn line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
        assert!(matches!(normalize_line_endings("a\nb"), Cow::Borrowed(_)));
    }
}
