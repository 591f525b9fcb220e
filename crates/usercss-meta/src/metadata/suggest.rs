//! "Did you mean" suggestions for misspelled directives.

use super::directive::Directive;

/// The known directive closest to `key`, if one is within `log2(len)` edits.
pub fn suggest_directive(key: &str) -> Option<&'static str> {
    let max_edits = (key.chars().count() as f64).log2();
    if !max_edits.is_finite() {
        return None;
    }
    let max_edits = max_edits.floor() as usize;
    Directive::keywords()
        .map(|known| (strsim::levenshtein(known, key), known))
        .filter(|(distance, _)| *distance <= max_edits)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, known)| known)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestions() {
        assert_eq!(suggest_directive("namspace"), Some("namespace"));
        assert_eq!(suggest_directive("verison"), Some("version"));
        assert_eq!(suggest_directive("homepageUrl"), Some("homepageURL"));
        assert_eq!(suggest_directive("zzzzzz"), None);
        assert_eq!(suggest_directive(""), None);
    }

    #[test]
    fn bound_grows_with_key_length() {
        // a three letter key allows one edit
        assert_eq!(suggest_directive("nam"), Some("name"));
        // two edits are too many for a three letter key
        assert_eq!(suggest_directive("nxx"), None);
    }

    #[test]
    fn closest_keyword_wins() {
        // "icon" is one edit away, "version" is much further
        assert_eq!(suggest_directive("icons"), Some("icon"));
    }
}
