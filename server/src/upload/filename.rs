//! Filename sanitization for uploaded files

use unicode_normalization::UnicodeNormalization;

/// Reduce a client-supplied filename to a safe single path component.
///
/// The name is NFKD-decomposed first so accented letters keep their base
/// letter. Path separators become word breaks, whitespace runs are joined
/// with `_`, anything outside ASCII `[A-Za-z0-9._-]` is dropped and
/// leading/trailing `.` and `_` are trimmed. Returns `None` when nothing
/// usable is left.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let flattened: String = name
        .nfkd()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");

    let filtered: String = joined
        .chars()
        .filter(|&c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let trimmed = filtered.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// True if `name` is already in sanitized form.
///
/// Such a name has no separators, no `..` component and no leading dot, so
/// joining it onto a directory never leaves that directory.
pub fn is_safe_filename(name: &str) -> bool {
    sanitize_filename(name).as_deref() == Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_plain_names() {
        assert_eq!(sanitize_filename("photo.png").as_deref(), Some("photo.png"));
        assert_eq!(
            sanitize_filename("logo-v2_final.JPG").as_deref(),
            Some("logo-v2_final.JPG")
        );
    }

    #[test]
    fn test_sanitize_strips_path_traversal() {
        assert_eq!(
            sanitize_filename("../../etc/passwd").as_deref(),
            Some("etc_passwd")
        );
        assert_eq!(
            sanitize_filename("..\\..\\windows\\system32.dll").as_deref(),
            Some("windows_system32.dll")
        );
        assert_eq!(
            sanitize_filename("/var/www/index.html").as_deref(),
            Some("var_www_index.html")
        );
    }

    #[test]
    fn test_sanitize_joins_whitespace_and_drops_unsafe_chars() {
        assert_eq!(
            sanitize_filename("my   cat photo.png").as_deref(),
            Some("my_cat_photo.png")
        );
        assert_eq!(
            sanitize_filename("a;b|c$(rm).gif").as_deref(),
            Some("abcrm.gif")
        );
        assert_eq!(sanitize_filename(".hidden").as_deref(), Some("hidden"));
    }

    #[test]
    fn test_sanitize_keeps_base_letter_of_accented_chars() {
        assert_eq!(sanitize_filename("café.png").as_deref(), Some("cafe.png"));
        assert_eq!(
            sanitize_filename("Über Straße.jpg").as_deref(),
            Some("Uber_Strae.jpg")
        );
        assert_eq!(sanitize_filename("ﬁle.txt").as_deref(), Some("file.txt"));
    }

    #[test]
    fn test_sanitize_rejects_names_with_nothing_left() {
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename("..."), None);
        assert_eq!(sanitize_filename("../"), None);
        assert_eq!(sanitize_filename("日本語"), None);
    }

    #[test]
    fn test_is_safe_filename() {
        assert!(is_safe_filename("etc_passwd"));
        assert!(is_safe_filename("image.final.png"));
        assert!(!is_safe_filename("../etc_passwd"));
        assert!(!is_safe_filename(".."));
        assert!(!is_safe_filename(".env"));
        assert!(!is_safe_filename("a/b.png"));
        assert!(!is_safe_filename("with space.png"));
        assert!(!is_safe_filename(""));
    }
}
