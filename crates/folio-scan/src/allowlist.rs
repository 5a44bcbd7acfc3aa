//! Ordered whitelist membership and the fixed value-shape patterns.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// One or more space-separated identifier-ish names.
    static ref SPACE_SEPARATED_NAMES: Regex =
        Regex::new(r"^[\s\p{L}\p{N}_-]+$").expect("valid pattern");
    /// A MIME-type-ish token list, e.g. `text/css`.
    static ref SLASH_SEPARATED_NAMES: Regex =
        Regex::new(r"^[\p{L}\p{N}/-]+$").expect("valid pattern");
    /// Conditional-comment (`[if …]`) and SSI (`#include …`) openers.
    static ref DIRECTIVE_COMMENT: Regex = Regex::new(r"^[\[#]").expect("valid pattern");
}

/// Ordered, first-match-wins membership test.
///
/// `*` admits anything, `!name` rejects `name`; because the first matching
/// entry decides, `["!evil", "*"]` and `["*", "!evil"]` behave differently.
pub fn list_contains<S: AsRef<str>>(value: &str, allowed: &[S]) -> bool {
    for entry in allowed {
        let entry = entry.as_ref();
        if entry == "*" || entry == value {
            return true;
        }
        if let Some(denied) = entry.strip_prefix('!') {
            if value == denied {
                return false;
            }
        }
    }
    false
}

pub(crate) fn is_name_list(value: &str) -> bool {
    SPACE_SEPARATED_NAMES.is_match(value)
}

pub(crate) fn is_mime_like(value: &str) -> bool {
    SLASH_SEPARATED_NAMES.is_match(value)
}

/// Comment bodies whose first character is `[` or `#` smell like legacy
/// conditional comments or server-side includes, both of which can smuggle
/// active content past a naive reading. Only the first character counts:
/// both directive forms are rigid about where they start.
pub(crate) fn is_directive_comment(data: &str) -> bool {
    DIRECTIVE_COMMENT.is_match(data)
}
