//! URL safety checks shared by attribute patterns and CSS URI tokens.

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::allowlist::list_contains;

lazy_static! {
    /// Hosts made only of digits and dots: raw IPv4 or integer-encoded
    /// addresses, used to dodge hostname-based review.
    static ref ANONYMOUS_HOST: Regex = Regex::new(r"^[.0-9]+$").expect("valid pattern");
    /// Base against which relative references are resolved for validation
    /// only; the resolved result is never fetched or kept.
    static ref VALIDATION_BASE: Url =
        Url::parse("https://folio.invalid/").expect("valid base URL");
}

/// Surrounding attributes that change what an absolute URL is allowed to do.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkContext<'a> {
    pub rel: &'a str,
    pub target: &'a str,
}

/// Decide whether `raw` is a safe reference. Returns `None` when it is, or
/// a human-readable issue when it is not.
///
/// The checks, in order: the URL must parse (relative references are
/// validated against a fixed dummy base); an explicit scheme must be
/// whitelisted; a query string needs `allow_query`; anything absolute needs
/// `allow_absolute`, must not point at an all-numeric host, must not be a
/// `rel=stylesheet` target, and with `target=_blank` must carry
/// `rel=noopener`.
pub fn check_url<S: AsRef<str>>(
    raw: &str,
    allowed_schemes: &[S],
    allow_absolute: bool,
    allow_query: bool,
    link: Option<LinkContext<'_>>,
) -> Option<String> {
    let (parsed, absolute) = match Url::parse(raw) {
        Ok(parsed) => (parsed, true),
        Err(url::ParseError::RelativeUrlWithoutBase) => match VALIDATION_BASE.join(raw) {
            Ok(resolved) => (resolved, false),
            Err(err) => return Some(format!("URL '{raw}' cannot be parsed: {err}")),
        },
        Err(err) => return Some(format!("URL '{raw}' cannot be parsed: {err}")),
    };

    if absolute && !list_contains(parsed.scheme(), allowed_schemes) {
        return Some(format!("URL scheme '{}' is not allowed", parsed.scheme()));
    }
    if !allow_query {
        if let Some(query) = parsed.query() {
            return Some(format!("URL query '{query}' is not allowed"));
        }
    }
    if !absolute {
        return None;
    }
    if !allow_absolute {
        return Some(format!("absolute URL '{raw}' is not allowed here"));
    }
    if let Some(host) = parsed.host_str() {
        if ANONYMOUS_HOST.is_match(host) {
            return Some(format!("anonymous host '{host}' is not allowed"));
        }
    }
    if let Some(link) = link {
        if link.rel.contains("stylesheet") {
            return Some(format!("external style sheet '{raw}' is not allowed"));
        }
        if link.target.contains("_blank") && !link.rel.contains("noopener") {
            return Some(format!(
                "external link '{raw}' opens a new context without rel=noopener"
            ));
        }
    }
    None
}

/// Extract the reference inside a CSS `url( … )` token: the text between
/// the parentheses, with boundary whitespace and quotes removed.
pub(crate) fn uri_contents(uri_text: &str) -> &str {
    let inner = uri_text.strip_suffix(')').unwrap_or(uri_text);
    let inner = match inner.find('(') {
        Some(open) => &inner[open + 1..],
        None => inner,
    };
    inner.trim().trim_matches(|c| c == '"' || c == '\'')
}
