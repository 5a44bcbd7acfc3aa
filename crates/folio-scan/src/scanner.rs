//! The content security scanner.
//!
//! A scanner walks markup token by token and checks every tag, attribute
//! and style fragment against its [`ScanPolicy`]. It collects issues, it
//! never sanitizes: the caller decides whether flagged content is rendered,
//! quarantined or rejected.

use std::io::Read;

use tracing::{debug, trace};

use folio_css as css;
use folio_css::TokenKind;

use crate::allowlist::{self, list_contains};
use crate::error::ScanError;
use crate::html::{HtmlToken, HtmlTokenizer};
use crate::policy::ScanPolicy;
use crate::urlcheck::{check_url, uri_contents, LinkContext};
use crate::vocab;

/// Whitelist scanner for untrusted HTML and CSS.
///
/// Attribute patterns come in these shapes, matched in order:
///
/// - `name` — attribute allowed, value must be space-separated names
/// - `name=*` — same value constraint, spelled out
/// - `name=**` — attribute allowed with any value
/// - `name=_MIME` — value must look like a MIME type
/// - `name=__URL` / `name=__URL_?` — value must pass the URL checks, the
///   `_?` variant additionally admitting a query string
/// - `name=__REL_URL` / `name=__REL_URL_?` — as above but relative-only
/// - `name=literal` — value must equal `literal`
/// - `*` / `**` — any attribute, except that no wildcard ever matches an
///   `on*` handler or a `data*` attribute
///
/// A `style` attribute admitted by any of `style`, `*` or `**` is never
/// taken at face value: its text goes through the CSS inspection instead.
pub struct Scanner {
    policy: ScanPolicy,
}

impl Scanner {
    pub fn new(policy: ScanPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScanPolicy {
        &self.policy
    }

    /// Scan markup from a byte source. Bytes that do not decode as UTF-8
    /// are an error, not an issue: the scanner refuses to guess at content
    /// it cannot faithfully read.
    pub fn scan_reader<R: Read>(&self, mut reader: R) -> Result<Vec<String>, ScanError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let text = std::str::from_utf8(&bytes)?;
        self.scan(text)
    }

    /// Scan an HTML document or fragment, returning one issue string per
    /// whitelist violation. An empty list means the content passed.
    pub fn scan(&self, html: &str) -> Result<Vec<String>, ScanError> {
        debug!(bytes = html.len(), "scanning markup");
        let mut issues = Vec::new();
        let mut in_style = false;
        let mut tokenizer = HtmlTokenizer::new(html);

        loop {
            match tokenizer.next_token() {
                HtmlToken::Eof => break,
                HtmlToken::Doctype => {}
                HtmlToken::Comment { data } => {
                    if allowlist::is_directive_comment(&data) {
                        issues.push(format!("comment carries a directive: <!--{data}-->"));
                    }
                }
                HtmlToken::StartTag {
                    name, attributes, ..
                } => {
                    if !vocab::is_known_tag(&name) {
                        issues.push(format!("tag '{name}' is unknown"));
                        continue;
                    }
                    in_style = name == "style";
                    let Some(patterns) = self.policy.allowed_tags.get(&name) else {
                        issues.push(format!("tag '{name}' is not allowed"));
                        continue;
                    };
                    for (key, value) in &attributes {
                        for issue in self.inspect_attribute(&name, patterns, &attributes, key, value)
                        {
                            issues.push(format!("{key}=\"{value}\": {issue}"));
                        }
                    }
                }
                HtmlToken::EndTag { name, raw } => {
                    if !vocab::is_known_tag(&name) {
                        issues.push(format!("tag '{name}' is unknown"));
                        continue;
                    }
                    if name == "style" {
                        in_style = false;
                    }
                    // a clean closing tag is exactly "</" + name + ">"
                    if raw.chars().count() != name.chars().count() + 3 {
                        issues.push(format!("closing tag carries extra content: {raw}"));
                    }
                }
                HtmlToken::Text { data } => {
                    if in_style {
                        match self.inspect_css(&data) {
                            Ok(css_issues) => issues.extend(css_issues),
                            Err(err) => issues.push(format!(
                                "style element cannot be parsed: {err}"
                            )),
                        }
                    }
                }
                HtmlToken::Trailing { raw } => {
                    issues.push(format!("unparseable markup: {raw}"));
                    break;
                }
            }
        }

        for issue in &issues {
            trace!(%issue, "markup issue");
        }
        Ok(issues)
    }

    /// Scan a standalone style sheet resource. Unlike embedded and inline
    /// style, a grammar error here is fatal: a whole `.css` file that does
    /// not parse cannot be meaningfully vetted.
    pub fn scan_css(&self, css_text: &str) -> Result<Vec<String>, ScanError> {
        debug!(bytes = css_text.len(), "scanning style sheet");
        let issues = self.inspect_css(css_text)?;
        for issue in &issues {
            trace!(%issue, "style sheet issue");
        }
        Ok(issues)
    }

    fn inspect_css(&self, css_text: &str) -> Result<Vec<String>, css::CssError> {
        let ruleset = css::parse(css_text)?;
        Ok(self.inspect_ruleset(&ruleset))
    }

    fn inspect_ruleset(&self, ruleset: &css::Ruleset) -> Vec<String> {
        ruleset
            .rules()
            .iter()
            .flat_map(|rule| self.inspect_rule(rule))
            .collect()
    }

    /// Issues for one rule. The first violation ends the inspection of the
    /// rule; nested rulesets are walked only when the rule itself is clean.
    fn inspect_rule(&self, rule: &css::Rule) -> Vec<String> {
        if let Some(at_keyword) = &rule.at_keyword {
            if !list_contains(&at_keyword.text, &self.policy.allowed_css_at_keywords) {
                return vec![format!("at-keyword '{}' is not allowed", at_keyword.text)];
            }
        }
        for selector in &rule.selectors {
            if let Some(issue) = self.inspect_value(selector) {
                return vec![issue];
            }
        }
        for declaration in &rule.declarations {
            if !list_contains(&declaration.property, &self.policy.allowed_css_properties) {
                return vec![format!(
                    "style property '{}' is not allowed",
                    declaration.property
                )];
            }
            if let Some(issue) = self.inspect_value(&declaration.value) {
                return vec![issue];
            }
        }
        self.inspect_ruleset(&rule.embedded)
    }

    /// First issue inside a selector or declaration value: a URI token that
    /// fails the URL checks, or a call to a function outside the whitelist.
    fn inspect_value(&self, value: &css::Value) -> Option<String> {
        for token in value.tokens() {
            match token.kind {
                TokenKind::Uri => {
                    if let Some(issue) = check_url(
                        uri_contents(&token.text),
                        &self.policy.allowed_url_schemes,
                        self.policy.allow_absolute_urls_in_css,
                        false,
                        None,
                    ) {
                        return Some(format!("{}: {issue}", token.text));
                    }
                }
                TokenKind::Function => {
                    let name = token.text.trim_end_matches('(');
                    if !list_contains(name, &self.policy.allowed_css_functions) {
                        return Some(format!("call to function '{name}' is not allowed"));
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Issues for one attribute, matched against the tag's pattern list.
    fn inspect_attribute(
        &self,
        tag: &str,
        patterns: &[String],
        attributes: &[(String, String)],
        key: &str,
        value: &str,
    ) -> Vec<String> {
        // a value shaped like `knownname=…` smells like tag-splitting
        if let Some((lhs, _)) = value.split_once('=') {
            if vocab::is_known_name(&lhs.to_ascii_lowercase()) {
                return vec![format!("value looks like a smuggled '{lhs}' attribute")];
            }
        }

        for pattern in patterns {
            match pattern.split_once('=') {
                None => {
                    if key == "style" && (pattern == "style" || pattern == "*" || pattern == "**")
                    {
                        return match self.inspect_inline_css(value) {
                            Ok(issues) => issues,
                            Err(err) => {
                                vec![format!("inline style cannot be parsed: {err}")]
                            }
                        };
                    }
                    if key == pattern {
                        return self.require_name_list(value);
                    }
                    if key.starts_with("on") || key.starts_with("data") {
                        continue;
                    }
                    if pattern == "*" {
                        return self.require_name_list(value);
                    }
                    if pattern == "**" {
                        return Vec::new();
                    }
                }
                Some((name, shape)) => {
                    if key != name {
                        continue;
                    }
                    match shape {
                        "**" => return Vec::new(),
                        "*" => return self.require_name_list(value),
                        "_MIME" => {
                            if allowlist::is_mime_like(value) {
                                return Vec::new();
                            }
                            return vec!["value is not a MIME type".to_string()];
                        }
                        "__URL" | "__URL_?" => {
                            return self.require_url(value, attributes, true, shape.ends_with("_?"))
                        }
                        "__REL_URL" | "__REL_URL_?" => {
                            return self.require_url(value, attributes, false, shape.ends_with("_?"))
                        }
                        literal if literal == value => return Vec::new(),
                        _ => {}
                    }
                }
            }
        }
        vec![format!("attribute is not allowed in '{tag}'")]
    }

    fn require_name_list(&self, value: &str) -> Vec<String> {
        if allowlist::is_name_list(value) {
            return Vec::new();
        }
        vec!["value is not a list of space-separated names".to_string()]
    }

    fn require_url(
        &self,
        value: &str,
        attributes: &[(String, String)],
        allow_absolute: bool,
        allow_query: bool,
    ) -> Vec<String> {
        let mut link = LinkContext::default();
        for (key, attr_value) in attributes {
            match key.as_str() {
                "rel" => link.rel = attr_value,
                "target" => link.target = attr_value,
                _ => {}
            }
        }
        match check_url(
            value,
            &self.policy.allowed_url_schemes,
            allow_absolute,
            allow_query,
            Some(link),
        ) {
            Some(issue) => vec![issue],
            None => Vec::new(),
        }
    }

    fn inspect_inline_css(&self, css_text: &str) -> Result<Vec<String>, css::CssError> {
        let ruleset = css::parse_inline(css_text)?;
        Ok(self.inspect_ruleset(&ruleset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_style() -> Scanner {
        Scanner::new(ScanPolicy::with_style(&[]))
    }

    #[test]
    fn clean_fragment_has_no_issues() {
        let issues = with_style()
            .scan("<p class=\"lead\">Hello <em>world</em></p>")
            .unwrap();
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn unknown_and_banned_tags_are_told_apart() {
        let scanner = with_style();
        let unknown = scanner.scan("<foobar>x</foobar>").unwrap();
        assert!(unknown[0].contains("unknown"), "{unknown:?}");
        let banned = scanner.scan("<iframe src=\"x\"></iframe>").unwrap();
        assert!(banned[0].contains("not allowed"), "{banned:?}");
    }

    #[test]
    fn wildcards_never_admit_handlers_or_data_attributes() {
        let scanner = Scanner::new(ScanPolicy::permissive());
        let issues = scanner
            .scan("<p onclick=\"alert(42)\" data-payload=\"x\">ok</p>")
            .unwrap();
        assert_eq!(issues.len(), 2, "{issues:?}");
    }

    #[test]
    fn style_attribute_is_inspected_not_matched() {
        let scanner = with_style();
        assert!(scanner.scan("<div style=\"color:green\">x</div>").unwrap().is_empty());
        let issues = scanner
            .scan("<div style=\"behavior:url(#default#time2)\">x</div>")
            .unwrap();
        assert_eq!(issues.len(), 1, "{issues:?}");
    }

    #[test]
    fn attribute_splitting_is_flagged() {
        let issues = with_style()
            .scan("<img alt=\"src=http://evil.example/x\" src=\"a.gif\"/>")
            .unwrap();
        assert_eq!(issues.len(), 1, "{issues:?}");
        assert!(issues[0].contains("smuggled"), "{issues:?}");
    }

    #[test]
    fn css_grammar_error_is_fatal_for_stylesheets_only() {
        let scanner = with_style();
        assert!(matches!(
            scanner.scan_css("p,,span { color: red }"),
            Err(ScanError::Css(_))
        ));
        // the same text embedded in markup is an issue, not an error
        let issues = scanner
            .scan("<style type=\"text/css\">p,,span { color: red }</style>")
            .unwrap();
        assert_eq!(issues.len(), 1, "{issues:?}");
        assert!(issues[0].contains("cannot be parsed"), "{issues:?}");
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let scanner = with_style();
        assert!(matches!(
            scanner.scan_reader(&b"<p>\xff\xfe</p>"[..]),
            Err(ScanError::Encoding(_))
        ));
        assert!(scanner.scan_reader(&b"<p>ok</p>"[..]).unwrap().is_empty());
    }
}
