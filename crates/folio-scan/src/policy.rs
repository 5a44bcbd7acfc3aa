//! Scan policies: declarative whitelists of what content may contain.
//!
//! A policy is a plain value; the preset constructors compose the base tag
//! table with caller-supplied global attribute patterns. Globals are
//! appended after the tag-specific patterns so catch-alls evaluate last.

use std::collections::HashMap;

/// What a [`crate::Scanner`] lets through.
///
/// `allowed_tags` maps a lowercased element name to its attribute patterns
/// (see the pattern language in [`crate::Scanner`]); a missing entry means
/// the element is banned outright. The CSS lists drive `list_contains`
/// matching, so `*` and `!name` entries work there too.
#[derive(Debug, Clone, Default)]
pub struct ScanPolicy {
    pub allowed_tags: HashMap<String, Vec<String>>,
    pub allowed_url_schemes: Vec<String>,
    pub allow_absolute_urls_in_css: bool,
    pub allowed_css_properties: Vec<String>,
    pub allowed_css_functions: Vec<String>,
    pub allowed_css_at_keywords: Vec<String>,
}

fn patterns(specific: &[&str], globals: &[String]) -> Vec<String> {
    specific
        .iter()
        .map(|s| s.to_string())
        .chain(globals.iter().cloned())
        .collect()
}

impl ScanPolicy {
    /// Structural and text-level tags only: enough for cleanly marked-up
    /// prose, with no styling and no external anything beyond plain links
    /// and images.
    pub fn minimal(global_attrs: &[&str]) -> Self {
        let globals: Vec<String> = global_attrs.iter().map(|s| s.to_string()).collect();
        let mut tags: HashMap<String, Vec<String>> = HashMap::new();

        for tag in [
            "b", "big", "body", "br", "caption", "cite", "dd", "dfn", "div", "em", "figure",
            "h1", "h2", "h3", "h4", "h5", "h6", "hr", "i", "li", "ol", "p", "s", "section",
            "small", "span", "strong", "sub", "sup", "tbody", "tfoot", "thead", "title",
            "tr", "u", "ul",
        ] {
            tags.insert(tag.to_string(), globals.clone());
        }
        for tag in ["blockquote", "del", "ins", "q"] {
            tags.insert(tag.to_string(), patterns(&["cite=__URL"], &globals));
        }
        for tag in ["col", "colgroup"] {
            tags.insert(tag.to_string(), patterns(&["span"], &globals));
        }
        tags.insert("a".to_string(), patterns(&["href=__URL"], &globals));
        // head carries no attributes at all, globals included
        tags.insert("head".to_string(), Vec::new());
        tags.insert(
            "html".to_string(),
            patterns(&["xml:lang", "xmlns=__URL"], &globals),
        );
        tags.insert(
            "img".to_string(),
            patterns(&["height", "width", "src=__URL", "alt=*"], &globals),
        );
        tags.insert(
            "link".to_string(),
            patterns(&["href=__URL", "type=_MIME", "rel"], &globals),
        );
        tags.insert(
            "meta".to_string(),
            patterns(
                &["http-equiv=content-type", "charset", "name", "content=**"],
                &globals,
            ),
        );
        tags.insert("table".to_string(), patterns(&["summary=**"], &globals));
        tags.insert("td".to_string(), patterns(&["colspan", "rowspan"], &globals));
        tags.insert(
            "th".to_string(),
            patterns(&["abbr", "colspan", "rowspan"], &globals),
        );

        Self {
            allowed_tags: tags,
            allowed_url_schemes: vec!["http".to_string(), "https".to_string()],
            allow_absolute_urls_in_css: false,
            allowed_css_properties: Vec::new(),
            allowed_css_functions: Vec::new(),
            allowed_css_at_keywords: Vec::new(),
        }
    }

    /// [`ScanPolicy::minimal`] plus class/style attributes everywhere, the
    /// `<style>` element, and the conventional typographic CSS properties.
    pub fn with_style(global_attrs: &[&str]) -> Self {
        let mut globals = global_attrs.to_vec();
        globals.extend(["class", "style"]);

        let mut policy = Self::minimal(&globals);
        policy
            .allowed_tags
            .insert("style".to_string(), vec!["type=text/css".to_string()]);
        policy.allowed_css_properties = [
            "background",
            "background-color",
            "border",
            "border-bottom",
            "border-collapse",
            "border-color",
            "border-radius",
            "border-style",
            "border-width",
            "clear",
            "color",
            "cursor",
            "direction",
            "display",
            "flex",
            "float",
            "font",
            "font-family",
            "font-size",
            "font-style",
            "font-variant",
            "font-weight",
            "grid",
            "height",
            "left",
            "letter-spacing",
            "line-height",
            "list-style",
            "margin",
            "margin-bottom",
            "margin-left",
            "margin-right",
            "margin-top",
            "max-height",
            "max-width",
            "min-height",
            "min-width",
            "overflow",
            "overflow-x",
            "overflow-y",
            "padding",
            "padding-bottom",
            "padding-left",
            "padding-right",
            "padding-top",
            "page-break-after",
            "page-break-before",
            "position",
            "right",
            "src",
            "table-layout",
            "text-align",
            "text-decoration",
            "text-indent",
            "top",
            "vertical-align",
            "visibility",
            "white-space",
            "width",
            "word-spacing",
            "z-index",
            "zoom",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        policy
    }

    /// Anything-goes baseline for trusted-ish sources: every known tag
    /// attribute is admitted through catch-alls, style is unrestricted
    /// except for `@import`, and only the URL and event-handler guards
    /// remain.
    pub fn permissive() -> Self {
        let mut policy = Self::minimal(&["title=**", "*"]);
        policy
            .allowed_tags
            .insert("style".to_string(), vec!["type=text/css".to_string()]);
        // the catch-all would admit any http-equiv, so meta stays pinned;
        // literal patterns are case-sensitive, hence the two spellings
        policy.allowed_tags.insert(
            "meta".to_string(),
            [
                "http-equiv=content-type",
                "http-equiv=Content-Type",
                "charset",
                "name",
                "content=**",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        );
        policy.allowed_css_properties = vec!["*".to_string()];
        policy.allowed_css_at_keywords = vec!["!@import".to_string(), "*".to_string()];
        policy
    }
}
