//! Static vocabulary of standard HTML element and attribute names.
//!
//! The scanner uses the element table to tell "unknown tag" (probable
//! obfuscation) apart from "known but not allowed", and the combined table
//! to spot attribute values that themselves look like smuggled attributes.

use std::collections::HashSet;

use lazy_static::lazy_static;

lazy_static! {
    static ref KNOWN_TAGS: HashSet<&'static str> = [
        "a", "abbr", "address", "area", "article", "aside", "audio", "b", "base", "bdi",
        "bdo", "big", "blockquote", "body", "br", "button", "canvas", "caption", "center",
        "cite", "code", "col", "colgroup", "data", "datalist", "dd", "del", "details",
        "dfn", "dialog", "div", "dl", "dt", "em", "embed", "fieldset", "figcaption",
        "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
        "h6", "head", "header", "hgroup", "hr", "html", "i", "iframe", "img", "input",
        "ins", "kbd", "label", "legend", "li", "link", "main", "map", "mark", "marquee",
        "menu", "meta", "meter", "nav", "noscript", "object", "ol", "optgroup", "option",
        "output", "p", "param", "picture", "pre", "progress", "q", "rp", "rt", "ruby",
        "s", "samp", "script", "section", "select", "slot", "small", "source", "span",
        "strike", "strong", "style", "sub", "summary", "sup", "svg", "table", "tbody",
        "td", "template", "textarea", "tfoot", "th", "thead", "time", "title", "tr",
        "track", "tt", "u", "ul", "var", "video", "wbr",
    ]
    .into_iter()
    .collect();
    static ref KNOWN_ATTRIBUTES: HashSet<&'static str> = [
        "accept", "accept-charset", "action", "align", "alt", "archive", "autocomplete",
        "autofocus", "autoplay", "axis", "background", "bgcolor", "border", "cellpadding",
        "cellspacing", "charset", "checked", "cite", "class", "color", "cols", "colspan",
        "content", "contenteditable", "controls", "coords", "datetime", "default",
        "defer", "dir", "disabled", "download", "draggable", "enctype", "face", "for",
        "formaction", "headers", "height", "hidden", "high", "href", "hreflang",
        "http-equiv", "id", "ismap", "kind", "lang", "list", "loop", "low", "manifest",
        "max", "maxlength", "media", "method", "min", "minlength", "multiple", "muted",
        "name", "novalidate", "onblur", "onchange", "onclick", "onerror", "onfocus",
        "oninput", "onload", "onmouseout", "onmouseover", "onsubmit", "open", "optimum",
        "pattern", "ping", "placeholder", "poster", "preload", "readonly", "rel",
        "required", "rev", "reversed", "rows", "rowspan", "sandbox", "scope", "scrolling",
        "selected", "shape", "size", "sizes", "span", "spellcheck", "src", "srcdoc",
        "srclang", "srcset", "start", "step", "style", "summary", "tabindex", "target",
        "title", "translate", "type", "usemap", "value", "width", "wrap", "xml:lang",
        "xmlns",
    ]
    .into_iter()
    .collect();
}

pub fn is_known_tag(name: &str) -> bool {
    KNOWN_TAGS.contains(name)
}

/// Is `name` a standard element or attribute name?
pub fn is_known_name(name: &str) -> bool {
    KNOWN_TAGS.contains(name) || KNOWN_ATTRIBUTES.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinguishes_tags_from_noise() {
        assert!(is_known_tag("script"));
        assert!(is_known_tag("blockquote"));
        assert!(!is_known_tag("blink"));
        assert!(!is_known_tag("foobar"));
    }

    #[test]
    fn names_cover_attributes_too() {
        assert!(is_known_name("onclick"));
        assert!(is_known_name("src"));
        assert!(is_known_name("table"));
        assert!(!is_known_name("payload"));
    }
}
