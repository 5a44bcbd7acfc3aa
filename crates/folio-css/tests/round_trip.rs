//! Parse-then-serialize round trips over realistic style sheets.

use folio_css::{parse, AtRuleClass};
use pretty_assertions::assert_eq;

#[test]
fn stylesheet_round_trips_through_its_model() {
    let css = "\
body, .chapter {
    margin: 0 auto;
    font-family: \"Gentium Book\", serif;
}
@media screen, print {
    body {
        line-height: 1.2;
    }
}
@font-face {
    font-family: MyHelvetica;
    src: local(\"Helvetica Neue Bold\"), url(MgOpenModernaBold.ttf);
    font-weight: bold;
}
@keyframes slide {
    0% {
        left: 0;
    }
    100% {
        left: 100%;
    }
}";

    let first = parse(css).unwrap();
    let serialized = first.to_string();
    let second = parse(&serialized).unwrap();

    assert_eq!(second, first);
    assert_eq!(second.to_string(), serialized);
}

#[test]
fn nested_at_rules_keep_their_structure() {
    let css = "@supports (animation-name: test) { @keyframes slide { 0% { top: 0 } } }";
    let ruleset = parse(css).unwrap();

    let supports = &ruleset.rules()[0];
    assert_eq!(supports.class(), Some(AtRuleClass::NestedRuleset));

    let keyframes = &supports.embedded.rules()[0];
    assert_eq!(keyframes.class(), Some(AtRuleClass::NestedRuleset));
    assert_eq!(keyframes.selectors[0].to_string(), "slide");

    let frame = &keyframes.embedded.rules()[0];
    assert_eq!(frame.selectors[0].to_string(), "0%");
    assert_eq!(frame.declarations[0].to_string(), "top: 0");
}

#[test]
fn comment_noise_disappears_from_the_model() {
    let css = "/* header */ h1 /* trailing */ { color: /* inline */ red }";
    let ruleset = parse(css).unwrap();
    assert_eq!(ruleset.to_string(), "h1 {\n    color: red;\n}");
}
