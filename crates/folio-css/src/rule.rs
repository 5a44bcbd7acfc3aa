//! Rule model and serialization.

use std::fmt;

use crate::tokenizer::Token;
use crate::value::{Declaration, Value};

/// One indentation step of the serialized form.
const TAB: &str = "    ";

/// Grammar class of a recognized at-rule.
///
/// Every supported at-keyword falls into exactly one class; the class alone
/// decides which production parses the rest of the rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtRuleClass {
    /// `@media`-like: prelude, then `{` containing a whole nested ruleset `}`.
    NestedRuleset,
    /// `@font-face`-like: optional prelude, then one declaration block.
    DeclarationBlock,
    /// `@import`-like: prelude terminated by `;`, no block at all.
    SelectorOnly,
}

impl AtRuleClass {
    /// Look up the class for an at-keyword. The leading `@` may be present
    /// or not; matching is ASCII case-insensitive. Unrecognized keywords get
    /// `None` and are rejected by the parser.
    pub fn classify(at_keyword: &str) -> Option<Self> {
        let name = at_keyword.strip_prefix('@').unwrap_or(at_keyword);
        match name.to_ascii_lowercase().as_str() {
            "media" | "supports" | "document" | "keyframes" | "font-feature-values" => {
                Some(Self::NestedRuleset)
            }
            "page" | "font-face" | "viewport" | "counter-style" | "property"
            | "color-profile" | "swash" | "annotation" | "ornaments" | "stylistic"
            | "styleset" | "character-variant" => Some(Self::DeclarationBlock),
            "charset" | "import" | "namespace" => Some(Self::SelectorOnly),
            _ => None,
        }
    }
}

/// A qualified rule or an at-rule.
///
/// Qualified rules leave `at_keyword` unset and use `selectors` plus
/// `declarations`. At-rules fill the fields their grammar class calls for;
/// `embedded` is only ever non-empty for `NestedRuleset` rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rule {
    pub at_keyword: Option<Token>,
    pub selectors: Vec<Value>,
    pub declarations: Vec<Declaration>,
    pub embedded: Ruleset,
}

impl Rule {
    pub fn class(&self) -> Option<AtRuleClass> {
        self.at_keyword
            .as_ref()
            .and_then(|token| AtRuleClass::classify(&token.text))
    }

    fn fmt_selectors(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, selector) in self.selectors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{selector}")?;
        }
        Ok(())
    }

    fn fmt_declaration_block(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.declarations.is_empty() {
            return Ok(());
        }
        f.write_str(" {")?;
        for declaration in &self.declarations {
            write!(f, "\n{TAB}{declaration};")?;
        }
        f.write_str("\n}")
    }

    fn fmt_embedded_block(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.embedded.rules().is_empty() {
            return Ok(());
        }
        let nested = self.embedded.to_string().replace('\n', &format!("\n{TAB}"));
        write!(f, " {{\n{TAB}{nested}\n}}")
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(at_keyword) = &self.at_keyword else {
            self.fmt_selectors(f)?;
            return self.fmt_declaration_block(f);
        };

        f.write_str(&at_keyword.text)?;
        if !self.selectors.is_empty() {
            f.write_str(" ")?;
            self.fmt_selectors(f)?;
        }
        match self.class() {
            Some(AtRuleClass::NestedRuleset) => self.fmt_embedded_block(f),
            Some(AtRuleClass::DeclarationBlock) => self.fmt_declaration_block(f),
            Some(AtRuleClass::SelectorOnly) | None => Ok(()),
        }
    }
}

/// An ordered list of rules: a whole style sheet or the contents of a
/// nested at-rule block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ruleset(pub Vec<Rule>);

impl Ruleset {
    pub fn rules(&self) -> &[Rule] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Ruleset {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Ruleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{rule}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::{TokenKind, Tokenizer};
    use pretty_assertions::assert_eq;

    fn value_of(input: &str) -> Value {
        let mut tokenizer = Tokenizer::new(input);
        let mut value = Value::new();
        loop {
            let token = tokenizer.next_token();
            if token.kind == TokenKind::Eof {
                return value;
            }
            value.append(token);
        }
    }

    fn declaration(property: &str, value: &str) -> Declaration {
        let mut declaration = Declaration::new(property);
        declaration.value = value_of(value);
        declaration
    }

    fn at(keyword: &str) -> Option<Token> {
        Some(Token::new(TokenKind::AtKeyword, keyword))
    }

    #[test]
    fn classify_strips_at_and_ignores_case() {
        assert_eq!(AtRuleClass::classify("@MEDIA"), Some(AtRuleClass::NestedRuleset));
        assert_eq!(AtRuleClass::classify("font-face"), Some(AtRuleClass::DeclarationBlock));
        assert_eq!(AtRuleClass::classify("@import"), Some(AtRuleClass::SelectorOnly));
        assert_eq!(AtRuleClass::classify("@bogus"), None);
    }

    #[test]
    fn formats_a_qualified_rule() {
        let rule = Rule {
            selectors: vec![value_of("h1"), value_of("h2")],
            declarations: vec![declaration("color", "red")],
            ..Default::default()
        };
        assert_eq!(rule.to_string(), "h1, h2 {\n    color: red;\n}");
    }

    #[test]
    fn formats_a_declaration_block_at_rule() {
        let rule = Rule {
            at_keyword: at("@font-face"),
            declarations: vec![
                declaration("font-family", "MyHelvetica"),
                declaration(
                    "src",
                    "local(\"Helvetica Neue Bold\"), url(MgOpenModernaBold.ttf)",
                ),
                declaration("font-weight", "bold"),
            ],
            ..Default::default()
        };
        assert_eq!(
            rule.to_string(),
            "@font-face {\n    font-family: MyHelvetica;\n    src: local(\"Helvetica Neue Bold\"), url(MgOpenModernaBold.ttf);\n    font-weight: bold;\n}"
        );
    }

    #[test]
    fn formats_a_nested_at_rule_with_reindentation() {
        let rule = Rule {
            at_keyword: at("@keyframes"),
            selectors: vec![value_of("identifier")],
            embedded: Ruleset(vec![
                Rule {
                    selectors: vec![value_of("0%")],
                    declarations: vec![declaration("top", "0"), declaration("left", "0")],
                    ..Default::default()
                },
                Rule {
                    selectors: vec![value_of("100%")],
                    declarations: vec![declaration("top", "100px"), declaration("left", "100%")],
                    ..Default::default()
                },
            ]),
            ..Default::default()
        };
        assert_eq!(
            rule.to_string(),
            "@keyframes identifier {\n    0% {\n        top: 0;\n        left: 0;\n    }\n    100% {\n        top: 100px;\n        left: 100%;\n    }\n}"
        );
    }

    #[test]
    fn formats_a_selector_only_at_rule() {
        let rule = Rule {
            at_keyword: at("@charset"),
            selectors: vec![value_of("\"UTF-8\"")],
            ..Default::default()
        };
        assert_eq!(rule.to_string(), "@charset \"UTF-8\"");
    }

    #[test]
    fn selectorless_rule_with_no_declarations_formats_empty() {
        assert_eq!(Rule::default().to_string(), "");
    }
}
