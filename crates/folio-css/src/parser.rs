//! Recursive-descent CSS parser.
//!
//! The parser holds exactly one token of lookahead. Every production leaves
//! the cursor on the first token after what it consumed; only the ruleset
//! loop advances the cursor itself, and only for tokens it skips.

use std::mem;

use crate::error::CssError;
use crate::rule::{AtRuleClass, Rule, Ruleset};
use crate::tokenizer::{Token, TokenKind, Tokenizer};
use crate::value::{Declaration, Value};

/// Hard cap on at-rule block nesting. Style sheets this deep are not
/// plausible content; refusing them bounds recursion on hostile input.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Parse a whole style sheet. Content left over after the outermost ruleset
/// is an error.
pub fn parse(css: &str) -> Result<Ruleset, CssError> {
    Parser::new(css).run()
}

/// Parse the contents of an inline `style="…"` attribute by wrapping the
/// fragment in braces, so it goes through the same declaration grammar as a
/// full rule body.
pub fn parse_inline(css: &str) -> Result<Ruleset, CssError> {
    Parser::new(&format!("{{{css}}}")).run()
}

struct Parser {
    tokenizer: Tokenizer,
    token: Token,
    depth: usize,
}

impl Parser {
    fn new(css: &str) -> Self {
        let mut tokenizer = Tokenizer::new(css);
        let token = tokenizer.next_token();
        Self {
            tokenizer,
            token,
            depth: 0,
        }
    }

    fn run(mut self) -> Result<Ruleset, CssError> {
        let ruleset = self.parse_ruleset()?;
        if self.token.kind != TokenKind::Eof {
            return Err(CssError::TrailingContent(self.token.text.clone()));
        }
        Ok(ruleset)
    }

    fn advance(&mut self) {
        self.token = self.tokenizer.next_token();
    }

    fn is_delim(&self, text: &str) -> bool {
        self.token.kind == TokenKind::Delim && self.token.text == text
    }

    fn expect_delim(&mut self, text: &str, context: &'static str) -> Result<(), CssError> {
        if self.token.kind == TokenKind::Eof {
            return Err(CssError::UnexpectedEnd(context));
        }
        if !self.is_delim(text) {
            return Err(CssError::UnexpectedToken {
                token: self.token.text.clone(),
                context,
            });
        }
        self.advance();
        Ok(())
    }

    /// ruleset := ( qualified-rule | at-rule )*
    ///
    /// Returns on end of input or on a `}` (left for the caller), so the
    /// same production serves the top level and nested at-rule blocks.
    fn parse_ruleset(&mut self) -> Result<Ruleset, CssError> {
        let mut rules = Vec::new();
        loop {
            match self.token.kind {
                TokenKind::Error => {
                    return Err(CssError::Tokenize(self.token.text.clone()));
                }
                TokenKind::Eof => return Ok(Ruleset(rules)),
                TokenKind::Whitespace
                | TokenKind::Comment
                | TokenKind::Cdo
                | TokenKind::Cdc => self.advance(),
                TokenKind::AtKeyword => rules.push(self.parse_at_rule()?),
                TokenKind::Delim if self.token.text == "}" => return Ok(Ruleset(rules)),
                _ => rules.push(self.parse_qualified_rule()?),
            }
        }
    }

    /// at-rule := ATKEYWORD, then whatever its grammar class dictates.
    fn parse_at_rule(&mut self) -> Result<Rule, CssError> {
        let at_keyword = self.token.clone();
        let class = AtRuleClass::classify(&at_keyword.text)
            .ok_or_else(|| CssError::UnknownAtKeyword(at_keyword.text.clone()))?;
        self.advance();

        match class {
            AtRuleClass::NestedRuleset => {
                let selectors = self.parse_selector_list("an at-rule prelude")?;
                self.expect_delim("{", "where an at-rule block should open")?;
                self.depth += 1;
                if self.depth > MAX_NESTING_DEPTH {
                    return Err(CssError::TooDeeplyNested);
                }
                let embedded = self.parse_ruleset()?;
                self.depth -= 1;
                self.expect_delim("}", "where an at-rule block should close")?;
                Ok(Rule {
                    at_keyword: Some(at_keyword),
                    selectors,
                    embedded,
                    ..Default::default()
                })
            }
            AtRuleClass::DeclarationBlock => {
                let rule = self.parse_qualified_rule()?;
                Ok(Rule {
                    at_keyword: Some(at_keyword),
                    ..rule
                })
            }
            AtRuleClass::SelectorOnly => {
                let selectors = self.parse_selector_list("an at-rule prelude")?;
                self.expect_delim(";", "where the at-rule should end")?;
                Ok(Rule {
                    at_keyword: Some(at_keyword),
                    selectors,
                    ..Default::default()
                })
            }
        }
    }

    /// qualified-rule := selector-list declaration-block
    fn parse_qualified_rule(&mut self) -> Result<Rule, CssError> {
        let selectors = self.parse_selector_list("a selector list")?;
        let declarations = self.parse_declaration_block()?;
        Ok(Rule {
            selectors,
            declarations,
            ..Default::default()
        })
    }

    /// selector-list := value ( ',' value )*
    ///
    /// Stops on `{` or `;` without consuming it. Each selector is scrubbed;
    /// a selector that scrubs to nothing between commas is an error, while
    /// an empty list as a whole is fine (`@font-face`, inline fragments).
    fn parse_selector_list(&mut self, context: &'static str) -> Result<Vec<Value>, CssError> {
        let mut selectors = Vec::new();
        let mut selector = Value::new();
        loop {
            match self.token.kind {
                TokenKind::Error => {
                    return Err(CssError::Tokenize(self.token.text.clone()));
                }
                TokenKind::Eof => return Err(CssError::UnexpectedEnd(context)),
                TokenKind::Delim if self.token.text == "{" || self.token.text == ";" => {
                    let selector = mem::take(&mut selector).scrub();
                    if !selector.is_empty() {
                        selectors.push(selector);
                    }
                    return Ok(selectors);
                }
                TokenKind::Delim if self.token.text == "," => {
                    let selector = mem::take(&mut selector).scrub();
                    if selector.is_empty() {
                        return Err(CssError::EmptySelector);
                    }
                    selectors.push(selector);
                    self.advance();
                }
                _ => {
                    selector.append(self.token.clone());
                    self.advance();
                }
            }
        }
    }

    /// declaration-block := '{' ( declaration ';' )* declaration? '}'
    ///
    /// Consumes the closing `}`.
    fn parse_declaration_block(&mut self) -> Result<Vec<Declaration>, CssError> {
        self.expect_delim("{", "where a declaration block should open")?;

        let mut declarations = Vec::new();
        let mut current: Option<Declaration> = None;
        let mut value_open = false;

        loop {
            match self.token.kind {
                TokenKind::Error => {
                    return Err(CssError::Tokenize(self.token.text.clone()));
                }
                TokenKind::Eof => {
                    return Err(CssError::UnexpectedEnd("a declaration block"));
                }
                TokenKind::Whitespace | TokenKind::Comment => {
                    if value_open {
                        if let Some(declaration) = &mut current {
                            declaration.append_to_value(self.token.clone())?;
                        }
                    }
                    self.advance();
                }
                TokenKind::Ident if current.is_none() => {
                    current = Some(Declaration::new(self.token.text.clone()));
                    self.advance();
                }
                TokenKind::Delim if self.token.text == ":" => {
                    match &mut current {
                        Some(declaration) => {
                            // a second colon restarts the value
                            declaration.value = Value::new();
                            value_open = true;
                        }
                        None => {
                            return Err(CssError::UnexpectedToken {
                                token: self.token.text.clone(),
                                context: "without a property name",
                            });
                        }
                    }
                    self.advance();
                }
                TokenKind::Delim if self.token.text == ";" => {
                    let declaration = self.finish_declaration(&mut current, value_open)?;
                    declarations.push(declaration);
                    value_open = false;
                    self.advance();
                }
                TokenKind::Delim if self.token.text == "}" => {
                    if current.is_some() {
                        let declaration = self.finish_declaration(&mut current, value_open)?;
                        declarations.push(declaration);
                    }
                    self.advance();
                    return Ok(declarations);
                }
                TokenKind::Delim if self.token.text == "{" => {
                    return Err(CssError::UnexpectedToken {
                        token: self.token.text.clone(),
                        context: "inside a declaration block",
                    });
                }
                TokenKind::AtKeyword | TokenKind::Cdo | TokenKind::Cdc => {
                    return Err(CssError::UnexpectedToken {
                        token: self.token.text.clone(),
                        context: "inside a declaration block",
                    });
                }
                _ => {
                    match &mut current {
                        Some(declaration) if value_open => {
                            declaration.append_to_value(self.token.clone())?;
                        }
                        _ => {
                            return Err(CssError::UnexpectedToken {
                                token: self.token.text.clone(),
                                context: "outside of a declaration value",
                            });
                        }
                    }
                    self.advance();
                }
            }
        }
    }

    fn finish_declaration(
        &self,
        current: &mut Option<Declaration>,
        value_open: bool,
    ) -> Result<Declaration, CssError> {
        let Some(mut declaration) = current.take() else {
            return Err(CssError::UnexpectedToken {
                token: self.token.text.clone(),
                context: "without a declaration",
            });
        };
        if !value_open {
            return Err(CssError::UnexpectedToken {
                token: self.token.text.clone(),
                context: "before the declaration value",
            });
        }
        declaration.value = mem::take(&mut declaration.value).scrub();
        if declaration.value.is_empty() {
            return Err(CssError::EmptyValue(declaration.property));
        }
        Ok(declaration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn selectors_of(rule: &Rule) -> Vec<String> {
        rule.selectors.iter().map(ToString::to_string).collect()
    }

    fn declarations_of(rule: &Rule) -> Vec<String> {
        rule.declarations.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn parses_a_qualified_rule() {
        let ruleset = parse("h1, h2.title { color: red; margin: 0 auto }").unwrap();
        assert_eq!(ruleset.rules().len(), 1);
        let rule = &ruleset.rules()[0];
        assert_eq!(selectors_of(rule), vec!["h1", "h2.title"]);
        assert_eq!(declarations_of(rule), vec!["color: red", "margin: 0 auto"]);
    }

    #[test]
    fn parses_consecutive_rules() {
        let ruleset = parse("p { color: red }\nq { color: blue }").unwrap();
        assert_eq!(ruleset.rules().len(), 2);
    }

    #[test]
    fn empty_selector_between_commas_fails() {
        assert_eq!(parse("p,,span { color: red }"), Err(CssError::EmptySelector));
    }

    #[test]
    fn empty_declaration_value_fails() {
        assert_eq!(
            parse("p { color: }"),
            Err(CssError::EmptyValue("color".to_string()))
        );
    }

    #[test]
    fn declarations_survive_comment_noise() {
        let ruleset = parse("p { /*a*/ color /*b*/ : /*c*/ red /*d*/ ; }").unwrap();
        assert_eq!(declarations_of(&ruleset.rules()[0]), vec!["color: red"]);
    }

    #[test]
    fn important_suffix_survives_trailing_whitespace() {
        let ruleset = parse("p { color: red !important ; }").unwrap();
        let rule = &ruleset.rules()[0];
        assert!(rule.declarations[0].is_important());
        assert_eq!(declarations_of(rule), vec!["color: red !important"]);
    }

    #[test]
    fn value_after_important_fails() {
        assert!(matches!(
            parse("p { color: red !important blue }"),
            Err(CssError::TokenAfterImportant(_))
        ));
    }

    #[test]
    fn unknown_at_keyword_fails() {
        assert_eq!(
            parse("@bogus screen { p { color: red } }"),
            Err(CssError::UnknownAtKeyword("@bogus".to_string()))
        );
    }

    #[test]
    fn nested_block_inside_declarations_fails() {
        assert!(matches!(
            parse("p { span { color: red } }"),
            Err(CssError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn unclosed_block_fails() {
        assert_eq!(
            parse("p { color: red"),
            Err(CssError::UnexpectedEnd("a declaration block"))
        );
    }

    #[test]
    fn stray_closing_brace_is_trailing_content() {
        assert_eq!(
            parse("p { color: red } }"),
            Err(CssError::TrailingContent("}".to_string()))
        );
    }

    #[test]
    fn cdo_cdc_wrappers_are_skipped() {
        let ruleset = parse("<!-- p { color: red } -->").unwrap();
        assert_eq!(ruleset.rules().len(), 1);
    }

    #[test]
    fn parses_inline_fragments() {
        let ruleset = parse_inline("color: green; padding: 0").unwrap();
        let rule = &ruleset.rules()[0];
        assert!(rule.selectors.is_empty());
        assert_eq!(declarations_of(rule), vec!["color: green", "padding: 0"]);
    }

    #[test]
    fn inline_fragment_with_grammar_error_fails() {
        assert!(parse_inline("color:").is_err());
    }

    #[test]
    fn parses_media_at_rule() {
        let ruleset = parse("@media screen, print { body { line-height: 1.2 } }").unwrap();
        let rule = &ruleset.rules()[0];
        assert_eq!(rule.class(), Some(AtRuleClass::NestedRuleset));
        assert_eq!(selectors_of(rule), vec!["screen", "print"]);
        assert_eq!(rule.embedded.rules().len(), 1);
        assert_eq!(selectors_of(&rule.embedded.rules()[0]), vec!["body"]);
    }

    #[test]
    fn parses_font_face_at_rule() {
        let ruleset = parse(
            "@font-face { font-family: MyHelvetica; src: local(\"Helvetica Neue Bold\"), url(MgOpenModernaBold.ttf); }",
        )
        .unwrap();
        let rule = &ruleset.rules()[0];
        assert_eq!(rule.class(), Some(AtRuleClass::DeclarationBlock));
        assert!(rule.selectors.is_empty());
        assert_eq!(rule.declarations.len(), 2);
    }

    #[test]
    fn parses_selector_only_at_rules() {
        let ruleset = parse(
            "@charset \"UTF-8\";\n@import url('landscape.css') screen;\n@namespace svg url(http://www.w3.org/2000/svg);",
        )
        .unwrap();
        assert_eq!(ruleset.rules().len(), 3);
        for rule in ruleset.rules() {
            assert_eq!(rule.class(), Some(AtRuleClass::SelectorOnly));
            assert!(rule.declarations.is_empty());
            assert!(rule.embedded.rules().is_empty());
        }
    }

    #[test]
    fn selector_only_at_rule_without_semicolon_fails() {
        assert!(parse("@charset \"UTF-8\"").is_err());
    }

    #[test]
    fn nesting_past_the_cap_fails() {
        let mut css = String::new();
        for _ in 0..=MAX_NESTING_DEPTH {
            css.push_str("@media screen {");
        }
        css.push_str("p { color: red }");
        for _ in 0..=MAX_NESTING_DEPTH {
            css.push('}');
        }
        assert_eq!(parse(&css), Err(CssError::TooDeeplyNested));
    }

    #[test]
    fn tokenizer_error_propagates() {
        assert!(matches!(
            parse("p { content: 'oops }"),
            Err(CssError::Tokenize(_))
        ));
    }
}
