//! Property values and declarations.

use std::fmt;

use crate::error::CssError;
use crate::tokenizer::{Token, TokenKind, Tokenizer};

/// An ordered run of tokens making up a selector or a declaration value.
///
/// Rendering a value concatenates the literal text of its tokens, so a value
/// round-trips to the exact source characters it was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Value {
    tokens: Vec<Token>,
}

impl Value {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Normalize the value: drop every comment, trim boundary whitespace,
    /// and if a comment was removed re-tokenize the surviving text.
    ///
    /// The re-tokenization is what defeats comment-splitting obfuscation:
    /// `expr/*XSS*/ession(...)` scrubs to a single `expression(` function
    /// token instead of two innocuous fragments. Scrubbing an already
    /// scrubbed value is a no-op.
    pub fn scrub(self) -> Value {
        let mut clean: Vec<Token> = Vec::with_capacity(self.tokens.len());
        let mut dropped_comment = false;
        for token in self.tokens {
            match token.kind {
                TokenKind::Comment => dropped_comment = true,
                TokenKind::Whitespace if clean.is_empty() => {}
                _ => clean.push(token),
            }
        }
        while matches!(clean.last(), Some(t) if t.kind == TokenKind::Whitespace) {
            clean.pop();
        }

        let value = Value { tokens: clean };
        if dropped_comment && !value.is_empty() {
            value.rescan()
        } else {
            value
        }
    }

    fn rescan(&self) -> Value {
        let mut rescanned = Value::new();
        let mut tokenizer = Tokenizer::new(&self.to_string());
        loop {
            let token = tokenizer.next_token();
            if token.kind == TokenKind::Eof {
                return rescanned;
            }
            rescanned.append(token);
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            f.write_str(&token.text)?;
        }
        Ok(())
    }
}

/// Where a declaration stands with respect to a trailing `!important`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ImportantState {
    /// Tokens still flow into the value.
    Collecting,
    /// A `!` arrived and is held back until the next token decides its fate.
    MaybeImportant(Token),
    /// `!important` was recognized; no further semantic token may follow.
    Finalized,
}

/// A single `property: value` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: Value,
    state: ImportantState,
}

impl Declaration {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: Value::new(),
            state: ImportantState::Collecting,
        }
    }

    pub fn is_important(&self) -> bool {
        self.state == ImportantState::Finalized
    }

    /// Route one token into the value, tracking the `!important` suffix.
    ///
    /// `!` is held back: if `important` follows, both are consumed and the
    /// declaration finalizes; otherwise the bang rejoins the value and
    /// collection continues. Once finalized, whitespace and comments are
    /// dropped and any other token is a grammar error.
    pub fn append_to_value(&mut self, token: Token) -> Result<(), CssError> {
        if self.state == ImportantState::Finalized {
            return match token.kind {
                TokenKind::Whitespace | TokenKind::Comment => Ok(()),
                _ => Err(CssError::TokenAfterImportant(token.text)),
            };
        }

        if let ImportantState::MaybeImportant(bang) =
            std::mem::replace(&mut self.state, ImportantState::Collecting)
        {
            if token.kind == TokenKind::Ident && token.text.eq_ignore_ascii_case("important") {
                self.state = ImportantState::Finalized;
                return Ok(());
            }
            self.value.append(bang);
        }

        if token.kind == TokenKind::Delim && token.text == "!" {
            self.state = ImportantState::MaybeImportant(token);
        } else {
            self.value.append(token);
        }
        Ok(())
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.value)?;
        if self.is_important() {
            f.write_str(" !important")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn build_declaration(input: &str) -> Result<Declaration, CssError> {
        let mut declaration = Declaration::new("color");
        for token in value_of(input).tokens() {
            declaration.append_to_value(token.clone())?;
        }
        declaration.value = std::mem::take(&mut declaration.value).scrub();
        Ok(declaration)
    }

    #[test]
    fn scrub_trims_boundary_whitespace() {
        assert_eq!(value_of("  yellow  ").scrub(), value_of("yellow"));
    }

    #[test]
    fn scrub_reassembles_split_function() {
        assert_eq!(
            value_of("expr/*XSS*/ession(alert('XSS'))").scrub(),
            value_of("expression(alert('XSS'))")
        );
    }

    #[test]
    fn scrub_is_idempotent() {
        for input in [
            "  yellow  ",
            "expr/*XSS*/ession(alert('XSS'))",
            "url(/*a*/img.png) /*b*/ no-repeat",
        ] {
            let once = value_of(input).scrub();
            assert_eq!(once.clone().scrub(), once);
        }
    }

    #[test]
    fn scrub_of_only_comments_is_empty() {
        assert!(value_of(" /* one */ /* two */ ").scrub().is_empty());
    }

    #[test]
    fn plain_value_collects() {
        let declaration = build_declaration("blue").unwrap();
        assert_eq!(declaration.value, value_of("blue"));
        assert!(!declaration.is_important());
    }

    #[test]
    fn important_without_bang_is_just_a_word() {
        let declaration = build_declaration("yellow important").unwrap();
        assert_eq!(declaration.value, value_of("yellow important"));
        assert!(!declaration.is_important());
    }

    #[test]
    fn detached_bang_rejoins_the_value() {
        let declaration = build_declaration("green ! important").unwrap();
        assert_eq!(declaration.value, value_of("green ! important"));
        assert!(!declaration.is_important());
    }

    #[test]
    fn bang_important_finalizes() {
        let declaration = build_declaration("red !important").unwrap();
        assert_eq!(declaration.value, value_of("red"));
        assert!(declaration.is_important());
    }

    #[test]
    fn trailing_whitespace_after_important_is_tolerated() {
        let declaration = build_declaration("red !important ").unwrap();
        assert!(declaration.is_important());
    }

    #[test]
    fn semantic_token_after_important_fails() {
        assert!(matches!(
            build_declaration("!important pink"),
            Err(CssError::TokenAfterImportant(_))
        ));
    }

    #[test]
    fn important_is_case_insensitive() {
        let declaration = build_declaration("red !IMPORTANT").unwrap();
        assert!(declaration.is_important());
    }

    #[test]
    fn declaration_displays_with_important_suffix() {
        let declaration = build_declaration("red !important").unwrap();
        assert_eq!(declaration.to_string(), "color: red !important");
    }
}
