//! Flat CSS token scanner.
//!
//! The grammar in [`crate::parser`] is a recursive-descent walk over a flat
//! token stream: block delimiters, whitespace and comments must all surface
//! as ordinary tokens so the parser (and the comment-scrubbing defense in
//! [`crate::value::Value::scrub`]) can see them.

use std::fmt;

/// Kinds of CSS tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier, e.g. `body` or `-moz-border-radius`
    Ident,
    /// At-keyword including the `@`, e.g. `@media`
    AtKeyword,
    /// Quoted string including its quotes
    String,
    /// Hash including the `#`, e.g. `#fff`
    Hash,
    Number,
    Percentage,
    Dimension,
    /// A whole `url(...)` form
    Uri,
    /// Function name including the opening `(`
    Function,
    /// Comment including its `/*` and `*/` delimiters
    Comment,
    Whitespace,
    /// `<!--`
    Cdo,
    /// `-->`
    Cdc,
    /// Any single character with no other role
    Delim,
    /// Malformed input the scanner cannot recover from
    Error,
    /// Returned forever once the input is exhausted
    Eof,
}

/// A single token with its literal matched text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Character-at-a-time scanner producing the flat token stream.
pub struct Tokenizer {
    chars: Vec<char>,
    position: usize,
}

impl Tokenizer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            position: 0,
        }
    }

    /// Produce the next token. After the input is exhausted this returns
    /// `Eof` tokens forever; after an `Error` token the rest of the input is
    /// abandoned.
    pub fn next_token(&mut self) -> Token {
        let Some(c) = self.peek(0) else {
            return Token::new(TokenKind::Eof, "");
        };

        if c.is_whitespace() {
            return Token::new(TokenKind::Whitespace, self.consume_while(char::is_whitespace));
        }
        if self.starts_with("/*") {
            return self.comment();
        }
        if self.starts_with("<!--") {
            self.position += 4;
            return Token::new(TokenKind::Cdo, "<!--");
        }
        if self.starts_with("-->") {
            self.position += 3;
            return Token::new(TokenKind::Cdc, "-->");
        }
        if c == '"' || c == '\'' {
            return self.string(c);
        }
        if c == '#' && matches!(self.peek(1), Some(n) if is_name_char(n)) {
            self.bump();
            let name = self.consume_name();
            return Token::new(TokenKind::Hash, format!("#{name}"));
        }
        if c == '@' && matches!(self.peek(1), Some(n) if is_name_char(n)) {
            self.bump();
            let name = self.consume_name();
            return Token::new(TokenKind::AtKeyword, format!("@{name}"));
        }
        if self.at_number_start() {
            return self.numeric();
        }
        if self.at_ident_start() {
            return self.ident_like();
        }

        self.bump();
        Token::new(TokenKind::Delim, c.to_string())
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn bump(&mut self) -> char {
        let c = self.chars[self.position];
        self.position += 1;
        c
    }

    fn starts_with(&self, pattern: &str) -> bool {
        pattern
            .chars()
            .enumerate()
            .all(|(i, c)| self.peek(i) == Some(c))
    }

    fn consume_while(&mut self, keep: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek(0) {
            if !keep(c) {
                break;
            }
            out.push(self.bump());
        }
        out
    }

    /// Consume a name, honoring backslash escapes.
    fn consume_name(&mut self) -> String {
        let mut name = String::new();
        loop {
            match self.peek(0) {
                Some('\\') => {
                    name.push(self.bump());
                    if self.peek(0).is_some() {
                        name.push(self.bump());
                    }
                }
                Some(c) if is_name_char(c) => {
                    name.push(self.bump());
                }
                _ => break,
            }
        }
        name
    }

    fn at_ident_start(&self) -> bool {
        match self.peek(0) {
            Some('-') => matches!(self.peek(1), Some(c) if is_ident_start(c)),
            Some(c) => is_ident_start(c),
            None => false,
        }
    }

    fn at_number_start(&self) -> bool {
        match self.peek(0) {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => matches!(self.peek(1), Some(c) if c.is_ascii_digit()),
            Some('+') | Some('-') => match self.peek(1) {
                Some(c) if c.is_ascii_digit() => true,
                Some('.') => matches!(self.peek(2), Some(c) if c.is_ascii_digit()),
                _ => false,
            },
            None => false,
            _ => false,
        }
    }

    fn comment(&mut self) -> Token {
        let mut text = String::new();
        text.push(self.bump());
        text.push(self.bump());
        loop {
            if self.peek(0).is_none() {
                return self.error(text);
            }
            if self.starts_with("*/") {
                text.push(self.bump());
                text.push(self.bump());
                return Token::new(TokenKind::Comment, text);
            }
            text.push(self.bump());
        }
    }

    fn string(&mut self, quote: char) -> Token {
        let mut text = String::new();
        text.push(self.bump());
        loop {
            match self.peek(0) {
                None | Some('\n') => return self.error(text),
                Some('\\') => {
                    text.push(self.bump());
                    if self.peek(0).is_some() {
                        text.push(self.bump());
                    }
                }
                Some(c) => {
                    text.push(self.bump());
                    if c == quote {
                        return Token::new(TokenKind::String, text);
                    }
                }
            }
        }
    }

    fn numeric(&mut self) -> Token {
        let mut text = String::new();
        if matches!(self.peek(0), Some('+') | Some('-')) {
            text.push(self.bump());
        }
        text.push_str(&self.consume_while(|c| c.is_ascii_digit()));
        if self.peek(0) == Some('.') && matches!(self.peek(1), Some(c) if c.is_ascii_digit()) {
            text.push(self.bump());
            text.push_str(&self.consume_while(|c| c.is_ascii_digit()));
        }
        if self.peek(0) == Some('%') {
            text.push(self.bump());
            return Token::new(TokenKind::Percentage, text);
        }
        if self.at_ident_start() {
            text.push_str(&self.consume_name());
            return Token::new(TokenKind::Dimension, text);
        }
        Token::new(TokenKind::Number, text)
    }

    fn ident_like(&mut self) -> Token {
        let name = self.consume_name();
        if self.peek(0) == Some('(') {
            if name.eq_ignore_ascii_case("url") {
                return self.uri(name);
            }
            self.bump();
            return Token::new(TokenKind::Function, format!("{name}("));
        }
        Token::new(TokenKind::Ident, name)
    }

    /// Scan the remainder of a `url(...)` form. If the body does not fit the
    /// URI shape the scanner backtracks and hands `url(` back as a plain
    /// function token instead.
    fn uri(&mut self, name: String) -> Token {
        let mut text = name;
        text.push(self.bump());
        let after_paren = self.position;

        text.push_str(&self.consume_while(char::is_whitespace));
        match self.peek(0) {
            Some(q) if q == '"' || q == '\'' => {
                let inner = self.string(q);
                if inner.kind == TokenKind::Error {
                    self.position = after_paren;
                    return Token::new(TokenKind::Function, uri_function_text(&text));
                }
                text.push_str(&inner.text);
            }
            _ => {
                while let Some(c) = self.peek(0) {
                    if c == ')' || c == '(' || c == '"' || c == '\'' || c.is_whitespace() {
                        break;
                    }
                    if c == '\\' {
                        text.push(self.bump());
                        if self.peek(0).is_some() {
                            text.push(self.bump());
                        }
                        continue;
                    }
                    text.push(self.bump());
                }
            }
        }
        text.push_str(&self.consume_while(char::is_whitespace));

        if self.peek(0) == Some(')') {
            text.push(self.bump());
            return Token::new(TokenKind::Uri, text);
        }
        self.position = after_paren;
        Token::new(TokenKind::Function, uri_function_text(&text))
    }

    fn error(&mut self, text: String) -> Token {
        self.position = self.chars.len();
        Token::new(TokenKind::Error, text)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '\\' || c >= '\u{80}'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c >= '\u{80}'
}

fn uri_function_text(scanned: &str) -> String {
    // "url" with the original casing, plus the opening paren
    let name_len = scanned.find('(').map(|i| i + 1).unwrap_or(scanned.len());
    scanned[..name_len].to_string()
}
