//! Minimal token-at-a-time HTML scanner.
//!
//! This is not a conforming HTML5 tokenizer; it is a strict reader for the
//! XHTML-ish markup found inside e-book archives. It never guesses: markup
//! it cannot account for comes back as a [`HtmlToken::Trailing`] tail for
//! the caller to report. Bogus declarations (`<!…>`, `<?…>`) surface as
//! comments so directive smuggling stays visible.

/// One markup token. Tag and attribute names are lowercased; everything
/// else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlToken {
    Doctype,
    Comment {
        data: String,
    },
    StartTag {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },
    /// `raw` is the complete source text of the tag, kept so the caller can
    /// spot payloads smuggled into a closing tag.
    EndTag {
        name: String,
        raw: String,
    },
    Text {
        data: String,
    },
    /// Unparseable tail; always the last token before `Eof`.
    Trailing {
        raw: String,
    },
    Eof,
}

pub struct HtmlTokenizer {
    chars: Vec<char>,
    position: usize,
    /// Set after a `<style>`/`<script>` start tag: the next token is raw
    /// text running to the matching end tag, never markup.
    raw_text_element: Option<String>,
}

impl HtmlTokenizer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            position: 0,
            raw_text_element: None,
        }
    }

    pub fn next_token(&mut self) -> HtmlToken {
        if let Some(element) = self.raw_text_element.take() {
            if let Some(token) = self.raw_text(&element) {
                return token;
            }
        }
        match self.peek(0) {
            None => HtmlToken::Eof,
            Some('<') => self.scan_tag(),
            Some(_) => HtmlToken::Text {
                data: self.consume_until('<'),
            },
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn bump(&mut self) -> char {
        let c = self.chars[self.position];
        self.position += 1;
        c
    }

    fn consume_until(&mut self, stop: char) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek(0) {
            if c == stop {
                break;
            }
            out.push(self.bump());
        }
        out
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(0), Some(c) if c.is_whitespace()) {
            self.position += 1;
        }
    }

    fn slice_from(&self, start: usize) -> String {
        self.chars[start..self.position].iter().collect()
    }

    fn trailing(&mut self, start: usize) -> HtmlToken {
        self.position = self.chars.len();
        HtmlToken::Trailing {
            raw: self.slice_from(start),
        }
    }

    fn matches_at(&self, offset: usize, pattern: &str) -> bool {
        pattern.chars().enumerate().all(|(i, c)| {
            matches!(self.peek(offset + i), Some(p) if p.eq_ignore_ascii_case(&c))
        })
    }

    /// Everything up to the matching end tag of a raw-text element. Returns
    /// `None` when the content is empty so the end tag scans normally.
    fn raw_text(&mut self, element: &str) -> Option<HtmlToken> {
        let close = format!("</{element}");
        let start = self.position;
        while self.position < self.chars.len() && !self.matches_at(0, &close) {
            self.position += 1;
        }
        if self.position == start {
            return None;
        }
        Some(HtmlToken::Text {
            data: self.slice_from(start),
        })
    }

    fn scan_tag(&mut self) -> HtmlToken {
        let start = self.position;
        match self.peek(1) {
            None => self.trailing(start),
            Some('/') => self.scan_end_tag(start),
            Some('!') | Some('?') => self.scan_markup_declaration(start),
            Some(c) if c.is_ascii_alphabetic() => self.scan_start_tag(start),
            Some(_) => {
                // stray '<' in running text
                let mut data = String::new();
                data.push(self.bump());
                data.push_str(&self.consume_until('<'));
                HtmlToken::Text { data }
            }
        }
    }

    fn scan_end_tag(&mut self, start: usize) -> HtmlToken {
        self.position += 2;
        let mut name = String::new();
        while let Some(c) = self.peek(0) {
            if c.is_whitespace() || c == '>' {
                break;
            }
            name.push(self.bump());
        }
        self.consume_until('>');
        if self.peek(0).is_none() {
            return self.trailing(start);
        }
        self.bump();
        HtmlToken::EndTag {
            name: name.to_lowercase(),
            raw: self.slice_from(start),
        }
    }

    fn scan_markup_declaration(&mut self, start: usize) -> HtmlToken {
        if self.matches_at(1, "!--") {
            self.position += 4;
            let mut data = String::new();
            loop {
                if self.peek(0).is_none() {
                    return self.trailing(start);
                }
                if self.matches_at(0, "-->") {
                    self.position += 3;
                    return HtmlToken::Comment { data };
                }
                data.push(self.bump());
            }
        }
        if self.matches_at(1, "!doctype") {
            self.consume_until('>');
            if self.peek(0).is_none() {
                return self.trailing(start);
            }
            self.bump();
            return HtmlToken::Doctype;
        }
        // bogus declaration or processing instruction: report as a comment
        self.bump();
        if self.peek(0) == Some('!') {
            self.bump();
        }
        let data = self.consume_until('>');
        if self.peek(0).is_none() {
            return self.trailing(start);
        }
        self.bump();
        HtmlToken::Comment { data }
    }

    fn scan_start_tag(&mut self, start: usize) -> HtmlToken {
        self.bump();
        let mut name = String::new();
        while let Some(c) = self.peek(0) {
            if c.is_whitespace() || c == '>' || c == '/' {
                break;
            }
            name.push(self.bump());
        }

        let mut attributes = Vec::new();
        let mut self_closing = false;
        loop {
            self.skip_whitespace();
            match self.peek(0) {
                None => return self.trailing(start),
                Some('>') => {
                    self.bump();
                    break;
                }
                Some('/') => {
                    self.bump();
                    if self.peek(0) == Some('>') {
                        self.bump();
                        self_closing = true;
                        break;
                    }
                }
                Some(_) => match self.scan_attribute() {
                    Some(attribute) => attributes.push(attribute),
                    None => return self.trailing(start),
                },
            }
        }

        let name = name.to_lowercase();
        if !self_closing && (name == "style" || name == "script") {
            self.raw_text_element = Some(name.clone());
        }
        HtmlToken::StartTag {
            name,
            attributes,
            self_closing,
        }
    }

    /// One `name` or `name=value` attribute. Returns `None` on end of input
    /// mid-attribute.
    fn scan_attribute(&mut self) -> Option<(String, String)> {
        let mut name = String::new();
        while let Some(c) = self.peek(0) {
            if c.is_whitespace() || c == '=' || c == '>' || c == '/' {
                break;
            }
            name.push(self.bump());
        }
        self.skip_whitespace();

        if self.peek(0) != Some('=') {
            return Some((name.to_lowercase(), String::new()));
        }
        self.bump();
        self.skip_whitespace();

        let mut value = String::new();
        match self.peek(0) {
            None => return None,
            Some(q) if q == '"' || q == '\'' => {
                self.bump();
                loop {
                    match self.peek(0) {
                        None => return None,
                        Some(c) if c == q => {
                            self.bump();
                            break;
                        }
                        Some(_) => value.push(self.bump()),
                    }
                }
            }
            Some(_) => {
                while let Some(c) = self.peek(0) {
                    if c.is_whitespace() || c == '>' {
                        break;
                    }
                    value.push(self.bump());
                }
            }
        }
        Some((name.to_lowercase(), value))
    }
}
