//! Error types for CSS tokenizing and parsing.

use thiserror::Error;

/// Errors surfaced while turning CSS text into a rule model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CssError {
    #[error("cannot scan input near {0:?}")]
    Tokenize(String),

    #[error("unexpected end of input in {0}")]
    UnexpectedEnd(&'static str),

    #[error("unexpected token {token:?} {context}")]
    UnexpectedToken {
        token: String,
        context: &'static str,
    },

    #[error("at-keyword {0:?} is not recognized")]
    UnknownAtKeyword(String),

    #[error("empty selector in a selector list")]
    EmptySelector,

    #[error("declaration {0:?} has an empty value")]
    EmptyValue(String),

    #[error("token {0:?} follows !important")]
    TokenAfterImportant(String),

    #[error("rules are nested too deeply")]
    TooDeeplyNested,

    #[error("trailing content after the style sheet near {0:?}")]
    TrailingContent(String),
}
