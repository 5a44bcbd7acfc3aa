//! Error types for the scanner entry points.
//!
//! Whitelist violations are never errors; they come back as issue strings.
//! Errors are reserved for failures below the scanner's control: I/O,
//! undecodable bytes, and CSS grammar errors on whole-stylesheet input.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("cannot read content: {0}")]
    Io(#[from] std::io::Error),

    #[error("content is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("cannot parse style sheet: {0}")]
    Css(#[from] folio_css::CssError),
}
