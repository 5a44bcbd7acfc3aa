//! CSS parsing for the folio content scanner.
//!
//! This crate turns untrusted CSS text into a structured rule model precise
//! enough to re-serialize, built for inspection rather than rendering:
//! comments and whitespace stay visible to the grammar, values can scrub
//! comment-splitting obfuscation out of themselves, and anything the strict
//! grammar cannot account for is a hard error instead of a recovery.
//!
//! The pieces layer bottom-up:
//!
//! - [`tokenizer`]: a flat scanner producing one [`Token`] at a time.
//! - [`value`]: token runs forming selectors and declaration values, plus
//!   the `!important` handling.
//! - [`rule`]: the [`Rule`]/[`Ruleset`] model and its serialization.
//! - [`parser`]: the recursive-descent grammar with [`parse`] and
//!   [`parse_inline`] entry points.

pub mod error;
pub mod parser;
pub mod rule;
pub mod tokenizer;
pub mod value;

pub use error::CssError;
pub use parser::{parse, parse_inline, MAX_NESTING_DEPTH};
pub use rule::{AtRuleClass, Rule, Ruleset};
pub use tokenizer::{Token, TokenKind, Tokenizer};
pub use value::{Declaration, Value};
