//! Content security scanning for untrusted e-book markup.
//!
//! E-book archives ship HTML and CSS written by third parties; rendering
//! them verbatim hands those parties a script-injection surface. This crate
//! walks such content token by token and checks every tag, attribute, URL
//! and style construct against a declarative whitelist ([`ScanPolicy`]),
//! reporting everything that falls outside it.
//!
//! ```
//! use folio_scan::{ScanPolicy, Scanner};
//!
//! let scanner = Scanner::new(ScanPolicy::with_style(&[]));
//! let issues = scanner.scan("<p onclick=\"alert(42)\">Hello</p>").unwrap();
//! assert_eq!(issues.len(), 1);
//! ```
//!
//! The scanner reports, it does not rewrite: sanitization policy belongs to
//! the caller.

pub mod allowlist;
pub mod error;
pub mod html;
pub mod policy;
pub mod scanner;
pub mod urlcheck;

mod vocab;

pub use allowlist::list_contains;
pub use error::ScanError;
pub use policy::ScanPolicy;
pub use scanner::Scanner;
pub use urlcheck::{check_url, LinkContext};
