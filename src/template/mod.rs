//! G-code templates with `{...}` placeholders
//!
//! A placeholder is either a bare variable reference with an optional inline
//! default or an arithmetic expression:
//!
//! ```text
//! G0 X{$position} Y{$y_offset}
//! G1 Z-{L1:12.5} F{feed:800}
//! G1 X{$position + L2/2}
//! ```
//!
//! Write `\{` and `\}` for literal braces.

mod error;
mod resolver;
mod scanner;

pub use error::{LineIndex, ResolveError, ResolveErrorKind};
pub use resolver::{referenced_variables, resolve, ResolverOptions, Template};
pub use scanner::{scan, scan_placeholders, Placeholder, PlaceholderKind, Scan, Segment};
