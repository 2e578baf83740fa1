//! Note content normalization
//!
//! Converts ENML/HTML note bodies into markdown-flavoured plain text:
//! - Title rendered as a top-level heading
//! - Headings, lists, emphasis and links mapped to markdown
//! - Markup stripped, entities decoded, whitespace tidied

mod normalize;

pub use normalize::*;
