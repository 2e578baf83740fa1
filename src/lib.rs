//! Evernote export conversion.
//!
//! Reads an `.enex` archive, normalizes every note and writes the notes as
//! CSV rows, a JSON document, or a directory of plain-text files.

pub mod config;
mod convert;
pub mod error;
pub mod evernote;
pub mod export;
pub mod markdown;

pub use config::{
    CollisionPolicy, ConvertOptions, Destination, OutputFormat, ResourceFilter, TabularEncoding,
};
pub use convert::{ConversionReport, Converter};
pub use error::{ConvertError, Result};
