//! Output encoders
//!
//! Writes extracted notes in one of three shapes:
//! - CSV rows (`tabular`)
//! - A single JSON array (`document`)
//! - A directory of `.txt` files with sidecar resources (`directory`)

mod directory;
mod document;
mod tabular;

pub use directory::*;
pub use document::*;
pub use tabular::*;

use std::io::{self, Write};
use std::path::PathBuf;

use crate::config::{ConvertOptions, Destination, OutputFormat};
use crate::error::Result;
use crate::evernote::NoteRecord;

/// What an encoder wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub notes_written: usize,
    pub resources_written: usize,
    /// Note files left untouched because they already existed
    pub skipped_notes: Vec<PathBuf>,
}

/// Run the encoder selected by `options.format`
pub fn export_notes(
    notes: &[NoteRecord],
    destination: &Destination,
    options: &ConvertOptions,
) -> Result<ExportSummary> {
    export_notes_to(notes, destination, options, io::stdout())
}

/// [`export_notes`] with `stdout` receiving whatever would go to standard
/// output
pub fn export_notes_to<W: Write>(
    notes: &[NoteRecord],
    destination: &Destination,
    options: &ConvertOptions,
    stdout: W,
) -> Result<ExportSummary> {
    match (options.format, destination) {
        (OutputFormat::Csv, _) => export_tabular_to(notes, destination, options, stdout),
        (OutputFormat::Json, _) => export_document_to(notes, destination, options, stdout),
        (OutputFormat::Dir, Destination::Path(dir)) => {
            export_directory(notes, dir, options.on_collision)
        }
        (OutputFormat::Dir, Destination::Stdout) => {
            log::info!("No destination directory given; writing JSON to stdout");
            export_document_to(notes, destination, options, stdout)
        }
    }
}

/// Single write of fully buffered output
fn write_once<W: Write>(mut out: W, bytes: &[u8]) -> io::Result<()> {
    out.write_all(bytes)?;
    out.flush()
}
