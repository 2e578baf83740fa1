use std::fs::File;
use std::io::{self, BufWriter, Write};

use super::{write_once, ExportSummary};
use crate::config::{ConvertOptions, Destination, TabularEncoding, TABULAR_FIELDS};
use crate::error::Result;
use crate::evernote::NoteRecord;

/// One CSV row in [`TABULAR_FIELDS`] order.
///
/// Tags are space-joined and resources are rendered as a compact JSON array.
pub fn tabular_row(note: &NoteRecord, encoding: TabularEncoding) -> Result<[String; 5]> {
    Ok([
        note.created.to_string(),
        note.modified.to_string(),
        encoding.project(&note.content),
        note.tags.join(" "),
        serde_json::to_string(&note.resources)?,
    ])
}

pub fn write_tabular<W: Write>(
    notes: &[NoteRecord],
    writer: W,
    options: &ConvertOptions,
) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    if options.tabular_header {
        csv.write_record(TABULAR_FIELDS)?;
    }
    for note in notes {
        csv.write_record(tabular_row(note, options.tabular_encoding)?)?;
    }
    csv.flush()?;
    Ok(())
}

pub fn export_tabular(
    notes: &[NoteRecord],
    destination: &Destination,
    options: &ConvertOptions,
) -> Result<ExportSummary> {
    export_tabular_to(notes, destination, options, io::stdout())
}

/// Stdout output is buffered whole and handed to `stdout` in one write.
pub fn export_tabular_to<W: Write>(
    notes: &[NoteRecord],
    destination: &Destination,
    options: &ConvertOptions,
    stdout: W,
) -> Result<ExportSummary> {
    match destination {
        Destination::Stdout => {
            let mut buffer = Vec::new();
            write_tabular(notes, &mut buffer, options)?;
            write_once(stdout, &buffer)?;
        }
        Destination::Path(path) => {
            let file = File::create(path)?;
            write_tabular(notes, BufWriter::new(file), options)?;
            log::debug!("Wrote {} rows to {:?}", notes.len(), path);
        }
    }

    Ok(ExportSummary {
        notes_written: notes.len(),
        ..Default::default()
    })
}
