use std::fs;
use std::io::{self, Read, Write};

use super::{write_once, ExportSummary};
use crate::config::{ConvertOptions, Destination};
use crate::error::Result;
use crate::evernote::NoteRecord;

pub fn write_document<W: Write>(notes: &[NoteRecord], writer: W, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(writer, notes)?;
    } else {
        serde_json::to_writer(writer, notes)?;
    }
    Ok(())
}

/// Parse a document written by [`write_document`]. Titles are not part of
/// the document and come back empty.
pub fn read_document<R: Read>(reader: R) -> Result<Vec<NoteRecord>> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn export_document(
    notes: &[NoteRecord],
    destination: &Destination,
    options: &ConvertOptions,
) -> Result<ExportSummary> {
    export_document_to(notes, destination, options, io::stdout())
}

pub fn export_document_to<W: Write>(
    notes: &[NoteRecord],
    destination: &Destination,
    options: &ConvertOptions,
    stdout: W,
) -> Result<ExportSummary> {
    let mut buffer = Vec::new();
    write_document(notes, &mut buffer, options.pretty_json)?;

    match destination {
        Destination::Stdout => write_once(stdout, &buffer)?,
        Destination::Path(path) => {
            fs::write(path, &buffer)?;
            log::debug!("Wrote {} notes to {:?}", notes.len(), path);
        }
    }

    Ok(ExportSummary {
        notes_written: notes.len(),
        resources_written: notes.iter().map(|n| n.resources.len()).sum(),
        skipped_notes: Vec::new(),
    })
}
