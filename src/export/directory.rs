use std::fs::{self, File, FileTimes};
use std::io::Write;
use std::path::Path;

use super::ExportSummary;
use crate::config::CollisionPolicy;
use crate::error::{ConvertError, Result};
use crate::evernote::NoteRecord;

/// Make a note title safe to use as a file name.
///
/// Spaces and `@` become `_`, `|` becomes `=`, and path or shell-reserved
/// characters and control characters become `-`.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            ' ' | '@' => '_',
            '|' => '=',
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect()
}

/// Resource names keep their spaces; only characters that cannot appear in
/// a file name are replaced.
fn sanitize_resource_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect()
}

/// `<title> (<modifydate without colons> - <index>)`
pub fn note_basename(note: &NoteRecord, index: usize) -> String {
    format!(
        "{} ({} - {})",
        sanitize_title(&note.title),
        note.modified.to_string().replace(':', ""),
        index
    )
}

/// Write one `.txt` per note plus its resources into `dir`
pub fn export_directory(
    notes: &[NoteRecord],
    dir: &Path,
    on_collision: CollisionPolicy,
) -> Result<ExportSummary> {
    if dir.exists() && !dir.is_dir() {
        return Err(ConvertError::DestinationNotDirectory(dir.to_path_buf()));
    }
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }

    let mut summary = ExportSummary::default();

    for (index, note) in notes.iter().enumerate() {
        let basename = note_basename(note, index);
        let text_path = dir.join(format!("{}.txt", basename));

        if text_path.exists() {
            match on_collision {
                CollisionPolicy::Skip => {
                    log::info!("Not creating second file called {}", text_path.display());
                    summary.skipped_notes.push(text_path);
                    continue;
                }
                CollisionPolicy::Fail => return Err(ConvertError::OutputExists(text_path)),
                CollisionPolicy::Overwrite => {
                    log::debug!("Overwriting {:?}", text_path);
                }
            }
        }

        write_note_text(&text_path, note)?;
        summary.notes_written += 1;

        for resource in &note.resources {
            let resource_path = dir.join(format!(
                "{}-{}",
                basename,
                sanitize_resource_name(&resource.filename)
            ));
            fs::write(&resource_path, resource.decode_data()?)?;
            summary.resources_written += 1;
        }
    }

    Ok(summary)
}

/// Write the note content and stamp the file with the note's modify date
fn write_note_text(path: &Path, note: &NoteRecord) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(note.content.as_bytes())?;

    let stamp = note.modified.to_system_time();
    file.set_times(FileTimes::new().set_accessed(stamp).set_modified(stamp))?;
    Ok(())
}
