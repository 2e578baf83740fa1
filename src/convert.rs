use std::path::{Path, PathBuf};

use crate::config::{expand_tilde, ConvertOptions, Destination};
use crate::error::Result;
use crate::evernote::{load_archive, NoteExtractor, SkippedResource};
use crate::export::{export_notes, ExportSummary};
use crate::markdown::{ContentNormalizer, MarkdownNormalizer};

/// Outcome of one conversion run
#[derive(Debug, Clone, Default)]
pub struct ConversionReport {
    /// Notes found in the archive
    pub notes: usize,
    pub skipped_resources: Vec<SkippedResource>,
    pub export: ExportSummary,
}

/// Load an export, extract its notes and write them in the requested format.
pub struct Converter<N = MarkdownNormalizer> {
    source: PathBuf,
    destination: Destination,
    options: ConvertOptions,
    normalizer: N,
}

impl Converter {
    pub fn new(
        source: impl AsRef<Path>,
        destination: Destination,
        options: ConvertOptions,
    ) -> Self {
        Self {
            source: expand_tilde(source.as_ref()),
            destination,
            options,
            normalizer: MarkdownNormalizer,
        }
    }
}

impl<N: ContentNormalizer> Converter<N> {
    /// Replace the content normalizer
    pub fn with_normalizer<M: ContentNormalizer>(self, normalizer: M) -> Converter<M> {
        Converter {
            source: self.source,
            destination: self.destination,
            options: self.options,
            normalizer,
        }
    }

    pub fn run(&self) -> Result<ConversionReport> {
        let archive = load_archive(&self.source)?;
        let extraction =
            NoteExtractor::new(&self.options.resource_filter, &self.normalizer).extract(&archive)?;

        let export = export_notes(&extraction.notes, &self.destination, &self.options)?;
        log::info!(
            "Converted {} notes from {:?} ({} written, {} skipped, {} resources)",
            extraction.notes.len(),
            self.source,
            export.notes_written,
            export.skipped_notes.len(),
            export.resources_written
        );

        Ok(ConversionReport {
            notes: extraction.notes.len(),
            skipped_resources: extraction.skipped_resources,
            export,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutputFormat, ResourceFilter};
    use crate::error::ConvertError;
    use crate::export::read_document;
    use std::fs;
    use tempfile::TempDir;

    const ARCHIVE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE en-export SYSTEM "http://xml.evernote.com/pub/evernote-export3.dtd">
<en-export export-date="20231231T235959Z" application="Evernote" version="10">
  <note>
    <title>My Notes</title>
    <content><![CDATA[<?xml version="1.0" encoding="UTF-8"?><!DOCTYPE en-note SYSTEM "http://xml.evernote.com/pub/enml2.dtd"><en-note><div>Hello</div></en-note>]]></content>
    <created>2011-06-10T18:29:17Z</created>
  </note>
  <note>
    <title>A/B: Notes</title>
    <content><![CDATA[<en-note><div>Dash &#8212; here</div></en-note>]]></content>
    <created>20120101T000000Z</created>
    <updated>20120202T101010Z</updated>
    <tag>one</tag>
    <tag>two</tag>
    <resource>
      <data encoding="base64">
aGVsbG8=
      </data>
      <mime>image/png</mime>
      <resource-attributes><file-name>hello.png</file-name></resource-attributes>
    </resource>
    <resource>
      <data encoding="base64">d29ybGQ=</data>
      <mime>application/pdf</mime>
    </resource>
  </note>
</en-export>"#;

    fn write_archive(dir: &Path) -> PathBuf {
        let path = dir.join("export.enex");
        fs::write(&path, ARCHIVE).unwrap();
        path
    }

    fn options(format: OutputFormat) -> ConvertOptions {
        ConvertOptions {
            format,
            ..Default::default()
        }
    }

    #[test]
    fn test_directory_conversion() {
        let temp = TempDir::new().unwrap();
        let source = write_archive(temp.path());
        let out = temp.path().join("notes");

        let destination = Destination::Path(out.clone());
        let report = Converter::new(&source, destination, options(OutputFormat::Dir))
            .run()
            .unwrap();
        assert_eq!(report.notes, 2);
        assert_eq!(report.export.notes_written, 2);
        assert_eq!(report.export.resources_written, 2);

        let first = out.join("My_Notes (2011-06-10 182917 - 0).txt");
        assert_eq!(fs::read_to_string(&first).unwrap(), "# My Notes\n\nHello\n");
        let modified = fs::metadata(&first).unwrap().modified().unwrap();
        let secs = modified
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .unwrap()
            .as_secs();
        assert_eq!(secs, 1_307_730_557);

        let second = out.join("A-B-_Notes (2012-02-02 101010 - 1).txt");
        assert_eq!(
            fs::read_to_string(&second).unwrap(),
            "# A/B: Notes\n\nDash \u{2014} here\n"
        );
        assert_eq!(
            fs::read(out.join("A-B-_Notes (2012-02-02 101010 - 1)-hello.png")).unwrap(),
            b"hello"
        );
        assert_eq!(
            fs::read(out.join("A-B-_Notes (2012-02-02 101010 - 1)-unknown pdf")).unwrap(),
            b"world"
        );

        let again = Converter::new(&source, Destination::Path(out), options(OutputFormat::Dir))
            .run()
            .unwrap();
        assert_eq!(again.export.notes_written, 0);
        assert_eq!(again.export.skipped_notes.len(), 2);
    }

    #[test]
    fn test_document_conversion() {
        let temp = TempDir::new().unwrap();
        let source = write_archive(temp.path());
        let out = temp.path().join("notes.json");

        Converter::new(&source, Destination::Path(out.clone()), options(OutputFormat::Json))
            .run()
            .unwrap();

        let notes = read_document(fs::File::open(&out).unwrap()).unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].created.to_string(), "2011-06-10 18:29:17");
        assert_eq!(notes[0].modified, notes[0].created);
        assert_eq!(notes[1].tags, vec!["one", "two"]);
        assert_eq!(notes[1].resources[0].decode_data().unwrap(), b"hello");
        assert_eq!(notes[1].resources[1].filename, "unknown pdf");
    }

    #[test]
    fn test_tabular_conversion_drops_non_ascii() {
        let temp = TempDir::new().unwrap();
        let source = write_archive(temp.path());
        let out = temp.path().join("notes.csv");

        Converter::new(&source, Destination::Path(out.clone()), options(OutputFormat::Csv))
            .run()
            .unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(&out)
            .unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][2], "# A/B: Notes\n\nDash  here\n");
        assert_eq!(&rows[1][3], "one two");
    }

    #[test]
    fn test_image_filter_reports_skips() {
        let temp = TempDir::new().unwrap();
        let source = write_archive(temp.path());
        let out = temp.path().join("notes.json");
        let options = ConvertOptions {
            resource_filter: ResourceFilter::Images,
            ..Default::default()
        };

        let report = Converter::new(&source, Destination::Path(out), options).run().unwrap();
        assert_eq!(report.skipped_resources.len(), 1);
        assert_eq!(report.skipped_resources[0].mime, "application/pdf");
        assert_eq!(report.export.resources_written, 1);
    }

    #[test]
    fn test_custom_normalizer() {
        let temp = TempDir::new().unwrap();
        let source = write_archive(temp.path());
        let out = temp.path().join("notes.json");

        Converter::new(&source, Destination::Path(out.clone()), ConvertOptions::default())
            .with_normalizer(|title: &str, _html: &str| format!("{}\n", title))
            .run()
            .unwrap();

        let notes = read_document(fs::File::open(&out).unwrap()).unwrap();
        assert_eq!(notes[0].content, "My Notes\n");
    }

    #[test]
    fn test_missing_source() {
        let temp = TempDir::new().unwrap();
        let err = Converter::new(
            temp.path().join("nope.enex"),
            Destination::Stdout,
            ConvertOptions::default(),
        )
        .run()
        .unwrap_err();
        assert!(matches!(err, ConvertError::SourceNotFound(_)));
    }

    #[test]
    fn test_unparsable_source() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("broken.enex");
        fs::write(&source, "<en-export><note><title>x</title></en-export>").unwrap();

        let err = Converter::new(&source, Destination::Stdout, ConvertOptions::default())
            .run()
            .unwrap_err();
        assert!(matches!(err, ConvertError::Xml(_)));
    }
}
