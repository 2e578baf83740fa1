//! Note extraction: element tree to [`NoteRecord`]s.

use super::archive::{Archive, XmlElement};
use super::dates::NoteTimestamp;
use super::models::{NoteRecord, ResourceRecord, SkippedResource};
use crate::config::ResourceFilter;
use crate::error::{ConvertError, Result};
use crate::markdown::ContentNormalizer;

/// Result of walking an archive
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Notes in source order
    pub notes: Vec<NoteRecord>,
    /// Resources rejected by the media-type filter
    pub skipped_resources: Vec<SkippedResource>,
}

pub struct NoteExtractor<'a, N: ContentNormalizer + ?Sized> {
    filter: &'a ResourceFilter,
    normalizer: &'a N,
}

impl<'a, N: ContentNormalizer + ?Sized> NoteExtractor<'a, N> {
    pub fn new(filter: &'a ResourceFilter, normalizer: &'a N) -> Self {
        Self { filter, normalizer }
    }

    pub fn extract(&self, archive: &Archive) -> Result<Extraction> {
        let mut extraction = Extraction::default();
        for (index, note) in archive.notes().into_iter().enumerate() {
            let record = self.extract_note(index, note, &mut extraction.skipped_resources)?;
            extraction.notes.push(record);
        }
        log::debug!(
            "Extracted {} notes ({} resources skipped)",
            extraction.notes.len(),
            extraction.skipped_resources.len()
        );
        Ok(extraction)
    }

    fn extract_note(
        &self,
        index: usize,
        note: &XmlElement,
        skipped: &mut Vec<SkippedResource>,
    ) -> Result<NoteRecord> {
        let title = note
            .child("title")
            .map(|t| t.text().to_string())
            .ok_or(ConvertError::MissingTitle { index })?;

        let mut resources = Vec::new();
        for resource in note.children_named("resource") {
            let mime = resource
                .child("mime")
                .map(|m| m.text().trim().to_string())
                .ok_or_else(|| ConvertError::MissingResourceMime {
                    title: title.clone(),
                })?;

            if !self.filter.accepts(&mime) {
                log::info!("{} has resource {}", title, mime);
                skipped.push(SkippedResource {
                    note_title: title.clone(),
                    mime,
                });
                continue;
            }

            resources.push(read_resource(&title, resource, mime)?);
        }

        let created = match note.child("created") {
            Some(el) => parse_date(&title, "created", el.text())?,
            None => NoteTimestamp::epoch_sentinel(),
        };
        let modified = match note.child("updated") {
            Some(el) => parse_date(&title, "updated", el.text())?,
            None => created,
        };

        let tags = note
            .children_named("tag")
            .map(|tag| tag.text().to_string())
            .collect();

        let content = note
            .child("content")
            .map(|content| self.normalizer.normalize(&title, content.text()))
            .unwrap_or_default();

        Ok(NoteRecord {
            title,
            created,
            modified,
            content,
            tags,
            resources,
        })
    }
}

fn read_resource(title: &str, resource: &XmlElement, mime: String) -> Result<ResourceRecord> {
    let filename = resource
        .child("resource-attributes")
        .and_then(|attrs| attrs.child("file-name"))
        .map(|name| name.text().trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| synthesized_filename(&mime));

    let Some(data) = resource.child("data") else {
        log::error!("Failed exporting resource in {} with mime {}", title, mime);
        return Err(ConvertError::MissingResourceData {
            title: title.to_string(),
            mime,
        });
    };

    Ok(ResourceRecord {
        filename,
        data: data.text().to_string(),
    })
}

/// `"unknown <subtype>"`, e.g. `unknown png` for `image/png`
fn synthesized_filename(mime: &str) -> String {
    let subtype = mime.split_once('/').map_or(mime, |(_, sub)| sub);
    format!("unknown {}", subtype)
}

fn parse_date(title: &str, field: &'static str, value: &str) -> Result<NoteTimestamp> {
    NoteTimestamp::parse(value).ok_or_else(|| ConvertError::InvalidDate {
        title: title.to_string(),
        field,
        value: value.to_string(),
    })
}
