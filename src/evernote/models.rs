use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

use super::dates::NoteTimestamp;
use crate::error::{ConvertError, Result};

/// A normalized note, ready for any encoder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    /// Only used to name files in directory output
    #[serde(skip_serializing, default)]
    pub title: String,
    #[serde(rename = "createdate")]
    pub created: NoteTimestamp,
    #[serde(rename = "modifydate")]
    pub modified: NoteTimestamp,
    pub content: String,
    pub tags: Vec<String>,
    pub resources: Vec<ResourceRecord>,
}

/// An attachment carried as base64 text until it is written out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub filename: String,
    pub data: String,
}

impl ResourceRecord {
    /// Decode the payload. ENEX wraps base64 across lines, so whitespace is
    /// ignored.
    pub fn decode_data(&self) -> Result<Vec<u8>> {
        let compact: String = self.data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        BASE64
            .decode(compact.as_bytes())
            .map_err(|source| ConvertError::InvalidResourceData {
                filename: self.filename.clone(),
                source,
            })
    }
}

/// A resource left out by the media-type filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedResource {
    pub note_title: String,
    pub mime: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_wrapped_base64() {
        let resource = ResourceRecord {
            filename: "hello.txt".to_string(),
            data: "aGVs\n  bG8g\r\nd29y bGQ=\n".to_string(),
        };
        assert_eq!(resource.decode_data().unwrap(), b"hello world");
    }

    #[test]
    fn test_decode_invalid_base64() {
        let resource = ResourceRecord {
            filename: "broken.png".to_string(),
            data: "not base64!".to_string(),
        };
        match resource.decode_data() {
            Err(ConvertError::InvalidResourceData { filename, .. }) => {
                assert_eq!(filename, "broken.png")
            }
            other => panic!("expected InvalidResourceData, got {:?}", other),
        }
    }

    #[test]
    fn test_note_serializes_without_title() {
        let note = NoteRecord {
            title: "Hidden".to_string(),
            created: NoteTimestamp::epoch_sentinel(),
            modified: NoteTimestamp::epoch_sentinel(),
            content: "text".to_string(),
            tags: vec!["x".to_string()],
            resources: vec![],
        };
        let value = serde_json::to_value(&note).unwrap();
        let object = value.as_object().unwrap();
        let keys: Vec<&String> = object.keys().collect();
        assert!(!object.contains_key("title"));
        assert_eq!(keys.len(), 5);
        assert_eq!(object["createdate"], "1970-01-01 00:00:17");
        assert_eq!(object["modifydate"], "1970-01-01 00:00:17");
    }
}
