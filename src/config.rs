//! Conversion options and process-wide formatting constants.
//!
//! Options can be loaded from a TOML file:
//!
//! ```toml
//! format = "dir"
//! on-collision = "skip"
//! tabular-encoding = "ascii"
//! resource-filter = { mode = "allow-list", types = ["image/png", "application/*"] }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};

/// Timestamp pattern used by every output format.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column order of the tabular output.
pub const TABULAR_FIELDS: [&str; 5] = ["createdate", "modifydate", "content", "tags", "resources"];

/// Seconds past the Unix epoch used when a note has no creation date.
pub const EPOCH_SENTINEL_SECS: i64 = 17;

const CONFIG_DIR_NAME: &str = "enex-convert";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Output shape requested for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One row per note
    #[serde(alias = "tabular")]
    #[value(alias = "tabular")]
    Csv,
    /// A single JSON array of notes
    #[default]
    #[serde(alias = "document")]
    #[value(alias = "document")]
    Json,
    /// One text file per note plus resource files
    #[serde(alias = "directory")]
    #[value(alias = "directory")]
    Dir,
}

/// Where encoded output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    Path(PathBuf),
}

impl Destination {
    pub fn from_option(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => Destination::Path(expand_tilde(&path)),
            None => Destination::Stdout,
        }
    }
}

/// Which note resources are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "types", rename_all = "kebab-case")]
pub enum ResourceFilter {
    /// Keep every resource regardless of media type
    #[default]
    All,
    /// Keep any `image/*` resource
    Images,
    /// Keep media types listed explicitly; `type/*` matches a whole family
    AllowList(Vec<String>),
}

impl ResourceFilter {
    pub fn accepts(&self, mime: &str) -> bool {
        let mime = mime.trim();
        match self {
            ResourceFilter::All => true,
            ResourceFilter::Images => mime.starts_with("image/"),
            ResourceFilter::AllowList(types) => types.iter().any(|allowed| {
                match allowed.strip_suffix("/*") {
                    Some(family) => mime
                        .split_once('/')
                        .is_some_and(|(top, _)| top.eq_ignore_ascii_case(family)),
                    None => allowed.eq_ignore_ascii_case(mime),
                }
            }),
        }
    }
}

/// What the directory encoder does when a note file already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Leave the existing file alone and report the skip
    #[default]
    Skip,
    /// Replace the existing file
    Overwrite,
    /// Stop the run
    Fail,
}

/// Character repertoire allowed in tabular content cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TabularEncoding {
    /// Drop every non-ASCII character
    #[default]
    Ascii,
    /// Keep content as UTF-8
    Utf8,
}

impl TabularEncoding {
    pub fn project(self, text: &str) -> String {
        match self {
            TabularEncoding::Ascii => text.chars().filter(char::is_ascii).collect(),
            TabularEncoding::Utf8 => text.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConvertOptions {
    pub format: OutputFormat,
    pub resource_filter: ResourceFilter,
    pub on_collision: CollisionPolicy,
    pub tabular_encoding: TabularEncoding,
    /// Write a header row before tabular output
    pub tabular_header: bool,
    /// Indent document output
    pub pretty_json: bool,
}

impl ConvertOptions {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load options from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConvertError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load `<config dir>/enex-convert/config.toml` if it exists, else defaults
    pub fn load_default() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) if path.is_file() => {
                log::debug!("Loading options from {:?}", path);
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }
}

/// Expand a leading `~` to the user's home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
