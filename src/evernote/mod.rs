//! Evernote export reading
//!
//! Loads Evernote export files (.enex) and turns each note into a
//! [`NoteRecord`]. Handles:
//! - Titles, tags and normalized note content
//! - Attachments/resources, filtered by media type
//! - Created/updated timestamps with fallbacks

mod archive;
mod dates;
mod extract;
mod models;

pub use archive::*;
pub use dates::*;
pub use extract::*;
pub use models::*;
