//! Container seam: the minimal view of an EPUB package the driver needs.
//!
//! Opening, enumerating and committing a real archive belongs to the
//! caller. [`MemoryContainer`] is an in-memory implementation for tests and
//! for callers that have already unpacked the entries they care about.

use std::collections::BTreeMap;

use crate::error::{ErrorPhase, RestyleError};

/// Media type of CSS stylesheets.
pub const MEDIA_TYPE_CSS: &str = "text/css";
/// Media type of XHTML content documents.
pub const MEDIA_TYPE_XHTML: &str = "application/xhtml+xml";
/// Media type of HTML content documents.
pub const MEDIA_TYPE_HTML: &str = "text/html";
/// Media type of Adobe page templates.
pub const MEDIA_TYPE_PAGE_TEMPLATE: &str = "application/vnd.adobe-page-template+xml";

/// One manifest entry: archive path plus declared media type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerEntry {
    /// Path of the entry inside the container.
    pub name: String,
    /// Declared media type.
    pub media_type: String,
}

/// Read/replace/remove access to container entries.
pub trait Container {
    /// Snapshot of the manifest, in a stable order.
    fn entries(&self) -> Vec<ContainerEntry>;

    /// Read an entry as UTF-8 text.
    fn read_text(&mut self, name: &str) -> Result<String, RestyleError>;

    /// Replace the content of an existing entry.
    fn replace_text(&mut self, name: &str, text: &str) -> Result<(), RestyleError>;

    /// Remove an entry.
    fn remove(&mut self, name: &str) -> Result<(), RestyleError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct MemoryEntry {
    media_type: String,
    data: Vec<u8>,
}

/// In-memory [`Container`] keyed by entry path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryContainer {
    entries: BTreeMap<String, MemoryEntry>,
}

impl MemoryContainer {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an entry.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        media_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) {
        self.entries.insert(
            name.into(),
            MemoryEntry {
                media_type: media_type.into(),
                data: data.into(),
            },
        );
    }

    /// Builder-style [`MemoryContainer::insert`].
    pub fn with_entry(
        mut self,
        name: impl Into<String>,
        media_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        self.insert(name, media_type, data);
        self
    }

    /// Raw bytes of an entry.
    pub fn bytes(&self, name: &str) -> Option<&[u8]> {
        self.entries.get(name).map(|entry| entry.data.as_slice())
    }

    /// Entry content as text, if present and valid UTF-8.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.bytes(name)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    /// Whether an entry exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the container has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn missing_entry(name: &str) -> RestyleError {
    RestyleError::new(
        ErrorPhase::Container,
        "CONTAINER_ENTRY_MISSING",
        format!("No entry named {}", name),
    )
    .with_path(name)
}

impl Container for MemoryContainer {
    fn entries(&self) -> Vec<ContainerEntry> {
        self.entries
            .iter()
            .map(|(name, entry)| ContainerEntry {
                name: name.clone(),
                media_type: entry.media_type.clone(),
            })
            .collect()
    }

    fn read_text(&mut self, name: &str) -> Result<String, RestyleError> {
        let entry = self.entries.get(name).ok_or_else(|| missing_entry(name))?;
        let text = std::str::from_utf8(&entry.data).map_err(|err| {
            RestyleError::new(
                ErrorPhase::Container,
                "CONTAINER_DECODE_ERROR",
                format!("Entry is not valid UTF-8: {}", err),
            )
            .with_path(name)
        })?;
        Ok(text.strip_prefix('\u{feff}').unwrap_or(text).to_string())
    }

    fn replace_text(&mut self, name: &str, text: &str) -> Result<(), RestyleError> {
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| missing_entry(name))?;
        entry.data = text.as_bytes().to_vec();
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<(), RestyleError> {
        self.entries
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| missing_entry(name))
    }
}
