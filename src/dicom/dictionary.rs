//! Tag dictionary: maps a tag to the canonical attribute name.
//!
//! Two implementations are provided:
//!
//! - [`StandardTagDictionary`]: the DICOM standard data dictionary, backed by
//!   `dicom-dictionary-std`. It is built once per process and never mutated,
//!   so it can be shared between threads without synchronization.
//! - [`TagDictionary`]: an explicit table, useful for private attributes or
//!   for restricting lookups to a known set of tags.

use std::collections::HashMap;

use dicom_core::dictionary::DataDictionary;
use dicom_dictionary_std::StandardDataDictionary;

use super::tag::Tag;
use crate::error::DictionaryError;

/// One known attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDictionaryEntry {
    pub tag: Tag,
    pub name: String,
}

impl TagDictionaryEntry {
    pub fn new(tag: Tag, name: impl Into<String>) -> Self {
        Self {
            tag,
            name: name.into(),
        }
    }
}

/// Read-only lookup from tag to dictionary entry.
///
/// A miss is `None`, never a panic.
pub trait AttributeDictionary: Send + Sync {
    fn lookup(&self, tag: Tag) -> Option<TagDictionaryEntry>;
}

// =============================================================================
// Standard dictionary
// =============================================================================

/// The DICOM standard data dictionary.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTagDictionary;

impl AttributeDictionary for StandardTagDictionary {
    fn lookup(&self, tag: Tag) -> Option<TagDictionaryEntry> {
        StandardDataDictionary
            .by_tag(tag.into())
            .map(|entry| TagDictionaryEntry::new(tag, entry.alias))
    }
}

// =============================================================================
// Explicit table
// =============================================================================

/// A fixed table of attributes, one entry per tag.
#[derive(Debug, Clone, Default)]
pub struct TagDictionary {
    entries: HashMap<Tag, TagDictionaryEntry>,
}

impl TagDictionary {
    /// Build a dictionary from entries.
    ///
    /// Fails if two entries share a tag.
    pub fn from_entries<I>(entries: I) -> Result<Self, DictionaryError>
    where
        I: IntoIterator<Item = TagDictionaryEntry>,
    {
        let mut table = HashMap::new();
        for entry in entries {
            if table.contains_key(&entry.tag) {
                return Err(DictionaryError::DuplicateTag(entry.tag));
            }
            table.insert(entry.tag, entry);
        }
        Ok(Self { entries: table })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AttributeDictionary for TagDictionary {
    fn lookup(&self, tag: Tag) -> Option<TagDictionaryEntry> {
        self.entries.get(&tag).cloned()
    }
}
