//! Locate a named top-level section of a document.

use serde_yaml::Value;

use crate::yaml::{self, Document};

/// Position of `name` among the keys of the document's root mapping.
///
/// `None` when the root is not a mapping or has no such key.
pub fn find_section_index(doc: &Document, name: &str) -> Option<usize> {
    doc.root()?
        .keys()
        .position(|key| yaml::key_text(key).as_deref() == Some(name))
}

/// The value paired with the root key equal to `name`.
pub fn find_section<'a>(doc: &'a Document, name: &str) -> Option<&'a Value> {
    let index = find_section_index(doc, name)?;
    doc.root()?.values().nth(index)
}
