//! Insertion-ordered collection of buffers keyed by name.

use crate::buffer::Buffer;
use core::fmt::{Display, Formatter, Result as FmtResult};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Rejections from [`BufferSet::add`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BufferError {
    /// A buffer with this name is already present.
    BufferExists(String),
    /// The requested name was empty or whitespace.
    EmptyName,
}

impl Display for BufferError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::BufferExists(name) => write!(formatter, "File already exists: {name}"),
            Self::EmptyName => formatter.write_str("File name must not be empty"),
        }
    }
}

impl core::error::Error for BufferError {}

/// All buffers of a project, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BufferSet {
    buffers: Vec<Buffer>,
}

impl BufferSet {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from `(name, content)` pairs. Later duplicates replace the
    /// content of earlier ones but keep the first position.
    pub fn from_pairs<N, C, I>(pairs: I) -> Self
    where
        N: Into<String>,
        C: Into<String>,
        I: IntoIterator<Item = (N, C)>,
    {
        let mut set = Self::new();
        for (name, content) in pairs {
            set.set_content(name, content);
        }
        set
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.buffers.iter().position(|buffer| buffer.name() == name)
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Buffer> {
        self.buffers.iter().find(|buffer| buffer.name() == name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Text of `name`, if present.
    #[inline]
    pub fn content(&self, name: &str) -> Option<&str> {
        self.get(name).map(Buffer::content)
    }

    /// Text of `name`, or the empty string when the buffer is absent.
    #[inline]
    pub fn content_or_empty(&self, name: &str) -> &str {
        self.content(name).unwrap_or_default()
    }

    /// Create or replace a buffer. Returns true if the buffer was created.
    pub fn set_content(&mut self, name: impl Into<String>, content: impl Into<String>) -> bool {
        let name = name.into();
        if let Some(index) = self.position(&name) {
            if let Some(buffer) = self.buffers.get_mut(index) {
                buffer.set_content(content);
            }
            return false;
        }
        self.buffers.push(Buffer::new(name, content));
        true
    }

    /// Append a new empty buffer.
    ///
    /// # Errors
    /// Fails if the name is blank or already taken.
    pub fn add(&mut self, name: &str) -> Result<(), BufferError> {
        if name.trim().is_empty() {
            return Err(BufferError::EmptyName);
        }
        if self.contains(name) {
            return Err(BufferError::BufferExists(name.to_owned()));
        }
        self.buffers.push(Buffer::new(name, String::new()));
        Ok(())
    }

    /// Remove a buffer, returning it if it existed.
    pub fn remove(&mut self, name: &str) -> Option<Buffer> {
        let index = self.position(name)?;
        Some(self.buffers.remove(index))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.buffers.iter().map(Buffer::name)
    }

    /// The first buffer name in iteration order.
    #[inline]
    pub fn first_name(&self) -> Option<&str> {
        self.buffers.first().map(Buffer::name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Buffer> {
        self.buffers.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

impl<'set> IntoIterator for &'set BufferSet {
    type Item = &'set Buffer;
    type IntoIter = core::slice::Iter<'set, Buffer>;

    fn into_iter(self) -> Self::IntoIter {
        self.buffers.iter()
    }
}

impl Serialize for BufferSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buffers.len()))?;
        for buffer in &self.buffers {
            map.serialize_entry(buffer.name(), buffer.content())?;
        }
        map.end()
    }
}

/// Reads a JSON object while keeping the document's key order.
struct BufferSetVisitor;

impl<'de> Visitor<'de> for BufferSetVisitor {
    type Value = BufferSet;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter.write_str("an object mapping file names to file contents")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut set = BufferSet::new();
        while let Some((name, content)) = access.next_entry::<String, String>()? {
            set.set_content(name, content);
        }
        Ok(set)
    }
}

impl<'de> Deserialize<'de> for BufferSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(BufferSetVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> BufferSet {
        BufferSet::from_pairs([("a", "1"), ("b", "2"), ("c", "3")])
    }

    #[test]
    fn set_content_keeps_position_of_existing_buffer() {
        let mut set = abc();
        assert!(!set.set_content("a", "changed"));
        assert!(set.set_content("d", "4"));
        assert_eq!(set.names().collect::<Vec<_>>(), ["a", "b", "c", "d"]);
        assert_eq!(set.content("a"), Some("changed"));
    }

    #[test]
    fn add_rejects_duplicates_and_blank_names() {
        let mut set = abc();
        assert_eq!(set.add("b"), Err(BufferError::BufferExists("b".to_owned())));
        assert_eq!(set.add("  "), Err(BufferError::EmptyName));
        assert_eq!(set.add("notes.md"), Ok(()));
        assert_eq!(set.content("notes.md"), Some(""));
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn remove_then_first_name_follows_iteration_order() {
        let mut set = abc();
        let removed = set.remove("a");
        assert_eq!(removed.map(|buffer| buffer.content().to_owned()).as_deref(), Some("1"));
        assert_eq!(set.first_name(), Some("b"));
        assert!(set.remove("missing").is_none());
    }

    #[test]
    fn missing_buffer_reads_as_empty() {
        let set = BufferSet::new();
        assert_eq!(set.content_or_empty("index.html"), "");
        assert!(set.is_empty());
    }
}
