use std::collections::HashMap;

use tracing::warn;

/// One file's metadata: a key -> value map plus the order the keys are shown in.
///
/// `keys` and `values` always hold the same key set. Only construction and
/// [`MetadataRecord::sort`] touch either of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    keys: Vec<String>,
    values: HashMap<String, String>,
    duplicates: Vec<String>,
    sorted: bool,
}

impl MetadataRecord {
    /// Builds a record in extraction order. A key seen more than once keeps
    /// its first value; later occurrences are recorded in `duplicates`.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = MetadataRecord::default();
        for (key, value) in entries {
            let key = key.into();
            if record.values.contains_key(&key) {
                warn!(key = %key, "duplicate metadata key, keeping first value");
                record.duplicates.push(key);
                continue;
            }
            record.values.insert(key.clone(), value.into());
            record.keys.push(key);
        }
        record
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Keys in display order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// `(key, value)` at position `index` in display order.
    pub fn entry(&self, index: usize) -> Option<(&str, &str)> {
        let key = self.keys.get(index)?;
        let value = self.values.get(key)?;
        Some((key.as_str(), value.as_str()))
    }

    /// Keys that appeared more than once in the source, in the order seen.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    /// Reorders keys lexicographically. Values are untouched.
    pub fn sort(&mut self) {
        self.keys.sort();
        self.sorted = true;
    }

    /// `true` once [`MetadataRecord::sort`] has run; the ordering-based
    /// refinement only applies to sorted records.
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }
}
