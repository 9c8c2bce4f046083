//! Slug-keyed content store

use indexmap::map::Entry;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use super::record::Record;

lazy_static! {
    static ref SLUG_RE: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

/// Errors raised while building a store
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("duplicate slug `{slug}`: defined by both {first} and {second}")]
    DuplicateSlug {
        slug: String,
        first: String,
        second: String,
    },

    #[error("slug `{slug}` in {file} is not URL-safe (use lowercase letters, digits and single hyphens)")]
    InvalidSlug { slug: String, file: String },
}

/// Check that a slug is lowercase, alphanumeric and hyphen separated
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_RE.is_match(slug)
}

/// Records keyed by slug, in insertion order
#[derive(Debug, Clone)]
pub struct ContentStore<T> {
    records: IndexMap<String, T>,
}

impl<T> Default for ContentStore<T> {
    fn default() -> Self {
        Self {
            records: IndexMap::new(),
        }
    }
}

impl<T: Record> ContentStore<T> {
    /// Build a store, failing on the first invalid or repeated slug
    pub fn from_records<I>(records: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut map: IndexMap<String, T> = IndexMap::new();

        for record in records {
            if !is_valid_slug(record.slug()) {
                return Err(StoreError::InvalidSlug {
                    slug: record.slug().to_string(),
                    file: record.source().to_string(),
                });
            }

            match map.entry(record.slug().to_string()) {
                Entry::Occupied(existing) => {
                    return Err(StoreError::DuplicateSlug {
                        slug: existing.key().clone(),
                        first: existing.get().source().to_string(),
                        second: record.source().to_string(),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
            }
        }

        Ok(Self { records: map })
    }

    /// Look up a record by exact slug
    pub fn get(&self, slug: &str) -> Option<&T> {
        self.records.get(slug)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The records before and after `slug` in store order
    pub fn neighbors(&self, slug: &str) -> (Option<&T>, Option<&T>) {
        let Some(index) = self.records.get_index_of(slug) else {
            return (None, None);
        };
        let prev = index
            .checked_sub(1)
            .and_then(|i| self.records.get_index(i))
            .map(|(_, record)| record);
        let next = self.records.get_index(index + 1).map(|(_, record)| record);
        (prev, next)
    }
}
