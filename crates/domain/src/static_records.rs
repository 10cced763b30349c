//! Static authority data.
//!
//! The store is built once at startup and never mutated afterwards; it is
//! shared across request tasks behind an `Arc` without any lock.

use crate::config::StaticRecordConfig;
use crate::dns_query::normalize_name;
use crate::{DnsQuery, DomainError, RecordType};
use rustc_hash::FxHashMap;
use std::sync::Arc;

type RecordsByType = FxHashMap<RecordType, Vec<String>>;

/// Immutable map of `name -> type -> record lines`.
///
/// Every stored line is a full presentation-format record
/// (`<owner> <ttl> IN <TYPE> <rdata>`), ready for the record parser.
#[derive(Debug, Default)]
pub struct StaticRecordStore {
    records: FxHashMap<Arc<str>, RecordsByType>,
}

impl StaticRecordStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> StaticRecordStoreBuilder {
        StaticRecordStoreBuilder::default()
    }

    /// Builds the store from `[[static_records]]` tables. `ttl` is written
    /// into each generated record line.
    pub fn from_config(entries: &[StaticRecordConfig], ttl: u32) -> Result<Self, DomainError> {
        let mut builder = StaticRecordStoreBuilder::default().with_ttl(ttl);
        for entry in entries {
            let record_type = entry.parsed_type().map_err(|e| {
                DomainError::ConfigError(format!("static record '{}': {}", entry.name, e))
            })?;
            for value in &entry.values {
                builder = builder.record(&entry.name, record_type, value);
            }
        }
        Ok(builder.build())
    }

    /// Record lines for the exact `(name, type)` of the query, if any.
    pub fn lookup(&self, query: &DnsQuery) -> Option<&[String]> {
        self.records
            .get(query.name.as_ref())?
            .get(&query.record_type)
            .map(Vec::as_slice)
    }

    /// True when some record type is defined for `name`.
    pub fn contains_name(&self, name: &str) -> bool {
        self.records.contains_key(normalize_name(name).as_str())
    }

    /// Number of `(name, type)` entries.
    pub fn len(&self) -> usize {
        self.records.values().map(|by_type| by_type.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(|name| name.as_ref())
    }
}

#[derive(Debug)]
pub struct StaticRecordStoreBuilder {
    records: FxHashMap<Arc<str>, RecordsByType>,
    ttl: u32,
}

impl Default for StaticRecordStoreBuilder {
    fn default() -> Self {
        Self {
            records: FxHashMap::default(),
            ttl: 60,
        }
    }
}

impl StaticRecordStoreBuilder {
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Adds one record from its rdata, e.g. `record("example.com", A, "93.184.216.34")`.
    pub fn record(self, name: &str, record_type: RecordType, rdata: &str) -> Self {
        let owner = normalize_name(name);
        let line = format!(
            "{} {} IN {} {}",
            owner,
            self.ttl,
            record_type,
            rdata.trim()
        );
        self.push(owner, record_type, line)
    }

    /// Adds a complete record line under `(name, type)` without rewriting it.
    pub fn line(self, name: &str, record_type: RecordType, line: &str) -> Self {
        self.push(normalize_name(name), record_type, line.trim().to_string())
    }

    fn push(mut self, owner: String, record_type: RecordType, line: String) -> Self {
        self.records
            .entry(Arc::from(owner))
            .or_default()
            .entry(record_type)
            .or_default()
            .push(line);
        self
    }

    pub fn build(self) -> StaticRecordStore {
        StaticRecordStore {
            records: self.records,
        }
    }
}
