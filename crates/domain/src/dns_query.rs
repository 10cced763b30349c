use super::RecordType;
use std::sync::Arc;

/// A single question, normalized for lookup.
///
/// `name` is always lowercase with exactly one trailing dot, so it can be
/// compared directly against static-store keys and cache keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuery {
    pub name: Arc<str>,
    pub record_type: RecordType,
}

impl DnsQuery {
    pub fn new(name: &str, record_type: RecordType) -> Self {
        Self {
            name: normalize_name(name).into(),
            record_type,
        }
    }

    /// Key under which answers for this question are cached: `name:type_code`.
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.name, self.record_type.to_u16())
    }
}

/// Lowercases a domain name and gives it canonical FQDN form.
pub fn normalize_name(name: &str) -> String {
    let trimmed = name.trim().trim_end_matches('.');
    let mut normalized = trimmed.to_ascii_lowercase();
    normalized.push('.');
    normalized
}
