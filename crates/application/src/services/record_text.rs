//! Presentation-format record text.
//!
//! Parses single-line records of the form
//! `<owner> [<ttl>] [<class>] <TYPE> <rdata...>` into hickory records and
//! renders records back into the same form. The owner is taken as fully
//! qualified whether or not it ends with a dot. Rdata goes through hickory's
//! zone-file parser with no `$ORIGIN`, so names inside rdata should be
//! written absolute.

use cascade_dns_domain::{DomainError, RecordType};
use hickory_proto::rr::{DNSClass, Name, RData, Record, RecordType as WireRecordType};
use hickory_proto::serialize::txt::RDataParser;
use std::str::FromStr;

/// Parses one record line.
pub fn parse_record(line: &str) -> Result<Record, DomainError> {
    let (owner, mut rest) = next_field(line)
        .ok_or_else(|| DomainError::InvalidRecord("empty record".to_string()))?;
    let name = parse_name(owner)?;

    let mut ttl: Option<u32> = None;
    let mut class: Option<DNSClass> = None;
    let record_type = loop {
        let (field, remainder) = next_field(rest).ok_or_else(|| {
            DomainError::InvalidRecord(format!("missing record type in '{}'", line))
        })?;
        rest = remainder;

        if ttl.is_none() && field.bytes().all(|b| b.is_ascii_digit()) {
            let value = field.parse::<u32>().map_err(|e| {
                DomainError::InvalidRecord(format!("invalid TTL '{}': {}", field, e))
            })?;
            ttl = Some(value);
            continue;
        }
        if class.is_none() {
            if let Some(parsed) = parse_class(field) {
                class = Some(parsed);
                continue;
            }
        }
        break RecordType::from_str(field)
            .map_err(|e| DomainError::InvalidRecord(format!("{} in '{}'", e, line)))?;
    };

    let rdata_text = rest.trim();
    if rdata_text.is_empty() || rdata_text.starts_with(';') {
        return Err(DomainError::InvalidRecord(format!(
            "{} record without data",
            record_type
        )));
    }

    let wire_type = WireRecordType::from(u16::from(record_type));
    let rdata = RData::try_from_str(wire_type, rdata_text).map_err(|e| {
        DomainError::InvalidRecord(format!(
            "invalid {} data '{}': {}",
            record_type, rdata_text, e
        ))
    })?;

    let mut record = Record::from_rdata(name, ttl.unwrap_or(0), rdata);
    record.set_dns_class(class.unwrap_or(DNSClass::IN));
    Ok(record)
}

/// Renders a record as `<owner> <ttl> <class> <TYPE> <rdata>`.
///
/// Output of this function is accepted by [`parse_record`].
pub fn render_record(record: &Record) -> String {
    let rdata = match record.data() {
        RData::TXT(txt) => txt
            .txt_data()
            .iter()
            .map(|segment| quote(&String::from_utf8_lossy(segment)))
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    };

    format!(
        "{} {} {} {} {}",
        record.name(),
        record.ttl(),
        record.dns_class(),
        RecordType::from_u16(u16::from(record.record_type())),
        rdata
    )
}

/// Parses a domain name, treating it as fully qualified.
pub fn parse_name(text: &str) -> Result<Name, DomainError> {
    let fqdn = if text.ends_with('.') {
        text.to_string()
    } else {
        format!("{}.", text)
    };
    Name::from_ascii(&fqdn)
        .map_err(|e| DomainError::InvalidDomainName(format!("'{}': {}", text, e)))
}

/// Splits off the next whitespace-delimited field. Stops at a `;` comment.
fn next_field(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() || text.starts_with(';') {
        return None;
    }
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    Some(text.split_at(end))
}

fn parse_class(text: &str) -> Option<DNSClass> {
    match text.to_ascii_uppercase().as_str() {
        "IN" => Some(DNSClass::IN),
        "CH" => Some(DNSClass::CH),
        "HS" => Some(DNSClass::HS),
        "NONE" => Some(DNSClass::NONE),
        "ANY" => Some(DNSClass::ANY),
        _ => None,
    }
}

fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        if ch == '"' || ch == '\\' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}
