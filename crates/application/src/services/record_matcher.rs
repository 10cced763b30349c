use cascade_dns_domain::dns_query::normalize_name;
use cascade_dns_domain::{DnsQuery, RecordType};
use hickory_proto::rr::{RData, Record};
use tracing::{debug, info, warn};

use super::record_text::parse_record;

/// Answers produced from a list of record lines.
#[derive(Debug, Default)]
pub struct MatchOutcome {
    pub answers: Vec<Record>,
    /// Lines that failed to parse.
    pub skipped: usize,
    /// Target of a CNAME owned by the query name when the query was not
    /// for CNAME. The alias is reported and never chased.
    pub unresolved_alias: Option<String>,
}

/// Turns stored record text into answer records for one question.
pub struct RecordMatcher;

impl RecordMatcher {
    /// True when `record` may be returned for `query`.
    ///
    /// Owner matches the question name, or either side is a CNAME.
    pub fn matches(query: &DnsQuery, record: &Record) -> bool {
        owner_of(record) == *query.name
            || query.record_type.is_cname()
            || RecordType::from(u16::from(record.record_type())).is_cname()
    }

    pub fn build_answers<S: AsRef<str>>(query: &DnsQuery, lines: &[S], ttl: u32) -> MatchOutcome {
        let mut outcome = MatchOutcome::default();

        for line in lines {
            let line = line.as_ref();
            let mut record = match parse_record(line) {
                Ok(record) => record,
                Err(e) => {
                    warn!(error = %e, line = %line, "Skipping unparsable record");
                    outcome.skipped += 1;
                    continue;
                }
            };

            if !Self::matches(query, &record) {
                debug!(
                    domain = %query.name,
                    owner = %record.name(),
                    record_type = %record.record_type(),
                    "Record excluded from answer"
                );
                continue;
            }

            record.set_ttl(ttl);

            if !query.record_type.is_cname() && owner_of(&record) == *query.name {
                if let RData::CNAME(target) = record.data() {
                    let target = target.0.to_ascii();
                    info!(
                        domain = %query.name,
                        target = %target,
                        "CNAME found for query, alias not followed"
                    );
                    outcome.unresolved_alias.get_or_insert(target);
                }
            }

            outcome.answers.push(record);
        }

        outcome
    }
}

fn owner_of(record: &Record) -> String {
    normalize_name(&record.name().to_ascii())
}
