//! Cache value encoding: record lines joined by a single delimiter.
//!
//! The delimiter is not escaped. A record whose text contains `|` will be
//! split into fragments on read, and the fragments are dropped by the
//! matcher as unparsable.

pub const RECORD_DELIMITER: &str = "|";

pub fn join_records<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(RECORD_DELIMITER)
}

pub fn split_records(value: &str) -> Vec<&str> {
    value
        .split(RECORD_DELIMITER)
        .filter(|line| !line.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_uses_pipe() {
        let value = join_records(&["a. 1 IN A 192.0.2.1", "a. 1 IN A 192.0.2.2"]);
        assert_eq!(value, "a. 1 IN A 192.0.2.1|a. 1 IN A 192.0.2.2");
    }

    #[test]
    fn test_split_ignores_empty_segments() {
        assert_eq!(split_records("x||y|"), vec!["x", "y"]);
        assert!(split_records("").is_empty());
    }

    #[test]
    fn test_pipe_inside_record_is_not_escaped() {
        let value = join_records(&["t. 1 IN TXT \"a|b\""]);
        assert_eq!(split_records(&value).len(), 2);
    }
}
