//! Record extraction from DNS cache diagnostic text.
//!
//! The diagnostic dump is free-form, but every cache entry we care about
//! carries three consecutive labelled lines:
//!
//! ```text
//!     Record Name ............ example.com
//!     Record Type ............ A
//!     Record Data ............ 93.184.216.34
//! ```
//!
//! Each label is followed by horizontal whitespace, exactly twelve dots and
//! more whitespace. The rest of the line is the field. Blocks whose type
//! token differs from the extractor's tag are skipped whole, and truncated
//! blocks at the end of the text simply never match.

use std::sync::OnceLock;

use regex::{CaptureMatches, Regex};

use crate::config::DEFAULT_RECORD_TYPE;

/// Name / type / data template. Groups: 1 = name, 2 = type, 3 = data.
const RECORD_PATTERN: &str = concat!(
    r"Record Name[ \t]+\.{12}[ \t]+([^\r\n]+?)[ \t]*\r?\n",
    r"[^\r\n]*?Record Type[ \t]+\.{12}[ \t]+(\S+)[ \t]*\r?\n",
    r"[^\r\n]*?Record Data[ \t]+\.{12}[ \t]+([^\r\n]+?)[ \t]*(?:\r?\n|$)",
);

static RECORD_REGEX: OnceLock<Regex> = OnceLock::new();

fn record_regex() -> &'static Regex {
    RECORD_REGEX.get_or_init(|| {
        Regex::new(RECORD_PATTERN).expect("record pattern is a valid regex")
    })
}

/// One cache entry: a host name and the address it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    pub name: String,
    pub value: String,
}

impl Record {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// Pulls `Record`s of a single type out of diagnostic text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordExtractor {
    record_type: String,
}

impl RecordExtractor {
    /// Extractor keeping only blocks whose type token equals `record_type`.
    pub fn new(record_type: impl Into<String>) -> Self {
        Self { record_type: record_type.into() }
    }

    /// Type tag this extractor keeps.
    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    /// Lazily scan `text` left to right.
    ///
    /// Matches never overlap: after each block the scan resumes right past
    /// its data line. Each call is an independent pass over the whole text.
    pub fn extract<'e, 't>(&'e self, text: &'t str) -> Records<'e, 't> {
        Records {
            captures: record_regex().captures_iter(text),
            record_type: &self.record_type,
        }
    }

    /// Collect every matching record in scan order.
    pub fn extract_all(&self, text: &str) -> Vec<Record> {
        self.extract(text).collect()
    }
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_RECORD_TYPE)
    }
}

/// Iterator returned by [`RecordExtractor::extract`].
pub struct Records<'e, 't> {
    captures: CaptureMatches<'static, 't>,
    record_type: &'e str,
}

impl Iterator for Records<'_, '_> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        for caps in self.captures.by_ref() {
            if &caps[2] != self.record_type {
                continue;
            }
            return Some(Record::new(&caps[1], &caps[3]));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOTS: &str = "............";

    fn block(name: &str, kind: &str, data: &str) -> String {
        format!(
            "    Record Name {d} {}\n    Record Type {d} {}\n    Record Data {d} {}\n\n",
            name, kind, data, d = DOTS
        )
    }

    #[test]
    fn test_single_record() {
        let text = "Record Name ............ a.com\nRecord Type ............ A\nRecord Data ............ 1.2.3.4\n";
        let records = RecordExtractor::default().extract_all(text);
        assert_eq!(records, vec![Record::new("a.com", "1.2.3.4")]);
    }

    #[test]
    fn test_other_type_skipped() {
        let text = "Record Name ............ a.com\nRecord Type ............ AAAA\nRecord Data ............ ::1\n";
        assert!(RecordExtractor::default().extract_all(text).is_empty());
    }

    #[test]
    fn test_custom_type_tag() {
        let text = format!("{}{}", block("a.com", "A", "1.1.1.1"), block("a.com", "AAAA", "::1"));
        let records = RecordExtractor::new("AAAA").extract_all(&text);
        assert_eq!(records, vec![Record::new("a.com", "::1")]);
    }

    #[test]
    fn test_mixed_blocks_in_order() {
        let text = format!(
            "Windows IP Configuration\n\n    a.com\n    ----------------------------------------\n{}{}{}{}",
            block("a.com", "A", "1.1.1.1"),
            block("v6.com", "AAAA", "fe80::1"),
            block("b.com", "A", "2.2.2.2"),
            block("a.com", "A", "3.3.3.3"),
        );
        let records = RecordExtractor::default().extract_all(&text);
        assert_eq!(records, vec![
            Record::new("a.com", "1.1.1.1"),
            Record::new("b.com", "2.2.2.2"),
            Record::new("a.com", "3.3.3.3"),
        ]);
    }

    #[test]
    fn test_truncated_tail_dropped() {
        let text = format!(
            "{}    Record Name {d} c.com\n    Record Type {d} A\n",
            block("b.com", "A", "2.2.2.2"),
            d = DOTS
        );
        let records = RecordExtractor::default().extract_all(&text);
        assert_eq!(records, vec![Record::new("b.com", "2.2.2.2")]);
    }

    #[test]
    fn test_data_line_at_end_of_input() {
        let text = "Record Name ............ a.com\nRecord Type ............ A\nRecord Data ............ 1.2.3.4";
        let records = RecordExtractor::default().extract_all(text);
        assert_eq!(records, vec![Record::new("a.com", "1.2.3.4")]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "Record Name ............ a.com\r\nRecord Type ............ A\r\nRecord Data ............ 1.2.3.4\r\n";
        let records = RecordExtractor::default().extract_all(text);
        assert_eq!(records, vec![Record::new("a.com", "1.2.3.4")]);
    }

    #[test]
    fn test_wrong_dot_count_ignored() {
        let text = "Record Name ........ a.com\nRecord Type ........ A\nRecord Data ........ 1.2.3.4\n";
        assert!(RecordExtractor::default().extract_all(text).is_empty());
    }

    #[test]
    fn test_type_must_be_exact_token() {
        let text = "Record Name ............ a.com\nRecord Type ............ AB\nRecord Data ............ 1.2.3.4\n";
        assert!(RecordExtractor::default().extract_all(text).is_empty());
    }

    #[test]
    fn test_lazy_and_restartable() {
        let text = format!("{}{}", block("a.com", "A", "1"), block("b.com", "A", "2"));
        let extractor = RecordExtractor::default();

        let mut records = extractor.extract(&text);
        assert_eq!(records.next(), Some(Record::new("a.com", "1")));

        // A fresh pass starts over from the beginning
        assert_eq!(extractor.extract(&text).count(), 2);
        assert_eq!(records.next(), Some(Record::new("b.com", "2")));
        assert_eq!(records.next(), None);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(RecordExtractor::default().extract("").count(), 0);
    }
}
