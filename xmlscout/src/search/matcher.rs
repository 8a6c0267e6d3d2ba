use crate::document::Record;
use crate::predicate::SearchPredicate;

/// Evaluates a [`SearchPredicate`] against records and documents
#[derive(Debug, Clone, Copy)]
pub struct DocumentMatcher<'a> {
    predicate: &'a SearchPredicate,
}

impl<'a> DocumentMatcher<'a> {
    pub fn new(predicate: &'a SearchPredicate) -> Self {
        Self { predicate }
    }

    /// A record matches when every term equals exactly. A missing field never
    /// matches. Stops at the first mismatching term.
    pub fn record_matches(&self, record: &Record) -> bool {
        self.predicate
            .terms()
            .iter()
            .all(|term| record.get(&term.field) == Some(term.value.as_str()))
    }

    /// A document matches when any record matches. Stops at the first match.
    pub fn document_matches(&self, records: &[Record]) -> bool {
        records.iter().any(|record| self.record_matches(record))
    }
}
