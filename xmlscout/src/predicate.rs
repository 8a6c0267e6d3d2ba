use serde::Serialize;

use crate::errors::{ScanError, ScanResult};

/// One equality constraint: the record's `field` must equal `value` exactly
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredicateTerm {
    /// Index into the discovered field list
    pub field_index: usize,
    pub field: String,
    pub value: String,
}

/// The validated, immutable set of constraints a record must satisfy.
///
/// Built once per run and shared read-only by every worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchPredicate {
    fields: Vec<String>,
    terms: Vec<PredicateTerm>,
}

impl SearchPredicate {
    /// Builds a predicate from `(field index, target value)` pairs over `fields`
    pub fn new(fields: Vec<String>, selections: Vec<(usize, String)>) -> ScanResult<Self> {
        if selections.is_empty() {
            return Err(ScanError::invalid_selection("no fields selected"));
        }

        let terms = selections
            .into_iter()
            .map(|(field_index, value)| {
                let field = fields.get(field_index).ok_or_else(|| {
                    ScanError::invalid_selection(format!(
                        "field index {} is out of range (0..{})",
                        field_index,
                        fields.len()
                    ))
                })?;
                Ok(PredicateTerm {
                    field_index,
                    field: field.clone(),
                    value,
                })
            })
            .collect::<ScanResult<Vec<_>>>()?;

        Ok(Self { fields, terms })
    }

    pub fn terms(&self) -> &[PredicateTerm] {
        &self.terms
    }

    /// The full field list the indices refer to
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// Parses a comma-separated list of 1-based field numbers ("1,3") into
/// 0-based field indices
pub fn parse_selection(input: &str, field_count: usize) -> ScanResult<Vec<usize>> {
    let indices = input
        .split(',')
        .map(str::trim)
        .map(|token| {
            let number: usize = token.parse().map_err(|_| {
                ScanError::invalid_selection(format!("'{}' is not a field number", token))
            })?;
            if number == 0 || number > field_count {
                return Err(ScanError::invalid_selection(format!(
                    "field number {} is not between 1 and {}",
                    number, field_count
                )));
            }
            Ok(number - 1)
        })
        .collect::<ScanResult<Vec<_>>>()?;

    Ok(indices)
}
