//! Invariant checking for deterministic simulation testing.
//!
//! After each operation the checker compares the store's outcome with the
//! model's and inspects the raw category blobs:
//!
//! - every blob starts with the header line
//! - every record line decodes, and ids are strictly ascending
//! - each record sits in the blob named by its category
//! - no id appears in two categories
//! - the union of all blobs equals the model

use std::collections::BTreeMap;

use crate::storage::codec::{self, HEADER};
use crate::types::{ItemId, Record};

use super::model::{ModelInventory, Outcome};
use super::operation_gen::Operation;

/// A violated invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violation.
    pub description: String,
    /// Index of the operation after which it was detected.
    pub operation_index: usize,
    /// Additional context.
    pub context: String,
}

/// Collects invariant violations over a simulation run.
#[derive(Debug, Default)]
pub struct InvariantChecker {
    violations: Vec<InvariantViolation>,
}

impl InvariantChecker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn violations(&self) -> &[InvariantViolation] {
        &self.violations
    }

    pub fn add_violation(&mut self, violation: InvariantViolation) {
        tracing::warn!(
            "invariant violated after operation {}: {}",
            violation.operation_index,
            violation.description
        );
        self.violations.push(violation);
    }

    fn violation(&mut self, operation_index: usize, description: String, context: String) {
        self.add_violation(InvariantViolation {
            description,
            operation_index,
            context,
        });
    }

    /// Compare the store's outcome with the model's.
    pub fn check_outcome(
        &mut self,
        operation_index: usize,
        operation: &Operation,
        expected: &Outcome,
        actual: &Outcome,
    ) {
        if expected != actual {
            self.violation(
                operation_index,
                "store outcome differs from model".to_string(),
                format!("operation: {operation:?}\nexpected: {expected:?}\nactual: {actual:?}"),
            );
        }
    }

    /// Check the raw category blobs against the file-format invariants and
    /// the model.
    pub fn check_storage(
        &mut self,
        operation_index: usize,
        blobs: &BTreeMap<String, String>,
        model: &ModelInventory,
    ) {
        let mut seen: BTreeMap<ItemId, Record> = BTreeMap::new();

        for (category, contents) in blobs {
            let mut lines = codec::record_lines(contents);
            if lines.next().map(|(_, header)| header) != Some(HEADER) {
                self.violation(
                    operation_index,
                    format!("category '{category}' does not start with the header"),
                    contents.clone(),
                );
            }

            let mut previous: Option<ItemId> = None;
            for (line_number, line) in lines {
                let record = match codec::decode_record(line) {
                    Ok(record) => record,
                    Err(e) => {
                        self.violation(
                            operation_index,
                            format!("category '{category}' line {line_number} does not decode: {e}"),
                            line.to_string(),
                        );
                        continue;
                    }
                };

                if previous.is_some_and(|prev| prev >= record.id) {
                    self.violation(
                        operation_index,
                        format!("category '{category}' ids not strictly ascending at line {line_number}"),
                        line.to_string(),
                    );
                }
                previous = Some(record.id);

                if record.category != *category {
                    self.violation(
                        operation_index,
                        format!(
                            "item {} with category '{}' stored in '{category}'",
                            record.id, record.category
                        ),
                        line.to_string(),
                    );
                }

                if let Some(other) = seen.insert(record.id, record) {
                    self.violation(
                        operation_index,
                        format!("item {} stored in more than one category", other.id),
                        format!("'{}' and '{category}'", other.category),
                    );
                }
            }
        }

        let expected: Vec<&Record> = model.records().collect();
        let stored: Vec<&Record> = seen.values().collect();
        if expected != stored {
            self.violation(
                operation_index,
                "stored records differ from model".to_string(),
                format!("expected {} records, stored {}", model.len(), seen.len()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::codec::LINE_ENDING;

    fn blob(lines: &[&str]) -> String {
        let mut contents = format!("{HEADER}{LINE_ENDING}");
        for line in lines {
            contents.push_str(line);
            contents.push_str(LINE_ENDING);
        }
        contents
    }

    #[test]
    fn test_consistent_storage_passes() {
        let mut model = ModelInventory::new(true);
        model.apply(&Operation::Create(Record::new(
            ItemId(1),
            "Saw",
            "Tools",
            1,
            1.0,
            "Acme",
        )));
        let blobs = BTreeMap::from([
            ("Tools".to_string(), blob(&["1,Saw,Tools,1,1,Acme"])),
            ("Garden".to_string(), blob(&[])),
        ]);

        let mut checker = InvariantChecker::new();
        checker.check_storage(0, &blobs, &model);
        assert!(checker.violations().is_empty(), "{:?}", checker.violations());
    }

    #[test]
    fn test_detects_broken_storage() {
        let model = ModelInventory::new(true);
        let blobs = BTreeMap::from([
            (
                "Tools".to_string(),
                blob(&["2,Saw,Tools,1,1,Acme", "1,Hammer,Tools,1,1,Acme"]),
            ),
            ("Garden".to_string(), blob(&["2,Rake,Tools,1,1,Acme"])),
            ("Office".to_string(), "no header".to_string()),
        ]);

        let mut checker = InvariantChecker::new();
        checker.check_storage(4, &blobs, &model);

        let descriptions: Vec<&str> = checker
            .violations()
            .iter()
            .map(|v| v.description.as_str())
            .collect();
        assert!(descriptions.iter().any(|d| d.contains("does not start with the header")));
        assert!(descriptions.iter().any(|d| d.contains("not strictly ascending")));
        assert!(descriptions.iter().any(|d| d.contains("stored in 'Garden'")));
        assert!(descriptions.iter().any(|d| d.contains("more than one category")));
        assert!(descriptions.iter().any(|d| d.contains("differ from model")));
        assert!(checker.violations().iter().all(|v| v.operation_index == 4));
    }

    #[test]
    fn test_outcome_mismatch() {
        let mut checker = InvariantChecker::new();
        checker.check_outcome(
            1,
            &Operation::Delete(ItemId(1)),
            &Outcome::Changed(true),
            &Outcome::Changed(false),
        );
        assert_eq!(checker.violations().len(), 1);
    }
}
