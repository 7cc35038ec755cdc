mod file_ops;
pub mod types;

use std::io::{Read, Write};

pub use self::file_ops::HistoryFile;
pub use self::types::{HistoryError, HistoryRecord};

/// Append-only log of executed lines, indexed densely from 0 in execution
/// order. Records are never removed one at a time; only `clear` and `load`
/// replace the whole sequence.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HistoryStore {
    records: Vec<HistoryRecord>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, command: impl Into<String>, arguments: Vec<String>) -> usize {
        self.records.push(HistoryRecord::new(command, arguments));
        self.records.len() - 1
    }

    pub fn get(&self, index: usize) -> Result<&HistoryRecord, HistoryError> {
        self.records.get(index).ok_or(HistoryError::IndexOutOfRange {
            index,
            len: self.records.len(),
        })
    }

    /// Index of the most recently appended record, `None` when empty.
    pub fn last_index(&self) -> Option<usize> {
        self.records.len().checked_sub(1)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    /// Renders records newest first as `<offset>: <line>`, where offset 0 is
    /// the most recently appended record.
    pub fn list_reverse(&self) -> Vec<String> {
        self.records
            .iter()
            .rev()
            .enumerate()
            .map(|(offset, record)| format!("{}: {}", offset, record))
            .collect()
    }

    /// Replaces the store with the records read from `source`. On a parse
    /// failure the current records are kept.
    pub fn load<R: Read>(&mut self, source: R) -> Result<usize, HistoryError> {
        let records = file_ops::decode(source)?;
        self.records = records;
        Ok(self.records.len())
    }

    pub fn save<W: Write>(&self, sink: W) -> Result<(), HistoryError> {
        file_ops::encode(&self.records, sink)
    }
}
