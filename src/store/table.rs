//! Table implementation
//!
//! A single ordered collection with contiguous sequential ids.

use crate::error::{Result, StoreError};
use crate::model::Record;

/// An ordered collection of records where position `i` holds id `i + 1`
///
/// Not synchronized: [`RecordStore`](super::RecordStore) owns tables behind
/// its lock.
#[derive(Debug, Clone)]
pub struct Table<T: Record> {
    /// Records in id order
    records: Vec<T>,

    /// Last id handed out by an insert
    counter: u64,
}

impl<T: Record> Table<T> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            counter: 0,
        }
    }

    /// Build a table from records already in id order
    ///
    /// The counter is reconstructed from the id of the last record, which
    /// holds the maximum id as long as the records are contiguous.
    pub fn from_records(records: Vec<T>) -> Self {
        let counter = records.last().map(Record::id).unwrap_or(0);
        Self { records, counter }
    }

    /// Insert a new record (id `0`) or replace an existing one (id in range)
    ///
    /// Returns the stored record with its id populated.
    pub fn insert(&mut self, mut record: T) -> Result<T> {
        if record.is_new() {
            self.counter += 1;
            record.set_id(self.counter);
            self.records.push(record.clone());
            return Ok(record);
        }

        let index = self.index_of(record.id()).ok_or(StoreError::OutOfRange {
            collection: T::KIND,
            id: record.id(),
            len: self.records.len(),
        })?;
        self.records[index] = record.clone();
        Ok(record)
    }

    /// Find a record by id
    pub fn get(&self, id: u64) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Clone every record matching the predicate, in id order
    pub fn list<F>(&self, mut predicate: F) -> Vec<T>
    where
        F: FnMut(&T) -> bool,
    {
        self.records.iter().filter(|r| predicate(r)).cloned().collect()
    }

    /// Delete the record with the given id and renumber the ones after it
    ///
    /// Every record behind the deleted one is re-inserted as new, so its id
    /// drops by one. Ids outside `1..=len` leave the table untouched.
    /// Returns the removed record.
    pub fn delete(&mut self, id: u64) -> Option<T> {
        if self.records.is_empty() {
            return None;
        }

        if self.records.len() == 1 {
            if self.records[0].id() != id {
                return None;
            }
            self.counter = 0;
            return self.records.pop();
        }

        let index = self.index_of(id)?;
        let shifted = self.records.split_off(index + 1);
        let removed = self.records.pop();

        self.counter = self.records.len() as u64;
        for mut record in shifted {
            self.counter += 1;
            record.set_id(self.counter);
            self.records.push(record);
        }

        removed
    }

    /// All records, in id order
    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Last id handed out; the next insert gets `counter() + 1`
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the table holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn index_of(&self, id: u64) -> Option<usize> {
        if id == 0 || id > self.records.len() as u64 {
            return None;
        }
        Some((id - 1) as usize)
    }
}

impl<T: Record> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}
