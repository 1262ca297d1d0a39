//! Identifier value allocation at insert time.

use super::def::{SequenceGeneratorDef, TableGeneratorDef};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Source of identifier values for sequence and table generators.
///
/// Implementations are shared between threads once the metamodel is built.
pub trait IdAllocator: Send + Sync {
    /// Next value of a sequence generator.
    fn next_sequence(&self, generator: &SequenceGeneratorDef) -> i64;

    /// Next value of a table generator.
    fn next_table_value(&self, generator: &TableGeneratorDef) -> i64;
}

/// Values reserved by one generator and not yet handed out: `next..end`.
#[derive(Debug, Default, Clone, Copy)]
struct Block {
    next: i64,
    end: i64,
}

impl Block {
    fn reserved(start: i64, allocation_size: u32) -> Self {
        Self {
            next: start,
            end: start + i64::from(allocation_size.max(1)),
        }
    }

    fn take(&mut self) -> Option<i64> {
        (self.next < self.end).then(|| {
            let value = self.next;
            self.next += 1;
            value
        })
    }
}

/// In-process allocator.
///
/// Generators reserve `allocation_size` values at a time from a backing
/// counter and hand them out one by one. Sequence counters are keyed by
/// sequence name. Table rows are keyed by `(table, pk_column_value)`, so
/// generators naming the same sequence or row reserve disjoint blocks of the
/// same counter.
#[derive(Debug, Default)]
pub struct InMemoryAllocator {
    /// Sequence name -> first value of the next unreserved block.
    sequences: DashMap<String, i64>,
    /// Table row -> first value of the next unreserved block.
    table_rows: Mutex<HashMap<(String, String), i64>>,
    sequence_blocks: DashMap<String, Block>,
    table_blocks: DashMap<String, Block>,
}

impl InMemoryAllocator {
    /// Create an allocator with no state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored value of a sequence, if any block was reserved from it.
    pub fn sequence_value(&self, sequence_name: &str) -> Option<i64> {
        self.sequences.get(sequence_name).map(|v| *v)
    }

    /// Stored value of a table row, if any block was reserved from it.
    pub fn table_row(&self, table: &str, pk_column_value: &str) -> Option<i64> {
        self.table_rows
            .lock()
            .get(&(table.to_string(), pk_column_value.to_string()))
            .copied()
    }

    fn reserve_sequence(&self, generator: &SequenceGeneratorDef) -> i64 {
        let mut stored = self
            .sequences
            .entry(generator.sequence_name.clone())
            .or_insert(generator.initial_value);
        let start = *stored;
        *stored = start + i64::from(generator.allocation_size.max(1));
        start
    }

    fn reserve_table_row(&self, generator: &TableGeneratorDef) -> i64 {
        let key = (generator.table.clone(), generator.pk_column_value.clone());
        let mut rows = self.table_rows.lock();
        let stored = rows.entry(key).or_insert(generator.initial_value);
        let start = *stored;
        *stored = start + i64::from(generator.allocation_size.max(1));
        start
    }
}

impl IdAllocator for InMemoryAllocator {
    fn next_sequence(&self, generator: &SequenceGeneratorDef) -> i64 {
        // The entry guard serializes callers of one generator.
        let mut block = self.sequence_blocks.entry(generator.name.clone()).or_default();
        match block.take() {
            Some(value) => value,
            None => {
                *block = Block::reserved(self.reserve_sequence(generator), generator.allocation_size);
                block.take().unwrap_or(generator.initial_value)
            }
        }
    }

    fn next_table_value(&self, generator: &TableGeneratorDef) -> i64 {
        let mut block = self.table_blocks.entry(generator.name.clone()).or_default();
        match block.take() {
            Some(value) => value,
            None => {
                *block = Block::reserved(self.reserve_table_row(generator), generator.allocation_size);
                block.take().unwrap_or(generator.initial_value)
            }
        }
    }
}
