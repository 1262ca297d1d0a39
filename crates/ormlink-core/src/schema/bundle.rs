//! Physical schema snapshot.

use super::Table;
use crate::error::Error;
use crate::generator::{SequenceGeneratorDef, TableGeneratorDef};
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// Snapshot of everything a DDL emitter needs: tables with their keys, and
/// the generators identifier values are drawn from.
#[derive(
    Debug, Clone, PartialEq, Eq, Default, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
pub struct PhysicalSchema {
    /// Entity tables in declaration order.
    pub tables: Vec<Table>,
    /// Sequence generators in registration order.
    pub sequence_generators: Vec<SequenceGeneratorDef>,
    /// Table generators in registration order.
    pub table_generators: Vec<TableGeneratorDef>,
}

impl PhysicalSchema {
    /// Get a table by name.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Get the table of an entity.
    pub fn table_for_entity(&self, entity: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.entity == entity)
    }

    /// Total number of foreign keys.
    pub fn foreign_key_count(&self) -> usize {
        self.tables.iter().map(|t| t.foreign_keys.len()).sum()
    }

    /// Tables whose foreign keys reference the given table.
    pub fn referencing(&self, table: &str) -> Vec<&Table> {
        self.tables
            .iter()
            .filter(|t| t.foreign_keys.iter().any(|fk| fk.reference_table_name == table))
            .collect()
    }

    /// Serialize the schema to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a schema from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(bytes)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}
