//! Physical columns.

use crate::model::ScalarType;
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// A column of a physical table after name resolution.
#[derive(
    Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
pub struct PhysicalColumn {
    /// Column name (unique within its table).
    pub name: String,
    /// Table owning the column.
    pub table: String,
    /// Value type stored in the column.
    pub value_type: ScalarType,
    /// Whether the column accepts nulls.
    pub nullable: bool,
    /// Whether the column carries a unique constraint.
    pub unique: bool,
    /// Whether the column is written on insert.
    pub insertable: bool,
    /// Whether the column is written on update.
    pub updatable: bool,
    /// Column length.
    pub length: u32,
    /// Decimal precision (0 when unused).
    pub precision: u32,
    /// Decimal scale (0 when unused).
    pub scale: u32,
    /// Whether the column is part of the primary key.
    pub primary_key: bool,
    /// For join columns, the referenced primary-key column.
    pub referenced_column: Option<String>,
    /// Dotted attribute path the column was produced from.
    pub mapping_path: String,
}

impl PhysicalColumn {
    /// Check if this is a join column.
    pub fn is_join_column(&self) -> bool {
        self.referenced_column.is_some()
    }

    /// Qualified `table.column` name.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.table, self.name)
    }
}
