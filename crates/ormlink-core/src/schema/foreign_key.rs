//! Foreign key synthesis.

use super::PhysicalColumn;
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// A foreign key derived from the join columns of an owning association.
#[derive(
    Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
pub struct ForeignKey {
    /// Synthesized constraint name.
    pub name: String,
    /// Table holding the join columns.
    pub table_name: String,
    /// Table holding the referenced primary key.
    pub reference_table_name: String,
    /// Join column names, in key order.
    pub columns: Vec<String>,
    /// Referenced column names, aligned with `columns`.
    pub referenced_columns: Vec<String>,
}

impl ForeignKey {
    /// Build a foreign key from join columns.
    ///
    /// Columns without a referenced column are ignored.
    pub fn new(
        table_name: impl Into<String>,
        reference_table_name: impl Into<String>,
        columns: &[PhysicalColumn],
    ) -> Self {
        let reference_table_name = reference_table_name.into();
        let (columns, referenced_columns): (Vec<_>, Vec<_>) = columns
            .iter()
            .filter_map(|c| {
                c.referenced_column
                    .as_ref()
                    .map(|r| (c.name.clone(), r.clone()))
            })
            .unzip();
        let name = generate_name(&reference_table_name, &referenced_columns);

        Self {
            name,
            table_name: table_name.into(),
            reference_table_name,
            columns,
            referenced_columns,
        }
    }
}

/// Foreign key name: the referenced table followed by the referenced column
/// names, all joined with `_`.
///
/// The name depends only on the referenced side, so two associations from one
/// table to the same target get the same name. Names are not unique keys.
pub fn generate_name(reference_table_name: &str, referenced_columns: &[String]) -> String {
    format!("{}_{}", reference_table_name, referenced_columns.join("_"))
}
