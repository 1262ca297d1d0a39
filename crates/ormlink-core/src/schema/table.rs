//! Physical tables.

use super::{ForeignKey, PhysicalColumn};
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// The primary table of an entity.
#[derive(
    Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Entity stored in the table.
    pub entity: String,
    /// Columns in mapping order.
    pub columns: Vec<PhysicalColumn>,
    /// Primary key column names.
    pub primary_key: Vec<String>,
    /// Foreign keys owned by this table.
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    /// Create an empty table.
    pub fn new(name: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity: entity.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Get a column by name.
    pub fn get_column(&self, name: &str) -> Option<&PhysicalColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Primary key columns in key order.
    pub fn primary_key_columns(&self) -> impl Iterator<Item = &PhysicalColumn> {
        self.primary_key
            .iter()
            .filter_map(move |name| self.get_column(name))
    }

    /// Columns produced by a mapping path or any path below it.
    pub fn columns_for_path<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a PhysicalColumn> {
        self.columns.iter().filter(move |c| {
            c.mapping_path == path
                || (c.mapping_path.starts_with(path)
                    && c.mapping_path[path.len()..].starts_with('.'))
        })
    }

    /// Add a column. Returns `false` if the name is taken, leaving the table
    /// unchanged.
    pub(crate) fn add_column(&mut self, column: PhysicalColumn) -> bool {
        if self.get_column(&column.name).is_some() {
            return false;
        }
        if column.primary_key {
            self.primary_key.push(column.name.clone());
        }
        self.columns.push(column);
        true
    }

    /// Add a foreign key unless an identical one is present.
    ///
    /// Comparison covers the columns as well as the name: keys sharing a
    /// synthesized name over different join columns are both kept.
    pub(crate) fn add_foreign_key(&mut self, foreign_key: ForeignKey) {
        if !self.foreign_keys.contains(&foreign_key) {
            self.foreign_keys.push(foreign_key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScalarType;

    fn column(name: &str, path: &str, primary_key: bool) -> PhysicalColumn {
        PhysicalColumn {
            name: name.to_string(),
            table: "Person".to_string(),
            value_type: ScalarType::String,
            nullable: !primary_key,
            unique: false,
            insertable: true,
            updatable: true,
            length: 255,
            precision: 0,
            scale: 0,
            primary_key,
            referenced_column: None,
            mapping_path: path.to_string(),
        }
    }

    #[test]
    fn test_add_columns() {
        let mut table = Table::new("Person", "Person");
        assert!(table.add_column(column("id", "id", true)));
        assert!(table.add_column(column("name", "name", false)));
        assert!(!table.add_column(column("name", "nickname", false)));

        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.primary_key, vec!["id"]);
        assert_eq!(table.primary_key_columns().count(), 1);
    }

    #[test]
    fn test_columns_for_path() {
        let mut table = Table::new("Person", "Person");
        table.add_column(column("address_city", "address.city", false));
        table.add_column(column("address_zip", "address.zip", false));
        table.add_column(column("addressee", "addressee", false));

        assert_eq!(table.columns_for_path("address").count(), 2);
        assert_eq!(table.columns_for_path("address.city").count(), 1);
        assert_eq!(table.columns_for_path("addressee").count(), 1);
    }

    #[test]
    fn test_foreign_keys_are_not_duplicated() {
        let mut table = Table::new("Customer", "Customer");
        let fk = ForeignKey {
            name: "Invoice_ID".into(),
            table_name: "Customer".into(),
            reference_table_name: "Invoice".into(),
            columns: vec!["invoice_ID".into()],
            referenced_columns: vec!["ID".into()],
        };

        table.add_foreign_key(fk.clone());
        table.add_foreign_key(fk);

        assert_eq!(table.foreign_keys.len(), 1);
    }

    #[test]
    fn test_foreign_keys_sharing_a_name() {
        let mut table = Table::new("Order", "Order");
        let fk = |column: &str| ForeignKey {
            name: "Customer_id".into(),
            table_name: "Order".into(),
            reference_table_name: "Customer".into(),
            columns: vec![column.into()],
            referenced_columns: vec!["id".into()],
        };

        table.add_foreign_key(fk("buyer_id"));
        table.add_foreign_key(fk("payer_id"));

        assert_eq!(table.foreign_keys.len(), 2);
        assert!(table.foreign_keys.iter().all(|k| k.name == "Customer_id"));
    }
}
