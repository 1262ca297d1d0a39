//! Sequence and table generator definitions.

use crate::model::IdType;
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

fn default_initial_value() -> i64 {
    1
}

fn default_allocation_size() -> u32 {
    50
}

/// A named database sequence used to draw identifier values.
#[derive(
    Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
pub struct SequenceGeneratorDef {
    /// Generator name (unique within the metamodel).
    pub name: String,
    /// Physical sequence name. Blank means the generator name.
    #[serde(default)]
    pub sequence_name: String,
    /// First value handed out.
    #[serde(default = "default_initial_value")]
    pub initial_value: i64,
    /// Values reserved per round trip.
    #[serde(default = "default_allocation_size")]
    pub allocation_size: u32,
}

impl SequenceGeneratorDef {
    /// Create a sequence generator with default parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sequence_name: String::new(),
            initial_value: default_initial_value(),
            allocation_size: default_allocation_size(),
        }
    }

    /// Set the physical sequence name.
    pub fn with_sequence_name(mut self, sequence_name: impl Into<String>) -> Self {
        self.sequence_name = sequence_name.into();
        self
    }

    /// Set the initial value.
    pub fn with_initial_value(mut self, initial_value: i64) -> Self {
        self.initial_value = initial_value;
        self
    }

    /// Set the allocation size.
    pub fn with_allocation_size(mut self, allocation_size: u32) -> Self {
        self.allocation_size = allocation_size;
        self
    }

    /// Fill in defaulted fields.
    pub fn normalized(mut self) -> Self {
        if self.sequence_name.trim().is_empty() {
            self.sequence_name = self.name.clone();
        }
        self
    }
}

/// A generator backed by a row in a dedicated table.
#[derive(
    Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
pub struct TableGeneratorDef {
    /// Generator name (unique within the metamodel).
    pub name: String,
    /// Generator table. Blank means the configured default table.
    #[serde(default)]
    pub table: String,
    /// Column holding the generator key.
    #[serde(default)]
    pub pk_column_name: String,
    /// Column holding the last value.
    #[serde(default)]
    pub value_column_name: String,
    /// Key of this generator's row. Blank means the generator name.
    #[serde(default)]
    pub pk_column_value: String,
    /// First value handed out.
    #[serde(default = "default_initial_value")]
    pub initial_value: i64,
    /// Values reserved per round trip.
    #[serde(default = "default_allocation_size")]
    pub allocation_size: u32,
}

impl TableGeneratorDef {
    /// Create a table generator with default parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: String::new(),
            pk_column_name: String::new(),
            value_column_name: String::new(),
            pk_column_value: String::new(),
            initial_value: default_initial_value(),
            allocation_size: default_allocation_size(),
        }
    }

    /// Set the generator table and its key/value columns.
    pub fn with_table(
        mut self,
        table: impl Into<String>,
        pk_column_name: impl Into<String>,
        value_column_name: impl Into<String>,
    ) -> Self {
        self.table = table.into();
        self.pk_column_name = pk_column_name.into();
        self.value_column_name = value_column_name.into();
        self
    }

    /// Set the key of the generator row.
    pub fn with_pk_column_value(mut self, value: impl Into<String>) -> Self {
        self.pk_column_value = value.into();
        self
    }

    /// Set the initial value.
    pub fn with_initial_value(mut self, initial_value: i64) -> Self {
        self.initial_value = initial_value;
        self
    }

    /// Set the allocation size.
    pub fn with_allocation_size(mut self, allocation_size: u32) -> Self {
        self.allocation_size = allocation_size;
        self
    }

    /// Fill in defaulted fields from the configured default generator.
    pub fn normalized(mut self, defaults: &TableGeneratorDef) -> Self {
        if self.table.trim().is_empty() {
            self.table = defaults.table.clone();
        }
        if self.pk_column_name.trim().is_empty() {
            self.pk_column_name = defaults.pk_column_name.clone();
        }
        if self.value_column_name.trim().is_empty() {
            self.value_column_name = defaults.value_column_name.clone();
        }
        if self.pk_column_value.trim().is_empty() {
            self.pk_column_value = self.name.clone();
        }
        self
    }
}

/// A registered generator of either kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorDef {
    /// Sequence-backed.
    Sequence(SequenceGeneratorDef),
    /// Table-backed.
    Table(TableGeneratorDef),
}

impl GeneratorDef {
    /// Generator name.
    pub fn name(&self) -> &str {
        match self {
            GeneratorDef::Sequence(def) => &def.name,
            GeneratorDef::Table(def) => &def.name,
        }
    }

    /// The identifier type this generator serves.
    pub fn id_type(&self) -> IdType {
        match self {
            GeneratorDef::Sequence(_) => IdType::Sequence,
            GeneratorDef::Table(_) => IdType::Table,
        }
    }

    /// Annotation name used in diagnostics.
    pub fn annotation(&self) -> &'static str {
        match self {
            GeneratorDef::Sequence(_) => "SequenceGenerator",
            GeneratorDef::Table(_) => "TableGenerator",
        }
    }
}
