//! Metamodel build configuration.

use crate::generator::{SequenceGeneratorDef, TableGeneratorDef};
use serde::{Deserialize, Serialize};

/// Name of the default sequence generator.
pub const DEFAULT_SEQUENCE_GENERATOR: &str = "ORMLINK_ID_SEQ";

/// Name of the default table generator.
pub const DEFAULT_TABLE_GENERATOR: &str = "ORMLINK_ID_TABLE";

/// Configuration for a metamodel build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetamodelConfig {
    /// Generator used by sequence identifiers that name none.
    pub default_sequence_generator: SequenceGeneratorDef,

    /// Generator used by table identifiers that name none. Its table and
    /// columns also fill in table generators that leave them blank.
    pub default_table_generator: TableGeneratorDef,

    /// Separator between path segments of columns reached through embeddables.
    pub embedded_column_separator: String,

    /// Separator between the attribute name and the referenced column in
    /// default join column names.
    pub join_column_separator: String,

    /// Length of columns that do not declare one.
    pub default_column_length: u32,
}

impl Default for MetamodelConfig {
    fn default() -> Self {
        Self {
            default_sequence_generator: SequenceGeneratorDef::new(DEFAULT_SEQUENCE_GENERATOR),
            default_table_generator: TableGeneratorDef::new(DEFAULT_TABLE_GENERATOR)
                .with_table("ORMLINK_SEQUENCES", "SEQ_NAME", "SEQ_VALUE"),
            embedded_column_separator: "_".to_string(),
            join_column_separator: "_".to_string(),
            default_column_length: 255,
        }
    }
}

impl MetamodelConfig {
    /// Set the default sequence generator.
    pub fn with_default_sequence_generator(mut self, generator: SequenceGeneratorDef) -> Self {
        self.default_sequence_generator = generator;
        self
    }

    /// Set the default table generator.
    pub fn with_default_table_generator(mut self, generator: TableGeneratorDef) -> Self {
        self.default_table_generator = generator;
        self
    }

    /// Set the embedded column separator.
    pub fn with_embedded_column_separator(mut self, separator: impl Into<String>) -> Self {
        self.embedded_column_separator = separator.into();
        self
    }

    /// Set the join column separator.
    pub fn with_join_column_separator(mut self, separator: impl Into<String>) -> Self {
        self.join_column_separator = separator.into();
        self
    }

    /// Set the default column length.
    pub fn with_default_column_length(mut self, length: u32) -> Self {
        self.default_column_length = length;
        self
    }

    /// The default table generator with its own blanks filled in.
    pub(crate) fn normalized_default_table_generator(&self) -> TableGeneratorDef {
        let defaults = self.default_table_generator.clone();
        defaults.clone().normalized(&defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MetamodelConfig::default();
        assert_eq!(config.default_sequence_generator.name, DEFAULT_SEQUENCE_GENERATOR);
        assert_eq!(config.default_table_generator.table, "ORMLINK_SEQUENCES");
        assert_eq!(config.embedded_column_separator, "_");
        assert_eq!(config.default_column_length, 255);
    }

    #[test]
    fn test_partial_json() {
        let config: MetamodelConfig =
            serde_json::from_str(r#"{"default_column_length": 64}"#).unwrap();
        assert_eq!(config.default_column_length, 64);
        assert_eq!(config.join_column_separator, "_");
    }

    #[test]
    fn test_builder() {
        let config = MetamodelConfig::default()
            .with_embedded_column_separator("__")
            .with_default_sequence_generator(SequenceGeneratorDef::new("GLOBAL_SEQ"));

        assert_eq!(config.embedded_column_separator, "__");
        assert_eq!(config.default_sequence_generator.name, "GLOBAL_SEQ");
        assert_eq!(
            config.normalized_default_table_generator().pk_column_value,
            DEFAULT_TABLE_GENERATOR
        );
    }
}
