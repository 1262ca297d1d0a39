//! Output formatters for metamodel reports.

use comfy_table::{Cell, Table};
use ormlink_core::link::flatten;
use ormlink_core::{GeneratorDef, Metamodel, PhysicalSchema};

/// Output format for metamodel reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// ASCII tables.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Part of the metamodel to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Section {
    /// Attribute mappings of every entity.
    Mappings,
    /// Physical tables and foreign keys.
    Tables,
    /// Registered identifier generators.
    Generators,
    /// Everything.
    #[default]
    All,
}

/// Trait for formatting metamodel reports.
pub trait Formatter: Send + Sync {
    /// Format the mappings of every entity, nested mappings flattened.
    fn format_mappings(&self, metamodel: &Metamodel) -> String;

    /// Format tables, their columns and foreign keys.
    fn format_tables(&self, schema: &PhysicalSchema) -> String;

    /// Format the generator registry.
    fn format_generators(&self, metamodel: &Metamodel) -> String;

    /// Format an error message.
    fn format_error(&self, error: &str) -> String;

    /// Format the requested section.
    fn format(&self, metamodel: &Metamodel, section: Section) -> String {
        match section {
            Section::Mappings => self.format_mappings(metamodel),
            Section::Tables => self.format_tables(metamodel.schema()),
            Section::Generators => self.format_generators(metamodel),
            Section::All => [
                self.format_mappings(metamodel),
                self.format_tables(metamodel.schema()),
                self.format_generators(metamodel),
            ]
            .join("\n\n"),
        }
    }
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        ""
    }
}

fn generator_details(def: &GeneratorDef) -> String {
    match def {
        GeneratorDef::Sequence(seq) => format!(
            "sequence {} from {} by {}",
            seq.sequence_name, seq.initial_value, seq.allocation_size
        ),
        GeneratorDef::Table(table) => format!(
            "table {}({}, {}) row {} from {} by {}",
            table.table,
            table.pk_column_name,
            table.value_column_name,
            table.pk_column_value,
            table.initial_value,
            table.allocation_size
        ),
    }
}

/// ASCII table formatter.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_mappings(&self, metamodel: &Metamodel) -> String {
        let mut table = Table::new();
        table.set_header(vec!["Entity", "Path", "Mapping", "Columns", "Target"]);

        let mut rows = 0;
        for entity in metamodel.entities() {
            for mapping in flatten(&entity.mappings) {
                table.add_row(vec![
                    Cell::new(entity.display_name()),
                    Cell::new(mapping.path()),
                    Cell::new(mapping.variant()),
                    Cell::new(mapping.columns().join(", ")),
                    Cell::new(mapping.target().unwrap_or("")),
                ]);
                rows += 1;
            }
        }

        format!("{}\n({} mappings)", table, rows)
    }

    fn format_tables(&self, schema: &PhysicalSchema) -> String {
        let mut sections = Vec::with_capacity(schema.tables.len());

        for physical in &schema.tables {
            let mut table = Table::new();
            table.set_header(vec!["Column", "Type", "Length", "Nullable", "PK", "References"]);
            for column in &physical.columns {
                table.add_row(vec![
                    Cell::new(&column.name),
                    Cell::new(format!("{:?}", column.value_type)),
                    Cell::new(column.length),
                    Cell::new(yes_no(column.nullable)),
                    Cell::new(yes_no(column.primary_key)),
                    Cell::new(column.referenced_column.as_deref().unwrap_or("")),
                ]);
            }

            let mut out = format!("{} ({})\n{}", physical.name, physical.entity, table);
            for fk in &physical.foreign_keys {
                out.push_str(&format!(
                    "\nFK {} ({}) -> {} ({})",
                    fk.name,
                    fk.columns.join(", "),
                    fk.reference_table_name,
                    fk.referenced_columns.join(", ")
                ));
            }
            sections.push(out);
        }

        if sections.is_empty() {
            return "(no tables)".to_string();
        }
        sections.join("\n\n")
    }

    fn format_generators(&self, metamodel: &Metamodel) -> String {
        let registry = metamodel.generators();
        let mut table = Table::new();
        table.set_header(vec!["Name", "Kind", "Declared by", "Details"]);

        for def in registry.iter() {
            table.add_row(vec![
                Cell::new(def.name()),
                Cell::new(def.id_type()),
                Cell::new(registry.declared_by(def.name()).unwrap_or("")),
                Cell::new(generator_details(def)),
            ]);
        }

        format!("{}\n({} generators)", table, registry.len())
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}", error)
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl JsonFormatter {
    fn pretty(value: &serde_json::Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    fn mappings(metamodel: &Metamodel) -> serde_json::Value {
        let entities: serde_json::Map<String, serde_json::Value> = metamodel
            .entities()
            .map(|entity| {
                let mappings =
                    serde_json::to_value(&entity.mappings).unwrap_or(serde_json::Value::Null);
                (entity.name.clone(), mappings)
            })
            .collect();
        serde_json::Value::Object(entities)
    }

    fn tables(schema: &PhysicalSchema) -> serde_json::Value {
        serde_json::to_value(&schema.tables).unwrap_or(serde_json::Value::Null)
    }

    fn generators(metamodel: &Metamodel) -> serde_json::Value {
        let registry = metamodel.generators();
        let sequences: Vec<_> = registry.sequences().collect();
        let tables: Vec<_> = registry.tables().collect();
        serde_json::json!({
            "sequences": serde_json::to_value(sequences).unwrap_or(serde_json::Value::Null),
            "tables": serde_json::to_value(tables).unwrap_or(serde_json::Value::Null),
        })
    }
}

impl Formatter for JsonFormatter {
    fn format_mappings(&self, metamodel: &Metamodel) -> String {
        Self::pretty(&serde_json::json!({ "mappings": Self::mappings(metamodel) }))
    }

    fn format_tables(&self, schema: &PhysicalSchema) -> String {
        Self::pretty(&serde_json::json!({ "tables": Self::tables(schema) }))
    }

    fn format_generators(&self, metamodel: &Metamodel) -> String {
        Self::pretty(&serde_json::json!({ "generators": Self::generators(metamodel) }))
    }

    fn format_error(&self, error: &str) -> String {
        Self::pretty(&serde_json::json!({ "error": error }))
    }

    fn format(&self, metamodel: &Metamodel, section: Section) -> String {
        match section {
            Section::Mappings => self.format_mappings(metamodel),
            Section::Tables => self.format_tables(metamodel.schema()),
            Section::Generators => self.format_generators(metamodel),
            Section::All => Self::pretty(&serde_json::json!({
                "adapter": metamodel.adapter_name(),
                "mappings": Self::mappings(metamodel),
                "tables": Self::tables(metamodel.schema()),
                "generators": Self::generators(metamodel),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ormlink_core::{AdapterProfile, UnitDescriptor};

    const UNIT: &str = r#"{
        "types": [
            { "name": "Customer", "kind": "entity", "attributes": [
                { "name": "id", "type": "Long", "annotations": [
                    { "annotation": "id" },
                    { "annotation": "generated_value", "strategy": "sequence" }
                ]}
            ]},
            { "name": "Order", "kind": "entity", "attributes": [
                { "name": "id", "type": "Long", "annotations": [{ "annotation": "id" }] },
                { "name": "customer", "type": "Customer", "annotations": [
                    { "annotation": "many_to_one" }
                ]}
            ]}
        ]
    }"#;

    fn metamodel() -> Metamodel {
        UnitDescriptor::from_json(UNIT)
            .unwrap()
            .build(&AdapterProfile::Postgres)
            .unwrap()
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_table_formatter() {
        let metamodel = metamodel();
        let out = TableFormatter.format(&metamodel, Section::All);

        assert!(out.contains("OwnerManyToOne"));
        assert!(out.contains("customer_id"));
        assert!(out.contains("FK Customer_id (customer_id) -> Customer (id)"));
        assert!(out.contains("ORMLINK_ID_SEQ"));
        assert!(out.contains("(1 generators)"));
    }

    #[test]
    fn test_json_formatter() {
        let metamodel = metamodel();
        let out = JsonFormatter.format(&metamodel, Section::All);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["mappings"]["Order"][1]["mapping"], "owner_many_to_one");
        assert_eq!(value["tables"][1]["foreign_keys"][0]["name"], "Customer_id");
        assert_eq!(
            value["generators"]["sequences"][0]["name"],
            "ORMLINK_ID_SEQ"
        );
    }

    #[test]
    fn test_json_single_section() {
        let metamodel = metamodel();
        let out = JsonFormatter.format(&metamodel, Section::Tables);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert!(value.get("tables").is_some());
        assert!(value.get("mappings").is_none());
    }

    #[test]
    fn test_format_error() {
        assert_eq!(TableFormatter.format_error("boom"), "Error: boom");
        let json: serde_json::Value =
            serde_json::from_str(&JsonFormatter.format_error("boom")).unwrap();
        assert_eq!(json["error"], "boom");
    }
}
