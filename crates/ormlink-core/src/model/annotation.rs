//! Declarative facts extracted from annotated members.
//!
//! The metamodel never reflects over live code. A front end (see
//! [`crate::descriptor`]) hands over one [`Annotation`] per declaration found
//! on a member; the parse phase turns them into attribute metadata.

use super::types::{CascadeType, FetchType, GenerationType};
use crate::generator::{SequenceGeneratorDef, TableGeneratorDef};
use serde::{Deserialize, Serialize};

/// One annotation found on a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "annotation", rename_all = "snake_case")]
pub enum Annotation {
    /// Marks the identifier.
    Id,
    /// Requests generated identifier values.
    GeneratedValue(GeneratedValue),
    /// Declares a sequence generator.
    SequenceGenerator(SequenceGeneratorDef),
    /// Declares a table generator.
    TableGenerator(TableGeneratorDef),
    /// Marks the optimistic-lock version.
    Version,
    /// Basic attribute options.
    Basic(BasicDecl),
    /// Large object.
    Lob,
    /// Nested embeddable.
    Embedded,
    /// Physical column options.
    Column(ColumnDecl),
    /// Physical join column of an owning association. Repeatable.
    JoinColumn(JoinColumnDecl),
    /// Many-to-one association.
    ManyToOne(ManyToOneDecl),
    /// One-to-one association.
    OneToOne(OneToOneDecl),
}

impl Annotation {
    /// Annotation name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Annotation::Id => "Id",
            Annotation::GeneratedValue(_) => "GeneratedValue",
            Annotation::SequenceGenerator(_) => "SequenceGenerator",
            Annotation::TableGenerator(_) => "TableGenerator",
            Annotation::Version => "Version",
            Annotation::Basic(_) => "Basic",
            Annotation::Lob => "Lob",
            Annotation::Embedded => "Embedded",
            Annotation::Column(_) => "Column",
            Annotation::JoinColumn(_) => "JoinColumn",
            Annotation::ManyToOne(_) => "ManyToOne",
            Annotation::OneToOne(_) => "OneToOne",
        }
    }

    /// Whether the annotation may appear more than once on a member.
    pub fn is_repeatable(&self) -> bool {
        matches!(self, Annotation::JoinColumn(_))
    }

    /// Whether the annotation selects the attribute kind.
    pub fn is_kind_selector(&self) -> bool {
        matches!(
            self,
            Annotation::Lob | Annotation::Embedded | Annotation::ManyToOne(_) | Annotation::OneToOne(_)
        )
    }
}

/// `GeneratedValue` options.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratedValue {
    /// Requested strategy.
    pub strategy: GenerationType,
    /// Referenced generator name, blank when none.
    pub generator: String,
}

impl GeneratedValue {
    /// Request a strategy without naming a generator.
    pub fn strategy(strategy: GenerationType) -> Self {
        Self {
            strategy,
            generator: String::new(),
        }
    }

    /// Name the generator to use.
    pub fn with_generator(mut self, generator: impl Into<String>) -> Self {
        self.generator = generator.into();
        self
    }
}

/// `Basic` options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicDecl {
    /// Whether the value may be null.
    pub optional: bool,
    /// Fetch policy.
    pub fetch: FetchType,
}

impl Default for BasicDecl {
    fn default() -> Self {
        Self {
            optional: true,
            fetch: FetchType::Eager,
        }
    }
}

/// `Column` options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnDecl {
    /// Physical name; defaults to the attribute path.
    pub name: Option<String>,
    /// Whether the column accepts nulls.
    pub nullable: bool,
    /// Whether the column carries a unique constraint.
    pub unique: bool,
    /// Whether the column is written on insert.
    pub insertable: bool,
    /// Whether the column is written on update.
    pub updatable: bool,
    /// Column length; `None` takes the configured default.
    pub length: Option<i32>,
    /// Decimal precision.
    pub precision: i32,
    /// Decimal scale.
    pub scale: i32,
    /// Raw DDL override. Not supported; rejected when non-blank.
    pub column_definition: Option<String>,
}

impl Default for ColumnDecl {
    fn default() -> Self {
        Self {
            name: None,
            nullable: true,
            unique: false,
            insertable: true,
            updatable: true,
            length: None,
            precision: 0,
            scale: 0,
            column_definition: None,
        }
    }
}

impl ColumnDecl {
    /// Column with an explicit name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Set the length.
    pub fn with_length(mut self, length: i32) -> Self {
        self.length = Some(length);
        self
    }

    /// Set precision and scale.
    pub fn with_precision(mut self, precision: i32, scale: i32) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }

    /// Mark as not nullable.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Mark as unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Set a raw column definition.
    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.column_definition = Some(definition.into());
        self
    }
}

/// `JoinColumn` options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinColumnDecl {
    /// Physical name; defaults to `<attribute>_<referenced column>`.
    pub name: Option<String>,
    /// Referenced primary-key column of the target.
    pub referenced_column_name: Option<String>,
    /// Whether the column accepts nulls.
    pub nullable: bool,
    /// Whether the column carries a unique constraint.
    pub unique: bool,
    /// Whether the column is written on insert.
    pub insertable: bool,
    /// Whether the column is written on update.
    pub updatable: bool,
    /// Raw DDL override. Not supported; rejected when non-blank.
    pub column_definition: Option<String>,
}

impl Default for JoinColumnDecl {
    fn default() -> Self {
        Self {
            name: None,
            referenced_column_name: None,
            nullable: true,
            unique: false,
            insertable: true,
            updatable: true,
            column_definition: None,
        }
    }
}

impl JoinColumnDecl {
    /// Join column with an explicit name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Set the referenced column.
    pub fn referencing(mut self, column: impl Into<String>) -> Self {
        self.referenced_column_name = Some(column.into());
        self
    }
}

/// `ManyToOne` options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManyToOneDecl {
    /// Whether the reference may be null.
    pub optional: bool,
    /// Fetch policy.
    pub fetch: FetchType,
    /// Cascaded operations.
    pub cascade: Vec<CascadeType>,
}

impl Default for ManyToOneDecl {
    fn default() -> Self {
        Self {
            optional: true,
            fetch: FetchType::Eager,
            cascade: Vec::new(),
        }
    }
}

/// `OneToOne` options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OneToOneDecl {
    /// Owning attribute on the target; blank on the owning side.
    pub mapped_by: String,
    /// Whether the reference may be null.
    pub optional: bool,
    /// Fetch policy.
    pub fetch: FetchType,
    /// Cascaded operations.
    pub cascade: Vec<CascadeType>,
    /// Remove the target when it is dereferenced.
    pub orphan_removal: bool,
}

impl Default for OneToOneDecl {
    fn default() -> Self {
        Self {
            mapped_by: String::new(),
            optional: true,
            fetch: FetchType::Eager,
            cascade: Vec::new(),
            orphan_removal: false,
        }
    }
}

impl OneToOneDecl {
    /// Non-owning side pointing at the owning attribute of the target.
    pub fn mapped_by(attribute: impl Into<String>) -> Self {
        Self {
            mapped_by: attribute.into(),
            ..Default::default()
        }
    }

    /// Set the fetch policy.
    pub fn with_fetch(mut self, fetch: FetchType) -> Self {
        self.fetch = fetch;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_classification() {
        assert!(Annotation::Embedded.is_kind_selector());
        assert!(Annotation::OneToOne(OneToOneDecl::default()).is_kind_selector());
        assert!(!Annotation::Column(ColumnDecl::default()).is_kind_selector());

        assert!(Annotation::JoinColumn(JoinColumnDecl::default()).is_repeatable());
        assert!(!Annotation::Id.is_repeatable());
    }

    #[test]
    fn test_annotation_from_json() {
        let json = r#"[
            {"annotation": "id"},
            {"annotation": "generated_value", "strategy": "sequence", "generator": "order_seq"},
            {"annotation": "sequence_generator", "name": "order_seq"},
            {"annotation": "one_to_one", "mapped_by": "invoice", "fetch": "lazy"}
        ]"#;
        let annotations: Vec<Annotation> = serde_json::from_str(json).unwrap();

        assert_eq!(annotations[0], Annotation::Id);
        assert_eq!(
            annotations[1],
            Annotation::GeneratedValue(
                GeneratedValue::strategy(GenerationType::Sequence).with_generator("order_seq")
            )
        );
        match &annotations[2] {
            Annotation::SequenceGenerator(def) => {
                assert_eq!(def.name, "order_seq");
                assert_eq!(def.allocation_size, 50);
            }
            other => panic!("Expected SequenceGenerator, got {other:?}"),
        }
        match &annotations[3] {
            Annotation::OneToOne(decl) => {
                assert_eq!(decl.mapped_by, "invoice");
                assert_eq!(decl.fetch, FetchType::Lazy);
                assert!(decl.optional);
            }
            other => panic!("Expected OneToOne, got {other:?}"),
        }
    }

    #[test]
    fn test_column_defaults() {
        let column = ColumnDecl::default();
        assert!(column.nullable);
        assert!(column.insertable);
        assert!(column.length.is_none());
        assert!(column.column_definition.is_none());
    }
}
