//! Managed type and attribute declarations.

use super::annotation::Annotation;
use super::types::PersistenceType;
use crate::generator::{SequenceGeneratorDef, TableGeneratorDef};
use serde::{Deserialize, Serialize};

/// Declaration of an entity, embeddable or mapped superclass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    /// Type name (unique within the unit).
    pub name: String,
    /// Fully qualified name used in diagnostics, when known.
    #[serde(default)]
    pub qualified_name: Option<String>,
    /// Category of the type.
    pub kind: PersistenceType,
    /// Primary table name for entities; defaults to the type name.
    #[serde(default)]
    pub table: Option<String>,
    /// Mapped superclass this type extends.
    #[serde(default)]
    pub supertype: Option<String>,
    /// Type-level sequence generator.
    #[serde(default)]
    pub sequence_generator: Option<SequenceGeneratorDef>,
    /// Type-level table generator.
    #[serde(default)]
    pub table_generator: Option<TableGeneratorDef>,
    /// Declared attributes, in declaration order.
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
}

/// Declaration of one persistent attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDef {
    /// Attribute name (unique within the declaring type).
    pub name: String,
    /// Value type: a scalar name for basic attributes, a managed type name
    /// for embedded and association attributes.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Annotations found on the member.
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl TypeDef {
    fn with_kind(name: impl Into<String>, kind: PersistenceType) -> Self {
        Self {
            name: name.into(),
            qualified_name: None,
            kind,
            table: None,
            supertype: None,
            sequence_generator: None,
            table_generator: None,
            attributes: Vec::new(),
        }
    }

    /// Declare an entity.
    pub fn entity(name: impl Into<String>) -> Self {
        Self::with_kind(name, PersistenceType::Entity)
    }

    /// Declare an embeddable.
    pub fn embeddable(name: impl Into<String>) -> Self {
        Self::with_kind(name, PersistenceType::Embeddable)
    }

    /// Declare a mapped superclass.
    pub fn mapped_superclass(name: impl Into<String>) -> Self {
        Self::with_kind(name, PersistenceType::MappedSuperclass)
    }

    /// Set the qualified name.
    pub fn with_qualified_name(mut self, qualified_name: impl Into<String>) -> Self {
        self.qualified_name = Some(qualified_name.into());
        self
    }

    /// Set the primary table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Extend a mapped superclass.
    pub fn extending(mut self, supertype: impl Into<String>) -> Self {
        self.supertype = Some(supertype.into());
        self
    }

    /// Declare a type-level sequence generator.
    pub fn with_sequence_generator(mut self, generator: SequenceGeneratorDef) -> Self {
        self.sequence_generator = Some(generator);
        self
    }

    /// Declare a type-level table generator.
    pub fn with_table_generator(mut self, generator: TableGeneratorDef) -> Self {
        self.table_generator = Some(generator);
        self
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, attribute: AttributeDef) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Add multiple attributes.
    pub fn with_attributes(mut self, attributes: impl IntoIterator<Item = AttributeDef>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    /// Get an attribute by name.
    pub fn get_attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Name used in diagnostics.
    pub fn display_name(&self) -> &str {
        self.qualified_name.as_deref().unwrap_or(&self.name)
    }

    /// Canonical diagnostic name of one of this type's members.
    pub fn member_name(&self, attribute: &str) -> String {
        format!("{}.{}", self.display_name(), attribute)
    }

    /// Primary table name.
    pub fn table_name(&self) -> &str {
        self.table.as_deref().unwrap_or(&self.name)
    }
}

impl AttributeDef {
    /// Create an attribute without annotations.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            annotations: Vec::new(),
        }
    }

    /// Add an annotation.
    pub fn with(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Check whether an annotation with the given name is present.
    pub fn has(&self, name: &str) -> bool {
        self.annotations.iter().any(|a| a.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnDecl, GeneratedValue};

    #[test]
    fn test_type_builder() {
        let order = TypeDef::entity("Order")
            .with_table("ORDERS")
            .with_attribute(AttributeDef::new("id", "Long").with(Annotation::Id))
            .with_attribute(
                AttributeDef::new("code", "String")
                    .with(Annotation::Column(ColumnDecl::named("CODE").with_length(16))),
            );

        assert_eq!(order.kind, PersistenceType::Entity);
        assert_eq!(order.table_name(), "ORDERS");
        assert_eq!(order.attributes.len(), 2);
        assert!(order.get_attribute("id").is_some());
        assert!(order.get_attribute("missing").is_none());
    }

    #[test]
    fn test_member_name() {
        let plain = TypeDef::entity("Order");
        assert_eq!(plain.member_name("id"), "Order.id");
        assert_eq!(plain.table_name(), "Order");

        let qualified = TypeDef::entity("Order").with_qualified_name("com.acme.Order");
        assert_eq!(qualified.member_name("id"), "com.acme.Order.id");
    }

    #[test]
    fn test_attribute_lookup() {
        let attribute = AttributeDef::new("id", "Long")
            .with(Annotation::Id)
            .with(Annotation::GeneratedValue(GeneratedValue::default()));

        assert!(attribute.has("Id"));
        assert!(attribute.has("GeneratedValue"));
        assert!(!attribute.has("Version"));
    }
}
