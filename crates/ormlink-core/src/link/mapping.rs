//! Linked attribute mappings.

use crate::model::{CascadeType, PersistentAttributeType};
use serde::Serialize;

/// Address of a mapping: an entity and a dotted attribute path inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MappingRef {
    /// Entity name.
    pub entity: String,
    /// Dotted attribute path.
    pub path: String,
}

impl MappingRef {
    /// Create a reference.
    pub fn new(entity: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            path: path.into(),
        }
    }
}

impl std::fmt::Display for MappingRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.entity, self.path)
    }
}

/// A basic or LOB attribute stored in columns of the entity table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasicMapping {
    /// Dotted path from the entity.
    pub path: String,
    /// Declaring member.
    pub member: String,
    /// Column names.
    pub columns: Vec<String>,
    /// Identifier attribute.
    pub id: bool,
    /// Version attribute.
    pub version: bool,
    /// Large object.
    pub lob: bool,
}

/// An embeddable nested into the entity table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbeddedMapping {
    /// Dotted path from the entity.
    pub path: String,
    /// Declaring member.
    pub member: String,
    /// Embeddable type name.
    pub embeddable: String,
    /// Mappings of the embeddable's attributes.
    pub mappings: Vec<Mapping>,
}

/// The non-owning side of a one-to-one. Holds no columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnedOneToOneMapping {
    /// Dotted path from the entity.
    pub path: String,
    /// Declaring member.
    pub member: String,
    /// Target entity.
    pub target: String,
    /// Owning attribute on the target.
    pub mapped_by: String,
    /// The owning side.
    pub owner: MappingRef,
    /// Remove the target when it is dereferenced.
    pub orphan_removal: bool,
    /// Loaded with the entity.
    pub eager: bool,
    /// Cascaded operations.
    pub cascade: Vec<CascadeType>,
}

/// The owning side of a one-to-one or a many-to-one: join columns plus the
/// foreign key over them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerMapping {
    /// Dotted path from the entity.
    pub path: String,
    /// Declaring member.
    pub member: String,
    /// Target entity.
    pub target: String,
    /// Primary table of the target.
    pub target_table: String,
    /// Join column names.
    pub columns: Vec<String>,
    /// Referenced primary key columns, aligned with `columns`.
    pub referenced_columns: Vec<String>,
    /// Foreign key name.
    pub foreign_key: String,
    /// Whether the reference may be null.
    pub optional: bool,
    /// Loaded with the entity.
    pub eager: bool,
    /// Cascaded operations.
    pub cascade: Vec<CascadeType>,
}

/// The mapping chosen for an attribute at link time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mapping", rename_all = "snake_case")]
pub enum Mapping {
    /// Basic or LOB.
    Basic(BasicMapping),
    /// Embedded.
    Embedded(EmbeddedMapping),
    /// Non-owning one-to-one.
    OwnedOneToOne(OwnedOneToOneMapping),
    /// Owning one-to-one.
    OwnerOneToOne(OwnerMapping),
    /// Many-to-one; always owning.
    OwnerManyToOne(OwnerMapping),
}

impl Mapping {
    /// Dotted path from the entity.
    pub fn path(&self) -> &str {
        match self {
            Mapping::Basic(m) => &m.path,
            Mapping::Embedded(m) => &m.path,
            Mapping::OwnedOneToOne(m) => &m.path,
            Mapping::OwnerOneToOne(m) | Mapping::OwnerManyToOne(m) => &m.path,
        }
    }

    /// Declaring member.
    pub fn member(&self) -> &str {
        match self {
            Mapping::Basic(m) => &m.member,
            Mapping::Embedded(m) => &m.member,
            Mapping::OwnedOneToOne(m) => &m.member,
            Mapping::OwnerOneToOne(m) | Mapping::OwnerManyToOne(m) => &m.member,
        }
    }

    /// Attribute name: the last path segment.
    pub fn name(&self) -> &str {
        let path = self.path();
        path.rsplit('.').next().unwrap_or(path)
    }

    /// Mapping variant name.
    pub fn variant(&self) -> &'static str {
        match self {
            Mapping::Basic(_) => "Basic",
            Mapping::Embedded(_) => "Embedded",
            Mapping::OwnedOneToOne(_) => "OwnedOneToOne",
            Mapping::OwnerOneToOne(_) => "OwnerOneToOne",
            Mapping::OwnerManyToOne(_) => "OwnerManyToOne",
        }
    }

    /// Public classification of the underlying attribute.
    pub fn persistent_attribute_type(&self) -> PersistentAttributeType {
        match self {
            Mapping::Basic(_) => PersistentAttributeType::Basic,
            Mapping::Embedded(_) => PersistentAttributeType::Embedded,
            Mapping::OwnedOneToOne(_) | Mapping::OwnerOneToOne(_) => PersistentAttributeType::OneToOne,
            Mapping::OwnerManyToOne(_) => PersistentAttributeType::ManyToOne,
        }
    }

    /// Whether the mapping references another entity.
    pub fn is_association(&self) -> bool {
        matches!(
            self,
            Mapping::OwnedOneToOne(_) | Mapping::OwnerOneToOne(_) | Mapping::OwnerManyToOne(_)
        )
    }

    /// The owning side of an association, if this is one.
    pub fn as_owner(&self) -> Option<&OwnerMapping> {
        match self {
            Mapping::OwnerOneToOne(m) | Mapping::OwnerManyToOne(m) => Some(m),
            _ => None,
        }
    }

    /// Target entity of an association.
    pub fn target(&self) -> Option<&str> {
        match self {
            Mapping::OwnedOneToOne(m) => Some(&m.target),
            Mapping::OwnerOneToOne(m) | Mapping::OwnerManyToOne(m) => Some(&m.target),
            _ => None,
        }
    }

    /// Columns held directly by this mapping.
    pub fn columns(&self) -> &[String] {
        match self {
            Mapping::Basic(m) => &m.columns,
            Mapping::OwnerOneToOne(m) | Mapping::OwnerManyToOne(m) => &m.columns,
            Mapping::Embedded(_) | Mapping::OwnedOneToOne(_) => &[],
        }
    }

    /// Nested mappings of an embedded mapping.
    pub fn children(&self) -> &[Mapping] {
        match self {
            Mapping::Embedded(m) => &m.mappings,
            _ => &[],
        }
    }

    /// Find the mapping at `path`, this one or one nested below it.
    pub fn find(&self, path: &str) -> Option<&Mapping> {
        if self.path() == path {
            return Some(self);
        }
        let rest = path.strip_prefix(self.path())?;
        if !rest.starts_with('.') {
            return None;
        }
        self.children().iter().find_map(|child| child.find(path))
    }
}

/// All mappings depth-first, parents before their children.
pub fn flatten(mappings: &[Mapping]) -> Vec<&Mapping> {
    let mut out = Vec::new();
    let mut stack: Vec<&Mapping> = mappings.iter().rev().collect();
    while let Some(mapping) = stack.pop() {
        out.push(mapping);
        stack.extend(mapping.children().iter().rev());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(path: &str) -> Mapping {
        Mapping::Basic(BasicMapping {
            path: path.to_string(),
            member: format!("Person.{path}"),
            columns: vec![path.replace('.', "_")],
            id: false,
            version: false,
            lob: false,
        })
    }

    fn address() -> Mapping {
        Mapping::Embedded(EmbeddedMapping {
            path: "address".into(),
            member: "Person.address".into(),
            embeddable: "Address".into(),
            mappings: vec![basic("address.city"), basic("address.zip")],
        })
    }

    #[test]
    fn test_find_nested() {
        let mapping = address();

        assert_eq!(mapping.find("address").map(|m| m.variant()), Some("Embedded"));
        assert_eq!(
            mapping.find("address.city").map(|m| m.columns().to_vec()),
            Some(vec!["address_city".to_string()])
        );
        assert!(mapping.find("address.street").is_none());
        assert!(mapping.find("addressee").is_none());
        assert_eq!(mapping.find("address.zip").map(|m| m.name()), Some("zip"));
    }

    #[test]
    fn test_flatten_order() {
        let mappings = vec![basic("id"), address(), basic("name")];
        let paths: Vec<_> = flatten(&mappings).iter().map(|m| m.path()).collect();

        assert_eq!(paths, vec!["id", "address", "address.city", "address.zip", "name"]);
    }

    #[test]
    fn test_association_accessors() {
        let owner = Mapping::OwnerManyToOne(OwnerMapping {
            path: "customer".into(),
            member: "Order.customer".into(),
            target: "Customer".into(),
            target_table: "CUSTOMERS".into(),
            columns: vec!["customer_ID".into()],
            referenced_columns: vec!["ID".into()],
            foreign_key: "CUSTOMERS_ID".into(),
            optional: true,
            eager: true,
            cascade: Vec::new(),
        });

        assert!(owner.is_association());
        assert_eq!(owner.target(), Some("Customer"));
        assert_eq!(owner.persistent_attribute_type(), PersistentAttributeType::ManyToOne);
        assert!(owner.as_owner().is_some());
        assert!(!basic("id").is_association());
        assert_eq!(MappingRef::new("Order", "customer").to_string(), "Order.customer");
    }
}
