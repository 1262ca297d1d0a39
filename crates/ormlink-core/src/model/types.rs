//! Core type definitions for the metamodel.

use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};
use std::str::FromStr;

/// Scalar data types a basic attribute can hold.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    /// Boolean value.
    Bool,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
    /// Fixed-precision decimal; precision and scale live on the column.
    Decimal,
    /// UTF-8 string.
    String,
    /// Binary data.
    Bytes,
    /// Calendar date.
    Date,
    /// Timestamp (microseconds since Unix epoch).
    Timestamp,
    /// UUID (128-bit identifier).
    Uuid,
}

impl ScalarType {
    /// Check if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ScalarType::Int32
                | ScalarType::Int64
                | ScalarType::Float32
                | ScalarType::Float64
                | ScalarType::Decimal
        )
    }

    /// Check if this type is a string-like type.
    pub fn is_string_like(&self) -> bool {
        matches!(self, ScalarType::String | ScalarType::Bytes)
    }

    /// Check if this type can back a version attribute.
    pub fn is_versionable(&self) -> bool {
        matches!(
            self,
            ScalarType::Int32 | ScalarType::Int64 | ScalarType::Timestamp
        )
    }
}

impl FromStr for ScalarType {
    type Err = ();

    /// Parse a declared value type. Accepts the snake-case names and the
    /// usual boxed-type spellings (`Long`, `Integer`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let scalar = match s.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => ScalarType::Bool,
            "int32" | "int" | "integer" | "short" => ScalarType::Int32,
            "int64" | "long" | "biginteger" => ScalarType::Int64,
            "float32" | "float" => ScalarType::Float32,
            "float64" | "double" => ScalarType::Float64,
            "decimal" | "bigdecimal" => ScalarType::Decimal,
            "string" | "text" | "char" | "character" => ScalarType::String,
            "bytes" | "byte[]" | "blob" => ScalarType::Bytes,
            "date" | "localdate" => ScalarType::Date,
            "timestamp" | "instant" | "localdatetime" => ScalarType::Timestamp,
            "uuid" => ScalarType::Uuid,
            _ => return Err(()),
        };
        Ok(scalar)
    }
}

/// Category of a managed type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerdeSerialize, SerdeDeserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceType {
    /// Has identity and owns a table.
    Entity,
    /// No identity; its attributes are stored in the embedding table.
    Embeddable,
    /// Contributes attributes (and possibly identity) to entities extending it.
    MappedSuperclass,
}

impl PersistenceType {
    /// Entities and mapped superclasses may declare identifiers.
    pub fn is_identifiable(&self) -> bool {
        matches!(
            self,
            PersistenceType::Entity | PersistenceType::MappedSuperclass
        )
    }
}

/// When an attribute value is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, SerdeSerialize, SerdeDeserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchType {
    /// Loaded together with the owner.
    #[default]
    Eager,
    /// Loaded on first access.
    Lazy,
}

/// Operations propagated across an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerdeSerialize, SerdeDeserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeType {
    /// Every operation.
    All,
    /// Persist.
    Persist,
    /// Merge.
    Merge,
    /// Remove.
    Remove,
    /// Refresh.
    Refresh,
    /// Detach.
    Detach,
}

/// Semantic kind of an attribute as determined by the parse phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerdeSerialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    /// Plain column-backed value.
    Basic,
    /// Large object, column-backed.
    Lob,
    /// Nested embeddable.
    Embedded,
    /// Reference to another entity.
    Association,
}

/// Public classification of a singular attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerdeSerialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistentAttributeType {
    /// Basic or LOB.
    Basic,
    /// Embedded.
    Embedded,
    /// One-to-one association.
    OneToOne,
    /// Many-to-one association.
    ManyToOne,
}

/// Identifier generation strategy as requested by `GeneratedValue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, SerdeSerialize, SerdeDeserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationType {
    /// Let the adapter pick.
    #[default]
    Auto,
    /// Database identity column.
    Identity,
    /// Database sequence.
    Sequence,
    /// Dedicated generator table.
    Table,
}

impl std::fmt::Display for GenerationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationType::Auto => write!(f, "AUTO"),
            GenerationType::Identity => write!(f, "IDENTITY"),
            GenerationType::Sequence => write!(f, "SEQUENCE"),
            GenerationType::Table => write!(f, "TABLE"),
        }
    }
}

/// Resolved identifier strategy of an identifier attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerdeSerialize, SerdeDeserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdType {
    /// Assigned by the application.
    Manual,
    /// Assigned by the database on insert.
    Identity,
    /// Drawn from a sequence generator.
    Sequence,
    /// Drawn from a table generator.
    Table,
}

impl IdType {
    /// The strategy that would request this id type directly.
    pub fn as_generation_type(&self) -> Option<GenerationType> {
        match self {
            IdType::Manual => None,
            IdType::Identity => Some(GenerationType::Identity),
            IdType::Sequence => Some(GenerationType::Sequence),
            IdType::Table => Some(GenerationType::Table),
        }
    }

    /// Whether values come from a named generator.
    pub fn uses_generator(&self) -> bool {
        matches!(self, IdType::Sequence | IdType::Table)
    }
}

impl std::fmt::Display for IdType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdType::Manual => write!(f, "MANUAL"),
            IdType::Identity => write!(f, "IDENTITY"),
            IdType::Sequence => write!(f, "SEQUENCE"),
            IdType::Table => write!(f, "TABLE"),
        }
    }
}
