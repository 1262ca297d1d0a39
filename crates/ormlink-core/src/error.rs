//! Core error types.

use crate::model::{GenerationType, IdType};
use thiserror::Error;

/// Classification of a [`MappingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The declared metadata cannot be turned into a consistent mapping.
    Structural,
    /// Generator declarations or references contradict each other.
    GeneratorConflict,
    /// The database adapter cannot produce the requested identifier strategy.
    UnsupportedStrategy,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Structural => write!(f, "structural mapping error"),
            ErrorKind::GeneratorConflict => write!(f, "generator conflict"),
            ErrorKind::UnsupportedStrategy => write!(f, "unsupported strategy"),
        }
    }
}

/// Errors raised while building a metamodel.
///
/// Every variant names the offending member (`Type.attribute`) or type so the
/// failure can be traced back to its declaration. None of them are recoverable:
/// the build that raised one is abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// Two managed types share a name.
    #[error("managed type {name} declared more than once")]
    DuplicateType {
        /// The duplicated type name.
        name: String,
    },

    /// Two attributes of one type (including inherited ones) share a name.
    #[error("attribute declared more than once: {member}")]
    DuplicateAttribute {
        /// The second declaration.
        member: String,
    },

    /// A supertype does not exist, is not a mapped superclass, or loops.
    #[error("invalid supertype {supertype} for {type_name}: {reason}")]
    InvalidSupertype {
        /// The type declaring the supertype.
        type_name: String,
        /// The referenced supertype.
        supertype: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Identifier declared on an embeddable.
    #[error("Id can only be specified on entities and mapped superclasses. Specified on {member}")]
    IdOnNonIdentifiable {
        /// The offending member.
        member: String,
    },

    /// Identifier declared on an embedded or association attribute.
    #[error("Id can only be specified on basic attributes. Specified on {member}")]
    IdOnNonBasic {
        /// The offending member.
        member: String,
    },

    /// Generation annotations used on an attribute that is not an identifier.
    #[error("{annotation} requires Id, specified on {member}")]
    GenerationWithoutId {
        /// The generation annotation.
        annotation: String,
        /// The offending member.
        member: String,
    },

    /// A generator declared on a type that cannot own an identifier.
    #[error("generators can only be declared on entities and mapped superclasses. Declared on {member}")]
    GeneratorOnNonIdentifiable {
        /// The offending type.
        member: String,
    },

    /// Two annotations that select the attribute kind were both present.
    #[error("conflicting annotations {first} and {second} on {member}")]
    ConflictingKinds {
        /// The annotation seen first.
        first: String,
        /// The annotation that contradicts it.
        second: String,
        /// The offending member.
        member: String,
    },

    /// The same non-repeatable annotation appears twice.
    #[error("annotation {annotation} repeated on {member}")]
    DuplicateAnnotation {
        /// The repeated annotation.
        annotation: String,
        /// The offending member.
        member: String,
    },

    /// `columnDefinition` overrides are not supported.
    #[error("Column.columnDefinition() is not supported: {member}")]
    UnsupportedColumnDefinition {
        /// The offending member.
        member: String,
    },

    /// Column length must be positive.
    #[error("Length must be positive: {member} (length {length})")]
    NonPositiveLength {
        /// The declared length.
        length: i32,
        /// The offending member.
        member: String,
    },

    /// Precision or scale are out of range.
    #[error("invalid column parameters on {member}: {reason}")]
    InvalidColumnParameters {
        /// What was wrong.
        reason: String,
        /// The offending member.
        member: String,
    },

    /// A basic attribute names a value type the engine does not know.
    #[error("unknown scalar type {type_name} on {member}")]
    UnknownScalarType {
        /// The declared value type.
        type_name: String,
        /// The offending member.
        member: String,
    },

    /// An embedded or association attribute targets a missing or wrong type.
    #[error("invalid target type {type_name} on {member}: {reason}")]
    InvalidTarget {
        /// The declared target type.
        type_name: String,
        /// Why the target was rejected.
        reason: String,
        /// The offending member.
        member: String,
    },

    /// An embeddable contains itself through its embedded attributes.
    #[error("embeddable recursion through {path}")]
    EmbeddableRecursion {
        /// The dotted path that closed the cycle.
        path: String,
    },

    /// `mappedBy` does not point to an owning one-to-one back to this type.
    #[error("invalid mappedBy {mapped_by} on {member}: {reason}")]
    InvalidMappedBy {
        /// The declared `mappedBy` value.
        mapped_by: String,
        /// Why it was rejected.
        reason: String,
        /// The offending member.
        member: String,
    },

    /// Join columns were declared where there is no foreign key to hold them.
    #[error("JoinColumn can only be specified on owning associations. Specified on {member}")]
    JoinColumnOnNonOwning {
        /// The offending member.
        member: String,
    },

    /// Join columns do not line up with the referenced primary key.
    #[error("join columns of {member} do not match the primary key of {target}: {reason}")]
    JoinColumnMismatch {
        /// The referenced entity.
        target: String,
        /// What did not match.
        reason: String,
        /// The offending member.
        member: String,
    },

    /// An association targets an entity without identifier.
    #[error("{target} has no identifier, referenced by {member}")]
    TargetWithoutIdentifier {
        /// The referenced entity.
        target: String,
        /// The offending member.
        member: String,
    },

    /// Two columns of one table resolved to the same physical name.
    #[error("column {column} mapped twice in table {table}, second mapping from {member}")]
    DuplicateColumn {
        /// The table name.
        table: String,
        /// The column name.
        column: String,
        /// The member producing the second column.
        member: String,
    },

    /// A version attribute is not a versionable basic attribute, or is repeated.
    #[error("invalid version attribute {member}: {reason}")]
    InvalidVersion {
        /// Why it was rejected.
        reason: String,
        /// The offending member.
        member: String,
    },

    /// Both a sequence and a table generator were declared.
    #[error("TableGenerator and SequenceGenerator declared together on {member}")]
    SequenceAndTableGenerator {
        /// The offending member or type.
        member: String,
    },

    /// A generator was declared on the type and again on the attribute.
    #[error("{generator} declared on both entity and attribute {member}")]
    GeneratorOnTypeAndAttribute {
        /// The generator annotation.
        generator: String,
        /// The offending member.
        member: String,
    },

    /// More than one attribute of a type declares a generator.
    #[error("more than one generator declared on {type_name}, second one on {member}")]
    MultipleGenerators {
        /// The identifiable type.
        type_name: String,
        /// The second declaring member.
        member: String,
    },

    /// A generator declaration without a name.
    #[error("{generator} name must be specified, defined on {member}")]
    BlankGeneratorName {
        /// The generator annotation.
        generator: String,
        /// The offending member.
        member: String,
    },

    /// A generator name is already registered.
    #[error("an existing generator with name {name} already defined, redefined on {member}")]
    DuplicateGenerator {
        /// The generator name.
        name: String,
        /// The redefining member.
        member: String,
    },

    /// `GeneratedValue.generator` names a different generator than the declared one.
    #[error("conflicting {generator}.name GeneratedValue.generator values : {declared} - {referenced} specified on {member}")]
    GeneratorNameMismatch {
        /// The generator annotation.
        generator: String,
        /// The declared generator name.
        declared: String,
        /// The name referenced from `GeneratedValue`.
        referenced: String,
        /// The offending member.
        member: String,
    },

    /// `GeneratedValue.strategy` contradicts the declared generator.
    #[error("conflicting GeneratedValue strategy with {generator}: {strategy} specified on {member}")]
    ConflictingStrategy {
        /// The generator annotation.
        generator: String,
        /// The requested strategy.
        strategy: GenerationType,
        /// The offending member.
        member: String,
    },

    /// `GeneratedValue.generator` names no registered generator.
    #[error("unknown generator {name} referenced from {member}")]
    UnknownGenerator {
        /// The referenced name.
        name: String,
        /// The offending member.
        member: String,
    },

    /// `GeneratedValue.generator` names a generator of the other kind.
    #[error("generator {name} referenced from {member} is not a {expected} generator")]
    GeneratorKindMismatch {
        /// The referenced name.
        name: String,
        /// The kind the identifier needs.
        expected: IdType,
        /// The offending member.
        member: String,
    },

    /// The adapter cannot produce the requested strategy.
    #[error("database adapter {adapter} does not support generation type {strategy}, specified on {member}")]
    UnsupportedStrategy {
        /// The adapter name.
        adapter: String,
        /// The requested strategy.
        strategy: GenerationType,
        /// The offending member.
        member: String,
    },
}

impl MappingError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MappingError::SequenceAndTableGenerator { .. }
            | MappingError::GeneratorOnTypeAndAttribute { .. }
            | MappingError::MultipleGenerators { .. }
            | MappingError::BlankGeneratorName { .. }
            | MappingError::DuplicateGenerator { .. }
            | MappingError::GeneratorNameMismatch { .. }
            | MappingError::ConflictingStrategy { .. }
            | MappingError::UnknownGenerator { .. }
            | MappingError::GeneratorKindMismatch { .. } => ErrorKind::GeneratorConflict,
            MappingError::UnsupportedStrategy { .. } => ErrorKind::UnsupportedStrategy,
            _ => ErrorKind::Structural,
        }
    }
}

/// Core errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Metamodel build failed.
    #[error("mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// Descriptor could not be decoded.
    #[error("descriptor error: {0}")]
    Descriptor(#[from] serde_json::Error),

    /// Descriptor could not be read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// No entity with the given name.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// No mapping at the given path.
    #[error("unknown mapping {path} on {entity}")]
    UnknownMapping {
        /// The entity searched.
        entity: String,
        /// The dotted path searched.
        path: String,
    },

    /// The mapping exists but is not an association.
    #[error("{entity}.{path} is not an association")]
    NotAnAssociation {
        /// The entity searched.
        entity: String,
        /// The dotted path searched.
        path: String,
    },

    /// The attribute is not an identifier.
    #[error("not an id attribute: {0}")]
    NotAnIdentifier(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = MappingError::NonPositiveLength {
            length: 0,
            member: "Order.code".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Structural);

        let err = MappingError::DuplicateGenerator {
            name: "shared".into(),
            member: "Order.other".into(),
        };
        assert_eq!(err.kind(), ErrorKind::GeneratorConflict);

        let err = MappingError::UnsupportedStrategy {
            adapter: "mysql".into(),
            strategy: GenerationType::Sequence,
            member: "Order.id".into(),
        };
        assert_eq!(err.kind(), ErrorKind::UnsupportedStrategy);
    }

    #[test]
    fn test_error_display() {
        let err = MappingError::NonPositiveLength {
            length: -1,
            member: "Order.code".into(),
        };
        assert!(err.to_string().contains("Order.code"));

        let err: Error = err.into();
        assert!(err.to_string().starts_with("mapping error"));
    }
}
