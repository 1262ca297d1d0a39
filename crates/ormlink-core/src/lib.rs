//! ormlink core - metamodel construction for an object-relational mapper.
//!
//! Declared types and their annotations go through two phases. The parse
//! phase turns each attribute's annotations into attribute metadata and
//! resolves identifier generators against the database adapter. The link
//! phase chooses a mapping for every attribute of every entity and derives
//! the physical columns and foreign keys. The result is an immutable
//! [`Metamodel`].

pub mod adapter;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod generator;
pub mod link;
pub mod metamodel;
pub mod model;
pub mod parse;
pub mod schema;
pub mod sql;

pub use adapter::{AdapterProfile, CustomAdapter, DatabaseAdapter};
pub use config::{MetamodelConfig, DEFAULT_SEQUENCE_GENERATOR, DEFAULT_TABLE_GENERATOR};
pub use descriptor::UnitDescriptor;
pub use error::{Error, ErrorKind, MappingError};
pub use generator::{
    GeneratorDef, GeneratorRegistry, IdAllocator, InMemoryAllocator, SequenceGeneratorDef,
    TableGeneratorDef,
};
pub use link::{Mapping, MappingRef, OwnedOneToOneMapping, OwnerMapping};
pub use metamodel::{ManagedType, Metamodel, MetamodelBuilder};
pub use model::{
    Annotation, AttributeDef, AttributeKind, CascadeType, FetchType, GenerationType, IdType,
    PersistenceType, PersistentAttributeType, ScalarType, TypeDef,
};
pub use parse::{Attribute, ValueType};
pub use schema::{ForeignKey, PhysicalColumn, PhysicalSchema, Table};
