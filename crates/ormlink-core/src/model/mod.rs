//! Declarative model consumed by the metamodel builder.
//!
//! Types, attributes and their annotation facts as produced by a front end.

mod annotation;
mod managed;
mod types;

pub use annotation::{
    Annotation, BasicDecl, ColumnDecl, GeneratedValue, JoinColumnDecl, ManyToOneDecl,
    OneToOneDecl,
};
pub use managed::{AttributeDef, TypeDef};
pub use types::{
    AttributeKind, CascadeType, FetchType, GenerationType, IdType, PersistenceType,
    PersistentAttributeType, ScalarType,
};
