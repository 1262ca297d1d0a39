//! Link phase.
//!
//! Every attribute of every entity gets exactly one [`Mapping`]. Owning
//! associations also contribute join columns and a foreign key to the
//! entity's table; non-owning one-to-ones point back to their owner.

mod mapping;
mod resolver;
mod unit;

pub use mapping::{
    flatten, BasicMapping, EmbeddedMapping, Mapping, MappingRef, OwnedOneToOneMapping,
    OwnerMapping,
};

pub(crate) use resolver::Linker;
pub(crate) use unit::ParsedUnit;
