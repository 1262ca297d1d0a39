//! Parse phase.
//!
//! Turns the annotations of each declared attribute into [`Attribute`]
//! metadata: kind, optionality, column templates and, for identifiers, the
//! resolved strategy and generator. Generators are registered here so that
//! name collisions surface before any linking happens.

mod attribute;
mod column;
mod context;
mod identifier;

pub use attribute::{Attribute, ValueType};
pub use column::{ColumnTemplate, JoinColumnTemplate};

pub(crate) use attribute::parse_attribute;
pub(crate) use context::ParseContext;
