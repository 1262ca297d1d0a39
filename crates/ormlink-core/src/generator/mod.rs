//! Identifier generators.
//!
//! Sequence and table generator definitions, the registry that keeps their
//! names unique within a metamodel, and allocators that hand out values.

mod allocator;
mod def;
mod registry;

pub use allocator::{IdAllocator, InMemoryAllocator};
pub use def::{GeneratorDef, SequenceGeneratorDef, TableGeneratorDef};
pub use registry::GeneratorRegistry;
