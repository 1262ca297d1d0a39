//! Physical schema produced by linking.
//!
//! Tables, columns and foreign keys are derived once per build and never
//! mutated afterwards.

mod bundle;
mod column;
mod foreign_key;
mod table;

pub use bundle::PhysicalSchema;
pub use column::PhysicalColumn;
pub use foreign_key::{generate_name as foreign_key_name, ForeignKey};
pub use table::Table;
