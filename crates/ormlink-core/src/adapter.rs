//! Database adapter interface.
//!
//! The metamodel only asks an adapter one question: which identifier strategy
//! it will actually use for a requested one. Everything else about a database
//! dialect lives outside this crate.

use crate::model::{GenerationType, IdType};
use std::collections::HashMap;

/// Identifier-strategy support of a database.
pub trait DatabaseAdapter: Send + Sync {
    /// Adapter name used in diagnostics.
    fn name(&self) -> &str;

    /// Resolve a requested strategy to the one the database will use, or
    /// `None` when it has no compatible equivalent.
    fn supports(&self, requested: GenerationType) -> Option<IdType>;
}

/// Built-in adapter profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterProfile {
    /// Identity, sequence and table; AUTO resolves to SEQUENCE.
    Postgres,
    /// Identity and table; SEQUENCE is served by TABLE, AUTO by IDENTITY.
    MySql,
    /// Everything; AUTO resolves to SEQUENCE.
    H2,
}

impl DatabaseAdapter for AdapterProfile {
    fn name(&self) -> &str {
        match self {
            AdapterProfile::Postgres => "postgres",
            AdapterProfile::MySql => "mysql",
            AdapterProfile::H2 => "h2",
        }
    }

    fn supports(&self, requested: GenerationType) -> Option<IdType> {
        let resolved = match (self, requested) {
            (_, GenerationType::Identity) => IdType::Identity,
            (_, GenerationType::Table) => IdType::Table,
            (AdapterProfile::MySql, GenerationType::Sequence) => IdType::Table,
            (AdapterProfile::MySql, GenerationType::Auto) => IdType::Identity,
            (_, GenerationType::Sequence) | (_, GenerationType::Auto) => IdType::Sequence,
        };
        Some(resolved)
    }
}

/// Adapter driven by an explicit strategy table.
///
/// Strategies missing from the table are unsupported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomAdapter {
    name: String,
    strategies: HashMap<GenerationType, IdType>,
}

impl CustomAdapter {
    /// Create an adapter that supports nothing.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strategies: HashMap::new(),
        }
    }

    /// Serve `requested` with `resolved`.
    pub fn with_strategy(mut self, requested: GenerationType, resolved: IdType) -> Self {
        self.strategies.insert(requested, resolved);
        self
    }
}

impl DatabaseAdapter for CustomAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, requested: GenerationType) -> Option<IdType> {
        self.strategies.get(&requested).copied()
    }
}
