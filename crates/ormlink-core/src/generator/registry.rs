//! Registry of named generators.

use super::def::{GeneratorDef, SequenceGeneratorDef, TableGeneratorDef};
use crate::error::MappingError;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Entry {
    def: GeneratorDef,
    declared_by: String,
}

/// Generators of one metamodel, keyed by their globally unique name.
///
/// Registration is check-then-insert and is only safe within the single
/// build pass that owns the registry.
#[derive(Debug, Clone, Default)]
pub struct GeneratorRegistry {
    entries: HashMap<String, Entry>,
    /// Names in registration order.
    order: Vec<String>,
}

impl GeneratorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a generator declared by `declared_by`.
    ///
    /// Registering the same definition again from the same declaration is a
    /// no-op, so relinking a member is idempotent. Any other reuse of the
    /// name fails.
    pub fn register(&mut self, def: GeneratorDef, declared_by: &str) -> Result<(), MappingError> {
        let name = def.name().to_string();
        if let Some(existing) = self.entries.get(&name) {
            if existing.declared_by == declared_by && existing.def == def {
                return Ok(());
            }
            return Err(MappingError::DuplicateGenerator {
                name,
                member: declared_by.to_string(),
            });
        }

        self.order.push(name.clone());
        self.entries.insert(
            name,
            Entry {
                def,
                declared_by: declared_by.to_string(),
            },
        );
        Ok(())
    }

    /// Register a default generator unless one with its name exists.
    ///
    /// Fails if the name is taken by a generator of the other kind.
    pub fn ensure_default(&mut self, def: GeneratorDef, requested_by: &str) -> Result<(), MappingError> {
        match self.entries.get(def.name()) {
            Some(existing) if existing.def.id_type() == def.id_type() => Ok(()),
            Some(_) => Err(MappingError::DuplicateGenerator {
                name: def.name().to_string(),
                member: requested_by.to_string(),
            }),
            None => {
                let name = def.name().to_string();
                self.order.push(name.clone());
                self.entries.insert(
                    name,
                    Entry {
                        def,
                        declared_by: "<default>".to_string(),
                    },
                );
                Ok(())
            }
        }
    }

    /// Get a generator by name.
    pub fn get(&self, name: &str) -> Option<&GeneratorDef> {
        self.entries.get(name).map(|e| &e.def)
    }

    /// Get a sequence generator by name.
    pub fn sequence(&self, name: &str) -> Option<&SequenceGeneratorDef> {
        match self.get(name) {
            Some(GeneratorDef::Sequence(def)) => Some(def),
            _ => None,
        }
    }

    /// Get a table generator by name.
    pub fn table(&self, name: &str) -> Option<&TableGeneratorDef> {
        match self.get(name) {
            Some(GeneratorDef::Table(def)) => Some(def),
            _ => None,
        }
    }

    /// The member or type that declared a generator.
    pub fn declared_by(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|e| e.declared_by.as_str())
    }

    /// Check whether a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of registered generators.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Generators in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &GeneratorDef> {
        self.order.iter().filter_map(|name| self.get(name))
    }

    /// Sequence generators in registration order.
    pub fn sequences(&self) -> impl Iterator<Item = &SequenceGeneratorDef> {
        self.iter().filter_map(|def| match def {
            GeneratorDef::Sequence(def) => Some(def),
            GeneratorDef::Table(_) => None,
        })
    }

    /// Table generators in registration order.
    pub fn tables(&self) -> impl Iterator<Item = &TableGeneratorDef> {
        self.iter().filter_map(|def| match def {
            GeneratorDef::Table(def) => Some(def),
            GeneratorDef::Sequence(_) => None,
        })
    }
}
