//! The built metamodel.
//!
//! A [`Metamodel`] is immutable once [`MetamodelBuilder::build`] returns and
//! can be shared freely between threads.

mod builder;

pub use builder::MetamodelBuilder;

use crate::error::Error;
use crate::generator::{GeneratorRegistry, IdAllocator};
use crate::link::{Mapping, MappingRef, OwnedOneToOneMapping};
use crate::model::{IdType, PersistenceType};
use crate::parse::Attribute;
use crate::schema::{PhysicalSchema, Table};
use serde::Serialize;
use std::collections::HashMap;

/// A managed type with its parsed attributes and, for entities, the mappings
/// of its effective attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagedType {
    /// Type name.
    pub name: String,
    /// Fully qualified name, when known.
    pub qualified_name: Option<String>,
    /// Category.
    pub kind: PersistenceType,
    /// Mapped superclass this type extends.
    pub supertype: Option<String>,
    /// Primary table; entities only.
    pub table: Option<String>,
    /// Declared attributes.
    pub attributes: Vec<Attribute>,
    /// Mappings of inherited and declared attributes; entities only.
    pub mappings: Vec<Mapping>,
}

impl ManagedType {
    /// Name used in diagnostics.
    pub fn display_name(&self) -> &str {
        self.qualified_name.as_deref().unwrap_or(&self.name)
    }

    /// Get a declared attribute by name.
    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Whether this is an entity.
    pub fn is_entity(&self) -> bool {
        self.kind == PersistenceType::Entity
    }
}

/// Linked metadata of a persistence unit.
#[derive(Debug, Clone)]
pub struct Metamodel {
    adapter: String,
    types: Vec<ManagedType>,
    index: HashMap<String, usize>,
    generators: GeneratorRegistry,
    schema: PhysicalSchema,
    /// Owning one-to-one -> the non-owning side naming it.
    inverse: HashMap<MappingRef, MappingRef>,
}

impl Metamodel {
    pub(crate) fn new(
        adapter: String,
        types: Vec<ManagedType>,
        generators: GeneratorRegistry,
        schema: PhysicalSchema,
        inverse: HashMap<MappingRef, MappingRef>,
    ) -> Self {
        let index = types
            .iter()
            .enumerate()
            .map(|(i, ty)| (ty.name.clone(), i))
            .collect();
        Self {
            adapter,
            types,
            index,
            generators,
            schema,
            inverse,
        }
    }

    /// Start a builder.
    pub fn builder() -> MetamodelBuilder {
        MetamodelBuilder::new()
    }

    /// Name of the adapter the metamodel was built against.
    pub fn adapter_name(&self) -> &str {
        &self.adapter
    }

    /// Managed types in declaration order.
    pub fn types(&self) -> &[ManagedType] {
        &self.types
    }

    /// Entities in declaration order.
    pub fn entities(&self) -> impl Iterator<Item = &ManagedType> {
        self.types.iter().filter(|t| t.is_entity())
    }

    /// Get a managed type by name.
    pub fn managed_type(&self, name: &str) -> Option<&ManagedType> {
        self.index.get(name).map(|&i| &self.types[i])
    }

    /// Get an entity by name.
    pub fn entity(&self, name: &str) -> Option<&ManagedType> {
        self.managed_type(name).filter(|t| t.is_entity())
    }

    /// The type followed by its supertypes, nearest first.
    fn lineage(&self, name: &str) -> Vec<&ManagedType> {
        let mut out: Vec<&ManagedType> = Vec::new();
        let mut current = self.managed_type(name);
        while let Some(ty) = current {
            out.push(ty);
            current = ty.supertype.as_deref().and_then(|s| self.managed_type(s));
        }
        out
    }

    /// Get an attribute of a type, declared or inherited.
    pub fn attribute(&self, type_name: &str, name: &str) -> Option<&Attribute> {
        self.lineage(type_name)
            .into_iter()
            .find_map(|ty| ty.get_attribute(name))
    }

    /// Inherited (root first) and declared attributes of a type.
    pub fn attributes(&self, type_name: &str) -> Vec<&Attribute> {
        self.lineage(type_name)
            .into_iter()
            .rev()
            .flat_map(|ty| ty.attributes.iter())
            .collect()
    }

    /// Identifier attributes of a type.
    pub fn id_attributes(&self, type_name: &str) -> Vec<&Attribute> {
        self.attributes(type_name)
            .into_iter()
            .filter(|a| a.is_id())
            .collect()
    }

    /// Version attribute of a type.
    pub fn version_attribute(&self, type_name: &str) -> Option<&Attribute> {
        self.attributes(type_name).into_iter().find(|a| a.version)
    }

    /// Top-level mappings of an entity.
    pub fn mappings(&self, entity: &str) -> &[Mapping] {
        self.entity(entity).map(|t| t.mappings.as_slice()).unwrap_or(&[])
    }

    /// Mapping at a dotted path of an entity.
    pub fn mapping(&self, entity: &str, path: &str) -> Option<&Mapping> {
        self.mappings(entity).iter().find_map(|m| m.find(path))
    }

    /// Resolve a mapping reference.
    pub fn resolve(&self, reference: &MappingRef) -> Option<&Mapping> {
        self.mapping(&reference.entity, &reference.path)
    }

    /// The owning side of a non-owning one-to-one.
    pub fn owner_of(&self, owned: &OwnedOneToOneMapping) -> Option<&Mapping> {
        self.resolve(&owned.owner)
    }

    /// The non-owning side that names an owning one-to-one, if any.
    pub fn inverse_of(&self, entity: &str, path: &str) -> Option<&MappingRef> {
        self.inverse.get(&MappingRef::new(entity, path))
    }

    /// Primary table of an entity.
    pub fn table(&self, entity: &str) -> Option<&Table> {
        self.schema.table_for_entity(entity)
    }

    /// Physical schema.
    pub fn schema(&self) -> &PhysicalSchema {
        &self.schema
    }

    /// Registered generators.
    pub fn generators(&self) -> &GeneratorRegistry {
        &self.generators
    }

    /// Draw the next identifier value for a new instance of `entity`.
    ///
    /// Returns `None` for manual and identity identifiers: the application or
    /// the database supplies those.
    pub fn next_identifier(
        &self,
        entity: &str,
        attribute: &str,
        allocator: &dyn IdAllocator,
    ) -> Result<Option<i64>, Error> {
        let ty = self
            .entity(entity)
            .ok_or_else(|| Error::UnknownEntity(entity.to_string()))?;
        let id = self
            .attribute(entity, attribute)
            .filter(|a| a.is_id())
            .ok_or_else(|| Error::NotAnIdentifier(format!("{}.{}", ty.display_name(), attribute)))?;

        let value = match (id.id_type, id.generator_name.as_deref()) {
            (Some(IdType::Sequence), Some(name)) => self
                .generators
                .sequence(name)
                .map(|def| allocator.next_sequence(def)),
            (Some(IdType::Table), Some(name)) => self
                .generators
                .table(name)
                .map(|def| allocator.next_table_value(def)),
            _ => None,
        };
        Ok(value)
    }
}
