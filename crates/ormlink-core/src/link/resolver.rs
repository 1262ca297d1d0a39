//! Link phase: choose a mapping for every attribute of every entity and
//! derive the physical columns and foreign keys they need.

use super::mapping::{
    BasicMapping, EmbeddedMapping, Mapping, MappingRef, OwnedOneToOneMapping, OwnerMapping,
};
use super::unit::ParsedUnit;
use crate::config::MetamodelConfig;
use crate::error::MappingError;
use crate::model::{AttributeKind, PersistenceType, TypeDef};
use crate::parse::{Attribute, ValueType};
use crate::schema::{ForeignKey, PhysicalColumn, Table};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Position of an attribute below its entity.
#[derive(Debug, Clone, Default)]
struct AttributePath {
    segments: Vec<String>,
    /// Embeddables entered so far, outermost first.
    embeddables: Vec<String>,
}

impl AttributePath {
    fn dotted(&self, name: &str) -> String {
        self.join(name, ".")
    }

    fn join(&self, name: &str, separator: &str) -> String {
        let mut parts: Vec<&str> = self.segments.iter().map(String::as_str).collect();
        parts.push(name);
        parts.join(separator)
    }

    fn embed(&self, name: &str, embeddable: &str) -> Self {
        let mut next = self.clone();
        next.segments.push(name.to_string());
        next.embeddables.push(embeddable.to_string());
        next
    }
}

/// Primary key of an entity, resolved before any association is linked.
#[derive(Debug, Clone)]
struct EntityKey {
    table: String,
    columns: Vec<PhysicalColumn>,
}

/// Links the entities of one parsed unit.
pub(crate) struct Linker<'a> {
    config: &'a MetamodelConfig,
    unit: &'a ParsedUnit<'a>,
    keys: HashMap<String, EntityKey>,
}

impl<'a> Linker<'a> {
    /// Resolve the primary key of every entity.
    pub(crate) fn new(config: &'a MetamodelConfig, unit: &'a ParsedUnit<'a>) -> Self {
        let mut linker = Self {
            config,
            unit,
            keys: HashMap::new(),
        };

        for ty in unit.types().iter().filter(|t| t.kind == PersistenceType::Entity) {
            let table = ty.table_name().to_string();
            let columns = unit
                .effective(&ty.name)
                .into_iter()
                .filter(|a| a.is_id())
                .flat_map(|a| linker.basic_columns(&table, a, &AttributePath::default()))
                .collect();
            linker.keys.insert(ty.name.clone(), EntityKey { table, columns });
        }

        linker
    }

    /// Link every effective attribute of an entity, in declaration order.
    pub(crate) fn link_entity(&self, entity: &TypeDef) -> Result<(Table, Vec<Mapping>), MappingError> {
        let mut table = Table::new(entity.table_name(), entity.name.clone());
        let root = AttributePath::default();

        let mappings = self
            .unit
            .effective(&entity.name)
            .into_iter()
            .map(|attribute| self.link(entity, &mut table, attribute, &root))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((table, mappings))
    }

    fn link(
        &self,
        entity: &TypeDef,
        table: &mut Table,
        attribute: &Attribute,
        path: &AttributePath,
    ) -> Result<Mapping, MappingError> {
        let mapping = match attribute.kind {
            AttributeKind::Basic | AttributeKind::Lob => self.link_basic(table, attribute, path)?,
            AttributeKind::Embedded => self.link_embedded(entity, table, attribute, path)?,
            AttributeKind::Association => {
                let target = self.association_target(attribute)?;
                match &attribute.mapped_by {
                    Some(mapped_by) if !attribute.many => {
                        self.link_owned(entity, attribute, target, mapped_by, path)?
                    }
                    _ => self.link_owner(table, attribute, target, path)?,
                }
            }
        };

        debug!(
            entity = %entity.name,
            path = %mapping.path(),
            mapping = mapping.variant(),
            "Linked attribute"
        );

        Ok(mapping)
    }

    /// Physical columns of a basic or LOB attribute.
    fn basic_columns(&self, table: &str, attribute: &Attribute, path: &AttributePath) -> Vec<PhysicalColumn> {
        let value_type = match attribute.value_type {
            ValueType::Scalar(scalar) => scalar,
            ValueType::Managed(_) => return Vec::new(),
        };
        let mapping_path = path.dotted(&attribute.name);

        attribute
            .columns
            .iter()
            .map(|template| PhysicalColumn {
                name: template
                    .name
                    .clone()
                    .unwrap_or_else(|| path.join(&attribute.name, &self.config.embedded_column_separator)),
                table: table.to_string(),
                value_type,
                nullable: template.nullable && attribute.optional && !attribute.is_id(),
                unique: template.unique,
                insertable: template.insertable,
                updatable: template.updatable,
                length: template.length,
                precision: template.precision,
                scale: template.scale,
                primary_key: attribute.is_id() && path.segments.is_empty(),
                referenced_column: None,
                mapping_path: mapping_path.clone(),
            })
            .collect()
    }

    fn add_columns(table: &mut Table, columns: &[PhysicalColumn], member: &str) -> Result<(), MappingError> {
        for column in columns {
            if !table.add_column(column.clone()) {
                return Err(MappingError::DuplicateColumn {
                    table: table.name.clone(),
                    column: column.name.clone(),
                    member: member.to_string(),
                });
            }
        }
        Ok(())
    }

    fn link_basic(&self, table: &mut Table, attribute: &Attribute, path: &AttributePath) -> Result<Mapping, MappingError> {
        let columns = self.basic_columns(&table.name, attribute, path);
        Self::add_columns(table, &columns, &attribute.member)?;

        Ok(Mapping::Basic(BasicMapping {
            path: path.dotted(&attribute.name),
            member: attribute.member.clone(),
            columns: columns.into_iter().map(|c| c.name).collect(),
            id: attribute.is_id(),
            version: attribute.version,
            lob: attribute.kind == AttributeKind::Lob,
        }))
    }

    fn link_embedded(
        &self,
        entity: &TypeDef,
        table: &mut Table,
        attribute: &Attribute,
        path: &AttributePath,
    ) -> Result<Mapping, MappingError> {
        let type_name = attribute.target().unwrap_or_default();
        let embeddable = match self.unit.get(type_name) {
            Some(ty) if ty.kind == PersistenceType::Embeddable => ty,
            Some(_) => {
                return Err(MappingError::InvalidTarget {
                    type_name: type_name.to_string(),
                    reason: "not an embeddable".to_string(),
                    member: attribute.member.clone(),
                })
            }
            None => {
                return Err(MappingError::InvalidTarget {
                    type_name: type_name.to_string(),
                    reason: "no such managed type".to_string(),
                    member: attribute.member.clone(),
                })
            }
        };

        if path.embeddables.iter().any(|e| e == &embeddable.name) {
            return Err(MappingError::EmbeddableRecursion {
                path: format!("{}.{}", entity.name, path.dotted(&attribute.name)),
            });
        }

        let nested = path.embed(&attribute.name, &embeddable.name);
        let mappings = self
            .unit
            .declared(&embeddable.name)
            .iter()
            .map(|child| self.link(entity, table, child, &nested))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Mapping::Embedded(EmbeddedMapping {
            path: path.dotted(&attribute.name),
            member: attribute.member.clone(),
            embeddable: embeddable.name.clone(),
            mappings,
        }))
    }

    fn association_target(&self, attribute: &Attribute) -> Result<&'a TypeDef, MappingError> {
        let type_name = attribute.target().unwrap_or_default();
        match self.unit.get(type_name) {
            Some(ty) if ty.kind == PersistenceType::Entity => Ok(ty),
            Some(_) => Err(MappingError::InvalidTarget {
                type_name: type_name.to_string(),
                reason: "not an entity".to_string(),
                member: attribute.member.clone(),
            }),
            None => Err(MappingError::InvalidTarget {
                type_name: type_name.to_string(),
                reason: "no such managed type".to_string(),
                member: attribute.member.clone(),
            }),
        }
    }

    fn link_owned(
        &self,
        entity: &TypeDef,
        attribute: &Attribute,
        target: &TypeDef,
        mapped_by: &str,
        path: &AttributePath,
    ) -> Result<Mapping, MappingError> {
        let invalid = |reason: String| MappingError::InvalidMappedBy {
            mapped_by: mapped_by.to_string(),
            reason,
            member: attribute.member.clone(),
        };

        let owner = self
            .unit
            .effective(&target.name)
            .into_iter()
            .find(|a| a.name == mapped_by)
            .ok_or_else(|| invalid(format!("{} has no attribute {}", target.name, mapped_by)))?;

        if !owner.is_association() || owner.many {
            return Err(invalid(format!("{} is not a one-to-one association", owner.member)));
        }
        if !owner.is_owner() {
            return Err(invalid(format!("{} also declares mappedBy", owner.member)));
        }

        let owner_target = owner.target().unwrap_or_default();
        let points_back = owner_target == attribute.declaring_type
            || self
                .unit
                .lineage(&entity.name)
                .iter()
                .any(|ty| ty.name == owner_target);
        if !points_back {
            return Err(invalid(format!(
                "{} references {}, not {}",
                owner.member, owner_target, entity.name
            )));
        }

        Ok(Mapping::OwnedOneToOne(OwnedOneToOneMapping {
            path: path.dotted(&attribute.name),
            member: attribute.member.clone(),
            target: target.name.clone(),
            mapped_by: mapped_by.to_string(),
            owner: MappingRef::new(target.name.clone(), mapped_by),
            orphan_removal: attribute.orphan_removal,
            eager: attribute.is_eager(),
            cascade: attribute.cascade.clone(),
        }))
    }

    fn link_owner(
        &self,
        table: &mut Table,
        attribute: &Attribute,
        target: &TypeDef,
        path: &AttributePath,
    ) -> Result<Mapping, MappingError> {
        let key = self
            .keys
            .get(&target.name)
            .filter(|key| !key.columns.is_empty())
            .ok_or_else(|| MappingError::TargetWithoutIdentifier {
                target: target.name.clone(),
                member: attribute.member.clone(),
            })?;

        let columns = self.join_columns(&table.name, attribute, target, key, path)?;
        Self::add_columns(table, &columns, &attribute.member)?;

        let foreign_key = ForeignKey::new(table.name.clone(), key.table.clone(), &columns);
        let foreign_key_name = foreign_key.name.clone();
        table.add_foreign_key(foreign_key);

        let owner = OwnerMapping {
            path: path.dotted(&attribute.name),
            member: attribute.member.clone(),
            target: target.name.clone(),
            target_table: key.table.clone(),
            columns: columns.iter().map(|c| c.name.clone()).collect(),
            referenced_columns: columns
                .iter()
                .filter_map(|c| c.referenced_column.clone())
                .collect(),
            foreign_key: foreign_key_name,
            optional: attribute.optional,
            eager: attribute.is_eager(),
            cascade: attribute.cascade.clone(),
        };

        Ok(if attribute.many {
            Mapping::OwnerManyToOne(owner)
        } else {
            Mapping::OwnerOneToOne(owner)
        })
    }

    /// Join columns of an owning association, one per referenced primary key
    /// column.
    fn join_columns(
        &self,
        table: &str,
        attribute: &Attribute,
        target: &TypeDef,
        key: &EntityKey,
        path: &AttributePath,
    ) -> Result<Vec<PhysicalColumn>, MappingError> {
        let default_name = |referenced: &str| {
            format!(
                "{}{}{}",
                path.join(&attribute.name, &self.config.embedded_column_separator),
                self.config.join_column_separator,
                referenced
            )
        };
        let join_column = |name: String, referenced: &PhysicalColumn| PhysicalColumn {
            name,
            table: table.to_string(),
            value_type: referenced.value_type,
            nullable: attribute.optional,
            unique: false,
            insertable: true,
            updatable: true,
            length: referenced.length,
            precision: referenced.precision,
            scale: referenced.scale,
            primary_key: false,
            referenced_column: Some(referenced.name.clone()),
            mapping_path: path.dotted(&attribute.name),
        };

        if attribute.join_columns.is_empty() {
            return Ok(key
                .columns
                .iter()
                .map(|pk| join_column(default_name(&pk.name), pk))
                .collect());
        }

        let mismatch = |reason: String| MappingError::JoinColumnMismatch {
            target: target.name.clone(),
            reason,
            member: attribute.member.clone(),
        };

        if attribute.join_columns.len() != key.columns.len() {
            return Err(mismatch(format!(
                "{} join columns for {} primary key columns",
                attribute.join_columns.len(),
                key.columns.len()
            )));
        }

        let mut used = HashSet::new();
        let mut columns = Vec::with_capacity(key.columns.len());
        for (template, positional) in attribute.join_columns.iter().zip(&key.columns) {
            let referenced_name = template
                .referenced_column
                .as_deref()
                .unwrap_or(&positional.name);
            let referenced = key
                .columns
                .iter()
                .find(|pk| pk.name == referenced_name)
                .ok_or_else(|| mismatch(format!("{referenced_name} is not a primary key column")))?;
            if !used.insert(referenced.name.as_str()) {
                return Err(mismatch(format!("{} referenced twice", referenced.name)));
            }

            let name = template
                .name
                .clone()
                .unwrap_or_else(|| default_name(&referenced.name));
            columns.push(PhysicalColumn {
                nullable: template.nullable && attribute.optional,
                unique: template.unique,
                insertable: template.insertable,
                updatable: template.updatable,
                ..join_column(name, referenced)
            });
        }

        Ok(columns)
    }
}
