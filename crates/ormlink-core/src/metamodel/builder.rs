//! Metamodel construction.

use super::{ManagedType, Metamodel};
use crate::adapter::DatabaseAdapter;
use crate::config::MetamodelConfig;
use crate::error::MappingError;
use crate::generator::GeneratorRegistry;
use crate::link::{flatten, Linker, Mapping, MappingRef, ParsedUnit};
use crate::model::{PersistenceType, TypeDef};
use crate::parse::{parse_attribute, Attribute, ParseContext};
use crate::schema::PhysicalSchema;
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument};

/// Builder for a [`Metamodel`].
///
/// Collects type declarations, then runs the parse phase over every attribute
/// followed by the link phase over every entity. The first error aborts the
/// build.
#[derive(Debug, Clone, Default)]
pub struct MetamodelBuilder {
    config: MetamodelConfig,
    types: Vec<TypeDef>,
}

impl MetamodelBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: MetamodelConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a type declaration.
    pub fn with_type(mut self, ty: TypeDef) -> Self {
        self.types.push(ty);
        self
    }

    /// Add multiple type declarations.
    pub fn with_types(mut self, types: impl IntoIterator<Item = TypeDef>) -> Self {
        self.types.extend(types);
        self
    }

    /// Build the metamodel against a database adapter.
    #[instrument(skip_all, fields(adapter = adapter.name()))]
    pub fn build(self, adapter: &dyn DatabaseAdapter) -> Result<Metamodel, MappingError> {
        let Self { config, types } = self;

        validate_types(&types)?;

        let mut ctx = ParseContext::new(&config, adapter);
        ctx.declare_generators(&types);
        for ty in &types {
            ctx.register_type_generators(ty)?;
        }
        let attributes = types
            .iter()
            .map(|ty| parse_type(&mut ctx, ty))
            .collect::<Result<Vec<_>, _>>()?;
        let registry = ctx.registry;

        validate_generator_references(&attributes, &registry)?;

        let (tables, mut linked, inverse) = {
            let unit = ParsedUnit::new(&types, &attributes);
            validate_effective(&unit)?;

            let linker = Linker::new(&config, &unit);
            let mut tables = Vec::new();
            let mut linked: HashMap<&str, Vec<Mapping>> = HashMap::new();
            for entity in types.iter().filter(|t| t.kind == PersistenceType::Entity) {
                let (table, mappings) = linker.link_entity(entity)?;
                tables.push(table);
                linked.insert(&entity.name, mappings);
            }

            let inverse = inverse_index(&linked)?;
            let linked: HashMap<String, Vec<Mapping>> = linked
                .into_iter()
                .map(|(name, mappings)| (name.to_string(), mappings))
                .collect();
            (tables, linked, inverse)
        };

        let schema = PhysicalSchema {
            tables,
            sequence_generators: registry.sequences().cloned().collect(),
            table_generators: registry.tables().cloned().collect(),
        };

        let managed: Vec<ManagedType> = types
            .iter()
            .zip(attributes)
            .map(|(ty, attributes)| ManagedType {
                name: ty.name.clone(),
                qualified_name: ty.qualified_name.clone(),
                kind: ty.kind,
                supertype: ty.supertype.clone(),
                table: (ty.kind == PersistenceType::Entity).then(|| ty.table_name().to_string()),
                attributes,
                mappings: linked.remove(&ty.name).unwrap_or_default(),
            })
            .collect();

        info!(
            types = managed.len(),
            tables = schema.tables.len(),
            foreign_keys = schema.foreign_key_count(),
            generators = registry.len(),
            "Metamodel built"
        );

        Ok(Metamodel::new(adapter.name().to_string(), managed, registry, schema, inverse))
    }
}

/// Reject duplicate type names and invalid supertypes.
fn validate_types(types: &[TypeDef]) -> Result<(), MappingError> {
    let mut names = HashSet::new();
    for ty in types {
        if !names.insert(ty.name.as_str()) {
            return Err(MappingError::DuplicateType {
                name: ty.name.clone(),
            });
        }
    }

    let index: HashMap<&str, &TypeDef> = types.iter().map(|t| (t.name.as_str(), t)).collect();
    for ty in types {
        let Some(supertype) = ty.supertype.as_deref() else {
            continue;
        };
        let invalid = |reason: &str| MappingError::InvalidSupertype {
            type_name: ty.display_name().to_string(),
            supertype: supertype.to_string(),
            reason: reason.to_string(),
        };

        if ty.kind == PersistenceType::Embeddable {
            return Err(invalid("embeddables cannot extend another type"));
        }
        match index.get(supertype) {
            None => return Err(invalid("no such managed type")),
            Some(parent) if parent.kind != PersistenceType::MappedSuperclass => {
                return Err(invalid("not a mapped superclass"))
            }
            Some(_) => {}
        }

        let mut seen = HashSet::from([ty.name.as_str()]);
        let mut current = Some(supertype);
        while let Some(name) = current {
            if !seen.insert(name) {
                return Err(invalid("inheritance cycle"));
            }
            current = index.get(name).and_then(|t| t.supertype.as_deref());
        }
    }

    Ok(())
}

/// Parse the declared attributes of one type.
fn parse_type(ctx: &mut ParseContext<'_>, ty: &TypeDef) -> Result<Vec<Attribute>, MappingError> {
    let mut names = HashSet::new();
    let mut attributes = Vec::with_capacity(ty.attributes.len());
    for def in &ty.attributes {
        if !names.insert(def.name.as_str()) {
            return Err(MappingError::DuplicateAttribute {
                member: ty.member_name(&def.name),
            });
        }
        attributes.push(parse_attribute(ctx, ty, def)?);
    }
    Ok(attributes)
}

/// Checks over inherited plus declared attributes.
fn validate_effective(unit: &ParsedUnit<'_>) -> Result<(), MappingError> {
    for ty in unit.types().iter().filter(|t| t.kind.is_identifiable()) {
        let mut names = HashSet::new();
        let mut version: Option<&Attribute> = None;
        let mut generator: Option<&Attribute> = None;

        for attribute in unit.effective(&ty.name) {
            if !names.insert(attribute.name.as_str()) {
                return Err(MappingError::DuplicateAttribute {
                    member: attribute.member.clone(),
                });
            }
            if attribute.version && version.replace(attribute).is_some() {
                return Err(MappingError::InvalidVersion {
                    reason: format!("{} already has a version attribute", ty.display_name()),
                    member: attribute.member.clone(),
                });
            }
            // Attribute-level generators are claimed per declaring type, so
            // inherited identifiers are checked here.
            if declares_generator(attribute, unit) && generator.replace(attribute).is_some() {
                return Err(MappingError::MultipleGenerators {
                    type_name: ty.display_name().to_string(),
                    member: attribute.member.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Whether the identifier carries its own generator declaration.
fn declares_generator(attribute: &Attribute, unit: &ParsedUnit<'_>) -> bool {
    unit.get(&attribute.declaring_type)
        .and_then(|ty| ty.get_attribute(&attribute.name))
        .map(|def| def.has("SequenceGenerator") || def.has("TableGenerator"))
        .unwrap_or(false)
}

/// Every generator an identifier draws from exists and has the right kind.
fn validate_generator_references(
    attributes: &[Vec<Attribute>],
    registry: &GeneratorRegistry,
) -> Result<(), MappingError> {
    for attribute in attributes.iter().flatten() {
        let (Some(id_type), Some(name)) = (attribute.id_type, attribute.generator_name.as_deref()) else {
            continue;
        };
        let def = registry.get(name).ok_or_else(|| MappingError::UnknownGenerator {
            name: name.to_string(),
            member: attribute.member.clone(),
        })?;
        if def.id_type() != id_type {
            return Err(MappingError::GeneratorKindMismatch {
                name: name.to_string(),
                expected: id_type,
                member: attribute.member.clone(),
            });
        }
    }
    Ok(())
}

/// Map each owning one-to-one to the non-owning side that names it.
fn inverse_index(
    linked: &HashMap<&str, Vec<Mapping>>,
) -> Result<HashMap<MappingRef, MappingRef>, MappingError> {
    let mut inverse: HashMap<MappingRef, MappingRef> = HashMap::new();

    // Sorted so that the reported conflict does not depend on hash order.
    let mut entities: Vec<_> = linked.iter().collect();
    entities.sort_by_key(|(name, _)| **name);

    for (entity, mappings) in entities {
        for mapping in flatten(mappings) {
            let Mapping::OwnedOneToOne(owned) = mapping else {
                continue;
            };
            let this = MappingRef::new(*entity, owned.path.clone());
            if let Some(previous) = inverse.insert(owned.owner.clone(), this) {
                return Err(MappingError::InvalidMappedBy {
                    mapped_by: owned.mapped_by.clone(),
                    reason: format!("{} is already mapped by {}", owned.owner, previous),
                    member: owned.member.clone(),
                });
            }
        }
    }

    Ok(inverse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::AdapterProfile;
    use crate::error::ErrorKind;
    use crate::config::DEFAULT_SEQUENCE_GENERATOR;
    use crate::generator::{SequenceGeneratorDef, TableGeneratorDef};
    use crate::model::{Annotation, AttributeDef, GeneratedValue, GenerationType, IdType};

    fn id() -> AttributeDef {
        AttributeDef::new("id", "Long").with(Annotation::Id)
    }

    fn build(types: Vec<TypeDef>) -> Result<Metamodel, MappingError> {
        MetamodelBuilder::new()
            .with_types(types)
            .build(&AdapterProfile::Postgres)
    }

    #[test]
    fn test_duplicate_type() {
        let err = build(vec![TypeDef::entity("Order"), TypeDef::entity("Order")]).unwrap_err();
        assert!(matches!(err, MappingError::DuplicateType { .. }));
    }

    #[test]
    fn test_invalid_supertypes() {
        let err = build(vec![TypeDef::entity("Order").extending("Missing")]).unwrap_err();
        assert!(matches!(err, MappingError::InvalidSupertype { .. }));

        let err = build(vec![
            TypeDef::entity("Base"),
            TypeDef::entity("Order").extending("Base"),
        ])
        .unwrap_err();
        assert!(matches!(err, MappingError::InvalidSupertype { .. }));

        let err = build(vec![
            TypeDef::mapped_superclass("A").extending("B"),
            TypeDef::mapped_superclass("B").extending("A"),
        ])
        .unwrap_err();
        match err {
            MappingError::InvalidSupertype { reason, .. } => assert_eq!(reason, "inheritance cycle"),
            other => panic!("Expected InvalidSupertype, got {other:?}"),
        }
    }

    #[test]
    fn test_inherited_attributes() {
        let metamodel = build(vec![
            TypeDef::mapped_superclass("Base").with_attribute(id().with(Annotation::GeneratedValue(
                GeneratedValue::strategy(GenerationType::Sequence),
            ))),
            TypeDef::entity("Order")
                .extending("Base")
                .with_attribute(AttributeDef::new("code", "String")),
        ])
        .unwrap();

        let table = metamodel.table("Order").unwrap();
        assert_eq!(table.primary_key, vec!["id"]);
        assert_eq!(table.columns.len(), 2);
        assert!(metamodel.table("Base").is_none());
        assert_eq!(
            metamodel.attribute("Order", "id").and_then(|a| a.id_type),
            Some(IdType::Sequence)
        );
    }

    #[test]
    fn test_inherited_duplicate_attribute() {
        let err = build(vec![
            TypeDef::mapped_superclass("Base").with_attribute(AttributeDef::new("code", "String")),
            TypeDef::entity("Order")
                .extending("Base")
                .with_attribute(AttributeDef::new("code", "String")),
        ])
        .unwrap_err();
        match err {
            MappingError::DuplicateAttribute { member } => assert_eq!(member, "Order.code"),
            other => panic!("Expected DuplicateAttribute, got {other:?}"),
        }
    }

    #[test]
    fn test_two_versions() {
        let err = build(vec![TypeDef::entity("Order")
            .with_attribute(AttributeDef::new("v1", "Long").with(Annotation::Version))
            .with_attribute(AttributeDef::new("v2", "Long").with(Annotation::Version))])
        .unwrap_err();
        assert!(matches!(err, MappingError::InvalidVersion { .. }));
    }

    #[test]
    fn test_unknown_generator_reference() {
        let err = build(vec![TypeDef::entity("Order").with_attribute(id().with(
            Annotation::GeneratedValue(GeneratedValue::strategy(GenerationType::Sequence).with_generator("nope")),
        ))])
        .unwrap_err();
        assert!(matches!(err, MappingError::UnknownGenerator { .. }));
        assert_eq!(err.kind(), ErrorKind::GeneratorConflict);
    }

    #[test]
    fn test_generator_kind_mismatch() {
        let err = build(vec![
            TypeDef::entity("Order").with_sequence_generator(SequenceGeneratorDef::new("order_seq")),
            TypeDef::entity("Invoice").with_attribute(id().with(Annotation::GeneratedValue(
                GeneratedValue::strategy(GenerationType::Table).with_generator("order_seq"),
            ))),
        ])
        .unwrap_err();
        assert!(matches!(err, MappingError::GeneratorKindMismatch { .. }));
    }

    #[test]
    fn test_generator_referenced_across_types() {
        let metamodel = build(vec![
            TypeDef::entity("Order").with_sequence_generator(SequenceGeneratorDef::new("shared_seq")),
            TypeDef::entity("Invoice").with_attribute(id().with(Annotation::GeneratedValue(
                GeneratedValue::strategy(GenerationType::Sequence).with_generator("shared_seq"),
            ))),
        ])
        .unwrap();

        let attribute = metamodel.attribute("Invoice", "id").unwrap();
        assert_eq!(attribute.generator_name.as_deref(), Some("shared_seq"));
        assert_eq!(metamodel.generators().len(), 1);
    }

    #[test]
    fn test_auto_generator_reference_in_any_order() {
        let order = TypeDef::entity("Order").with_attribute(id().with(Annotation::GeneratedValue(
            GeneratedValue::strategy(GenerationType::Auto).with_generator("inv_ids"),
        )));
        let invoice = TypeDef::entity("Invoice")
            .with_attribute(id().with(Annotation::TableGenerator(TableGeneratorDef::new("inv_ids"))));

        for types in [
            vec![invoice.clone(), order.clone()],
            vec![order.clone(), invoice.clone()],
        ] {
            let metamodel = build(types).unwrap();
            let attribute = metamodel.attribute("Order", "id").unwrap();
            assert_eq!(attribute.id_type, Some(IdType::Table));
            assert_eq!(attribute.generator_name.as_deref(), Some("inv_ids"));
            assert_eq!(metamodel.generators().len(), 1);
        }
    }

    #[test]
    fn test_declared_default_generator_in_any_order() {
        let order = TypeDef::entity("Order")
            .with_attribute(id().with(Annotation::GeneratedValue(GeneratedValue::strategy(GenerationType::Auto))));
        let invoice = TypeDef::entity("Invoice").with_attribute(id().with(Annotation::SequenceGenerator(
            SequenceGeneratorDef::new(DEFAULT_SEQUENCE_GENERATOR).with_initial_value(500),
        )));

        for types in [
            vec![invoice.clone(), order.clone()],
            vec![order.clone(), invoice.clone()],
        ] {
            let metamodel = build(types).unwrap();
            assert_eq!(
                metamodel.attribute("Order", "id").unwrap().generator_name.as_deref(),
                Some(DEFAULT_SEQUENCE_GENERATOR)
            );
            assert_eq!(metamodel.generators().len(), 1);
            assert_eq!(metamodel.generators().declared_by(DEFAULT_SEQUENCE_GENERATOR), Some("Invoice.id"));
            assert_eq!(
                metamodel.generators().sequence(DEFAULT_SEQUENCE_GENERATOR).map(|g| g.initial_value),
                Some(500)
            );
        }
    }

    #[test]
    fn test_default_generator_name_of_other_kind() {
        let err = build(vec![
            TypeDef::entity("Order")
                .with_attribute(id().with(Annotation::GeneratedValue(GeneratedValue::strategy(GenerationType::Auto)))),
            TypeDef::entity("Invoice").with_attribute(id().with(Annotation::TableGenerator(
                TableGeneratorDef::new(DEFAULT_SEQUENCE_GENERATOR),
            ))),
        ])
        .unwrap_err();
        match err {
            MappingError::DuplicateGenerator { name, member } => {
                assert_eq!(name, DEFAULT_SEQUENCE_GENERATOR);
                assert_eq!(member, "Order.id");
            }
            other => panic!("Expected DuplicateGenerator, got {other:?}"),
        }
    }
}
