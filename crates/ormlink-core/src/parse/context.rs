//! State shared by every attribute parsed within one build.

use crate::adapter::DatabaseAdapter;
use crate::config::MetamodelConfig;
use crate::error::MappingError;
use crate::generator::{GeneratorDef, GeneratorRegistry};
use crate::model::{Annotation, IdType, TypeDef};
use std::collections::HashMap;
use tracing::debug;

/// Parse-phase state of one build.
///
/// Owned by a single builder; nothing here is shared across threads.
pub(crate) struct ParseContext<'a> {
    pub(crate) config: &'a MetamodelConfig,
    pub(crate) adapter: &'a dyn DatabaseAdapter,
    pub(crate) registry: GeneratorRegistry,
    /// Identifiable type name -> member declaring its attribute-level generator.
    generator_members: HashMap<String, String>,
    /// Every generator name declared in the unit -> its kind, known before
    /// any attribute is parsed.
    declared: HashMap<String, IdType>,
}

impl<'a> ParseContext<'a> {
    pub(crate) fn new(config: &'a MetamodelConfig, adapter: &'a dyn DatabaseAdapter) -> Self {
        Self {
            config,
            adapter,
            registry: GeneratorRegistry::new(),
            generator_members: HashMap::new(),
            declared: HashMap::new(),
        }
    }

    /// Index the generators declared on the types of the unit and on their
    /// attributes.
    pub(crate) fn declare_generators(&mut self, types: &[TypeDef]) {
        for ty in types {
            let on_type = ty
                .sequence_generator
                .iter()
                .map(|g| (g.name.as_str(), IdType::Sequence))
                .chain(ty.table_generator.iter().map(|g| (g.name.as_str(), IdType::Table)));
            let on_attributes = ty
                .attributes
                .iter()
                .flat_map(|a| a.annotations.iter())
                .filter_map(|annotation| match annotation {
                    Annotation::SequenceGenerator(g) => Some((g.name.as_str(), IdType::Sequence)),
                    Annotation::TableGenerator(g) => Some((g.name.as_str(), IdType::Table)),
                    _ => None,
                });

            for (name, kind) in on_type.chain(on_attributes) {
                if !name.trim().is_empty() {
                    self.declared.entry(name.to_string()).or_insert(kind);
                }
            }
        }
    }

    /// Kind of a generator declared anywhere in the unit.
    pub(crate) fn declared_kind(&self, name: &str) -> Option<IdType> {
        self.declared.get(name).copied()
    }

    /// Kind of a generator, registered or declared.
    pub(crate) fn generator_kind(&self, name: &str) -> Option<IdType> {
        self.registry
            .get(name)
            .map(GeneratorDef::id_type)
            .or_else(|| self.declared_kind(name))
    }

    /// Whether the adapter produces `kind` as is.
    pub(crate) fn serves(&self, kind: IdType) -> bool {
        kind.as_generation_type()
            .and_then(|strategy| self.adapter.supports(strategy))
            == Some(kind)
    }

    /// Record that `member` declares the attribute-level generator of `owner`.
    pub(crate) fn claim_generator(&mut self, owner: &TypeDef, member: &str) -> Result<(), MappingError> {
        match self.generator_members.get(&owner.name) {
            Some(existing) if existing == member => Ok(()),
            Some(_) => Err(MappingError::MultipleGenerators {
                type_name: owner.display_name().to_string(),
                member: member.to_string(),
            }),
            None => {
                self.generator_members
                    .insert(owner.name.clone(), member.to_string());
                Ok(())
            }
        }
    }

    /// Register the generators declared on a type.
    pub(crate) fn register_type_generators(&mut self, owner: &TypeDef) -> Result<(), MappingError> {
        if owner.sequence_generator.is_none() && owner.table_generator.is_none() {
            return Ok(());
        }

        let declared_by = owner.display_name().to_string();
        if !owner.kind.is_identifiable() {
            return Err(MappingError::GeneratorOnNonIdentifiable {
                member: declared_by,
            });
        }

        let def = match (&owner.sequence_generator, &owner.table_generator) {
            (Some(_), Some(_)) => {
                return Err(MappingError::SequenceAndTableGenerator {
                    member: declared_by,
                })
            }
            (Some(seq), None) => GeneratorDef::Sequence(seq.clone().normalized()),
            (None, Some(table)) => {
                GeneratorDef::Table(table.clone().normalized(&self.config.default_table_generator))
            }
            (None, None) => return Ok(()),
        };

        if def.name().trim().is_empty() {
            return Err(MappingError::BlankGeneratorName {
                generator: def.annotation().to_string(),
                member: declared_by,
            });
        }

        if !self.serves(def.id_type()) {
            debug!(
                generator = def.name(),
                adapter = self.adapter.name(),
                "Skipped generator the adapter cannot serve"
            );
            return Ok(());
        }
        self.registry.register(def, &declared_by)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::AdapterProfile;
    use crate::error::ErrorKind;
    use crate::generator::{SequenceGeneratorDef, TableGeneratorDef};

    #[test]
    fn test_type_generators() {
        let config = MetamodelConfig::default();
        let mut ctx = ParseContext::new(&config, &AdapterProfile::Postgres);

        let order = TypeDef::entity("Order").with_sequence_generator(SequenceGeneratorDef::new("order_seq"));
        ctx.register_type_generators(&order).unwrap();
        assert_eq!(ctx.registry.declared_by("order_seq"), Some("Order"));

        let invoice = TypeDef::entity("Invoice").with_table_generator(TableGeneratorDef::new("invoice_ids"));
        ctx.register_type_generators(&invoice).unwrap();
        let table = ctx.registry.table("invoice_ids").unwrap();
        assert_eq!(table.table, "ORMLINK_SEQUENCES");
        assert_eq!(table.pk_column_value, "invoice_ids");
    }

    #[test]
    fn test_type_generator_errors() {
        let config = MetamodelConfig::default();
        let mut ctx = ParseContext::new(&config, &AdapterProfile::Postgres);

        let both = TypeDef::entity("Both")
            .with_sequence_generator(SequenceGeneratorDef::new("a"))
            .with_table_generator(TableGeneratorDef::new("b"));
        let err = ctx.register_type_generators(&both).unwrap_err();
        assert!(matches!(err, MappingError::SequenceAndTableGenerator { .. }));
        assert_eq!(err.kind(), ErrorKind::GeneratorConflict);

        let embeddable = TypeDef::embeddable("Address").with_sequence_generator(SequenceGeneratorDef::new("c"));
        assert!(matches!(
            ctx.register_type_generators(&embeddable),
            Err(MappingError::GeneratorOnNonIdentifiable { .. })
        ));

        let blank = TypeDef::entity("Blank").with_sequence_generator(SequenceGeneratorDef::new(" "));
        assert!(matches!(
            ctx.register_type_generators(&blank),
            Err(MappingError::BlankGeneratorName { .. })
        ));
        assert!(ctx.registry.is_empty());
    }

    #[test]
    fn test_claim_generator() {
        let config = MetamodelConfig::default();
        let mut ctx = ParseContext::new(&config, &AdapterProfile::Postgres);
        let order = TypeDef::entity("Order");

        ctx.claim_generator(&order, "Order.id").unwrap();
        ctx.claim_generator(&order, "Order.id").unwrap();
        let err = ctx.claim_generator(&order, "Order.other").unwrap_err();
        assert!(matches!(err, MappingError::MultipleGenerators { .. }));
    }

    #[test]
    fn test_declared_generators() {
        let config = MetamodelConfig::default();
        let mut ctx = ParseContext::new(&config, &AdapterProfile::Postgres);
        ctx.declare_generators(&[
            TypeDef::entity("Order").with_sequence_generator(SequenceGeneratorDef::new("order_seq")),
            TypeDef::entity("Invoice").with_attribute(
                crate::model::AttributeDef::new("id", "Long")
                    .with(Annotation::Id)
                    .with(Annotation::TableGenerator(TableGeneratorDef::new("invoice_ids"))),
            ),
        ]);

        assert_eq!(ctx.declared_kind("order_seq"), Some(IdType::Sequence));
        assert_eq!(ctx.generator_kind("invoice_ids"), Some(IdType::Table));
        assert_eq!(ctx.generator_kind("missing"), None);
        assert!(ctx.registry.is_empty());
    }

    #[test]
    fn test_type_generator_the_adapter_cannot_serve() {
        let config = MetamodelConfig::default();
        let mut ctx = ParseContext::new(&config, &AdapterProfile::MySql);
        assert!(!ctx.serves(IdType::Sequence));
        assert!(ctx.serves(IdType::Table));

        let order = TypeDef::entity("Order").with_sequence_generator(SequenceGeneratorDef::new("order_seq"));
        ctx.register_type_generators(&order).unwrap();
        assert!(!ctx.registry.contains("order_seq"));
    }
}
