//! Identifier parsing: generator validation and registration, and strategy
//! resolution against the database adapter.

use super::attribute::Attribute;
use super::context::ParseContext;
use crate::error::MappingError;
use crate::generator::GeneratorDef;
use crate::model::{Annotation, AttributeDef, AttributeKind, GeneratedValue, GenerationType, IdType, TypeDef};
use tracing::{debug, warn};

/// Validate a generator declared on an identifier attribute.
fn check_attribute_generator(
    owner: &TypeDef,
    member: &str,
    def: &GeneratorDef,
    generated: Option<&GeneratedValue>,
) -> Result<(), MappingError> {
    let generator = def.annotation();
    let (same_on_type, other_on_type) = match def {
        GeneratorDef::Sequence(_) => (owner.sequence_generator.is_some(), owner.table_generator.is_some()),
        GeneratorDef::Table(_) => (owner.table_generator.is_some(), owner.sequence_generator.is_some()),
    };

    if same_on_type {
        return Err(MappingError::GeneratorOnTypeAndAttribute {
            generator: generator.to_string(),
            member: member.to_string(),
        });
    }
    if other_on_type {
        return Err(MappingError::SequenceAndTableGenerator {
            member: member.to_string(),
        });
    }
    if def.name().trim().is_empty() {
        return Err(MappingError::BlankGeneratorName {
            generator: generator.to_string(),
            member: member.to_string(),
        });
    }

    if let Some(generated) = generated {
        let own_strategy = strategy_of(def.id_type());
        if generated.strategy != GenerationType::Auto && generated.strategy != own_strategy {
            return Err(MappingError::ConflictingStrategy {
                generator: generator.to_string(),
                strategy: generated.strategy,
                member: member.to_string(),
            });
        }

        let referenced = generated.generator.trim();
        if !referenced.is_empty() && referenced != def.name() {
            return Err(MappingError::GeneratorNameMismatch {
                generator: generator.to_string(),
                declared: def.name().to_string(),
                referenced: referenced.to_string(),
                member: member.to_string(),
            });
        }
    }

    Ok(())
}

fn strategy_of(kind: IdType) -> GenerationType {
    match kind {
        IdType::Table => GenerationType::Table,
        _ => GenerationType::Sequence,
    }
}

/// Parse the identifier facets of `attribute`.
///
/// Sets the resolved id type and, for sequence and table identifiers, the
/// generator values are drawn from. A generator declared on the attribute is
/// registered only when the adapter serves its kind.
pub(crate) fn parse_id(
    ctx: &mut ParseContext<'_>,
    owner: &TypeDef,
    def: &AttributeDef,
    attribute: &mut Attribute,
) -> Result<(), MappingError> {
    let member = attribute.member.clone();

    if !owner.kind.is_identifiable() {
        return Err(MappingError::IdOnNonIdentifiable { member });
    }
    if attribute.kind != AttributeKind::Basic {
        return Err(MappingError::IdOnNonBasic { member });
    }

    let mut generated = None;
    let mut sequence = None;
    let mut table = None;
    for annotation in &def.annotations {
        match annotation {
            Annotation::GeneratedValue(value) => generated = Some(value),
            Annotation::SequenceGenerator(value) => sequence = Some(value),
            Annotation::TableGenerator(value) => table = Some(value),
            _ => {}
        }
    }

    let declared = match (sequence, table) {
        (Some(_), Some(_)) => return Err(MappingError::SequenceAndTableGenerator { member }),
        (Some(seq), None) => Some(GeneratorDef::Sequence(seq.clone().normalized())),
        (None, Some(tab)) => Some(GeneratorDef::Table(
            tab.clone().normalized(&ctx.config.default_table_generator),
        )),
        (None, None) => None,
    };

    let mut requested = generated.map(|g| g.strategy);
    let mut generator_name = generated
        .map(|g| g.generator.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    if let Some(declared) = &declared {
        check_attribute_generator(owner, &member, declared, generated)?;
        generator_name = Some(declared.name().to_string());
        requested = Some(strategy_of(declared.id_type()));
    }

    let Some(mut strategy) = requested else {
        attribute.id_type = Some(IdType::Manual);
        return Ok(());
    };

    // AUTO naming a generator takes that generator's kind, wherever in the
    // unit it is declared.
    if strategy == GenerationType::Auto {
        if let Some(kind) = generator_name.as_deref().and_then(|name| ctx.generator_kind(name)) {
            strategy = strategy_of(kind);
        }
    }

    let id_type = ctx
        .adapter
        .supports(strategy)
        .ok_or_else(|| MappingError::UnsupportedStrategy {
            adapter: ctx.adapter.name().to_string(),
            strategy,
            member: member.clone(),
        })?;

    let substituted = strategy != GenerationType::Auto && id_type.as_generation_type() != Some(strategy);
    if substituted {
        warn!(
            member = %member,
            requested = %strategy,
            resolved = %id_type,
            adapter = ctx.adapter.name(),
            "Adapter substituted identifier strategy"
        );
        generator_name = None;
    }

    if let Some(declared) = declared {
        if substituted {
            debug!(
                member = %member,
                generator = declared.name(),
                "Skipped generator the adapter cannot serve"
            );
        } else {
            ctx.registry.register(declared, &member)?;
        }
        ctx.claim_generator(owner, &member)?;
    }

    if !id_type.uses_generator() {
        generator_name = None;
    } else if generator_name.is_none() {
        generator_name = Some(fallback_generator(ctx, owner, &member, id_type)?);
    }

    attribute.id_type = Some(id_type);
    attribute.generator_name = generator_name;
    Ok(())
}

/// Generator for a sequence or table identifier that names none: the owner's
/// type-level generator of that kind, else the configured default.
///
/// A generator declared in the unit under the default's name stands in for
/// the default, whether it is declared before or after this attribute.
fn fallback_generator(
    ctx: &mut ParseContext<'_>,
    owner: &TypeDef,
    member: &str,
    id_type: IdType,
) -> Result<String, MappingError> {
    let type_level = match id_type {
        IdType::Sequence => owner.sequence_generator.as_ref().map(|g| g.name.clone()),
        _ => owner.table_generator.as_ref().map(|g| g.name.clone()),
    };
    if let Some(name) = type_level.filter(|name| ctx.registry.contains(name)) {
        return Ok(name);
    }

    let default = match id_type {
        IdType::Sequence => GeneratorDef::Sequence(ctx.config.default_sequence_generator.clone().normalized()),
        _ => GeneratorDef::Table(ctx.config.normalized_default_table_generator()),
    };
    let name = default.name().to_string();

    match ctx.declared_kind(&name) {
        Some(kind) if kind == id_type => Ok(name),
        Some(_) => Err(MappingError::DuplicateGenerator {
            name,
            member: member.to_string(),
        }),
        None => {
            ctx.registry.ensure_default(default, member)?;
            Ok(name)
        }
    }
}
