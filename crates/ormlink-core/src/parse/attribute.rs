//! Attribute metadata and the parse phase.

use super::column::{ColumnTemplate, JoinColumnTemplate};
use super::context::ParseContext;
use super::identifier::parse_id;
use crate::error::MappingError;
use crate::model::{
    Annotation, AttributeDef, AttributeKind, CascadeType, FetchType, IdType,
    PersistentAttributeType, ScalarType, TypeDef,
};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Value type of an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Scalar held by a basic or LOB attribute.
    Scalar(ScalarType),
    /// Embeddable or entity type name.
    Managed(String),
}

impl ValueType {
    /// Managed type name, if any.
    pub fn managed(&self) -> Option<&str> {
        match self {
            ValueType::Managed(name) => Some(name),
            ValueType::Scalar(_) => None,
        }
    }

    /// Scalar type, if any.
    pub fn scalar(&self) -> Option<ScalarType> {
        match self {
            ValueType::Scalar(scalar) => Some(*scalar),
            ValueType::Managed(_) => None,
        }
    }
}

/// Parsed metadata of one singular attribute.
///
/// Produced once by the parse phase and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Name of the declaring type.
    pub declaring_type: String,
    /// Canonical member name used in diagnostics.
    pub member: String,
    /// Semantic kind.
    pub kind: AttributeKind,
    /// Value type.
    pub value_type: ValueType,
    /// Many-to-one association.
    pub many: bool,
    /// Whether the value may be null.
    pub optional: bool,
    /// Optimistic-lock version.
    pub version: bool,
    /// Fetch policy.
    pub fetch: FetchType,
    /// Cascaded operations of an association.
    pub cascade: Vec<CascadeType>,
    /// Owning attribute on the target of a non-owning one-to-one.
    pub mapped_by: Option<String>,
    /// Remove the target when it is dereferenced.
    pub orphan_removal: bool,
    /// Resolved identifier strategy; set only on identifiers.
    pub id_type: Option<IdType>,
    /// Generator drawn from for sequence and table identifiers.
    pub generator_name: Option<String>,
    /// Column templates of basic and LOB attributes.
    pub columns: Vec<ColumnTemplate>,
    /// Declared join columns of an owning association.
    pub join_columns: Vec<JoinColumnTemplate>,
}

impl Attribute {
    fn new(owner: &TypeDef, def: &AttributeDef, member: String, kind: AttributeKind, value_type: ValueType) -> Self {
        Self {
            name: def.name.clone(),
            declaring_type: owner.name.clone(),
            member,
            kind,
            value_type,
            many: false,
            optional: true,
            version: false,
            fetch: FetchType::Eager,
            cascade: Vec::new(),
            mapped_by: None,
            orphan_removal: false,
            id_type: None,
            generator_name: None,
            columns: Vec::new(),
            join_columns: Vec::new(),
        }
    }

    /// Whether this is an identifier attribute.
    pub fn is_id(&self) -> bool {
        self.id_type.is_some()
    }

    /// Whether the attribute is stored in its own columns.
    pub fn is_column_backed(&self) -> bool {
        matches!(self.kind, AttributeKind::Basic | AttributeKind::Lob)
    }

    /// Whether the attribute references another entity.
    pub fn is_association(&self) -> bool {
        self.kind == AttributeKind::Association
    }

    /// Whether the attribute owns a foreign key.
    pub fn is_owner(&self) -> bool {
        self.is_association() && self.mapped_by.is_none()
    }

    /// Whether the value is loaded with its owner.
    pub fn is_eager(&self) -> bool {
        self.fetch == FetchType::Eager
    }

    /// Target type of an embedded or association attribute.
    pub fn target(&self) -> Option<&str> {
        self.value_type.managed()
    }

    /// Public classification.
    pub fn persistent_attribute_type(&self) -> PersistentAttributeType {
        match self.kind {
            AttributeKind::Basic | AttributeKind::Lob => PersistentAttributeType::Basic,
            AttributeKind::Embedded => PersistentAttributeType::Embedded,
            AttributeKind::Association if self.many => PersistentAttributeType::ManyToOne,
            AttributeKind::Association => PersistentAttributeType::OneToOne,
        }
    }
}

/// Reject non-repeatable annotations that occur more than once.
fn check_repeats(def: &AttributeDef, member: &str) -> Result<(), MappingError> {
    let mut seen = HashSet::new();
    for annotation in def.annotations.iter().filter(|a| !a.is_repeatable()) {
        if !seen.insert(annotation.name()) {
            return Err(MappingError::DuplicateAnnotation {
                annotation: annotation.name().to_string(),
                member: member.to_string(),
            });
        }
    }
    Ok(())
}

/// Determine the attribute kind from the kind-selecting annotations.
///
/// Returns the kind and the annotation that selected it.
fn resolve_kind(def: &AttributeDef, member: &str) -> Result<(AttributeKind, Option<&'static str>), MappingError> {
    let mut selected: Option<(AttributeKind, &'static str)> = None;

    for annotation in def.annotations.iter().filter(|a| a.is_kind_selector()) {
        let kind = match annotation {
            Annotation::Lob => AttributeKind::Lob,
            Annotation::Embedded => AttributeKind::Embedded,
            _ => AttributeKind::Association,
        };
        if let Some((_, first)) = selected {
            return Err(MappingError::ConflictingKinds {
                first: first.to_string(),
                second: annotation.name().to_string(),
                member: member.to_string(),
            });
        }
        selected = Some((kind, annotation.name()));
    }

    Ok(match selected {
        Some((kind, selector)) => (kind, Some(selector)),
        None => (AttributeKind::Basic, None),
    })
}

fn validate_version(attribute: &Attribute) -> Result<(), MappingError> {
    let reason = if attribute.is_id() {
        Some("an identifier cannot be the version".to_string())
    } else if attribute.kind != AttributeKind::Basic {
        Some("only basic attributes can be versions".to_string())
    } else {
        match attribute.value_type.scalar() {
            Some(scalar) if scalar.is_versionable() => None,
            Some(scalar) => Some(format!("{scalar:?} cannot hold a version")),
            None => Some("only basic attributes can be versions".to_string()),
        }
    };

    match reason {
        Some(reason) => Err(MappingError::InvalidVersion {
            reason,
            member: attribute.member.clone(),
        }),
        None => Ok(()),
    }
}

/// Parse one declared attribute of `owner`.
///
/// Identifier attributes also register their generators and resolve their
/// strategy against the adapter.
pub(crate) fn parse_attribute(
    ctx: &mut ParseContext<'_>,
    owner: &TypeDef,
    def: &AttributeDef,
) -> Result<Attribute, MappingError> {
    let member = owner.member_name(&def.name);
    check_repeats(def, &member)?;
    let (kind, selector) = resolve_kind(def, &member)?;

    let value_type = match kind {
        AttributeKind::Basic | AttributeKind::Lob => {
            let scalar = def
                .type_name
                .parse::<ScalarType>()
                .map_err(|_| MappingError::UnknownScalarType {
                    type_name: def.type_name.clone(),
                    member: member.clone(),
                })?;
            ValueType::Scalar(scalar)
        }
        AttributeKind::Embedded | AttributeKind::Association => ValueType::Managed(def.type_name.clone()),
    };

    let mut attribute = Attribute::new(owner, def, member, kind, value_type);

    if def.has("Id") {
        parse_id(ctx, owner, def, &mut attribute)?;
    } else if let Some(annotation) = def.annotations.iter().find(|a| {
        matches!(
            a,
            Annotation::GeneratedValue(_) | Annotation::SequenceGenerator(_) | Annotation::TableGenerator(_)
        )
    }) {
        return Err(MappingError::GenerationWithoutId {
            annotation: annotation.name().to_string(),
            member: attribute.member,
        });
    }

    for annotation in &def.annotations {
        match annotation {
            Annotation::Version => attribute.version = true,
            Annotation::Basic(_) | Annotation::Column(_) if !attribute.is_column_backed() => {
                return Err(MappingError::ConflictingKinds {
                    first: selector.unwrap_or("Basic").to_string(),
                    second: annotation.name().to_string(),
                    member: attribute.member,
                });
            }
            Annotation::Basic(basic) => {
                attribute.optional = basic.optional;
                attribute.fetch = basic.fetch;
            }
            Annotation::Column(column) => {
                attribute.columns.push(ColumnTemplate::from_decl(
                    column,
                    &attribute.member,
                    ctx.config.default_column_length,
                )?);
            }
            Annotation::ManyToOne(decl) => {
                attribute.many = true;
                attribute.optional = decl.optional;
                attribute.fetch = decl.fetch;
                attribute.cascade = decl.cascade.clone();
            }
            Annotation::OneToOne(decl) => {
                let mapped_by = decl.mapped_by.trim();
                attribute.mapped_by = (!mapped_by.is_empty()).then(|| mapped_by.to_string());
                attribute.optional = decl.optional;
                attribute.fetch = decl.fetch;
                attribute.cascade = decl.cascade.clone();
                attribute.orphan_removal = decl.orphan_removal;
            }
            Annotation::JoinColumn(decl) => {
                attribute
                    .join_columns
                    .push(JoinColumnTemplate::from_decl(decl, &attribute.member)?);
            }
            _ => {}
        }
    }

    if !attribute.join_columns.is_empty() && !attribute.is_owner() {
        return Err(MappingError::JoinColumnOnNonOwning {
            member: attribute.member,
        });
    }

    if attribute.version {
        validate_version(&attribute)?;
    }

    if attribute.is_column_backed() && attribute.columns.is_empty() {
        attribute
            .columns
            .push(ColumnTemplate::implicit(ctx.config.default_column_length));
    }

    debug!(
        member = %attribute.member,
        kind = ?attribute.kind,
        id_type = ?attribute.id_type,
        generator = ?attribute.generator_name,
        "Parsed attribute"
    );

    Ok(attribute)
}
