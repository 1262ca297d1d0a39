//! Column templates.
//!
//! A template is a validated column declaration whose final physical name is
//! only known once the attribute is linked into a table.

use crate::error::MappingError;
use crate::model::{ColumnDecl, JoinColumnDecl};
use serde::Serialize;

/// A validated `Column` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnTemplate {
    /// Explicit physical name.
    pub name: Option<String>,
    /// Whether the column accepts nulls.
    pub nullable: bool,
    /// Whether the column carries a unique constraint.
    pub unique: bool,
    /// Whether the column is written on insert.
    pub insertable: bool,
    /// Whether the column is written on update.
    pub updatable: bool,
    /// Column length, always positive.
    pub length: u32,
    /// Decimal precision.
    pub precision: u32,
    /// Decimal scale.
    pub scale: u32,
}

/// A validated `JoinColumn` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinColumnTemplate {
    /// Explicit physical name.
    pub name: Option<String>,
    /// Referenced primary-key column of the target.
    pub referenced_column: Option<String>,
    /// Whether the column accepts nulls.
    pub nullable: bool,
    /// Whether the column carries a unique constraint.
    pub unique: bool,
    /// Whether the column is written on insert.
    pub insertable: bool,
    /// Whether the column is written on update.
    pub updatable: bool,
}

fn reject_definition(definition: &Option<String>, member: &str) -> Result<(), MappingError> {
    match definition {
        Some(d) if !d.trim().is_empty() => Err(MappingError::UnsupportedColumnDefinition {
            member: member.to_string(),
        }),
        _ => Ok(()),
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Reject negative precision/scale and a scale larger than the precision.
fn validate_column_parameters(member: &str, precision: i32, scale: i32) -> Result<(), MappingError> {
    let reason = if precision < 0 {
        Some(format!("precision must not be negative, was {precision}"))
    } else if scale < 0 {
        Some(format!("scale must not be negative, was {scale}"))
    } else if precision > 0 && scale > precision {
        Some(format!("scale {scale} exceeds precision {precision}"))
    } else {
        None
    };

    match reason {
        Some(reason) => Err(MappingError::InvalidColumnParameters {
            reason,
            member: member.to_string(),
        }),
        None => Ok(()),
    }
}

impl ColumnTemplate {
    /// Validate a `Column` declaration.
    pub(crate) fn from_decl(
        decl: &ColumnDecl,
        member: &str,
        default_length: u32,
    ) -> Result<Self, MappingError> {
        reject_definition(&decl.column_definition, member)?;
        validate_column_parameters(member, decl.precision, decl.scale)?;

        let length = match decl.length {
            Some(length) if length <= 0 => {
                return Err(MappingError::NonPositiveLength {
                    length,
                    member: member.to_string(),
                })
            }
            Some(length) => length as u32,
            None => default_length,
        };

        Ok(Self {
            name: non_blank(&decl.name),
            nullable: decl.nullable,
            unique: decl.unique,
            insertable: decl.insertable,
            updatable: decl.updatable,
            length,
            precision: decl.precision as u32,
            scale: decl.scale as u32,
        })
    }

    /// Template for a basic attribute without `Column`.
    pub(crate) fn implicit(default_length: u32) -> Self {
        Self {
            name: None,
            nullable: true,
            unique: false,
            insertable: true,
            updatable: true,
            length: default_length,
            precision: 0,
            scale: 0,
        }
    }
}

impl JoinColumnTemplate {
    /// Validate a `JoinColumn` declaration.
    pub(crate) fn from_decl(decl: &JoinColumnDecl, member: &str) -> Result<Self, MappingError> {
        reject_definition(&decl.column_definition, member)?;

        Ok(Self {
            name: non_blank(&decl.name),
            referenced_column: non_blank(&decl.referenced_column_name),
            nullable: decl.nullable,
            unique: decl.unique,
            insertable: decl.insertable,
            updatable: decl.updatable,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_length_must_be_positive() {
        for length in [0, -1, -255] {
            let err = ColumnTemplate::from_decl(
                &ColumnDecl::default().with_length(length),
                "Order.code",
                255,
            )
            .unwrap_err();
            assert!(matches!(err, MappingError::NonPositiveLength { .. }));
            assert_eq!(err.kind(), ErrorKind::Structural);
        }

        for length in [1, 16, 4000] {
            let template = ColumnTemplate::from_decl(
                &ColumnDecl::default().with_length(length),
                "Order.code",
                255,
            )
            .unwrap();
            assert_eq!(template.length, length as u32);
        }
    }

    #[test]
    fn test_default_length() {
        let template = ColumnTemplate::from_decl(&ColumnDecl::default(), "Order.code", 64).unwrap();
        assert_eq!(template.length, 64);
        assert!(template.name.is_none());
    }

    #[test]
    fn test_column_definition_rejected() {
        let err = ColumnTemplate::from_decl(
            &ColumnDecl::default().with_definition("VARCHAR(20) NOT NULL"),
            "Order.code",
            255,
        )
        .unwrap_err();
        assert!(matches!(err, MappingError::UnsupportedColumnDefinition { .. }));

        // Blank definitions are the annotation default and mean "none".
        assert!(ColumnTemplate::from_decl(
            &ColumnDecl::default().with_definition("  "),
            "Order.code",
            255
        )
        .is_ok());
    }

    #[test]
    fn test_precision_and_scale() {
        assert!(ColumnTemplate::from_decl(
            &ColumnDecl::default().with_precision(10, 2),
            "Order.total",
            255
        )
        .is_ok());

        let err = ColumnTemplate::from_decl(
            &ColumnDecl::default().with_precision(4, 6),
            "Order.total",
            255,
        )
        .unwrap_err();
        assert!(matches!(err, MappingError::InvalidColumnParameters { .. }));

        assert!(ColumnTemplate::from_decl(
            &ColumnDecl::default().with_precision(-1, 0),
            "Order.total",
            255
        )
        .is_err());
    }

    #[test]
    fn test_join_column_template() {
        let template = JoinColumnTemplate::from_decl(
            &JoinColumnDecl::named("CUSTOMER_ID").referencing("ID"),
            "Order.customer",
        )
        .unwrap();
        assert_eq!(template.name.as_deref(), Some("CUSTOMER_ID"));
        assert_eq!(template.referenced_column.as_deref(), Some("ID"));

        let mut decl = JoinColumnDecl::default();
        decl.column_definition = Some("BIGINT".into());
        assert!(JoinColumnTemplate::from_decl(&decl, "Order.customer").is_err());
    }
}
