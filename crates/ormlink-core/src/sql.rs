//! SQL fragments derived from the metamodel.
//!
//! Only the pieces a query generator needs to address entity tables: the
//! `FROM` item, the column list and association joins.

use crate::error::Error;
use crate::link::Mapping;
use crate::metamodel::Metamodel;
use crate::schema::Table;

fn entity_table<'a>(metamodel: &'a Metamodel, entity: &str) -> Result<&'a Table, Error> {
    metamodel
        .table(entity)
        .ok_or_else(|| Error::UnknownEntity(entity.to_string()))
}

/// `FROM` item of an entity: `<table> AS <alias>`.
pub fn from_fragment(metamodel: &Metamodel, entity: &str, alias: &str) -> Result<String, Error> {
    let table = entity_table(metamodel, entity)?;
    Ok(format!("{} AS {}", table.name, alias))
}

/// Every column of an entity table, qualified with `alias`.
pub fn select_list(metamodel: &Metamodel, entity: &str, alias: &str) -> Result<String, Error> {
    let table = entity_table(metamodel, entity)?;
    Ok(table
        .columns
        .iter()
        .map(|c| format!("{}.{}", alias, c.name))
        .collect::<Vec<_>>()
        .join(", "))
}

/// Join from `entity` (aliased `left`) across the association at `path` to
/// its target (aliased `right`).
///
/// Optional and non-owning associations join outer; mandatory owning ones
/// join inner.
pub fn join_fragment(
    metamodel: &Metamodel,
    entity: &str,
    path: &str,
    left: &str,
    right: &str,
) -> Result<String, Error> {
    entity_table(metamodel, entity)?;
    let mapping = metamodel
        .mapping(entity, path)
        .ok_or_else(|| Error::UnknownMapping {
            entity: entity.to_string(),
            path: path.to_string(),
        })?;

    let (kind, target_table, conditions) = match mapping {
        Mapping::OwnerOneToOne(owner) | Mapping::OwnerManyToOne(owner) => {
            let kind = if owner.optional { "LEFT OUTER JOIN" } else { "INNER JOIN" };
            let conditions: Vec<String> = owner
                .columns
                .iter()
                .zip(&owner.referenced_columns)
                .map(|(column, referenced)| format!("{right}.{referenced} = {left}.{column}"))
                .collect();
            (kind, owner.target_table.clone(), conditions)
        }
        Mapping::OwnedOneToOne(owned) => {
            let owner = metamodel
                .owner_of(owned)
                .and_then(Mapping::as_owner)
                .ok_or_else(|| Error::UnknownMapping {
                    entity: owned.owner.entity.clone(),
                    path: owned.owner.path.clone(),
                })?;
            let target_table = entity_table(metamodel, &owned.target)?.name.clone();
            let conditions: Vec<String> = owner
                .columns
                .iter()
                .zip(&owner.referenced_columns)
                .map(|(column, referenced)| format!("{right}.{column} = {left}.{referenced}"))
                .collect();
            ("LEFT OUTER JOIN", target_table, conditions)
        }
        Mapping::Basic(_) | Mapping::Embedded(_) => {
            return Err(Error::NotAnAssociation {
                entity: entity.to_string(),
                path: path.to_string(),
            })
        }
    };

    Ok(format!(
        "{} {} AS {} ON {}",
        kind,
        target_table,
        right,
        conditions.join(" AND ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::AdapterProfile;
    use crate::model::{Annotation, AttributeDef, ColumnDecl, ManyToOneDecl, OneToOneDecl, TypeDef};

    fn metamodel() -> Metamodel {
        Metamodel::builder()
            .with_type(
                TypeDef::entity("Customer")
                    .with_table("CUSTOMERS")
                    .with_attribute(
                        AttributeDef::new("id", "Long")
                            .with(Annotation::Id)
                            .with(Annotation::Column(ColumnDecl::named("ID"))),
                    )
                    .with_attribute(AttributeDef::new("name", "String"))
                    .with_attribute(
                        AttributeDef::new("profile", "Profile")
                            .with(Annotation::OneToOne(OneToOneDecl::mapped_by("customer"))),
                    ),
            )
            .with_type(
                TypeDef::entity("Profile")
                    .with_attribute(AttributeDef::new("id", "Long").with(Annotation::Id))
                    .with_attribute(
                        AttributeDef::new("customer", "Customer")
                            .with(Annotation::OneToOne(OneToOneDecl::default())),
                    ),
            )
            .with_type(
                TypeDef::entity("Order")
                    .with_table("ORDERS")
                    .with_attribute(AttributeDef::new("id", "Long").with(Annotation::Id))
                    .with_attribute(AttributeDef::new("customer", "Customer").with(
                        Annotation::ManyToOne(ManyToOneDecl {
                            optional: false,
                            ..Default::default()
                        }),
                    )),
            )
            .build(&AdapterProfile::H2)
            .unwrap()
    }

    #[test]
    fn test_from_fragment() {
        let metamodel = metamodel();
        assert_eq!(from_fragment(&metamodel, "Order", "o").unwrap(), "ORDERS AS o");
        assert!(matches!(
            from_fragment(&metamodel, "Missing", "m"),
            Err(Error::UnknownEntity(_))
        ));
    }

    #[test]
    fn test_select_list() {
        let metamodel = metamodel();
        assert_eq!(select_list(&metamodel, "Customer", "c").unwrap(), "c.ID, c.name");
    }

    #[test]
    fn test_owner_join() {
        let metamodel = metamodel();
        assert_eq!(
            join_fragment(&metamodel, "Order", "customer", "o", "c").unwrap(),
            "INNER JOIN CUSTOMERS AS c ON c.ID = o.customer_ID"
        );
    }

    #[test]
    fn test_owned_join() {
        let metamodel = metamodel();
        assert_eq!(
            join_fragment(&metamodel, "Customer", "profile", "c", "p").unwrap(),
            "LEFT OUTER JOIN Profile AS p ON p.customer_ID = c.ID"
        );
    }

    #[test]
    fn test_join_errors() {
        let metamodel = metamodel();
        assert!(matches!(
            join_fragment(&metamodel, "Customer", "name", "c", "n"),
            Err(Error::NotAnAssociation { .. })
        ));
        assert!(matches!(
            join_fragment(&metamodel, "Customer", "nope", "c", "n"),
            Err(Error::UnknownMapping { .. })
        ));
    }
}
