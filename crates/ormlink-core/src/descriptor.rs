//! JSON persistence-unit descriptors.
//!
//! A descriptor is the declarative front end to the builder: the managed
//! types with their annotations, plus an optional configuration.
//!
//! ```json
//! {
//!   "name": "shop",
//!   "types": [
//!     {
//!       "name": "Order",
//!       "kind": "entity",
//!       "attributes": [
//!         { "name": "id", "type": "Long", "annotations": [{ "annotation": "id" }] }
//!       ]
//!     }
//!   ]
//! }
//! ```

use crate::adapter::DatabaseAdapter;
use crate::config::MetamodelConfig;
use crate::error::Error;
use crate::metamodel::{Metamodel, MetamodelBuilder};
use crate::model::TypeDef;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// A persistence unit as read from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDescriptor {
    /// Unit name.
    #[serde(default)]
    pub name: Option<String>,
    /// Build configuration; omitted fields take their defaults.
    #[serde(default)]
    pub config: MetamodelConfig,
    /// Managed types in declaration order.
    #[serde(default)]
    pub types: Vec<TypeDef>,
}

impl UnitDescriptor {
    /// Parse a descriptor from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a descriptor from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let descriptor = Self::from_json(&json)?;
        debug!(
            path = %path.display(),
            types = descriptor.types.len(),
            "Loaded descriptor"
        );
        Ok(descriptor)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// A builder preloaded with this unit's configuration and types.
    pub fn builder(&self) -> MetamodelBuilder {
        MetamodelBuilder::new()
            .with_config(self.config.clone())
            .with_types(self.types.iter().cloned())
    }

    /// Build the metamodel against a database adapter.
    pub fn build(&self, adapter: &dyn DatabaseAdapter) -> Result<Metamodel, Error> {
        Ok(self.builder().build(adapter)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::AdapterProfile;
    use crate::error::MappingError;
    use crate::model::{Annotation, PersistenceType};
    use std::io::Write;

    const SHOP: &str = r#"{
        "name": "shop",
        "config": { "default_column_length": 120 },
        "types": [
            {
                "name": "Order",
                "kind": "entity",
                "table": "ORDERS",
                "attributes": [
                    { "name": "id", "type": "Long", "annotations": [
                        { "annotation": "id" },
                        { "annotation": "generated_value", "strategy": "sequence" }
                    ]},
                    { "name": "code", "type": "String" }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let descriptor = UnitDescriptor::from_json(SHOP).unwrap();

        assert_eq!(descriptor.name.as_deref(), Some("shop"));
        assert_eq!(descriptor.config.default_column_length, 120);
        assert_eq!(descriptor.config.embedded_column_separator, "_");
        assert_eq!(descriptor.types[0].kind, PersistenceType::Entity);
        assert_eq!(descriptor.types[0].attributes[0].annotations[0], Annotation::Id);
    }

    #[test]
    fn test_build() {
        let metamodel = UnitDescriptor::from_json(SHOP)
            .unwrap()
            .build(&AdapterProfile::Postgres)
            .unwrap();

        let table = metamodel.table("Order").unwrap();
        assert_eq!(table.name, "ORDERS");
        assert_eq!(table.get_column("code").map(|c| c.length), Some(120));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SHOP.as_bytes()).unwrap();

        let descriptor = UnitDescriptor::from_path(file.path()).unwrap();
        assert_eq!(descriptor.types.len(), 1);

        let json = descriptor.to_json_pretty().unwrap();
        assert_eq!(UnitDescriptor::from_json(&json).unwrap(), descriptor);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            UnitDescriptor::from_json("{ not json"),
            Err(Error::Descriptor(_))
        ));
        assert!(matches!(
            UnitDescriptor::from_path("/nonexistent/ormlink/unit.json"),
            Err(Error::Io(_))
        ));

        let invalid = r#"{ "types": [
            { "name": "Order", "kind": "entity", "attributes": [
                { "name": "code", "type": "String", "annotations": [
                    { "annotation": "column", "length": 0 }
                ]}
            ]}
        ]}"#;
        let err = UnitDescriptor::from_json(invalid)
            .unwrap()
            .build(&AdapterProfile::Postgres)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Mapping(MappingError::NonPositiveLength { length: 0, .. })
        ));
    }
}
