//! Parsed declarations of one build, indexed for linking.

use crate::model::TypeDef;
use crate::parse::Attribute;
use std::collections::HashMap;

/// Declared types with their parsed attributes.
pub(crate) struct ParsedUnit<'a> {
    types: &'a [TypeDef],
    attributes: &'a [Vec<Attribute>],
    index: HashMap<&'a str, usize>,
}

impl<'a> ParsedUnit<'a> {
    /// `attributes[i]` holds the parsed attributes of `types[i]`.
    pub(crate) fn new(types: &'a [TypeDef], attributes: &'a [Vec<Attribute>]) -> Self {
        let index = types
            .iter()
            .enumerate()
            .map(|(i, ty)| (ty.name.as_str(), i))
            .collect();
        Self {
            types,
            attributes,
            index,
        }
    }

    pub(crate) fn types(&self) -> &'a [TypeDef] {
        self.types
    }

    pub(crate) fn get(&self, name: &str) -> Option<&'a TypeDef> {
        self.index.get(name).map(|&i| &self.types[i])
    }

    /// Attributes declared directly on a type.
    pub(crate) fn declared(&self, name: &str) -> &'a [Attribute] {
        match self.index.get(name) {
            Some(&i) => &self.attributes[i],
            None => &[],
        }
    }

    /// The type followed by its supertypes, nearest first.
    pub(crate) fn lineage(&self, name: &str) -> Vec<&'a TypeDef> {
        let mut out: Vec<&'a TypeDef> = Vec::new();
        let mut current = self.get(name);
        while let Some(ty) = current {
            if out.iter().any(|seen| seen.name == ty.name) {
                break;
            }
            out.push(ty);
            current = ty.supertype.as_deref().and_then(|s| self.get(s));
        }
        out
    }

    /// Inherited attributes (root supertype first) followed by declared ones.
    pub(crate) fn effective(&self, name: &str) -> Vec<&'a Attribute> {
        self.lineage(name)
            .iter()
            .rev()
            .flat_map(|ty| self.declared(&ty.name))
            .collect()
    }
}
