use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::model::Dataset;

// ---------------------------------------------------------------------------
// PropertyKey – typed composite name
// ---------------------------------------------------------------------------

/// An input property addressed by type and optional subtype.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyKey {
    pub type_name: String,
    pub subtype: Option<String>,
}

impl PropertyKey {
    pub fn leaf(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            subtype: None,
        }
    }

    pub fn sub(type_name: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            subtype: Some(subtype.into()),
        }
    }

    /// The name this key is stored under in an experiment's `inputs`.
    pub fn canonical_name(&self) -> String {
        match &self.subtype {
            Some(sub) => format!("{} {}", self.type_name, sub),
            None => self.type_name.clone(),
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_name())
    }
}

// ---------------------------------------------------------------------------
// PropertySchema – input type → subtype grouping
// ---------------------------------------------------------------------------

/// Whether a schema entry is itself a property or a header over subtypes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKind {
    Leaf,
    Group(Vec<String>),
}

/// Static description of the recognised input properties.
///
/// Serialised as a JSON object mapping each type to its list of subtypes; an
/// empty list marks a leaf:
///
/// ```json
/// { "Temperature": [], "Gas Flow": ["Argon", "Nitrogen"] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySchema {
    types: Vec<(String, PropertyKind)>,
}

/// Input properties named by the schema but absent from an experiment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDrift {
    pub experiment_id: String,
    pub missing: Vec<String>,
}

impl PropertySchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_leaf(mut self, type_name: impl Into<String>) -> Self {
        self.types.push((type_name.into(), PropertyKind::Leaf));
        self
    }

    pub fn with_group<I, S>(mut self, type_name: impl Into<String>, subtypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let subtypes: Vec<String> = subtypes.into_iter().map(Into::into).collect();
        let kind = if subtypes.is_empty() {
            PropertyKind::Leaf
        } else {
            PropertyKind::Group(subtypes)
        };
        self.types.push((type_name.into(), kind));
        self
    }

    /// Types with their kind, in configuration order.
    pub fn types(&self) -> impl Iterator<Item = (&str, &PropertyKind)> {
        self.types.iter().map(|(t, k)| (t.as_str(), k))
    }

    /// Every addressable input key, expanded in order.
    pub fn input_keys(&self) -> Vec<PropertyKey> {
        let mut keys = Vec::new();
        for (type_name, kind) in &self.types {
            match kind {
                PropertyKind::Leaf => keys.push(PropertyKey::leaf(type_name.clone())),
                PropertyKind::Group(subtypes) => keys.extend(
                    subtypes
                        .iter()
                        .map(|sub| PropertyKey::sub(type_name.clone(), sub.clone())),
                ),
            }
        }
        keys
    }

    /// Look up the key whose canonical name is `name`.
    pub fn key_for(&self, name: &str) -> Option<PropertyKey> {
        self.input_keys()
            .into_iter()
            .find(|k| k.canonical_name() == name)
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// List the experiments whose inputs lack a schema property.
    ///
    /// Lookups against such experiments yield no value, which the filter
    /// engine treats as a non-match; this only reports it.
    pub fn check_against(&self, dataset: &Dataset) -> Vec<SchemaDrift> {
        let names: Vec<String> = self.input_keys().iter().map(PropertyKey::canonical_name).collect();
        dataset
            .experiments()
            .iter()
            .filter_map(|exp| {
                let missing: Vec<String> = names
                    .iter()
                    .filter(|n| !exp.inputs.contains(n))
                    .cloned()
                    .collect();
                (!missing.is_empty()).then(|| SchemaDrift {
                    experiment_id: exp.id.clone(),
                    missing,
                })
            })
            .collect()
    }
}

// -- serde: object of type → [subtype, ...], preserving key order --

impl Serialize for PropertySchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.types.len()))?;
        for (type_name, kind) in &self.types {
            let subtypes: &[String] = match kind {
                PropertyKind::Leaf => &[],
                PropertyKind::Group(subs) => subs,
            };
            map.serialize_entry(type_name, subtypes)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PropertySchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SchemaVisitor;

        impl<'de> Visitor<'de> for SchemaVisitor {
            type Value = PropertySchema;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping property types to subtype lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut schema = PropertySchema::new();
                while let Some((type_name, subtypes)) =
                    access.next_entry::<String, Vec<String>>()?
                {
                    schema = schema.with_group(type_name, subtypes);
                }
                Ok(schema)
            }
        }

        deserializer.deserialize_map(SchemaVisitor)
    }
}
