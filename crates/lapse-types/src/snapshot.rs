use std::fmt;
use std::slice;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single completed measurement: a label and the elapsed time it covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    /// Label the measurement was recorded under.
    pub name: String,
    /// Elapsed time in fractional milliseconds.
    pub duration: f64,
}

impl Measure {
    /// Create a measure from a label and a duration in milliseconds.
    pub fn new(name: impl Into<String>, duration: f64) -> Self {
        Self { name: name.into(), duration }
    }
}

/// Read-only nested export of a timer and its descendants.
///
/// `measures` is always present, even when empty. `children` is omitted
/// from the serialized form entirely when the timer has no child contexts;
/// consumers distinguish a leaf by the key's absence, not by an empty
/// object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NestedMeasures {
    /// Completed measurements in recording order.
    pub measures: Vec<Measure>,
    /// Child snapshots keyed by context name, present only when at least
    /// one child context exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<ChildMeasures>,
}

/// Name-to-snapshot mapping that preserves insertion order.
///
/// Serializes as a JSON object whose keys appear in the order the child
/// contexts were created. Duplicate keys are representable — the collision
/// rename rule can mint a key that matches an organically named sibling —
/// and every entry is emitted in document order; lookup returns the first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildMeasures(Vec<(String, NestedMeasures)>);

impl ChildMeasures {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a child snapshot under `name`.
    pub fn insert(&mut self, name: impl Into<String>, snapshot: NestedMeasures) {
        self.0.push((name.into(), snapshot));
    }

    /// Look up the first child registered under `name`.
    pub fn get(&self, name: &str) -> Option<&NestedMeasures> {
        self.0.iter().find(|(key, _)| key == name).map(|(_, snapshot)| snapshot)
    }

    /// Number of child entries, duplicates included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the mapping holds no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> slice::Iter<'_, (String, NestedMeasures)> {
        self.0.iter()
    }
}

impl FromIterator<(String, NestedMeasures)> for ChildMeasures {
    fn from_iter<I: IntoIterator<Item = (String, NestedMeasures)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ChildMeasures {
    type Item = &'a (String, NestedMeasures);
    type IntoIter = slice::Iter<'a, (String, NestedMeasures)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for ChildMeasures {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, snapshot) in &self.0 {
            map.serialize_entry(name, snapshot)?;
        }
        map.end()
    }
}

struct ChildMeasuresVisitor;

impl<'de> Visitor<'de> for ChildMeasuresVisitor {
    type Value = ChildMeasures;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map of child context names to nested measures")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((name, snapshot)) = access.next_entry::<String, NestedMeasures>()? {
            entries.push((name, snapshot));
        }
        Ok(ChildMeasures(entries))
    }
}

impl<'de> Deserialize<'de> for ChildMeasures {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ChildMeasuresVisitor)
    }
}
