//! Caller-submitted form fields.

use std::fmt;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value;

/// Field name → raw value, in submission order.
///
/// Unlike `serde_json::Map`, iteration follows the order in which fields
/// arrived, which is what makes "first invalid field" well defined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    entries: Vec<(String, Value)>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Build from urlencoded `name=value` pairs.
    ///
    /// A trailing `[]` on the name is dropped, and a name that repeats
    /// collects its values into an array, so `a=1&a=2` and `a[]=1&a[]=2`
    /// both read as `["1", "2"]`.
    pub fn from_form_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut set = FieldSet::new();
        for (name, value) in pairs {
            let name = name.strip_suffix("[]").unwrap_or(&name);
            match set.entries.iter_mut().find(|(k, _)| k == name) {
                Some((_, Value::Array(items))) => items.push(Value::String(value)),
                Some((_, slot)) => {
                    let first = slot.take();
                    *slot = Value::Array(vec![first, Value::String(value)]);
                }
                None => set.entries.push((name.to_string(), Value::String(value))),
            }
        }
        set
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Value for `name`, with absent fields read as `null`.
    pub fn value(&self, name: &str) -> &Value {
        self.get(name).unwrap_or(&Value::Null)
    }

    /// A new set holding exactly `names`, in that order. Absent names map to `null`.
    pub fn select(&self, names: &[&str]) -> FieldSet {
        names
            .iter()
            .map(|name| (name.to_string(), self.value(name).clone()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for FieldSet {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut set = FieldSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

impl<'de> Deserialize<'de> for FieldSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldSetVisitor;

        impl<'de> Visitor<'de> for FieldSetVisitor {
            type Value = FieldSet;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of form fields")
            }

            fn visit_map<A>(self, mut map: A) -> Result<FieldSet, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut set = FieldSet::new();
                while let Some((name, value)) = map.next_entry::<String, Value>()? {
                    set.insert(name, value);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(FieldSetVisitor)
    }
}
