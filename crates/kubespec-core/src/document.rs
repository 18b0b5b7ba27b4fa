//! Manifest documents with duplicate key tracking
//!
//! Deserializing straight into `serde_json::Value` keeps only the last value
//! of a repeated mapping key. `Manifest` keeps the first one and records the
//! path of every repeated key so the linter can report it.

use serde::Deserialize;
use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Number, Value};
use std::fmt;

/// A manifest document as written
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    pub value: Value,
    /// Key paths that occur more than once in their mapping, in document order
    pub duplicate_keys: Vec<Vec<String>>,
}

impl Manifest {
    /// Wrap a value that cannot contain duplicates
    pub fn new(value: Value) -> Self {
        Self {
            value,
            duplicate_keys: Vec::new(),
        }
    }
}

impl<'de> Deserialize<'de> for Manifest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut path = Vec::new();
        let mut duplicate_keys = Vec::new();
        let value = ValueSeed {
            path: &mut path,
            duplicates: &mut duplicate_keys,
        }
        .deserialize(deserializer)?;
        Ok(Self {
            value,
            duplicate_keys,
        })
    }
}

struct ValueSeed<'s> {
    path: &'s mut Vec<String>,
    duplicates: &'s mut Vec<Vec<String>>,
}

impl ValueSeed<'_> {
    fn child(&mut self) -> ValueSeed<'_> {
        ValueSeed {
            path: &mut *self.path,
            duplicates: &mut *self.duplicates,
        }
    }
}

impl<'de> DeserializeSeed<'de> for ValueSeed<'_> {
    type Value = Value;

    fn deserialize<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for ValueSeed<'_> {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a YAML or JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Number::from_f64(v).map_or(Value::Null, Value::Number))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        DeserializeSeed::deserialize(self, deserializer)
    }

    fn visit_seq<A>(mut self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element_seed(self.child())? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A>(mut self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut object = Map::new();
        while let Some(key) = map.next_key::<String>()? {
            self.path.push(key.clone());
            let value = map.next_value_seed(self.child())?;
            if object.contains_key(&key) {
                self.duplicates.push(self.path.clone());
            } else {
                object.insert(key, value);
            }
            self.path.pop();
        }
        Ok(Value::Object(object))
    }
}
