use crate::map::Map;
use crate::node::{Node, NodeContent};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Plain data view of a node tree, ready for serde.
///
/// Scalars stay strings: no type resolution is done. Mappings keep their entries in input order,
/// duplicates included.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    String(String),
    Sequence(Vec<Value>),
    Mapping(Vec<(Value, Value)>),
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::String(s) => serializer.serialize_str(s),
            Value::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

pub(crate) fn to_value(node: &Node) -> Value {
    match &node.content {
        NodeContent::Null => Value::Null,
        NodeContent::Scalar(s) => Value::String(s.clone()),
        NodeContent::Sequence(seq) => Value::Sequence(seq.iter().map(to_value).collect()),
        NodeContent::Map(map) => map_to_value(map),
    }
}

fn map_to_value(map: &Map) -> Value {
    Value::Mapping(
        map.iter()
            .map(|(key, value)| (to_value(key), to_value(value)))
            .collect(),
    )
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        to_value(self).serialize(serializer)
    }
}
