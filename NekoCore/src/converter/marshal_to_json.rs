//! Marshal to JSON conversion (one-way, for inspection)
//!
//! Mapping:
//! - nil, booleans, integers and strings map to their JSON counterparts
//! - symbols become `":name"` strings
//! - floats become numbers when they parse, otherwise their text
//! - objects become `{"__class__": ..., "@field": ...}`
//! - hashes become `{"__hash__": [[key, value], ...]}`
//! - user data becomes `{"__class__": ..., "__data__": "<base64>"}`
//! - UTF-8 string wrappers collapse to the string; other wrappers become
//!   `{"__value__": ..., "__ivars__": {...}}`
//!
//! Containers met a second time (shared or cyclic) become
//! `{"__link__": n}`, `n` counting containers in order of first appearance.

use crate::error::{Error, Result};
use crate::formats::marshal::{self, ENCODING_FIELD, Graph, MarshalDocument, Node, NodeId, Value};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde_json::{Map, Number, Value as Json};
use std::collections::HashMap;
use std::path::Path;

/// Convert a Marshal file to an indented JSON file
pub fn convert_marshal_to_json<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    dest: Q,
) -> Result<()> {
    tracing::info!("Converting Marshal→JSON: {:?} → {:?}", source.as_ref(), dest.as_ref());
    let doc = marshal::read_marshal(&source)?;
    let json = to_json(&doc)?;
    std::fs::write(dest, serde_json::to_string_pretty(&json)?)?;
    tracing::info!("Conversion complete");
    Ok(())
}

/// Build the JSON view of a decoded document
pub fn to_json(doc: &MarshalDocument) -> Result<Json> {
    JsonView {
        graph: &doc.graph,
        containers: HashMap::new(),
    }
    .value(&doc.root)
}

struct JsonView<'g> {
    graph: &'g Graph,
    containers: HashMap<NodeId, usize>,
}

impl JsonView<'_> {
    fn value(&mut self, value: &Value) -> Result<Json> {
        Ok(match value {
            Value::Nil => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::Symbol(symbol) => Json::String(symbol.to_string()),
            Value::Node(id) => self.node(*id)?,
        })
    }

    fn node(&mut self, id: NodeId) -> Result<Json> {
        let graph = self.graph;
        let node = graph.node(id).ok_or(Error::DanglingNode(id.index()))?;

        if matches!(node, Node::Array(_) | Node::Hash(_) | Node::Object(_)) {
            if let Some(&seen) = self.containers.get(&id) {
                let mut link = Map::new();
                link.insert("__link__".to_string(), Json::from(seen));
                return Ok(Json::Object(link));
            }
            let next = self.containers.len();
            self.containers.insert(id, next);
        }

        Ok(match node {
            Node::Float(text) => text
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map_or_else(|| Json::String(text.clone()), Json::Number),
            Node::Str(bytes) => Json::String(String::from_utf8_lossy(bytes).into_owned()),
            Node::Array(items) => Json::Array(
                items
                    .iter()
                    .map(|item| self.value(item))
                    .collect::<Result<_>>()?,
            ),
            Node::Hash(pairs) => {
                let mut entries = Vec::with_capacity(pairs.len());
                for (key, value) in pairs {
                    entries.push(Json::Array(vec![self.value(key)?, self.value(value)?]));
                }
                let mut map = Map::new();
                map.insert("__hash__".to_string(), Json::Array(entries));
                Json::Object(map)
            }
            Node::Object(object) => {
                let mut map = Map::new();
                map.insert(
                    "__class__".to_string(),
                    Json::String(object.class.as_str().to_string()),
                );
                for (name, value) in &object.fields {
                    map.insert(name.as_str().to_string(), self.value(value)?);
                }
                Json::Object(map)
            }
            Node::UserData { class, data } => {
                let mut map = Map::new();
                map.insert("__class__".to_string(), Json::String(class.as_str().to_string()));
                map.insert("__data__".to_string(), Json::String(BASE64.encode(data)));
                Json::Object(map)
            }
            Node::Annotated(annotated) => {
                let inner = self.value(&annotated.inner)?;
                let only_encoding = annotated
                    .extras
                    .keys()
                    .all(|name| name.as_str() == ENCODING_FIELD);
                if only_encoding {
                    inner
                } else {
                    let mut ivars = Map::new();
                    for (name, value) in &annotated.extras {
                        ivars.insert(name.as_str().to_string(), self.value(value)?);
                    }
                    let mut map = Map::new();
                    map.insert("__value__".to_string(), inner);
                    map.insert("__ivars__".to_string(), Json::Object(ivars));
                    Json::Object(map)
                }
            }
        })
    }
}
