//! Marshal object graph structure definitions
//!
//! Decoded data lives in an arena ([`Graph`]). Every composite value is a
//! [`Node`] owned by the arena and addressed by a [`NodeId`]; a [`Value`] is
//! either an immediate (nil, booleans, integers, symbols) or a reference to
//! a node. Cycles and shared sub-graphs are plain `NodeId` reuse.
//!
//! There are two notions of equality in this model and they are kept apart:
//! symbols compare by name, nodes compare by identity (`NodeId`). Two string
//! nodes holding the same bytes are different values.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;

/// Field name used by Ruby for a string's encoding flag.
pub const ENCODING_FIELD: &str = "E";

/// An interned Ruby symbol. Equality is by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Symbol(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

/// Identity of a node inside a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena index of the node.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A Marshal value.
///
/// The derived equality is the model's comparison rule: immediates and
/// symbols compare by content, `Node` compares by identity only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Symbol(Symbol),
    Node(NodeId),
}

impl Value {
    /// The node this value refers to, if any.
    #[must_use]
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Value::Node(id) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Value::Symbol(sym) => Some(sym),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }
}

/// A Ruby object instance (`o` tag): class name plus instance variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub class: Symbol,
    pub fields: IndexMap<Symbol, Value>,
}

impl Object {
    #[must_use]
    pub fn new(class: Symbol) -> Self {
        Object {
            class,
            fields: IndexMap::new(),
        }
    }

    /// Look up an instance variable by name (including the leading `@`).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// A value with extra instance variables attached (`I` tag).
///
/// The wrapper has no backreference slot of its own; links always point at
/// the inner value.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotated {
    pub inner: Value,
    pub extras: IndexMap<Symbol, Value>,
}

/// A composite value owned by a [`Graph`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Float kept as its decimal text so it re-encodes verbatim.
    Float(String),
    /// Raw string bytes.
    Str(Vec<u8>),
    Array(Vec<Value>),
    /// Ordered key/value pairs; keys may be any value.
    Hash(Vec<(Value, Value)>),
    Object(Object),
    /// `_dump`-style user data the codec does not interpret.
    UserData { class: Symbol, data: Vec<u8> },
    Annotated(Annotated),
}

impl Node {
    /// Whether this node takes a slot in the Marshal object table.
    #[must_use]
    pub fn is_linkable(&self) -> bool {
        !matches!(self, Node::Annotated(_))
    }

    /// Child values in traversal order.
    pub fn children(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match self {
            Node::Array(items) => Box::new(items.iter()),
            Node::Hash(pairs) => Box::new(pairs.iter().flat_map(|(k, v)| [k, v])),
            Node::Object(obj) => Box::new(obj.fields.values()),
            Node::Annotated(ann) => {
                Box::new(std::iter::once(&ann.inner).chain(ann.extras.values()))
            }
            Node::Float(_) | Node::Str(_) | Node::UserData { .. } => Box::new(std::iter::empty()),
        }
    }

    /// Short type name used in diagnostics and dumps.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Float(_) => "float",
            Node::Str(_) => "string",
            Node::Array(_) => "array",
            Node::Hash(_) => "hash",
            Node::Object(_) => "object",
            Node::UserData { .. } => "user_data",
            Node::Annotated(_) => "annotated",
        }
    }
}

/// Arena owning every node of one decoded (or constructed) Marshal graph.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    #[must_use]
    pub fn new() -> Self {
        Graph { nodes: Vec::new() }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node and return a value referring to it.
    pub fn add(&mut self, node: Node) -> Value {
        Value::Node(self.insert(node))
    }

    /// Add a node and return its id.
    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Resolve a value to the node it refers to.
    #[must_use]
    pub fn get(&self, value: &Value) -> Option<&Node> {
        value.node_id().and_then(|id| self.node(id))
    }

    // ------------------------------------------------------------------
    // Construction helpers
    // ------------------------------------------------------------------

    /// A bare string node (no encoding flag).
    pub fn string(&mut self, text: &str) -> Value {
        self.add(Node::Str(text.as_bytes().to_vec()))
    }

    /// A UTF-8 string the way Ruby 1.9+ writes it: `I"..."` with `:E => true`.
    pub fn utf8_string(&mut self, text: &str) -> Value {
        let inner = self.string(text);
        let mut extras = IndexMap::new();
        extras.insert(Symbol::new(ENCODING_FIELD), Value::Bool(true));
        self.add(Node::Annotated(Annotated { inner, extras }))
    }

    pub fn array(&mut self, items: Vec<Value>) -> Value {
        self.add(Node::Array(items))
    }

    pub fn object<I>(&mut self, class: &str, fields: I) -> Value
    where
        I: IntoIterator<Item = (&'static str, Value)>,
    {
        let mut obj = Object::new(Symbol::new(class));
        for (name, value) in fields {
            obj.fields.insert(Symbol::new(name), value);
        }
        self.add(Node::Object(obj))
    }

    // ------------------------------------------------------------------
    // Typed accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn as_array(&self, value: &Value) -> Option<&[Value]> {
        match self.get(value)? {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn array_mut(&mut self, id: NodeId) -> Option<&mut Vec<Value>> {
        match self.node_mut(id)? {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self, value: &Value) -> Option<&Object> {
        match self.get(value)? {
            Node::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// The string node behind a value, looking through an annotation wrapper.
    #[must_use]
    pub fn string_node(&self, value: &Value) -> Option<NodeId> {
        let id = value.node_id()?;
        match self.node(id)? {
            Node::Str(_) => Some(id),
            Node::Annotated(ann) => match self.get(&ann.inner)? {
                Node::Str(_) => ann.inner.node_id(),
                _ => None,
            },
            _ => None,
        }
    }

    #[must_use]
    pub fn str_bytes(&self, value: &Value) -> Option<&[u8]> {
        match self.node(self.string_node(value)?)? {
            Node::Str(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Decode a string value as UTF-8 (lossy).
    #[must_use]
    pub fn text(&self, value: &Value) -> Option<String> {
        self.str_bytes(value)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Overwrite the bytes of the string behind `value` in place.
    ///
    /// Returns `false` when `value` is not a string.
    pub fn set_text(&mut self, value: &Value, text: &str) -> bool {
        let Some(id) = self.string_node(value) else {
            return false;
        };
        if let Some(Node::Str(bytes)) = self.node_mut(id) {
            *bytes = text.as_bytes().to_vec();
            true
        } else {
            false
        }
    }

    /// Copy the sub-graph reachable from `value` into fresh nodes.
    ///
    /// Sharing and cycles inside the sub-graph are reproduced in the copy.
    /// Symbols and immediates are returned as-is.
    pub fn deep_clone(&mut self, value: &Value) -> Value {
        let mut copies = HashMap::new();
        self.clone_value(value, &mut copies)
    }

    fn clone_value(&mut self, value: &Value, copies: &mut HashMap<NodeId, NodeId>) -> Value {
        let Value::Node(id) = value else {
            return value.clone();
        };
        if let Some(copy) = copies.get(id) {
            return Value::Node(*copy);
        }
        let Some(node) = self.node(*id).cloned() else {
            return value.clone();
        };

        // Reserve the slot first so cycles back to this node resolve to the copy
        let copy = self.insert(node.clone());
        copies.insert(*id, copy);

        let rewritten = match node {
            Node::Array(items) => {
                Node::Array(items.iter().map(|v| self.clone_value(v, copies)).collect())
            }
            Node::Hash(pairs) => Node::Hash(
                pairs
                    .iter()
                    .map(|(k, v)| (self.clone_value(k, copies), self.clone_value(v, copies)))
                    .collect(),
            ),
            Node::Object(obj) => {
                let mut cloned = Object::new(obj.class.clone());
                for (name, v) in &obj.fields {
                    let v = self.clone_value(v, copies);
                    cloned.fields.insert(name.clone(), v);
                }
                Node::Object(cloned)
            }
            Node::Annotated(ann) => {
                let inner = self.clone_value(&ann.inner, copies);
                let mut extras = IndexMap::new();
                for (name, v) in &ann.extras {
                    let v = self.clone_value(v, copies);
                    extras.insert(name.clone(), v);
                }
                Node::Annotated(Annotated { inner, extras })
            }
            leaf @ (Node::Float(_) | Node::Str(_) | Node::UserData { .. }) => leaf,
        };
        self.nodes[copy.0] = rewritten;
        Value::Node(copy)
    }
}

/// A decoded Marshal file: the arena plus its root value.
#[derive(Debug, Clone)]
pub struct MarshalDocument {
    pub graph: Graph,
    pub root: Value,
}

impl MarshalDocument {
    #[must_use]
    pub fn new(graph: Graph, root: Value) -> Self {
        MarshalDocument { graph, root }
    }
}
