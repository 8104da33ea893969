//! File format handlers for RPG Maker data files
//!
//! MV/MZ data is plain JSON and is handled with `serde_json` directly by the
//! engine bindings; only the binary Marshal format needs a codec here.

pub mod marshal;

// Re-export main document types
pub use marshal::{Graph, MarshalDocument, Node, NodeId, Symbol, Value};
pub use marshal::{parse_marshal_bytes, read_marshal, serialize_marshal, write_marshal};
