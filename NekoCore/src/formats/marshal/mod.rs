//! Ruby Marshal 4.8 binary format module
//!
//! RPG Maker XP/VX/VX Ace store their database and map files (`.rxdata`,
//! `.rvdata`, `.rvdata2`) as Marshal streams. This module decodes them into an
//! arena-backed object graph, walks that graph, and encodes it back.
//!
//! Only the value kinds those files use are supported: nil, booleans,
//! fixnums, strings, symbols, arrays, hashes, plain objects, `_dump` user
//! data, floats and instance-variable wrappers. Any other tag is rejected.

mod document;
mod reader;
mod visit;
mod writer;

// Public API
pub use document::{
    Annotated, ENCODING_FIELD, Graph, MarshalDocument, Node, NodeId, Object, Symbol, Value,
};
pub use reader::{MarshalReader, parse_marshal_bytes, read_marshal};
pub use visit::{Walker, walk, walk_mut};
pub use writer::{MarshalWriter, serialize_marshal, write_marshal};

pub const MAJOR_VERSION: u8 = 4;
pub const MINOR_VERSION: u8 = 8;

/// Nesting limit for decoding and encoding.
pub const MAX_DEPTH: usize = 128;

// Type tags
pub const TAG_NIL: u8 = b'0';
pub const TAG_TRUE: u8 = b'T';
pub const TAG_FALSE: u8 = b'F';
pub const TAG_FIXNUM: u8 = b'i';
pub const TAG_STRING: u8 = b'"';
pub const TAG_SYMBOL: u8 = b':';
pub const TAG_SYMLINK: u8 = b';';
pub const TAG_LINK: u8 = b'@';
pub const TAG_ARRAY: u8 = b'[';
pub const TAG_HASH: u8 = b'{';
pub const TAG_OBJECT: u8 = b'o';
pub const TAG_USER_DEF: u8 = b'u';
pub const TAG_FLOAT: u8 = b'f';
pub const TAG_IVAR: u8 = b'I';
