//! Marshal 4.8 stream decoding

use super::document::{Annotated, Graph, MarshalDocument, Node, NodeId, Object, Symbol, Value};
use super::{
    MAJOR_VERSION, MAX_DEPTH, MINOR_VERSION, TAG_ARRAY, TAG_FALSE, TAG_FLOAT, TAG_HASH, TAG_IVAR,
    TAG_NIL, TAG_OBJECT, TAG_FIXNUM, TAG_LINK, TAG_STRING, TAG_SYMBOL, TAG_SYMLINK, TAG_TRUE,
    TAG_USER_DEF,
};
use crate::error::{Error, Result};
use byteorder::ReadBytesExt;
use indexmap::IndexMap;
use std::fs::File;
use std::io::{BufReader, Cursor, ErrorKind, Read};
use std::path::Path;

/// Read a Marshal file from disk
///
/// # Errors
/// Returns an error if the file cannot be read or is not a valid Marshal 4.8 stream.
pub fn read_marshal<P: AsRef<Path>>(path: P) -> Result<MarshalDocument> {
    let file = File::open(path)?;
    MarshalReader::new(BufReader::new(file)).read_document()
}

/// Parse Marshal data from bytes
///
/// # Errors
/// Returns an error if the data is not a valid Marshal 4.8 stream.
pub fn parse_marshal_bytes(data: &[u8]) -> Result<MarshalDocument> {
    MarshalReader::new(Cursor::new(data)).read_document()
}

/// Streaming decoder holding the per-session symbol and object tables.
pub struct MarshalReader<R: Read> {
    reader: R,
    offset: u64,
    graph: Graph,
    symbols: Vec<Symbol>,
    objects: Vec<Value>,
    depth: usize,
}

impl<R: Read> MarshalReader<R> {
    pub fn new(reader: R) -> Self {
        MarshalReader {
            reader,
            offset: 0,
            graph: Graph::new(),
            symbols: Vec::new(),
            objects: Vec::new(),
            depth: 0,
        }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.offset
    }

    /// Decode the version header and one root value.
    ///
    /// A header other than 4.8 fails before anything past it is read.
    pub fn read_document(mut self) -> Result<MarshalDocument> {
        self.read_header()?;
        let root = self.read_value()?;
        Ok(MarshalDocument::new(self.graph, root))
    }

    /// Read and check the two version bytes.
    pub fn read_header(&mut self) -> Result<()> {
        let major = self.read_u8()?;
        let minor = self.read_u8()?;
        if major != MAJOR_VERSION || minor != MINOR_VERSION {
            return Err(Error::UnsupportedVersion { major, minor });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Primitives
    // ------------------------------------------------------------------

    fn eof(&self, err: std::io::Error) -> Error {
        if err.kind() == ErrorKind::UnexpectedEof {
            Error::UnexpectedEof {
                offset: self.offset,
            }
        } else {
            Error::Io(err)
        }
    }

    fn read_u8(&mut self) -> Result<u8> {
        let byte = self.reader.read_u8().map_err(|e| self.eof(e))?;
        self.offset += 1;
        Ok(byte)
    }

    fn read_i8(&mut self) -> Result<i8> {
        let byte = self.reader.read_i8().map_err(|e| self.eof(e))?;
        self.offset += 1;
        Ok(byte)
    }

    /// Read a Marshal variable-length integer.
    pub fn read_int(&mut self) -> Result<i64> {
        let c = self.read_i8()?;
        match c {
            0 => Ok(0),
            1..=4 => {
                let mut value: i64 = 0;
                for i in 0..c.unsigned_abs() {
                    let byte = self.read_u8()?;
                    value |= i64::from(byte) << (8 * u32::from(i));
                }
                Ok(value)
            }
            5..=127 => Ok(i64::from(c) - 5),
            -4..=-1 => {
                let mut value: i64 = -1;
                for i in 0..c.unsigned_abs() {
                    let byte = self.read_u8()?;
                    let shift = 8 * u32::from(i);
                    value &= !(0xFF_i64 << shift);
                    value |= i64::from(byte) << shift;
                }
                Ok(value)
            }
            _ => Ok(i64::from(c) + 5),
        }
    }

    fn read_len(&mut self) -> Result<usize> {
        let offset = self.offset;
        let length = self.read_int()?;
        usize::try_from(length).map_err(|_| Error::NegativeLength { length, offset })
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.read_len()?;
        let mut buf = Vec::new();
        // Bounded by what is actually in the stream, not by the declared length
        let result = (&mut self.reader).take(len as u64).read_to_end(&mut buf);
        let read = result.map_err(|e| self.eof(e))?;
        self.offset += read as u64;
        if read < len {
            return Err(Error::UnexpectedEof {
                offset: self.offset,
            });
        }
        Ok(buf)
    }

    // ------------------------------------------------------------------
    // Tables
    // ------------------------------------------------------------------

    fn read_symbol_body(&mut self) -> Result<Symbol> {
        let bytes = self.read_bytes()?;
        let symbol = Symbol::new(String::from_utf8_lossy(&bytes));
        self.symbols.push(symbol.clone());
        Ok(symbol)
    }

    fn read_symlink(&mut self) -> Result<Symbol> {
        let index = self.read_int()?;
        usize::try_from(index)
            .ok()
            .and_then(|i| self.symbols.get(i))
            .cloned()
            .ok_or(Error::BackreferenceOutOfRange {
                table: "symbol",
                index,
                size: self.symbols.len(),
            })
    }

    fn read_object_link(&mut self) -> Result<Value> {
        let index = self.read_int()?;
        usize::try_from(index)
            .ok()
            .and_then(|i| self.objects.get(i))
            .cloned()
            .ok_or(Error::BackreferenceOutOfRange {
                table: "object",
                index,
                size: self.objects.len(),
            })
    }

    /// Read a value that must be a symbol (class names, field names).
    pub fn read_symbol(&mut self) -> Result<Symbol> {
        let offset = self.offset;
        match self.read_u8()? {
            TAG_SYMBOL => self.read_symbol_body(),
            TAG_SYMLINK => self.read_symlink(),
            // Non-ASCII symbols carry an encoding ivar; the name is all we keep
            TAG_IVAR => {
                if self.depth >= MAX_DEPTH {
                    return Err(Error::NestingTooDeep {
                        limit: MAX_DEPTH,
                        offset,
                    });
                }
                self.depth += 1;
                let symbol = self.read_annotated_symbol();
                self.depth -= 1;
                symbol
            }
            _ => Err(Error::ExpectedSymbol { offset }),
        }
    }

    fn read_annotated_symbol(&mut self) -> Result<Symbol> {
        let symbol = self.read_symbol()?;
        let count = self.read_len()?;
        for _ in 0..count {
            self.read_symbol()?;
            self.read_value()?;
        }
        Ok(symbol)
    }

    /// Take the next object-table slot for a node whose definition starts now.
    fn begin_node(&mut self, placeholder: Node) -> NodeId {
        let id = self.graph.insert(placeholder);
        self.objects.push(Value::Node(id));
        id
    }

    fn finish_node(&mut self, id: NodeId, node: Node) {
        if let Some(slot) = self.graph.node_mut(id) {
            *slot = node;
        }
    }

    fn read_fields(&mut self) -> Result<IndexMap<Symbol, Value>> {
        let count = self.read_len()?;
        let mut fields = IndexMap::new();
        for _ in 0..count {
            let name = self.read_symbol()?;
            let value = self.read_value()?;
            fields.insert(name, value);
        }
        Ok(fields)
    }

    // ------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------

    /// Read one tagged value.
    pub fn read_value(&mut self) -> Result<Value> {
        let offset = self.offset;
        if self.depth >= MAX_DEPTH {
            return Err(Error::NestingTooDeep {
                limit: MAX_DEPTH,
                offset,
            });
        }
        self.depth += 1;
        let value = self.read_tagged(offset);
        self.depth -= 1;
        value
    }

    fn read_tagged(&mut self, offset: u64) -> Result<Value> {
        let tag = self.read_u8()?;
        match tag {
            TAG_NIL => Ok(Value::Nil),
            TAG_TRUE => Ok(Value::Bool(true)),
            TAG_FALSE => Ok(Value::Bool(false)),
            TAG_FIXNUM => Ok(Value::Int(self.read_int()?)),
            TAG_SYMBOL => Ok(Value::Symbol(self.read_symbol_body()?)),
            TAG_SYMLINK => Ok(Value::Symbol(self.read_symlink()?)),
            TAG_LINK => self.read_object_link(),
            TAG_STRING => {
                let id = self.begin_node(Node::Str(Vec::new()));
                let bytes = self.read_bytes()?;
                self.finish_node(id, Node::Str(bytes));
                Ok(Value::Node(id))
            }
            TAG_FLOAT => {
                let id = self.begin_node(Node::Float(String::new()));
                let bytes = self.read_bytes()?;
                self.finish_node(id, Node::Float(String::from_utf8_lossy(&bytes).into_owned()));
                Ok(Value::Node(id))
            }
            TAG_ARRAY => {
                let id = self.begin_node(Node::Array(Vec::new()));
                let count = self.read_len()?;
                let mut items = Vec::with_capacity(count.min(4096));
                for _ in 0..count {
                    items.push(self.read_value()?);
                }
                self.finish_node(id, Node::Array(items));
                Ok(Value::Node(id))
            }
            TAG_HASH => {
                let id = self.begin_node(Node::Hash(Vec::new()));
                let count = self.read_len()?;
                let mut pairs = Vec::with_capacity(count.min(4096));
                for _ in 0..count {
                    let key = self.read_value()?;
                    let value = self.read_value()?;
                    pairs.push((key, value));
                }
                self.finish_node(id, Node::Hash(pairs));
                Ok(Value::Node(id))
            }
            TAG_OBJECT => {
                let class = self.read_symbol()?;
                let id = self.begin_node(Node::Object(Object::new(class.clone())));
                let fields = self.read_fields()?;
                self.finish_node(id, Node::Object(Object { class, fields }));
                Ok(Value::Node(id))
            }
            TAG_USER_DEF => {
                let class = self.read_symbol()?;
                let id = self.begin_node(Node::UserData {
                    class: class.clone(),
                    data: Vec::new(),
                });
                let data = self.read_bytes()?;
                self.finish_node(id, Node::UserData { class, data });
                Ok(Value::Node(id))
            }
            TAG_IVAR => {
                let inner = self.read_value()?;
                let extras = self.read_fields()?;
                // The wrapper never takes an object-table slot
                Ok(self.graph.add(Node::Annotated(Annotated { inner, extras })))
            }
            _ => Err(Error::UnknownTag { tag, offset }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(bytes: &[u8]) -> i64 {
        MarshalReader::new(Cursor::new(bytes)).read_int().unwrap()
    }

    #[test]
    fn test_read_int_short_forms() {
        assert_eq!(int(&[0x00]), 0);
        assert_eq!(int(&[0x05]), 0);
        assert_eq!(int(&[0x06]), 1);
        assert_eq!(int(&[0x7F]), 122);
        assert_eq!(int(&[0xFA]), -1);
        assert_eq!(int(&[0x80]), -123);
    }

    #[test]
    fn test_read_int_long_forms() {
        assert_eq!(int(&[0x01, 0x7B]), 123);
        assert_eq!(int(&[0x01, 0xFF]), 255);
        assert_eq!(int(&[0x02, 0x00, 0x01]), 256);
        assert_eq!(int(&[0x03, 0x00, 0x00, 0x01]), 65536);
        assert_eq!(int(&[0x04, 0xFF, 0xFF, 0xFF, 0xFF]), 0xFFFF_FFFF);
        assert_eq!(int(&[0xFF, 0x84]), -124);
        assert_eq!(int(&[0xFF, 0x00]), -256);
        assert_eq!(int(&[0xFE, 0x00, 0x00]), -65536);
    }

    #[test]
    fn test_unsupported_version_stops_after_header() {
        let data = [0x04, 0x09, b'0'];
        let mut reader = MarshalReader::new(Cursor::new(&data[..]));
        let err = reader.read_header().unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion { major: 4, minor: 9 }));
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn test_unknown_tag_reports_offset() {
        let err = parse_marshal_bytes(&[0x04, 0x08, b'[', 0x06, b'Z']).unwrap_err();
        assert!(matches!(err, Error::UnknownTag { tag: b'Z', offset: 4 }));
    }

    #[test]
    fn test_truncated_string() {
        let err = parse_marshal_bytes(&[0x04, 0x08, b'"', 0x0A, b'a', b'b']).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof { offset: 6 }));
    }

    #[test]
    fn test_bad_backreferences() {
        let err = parse_marshal_bytes(&[0x04, 0x08, b';', 0x06]).unwrap_err();
        assert!(matches!(
            err,
            Error::BackreferenceOutOfRange { table: "symbol", index: 1, size: 0 }
        ));

        let err = parse_marshal_bytes(&[0x04, 0x08, b'[', 0x06, b'@', 0x07]).unwrap_err();
        assert!(matches!(
            err,
            Error::BackreferenceOutOfRange { table: "object", index: 2, size: 1 }
        ));
    }

    #[test]
    fn test_self_referencing_array() {
        // a = []; a << a
        let doc = parse_marshal_bytes(&[0x04, 0x08, b'[', 0x06, b'@', 0x00]).unwrap();
        let items = doc.graph.as_array(&doc.root).unwrap();
        assert_eq!(items[0], doc.root);
    }

    #[test]
    fn test_annotated_string_has_no_slot() {
        // [I"\x05hello\x06:\x06ET, @1]: the link targets the inner string
        let mut data = vec![0x04, 0x08, b'[', 0x07, b'I', b'"', 0x0A];
        data.extend_from_slice(b"hello");
        data.extend_from_slice(&[0x06, b':', 0x06, b'E', b'T', b'@', 0x06]);
        let doc = parse_marshal_bytes(&data).unwrap();

        let items = doc.graph.as_array(&doc.root).unwrap();
        let Some(Node::Annotated(ann)) = doc.graph.get(&items[0]) else {
            panic!("expected annotated string");
        };
        assert_eq!(ann.inner, items[1]);
        assert_eq!(doc.graph.text(&items[0]).as_deref(), Some("hello"));
        assert_eq!(ann.extras.get("E"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_object_fields_require_symbols() {
        let err = parse_marshal_bytes(&[0x04, 0x08, b'o', b'i', 0x06]).unwrap_err();
        assert!(matches!(err, Error::ExpectedSymbol { offset: 3 }));
    }

    #[test]
    fn test_nesting_limit() {
        let mut data = vec![0x04, 0x08];
        for _ in 0..=MAX_DEPTH {
            data.extend_from_slice(&[b'[', 0x06]);
        }
        data.push(b'0');
        let err = parse_marshal_bytes(&data).unwrap_err();
        assert!(matches!(err, Error::NestingTooDeep { .. }));
    }

    #[test]
    fn test_nesting_limit_on_wrapped_class_name() {
        let mut data = vec![0x04, 0x08, b'o'];
        data.resize(data.len() + 2_000_000, b'I');
        let err = parse_marshal_bytes(&data).unwrap_err();
        assert!(matches!(
            err,
            Error::NestingTooDeep {
                limit: MAX_DEPTH,
                ..
            }
        ));
    }

    #[test]
    fn test_wrapped_symbol_name() {
        // Object whose class name is an encoding-wrapped symbol, no fields
        let data = [
            0x04, 0x08, b'o', b'I', b':', 0x08, b'F', b'o', b'o', 0x06, b':', 0x06, b'E', b'T',
            0x00,
        ];
        let doc = parse_marshal_bytes(&data).unwrap();
        assert_eq!(doc.graph.as_object(&doc.root).unwrap().class.as_str(), "Foo");
    }
}
