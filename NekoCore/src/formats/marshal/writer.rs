//! Marshal 4.8 stream encoding

use super::document::{Graph, MarshalDocument, Node, NodeId, Symbol, Value};
use super::{
    MAJOR_VERSION, MAX_DEPTH, MINOR_VERSION, TAG_ARRAY, TAG_FALSE, TAG_FIXNUM, TAG_FLOAT,
    TAG_HASH, TAG_IVAR, TAG_LINK, TAG_NIL, TAG_OBJECT, TAG_STRING, TAG_SYMBOL, TAG_SYMLINK,
    TAG_TRUE, TAG_USER_DEF,
};
use crate::error::{Error, Result};
use byteorder::WriteBytesExt;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

/// Write a Marshal document to disk
///
/// # Errors
/// Returns an error if the document cannot be encoded or the file cannot be written.
pub fn write_marshal<P: AsRef<Path>>(doc: &MarshalDocument, path: P) -> Result<()> {
    let bytes = serialize_marshal(doc)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Serialize a Marshal document to bytes
///
/// # Errors
/// Returns an error if an integer is outside the 4-byte range Marshal stores,
/// a value refers to a missing node, or the graph nests deeper than the
/// reader accepts.
pub fn serialize_marshal(doc: &MarshalDocument) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    MarshalWriter::new(&mut output, &doc.graph).write_document(&doc.root)?;
    Ok(output)
}

/// Encoder mirroring the decoder's table discipline.
///
/// Symbols are deduplicated by name; nodes are deduplicated by identity only,
/// so two equal strings held by different nodes are both written in full.
pub struct MarshalWriter<'g, W: Write> {
    writer: W,
    graph: &'g Graph,
    symbols: HashMap<&'g str, usize>,
    objects: HashMap<NodeId, usize>,
    depth: usize,
}

impl<'g, W: Write> MarshalWriter<'g, W> {
    pub fn new(writer: W, graph: &'g Graph) -> Self {
        MarshalWriter {
            writer,
            graph,
            symbols: HashMap::new(),
            objects: HashMap::new(),
            depth: 0,
        }
    }

    /// Write the version header followed by `root`.
    pub fn write_document(mut self, root: &'g Value) -> Result<()> {
        self.writer.write_u8(MAJOR_VERSION)?;
        self.writer.write_u8(MINOR_VERSION)?;
        self.write_value(root)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a Marshal variable-length integer.
    pub fn write_int(&mut self, value: i64) -> Result<()> {
        match value {
            0 => self.writer.write_u8(0)?,
            1..=122 => self.writer.write_i8((value + 5) as i8)?,
            -123..=-1 => self.writer.write_i8((value - 5) as i8)?,
            123..=0xFFFF_FFFF => {
                let mut bytes = [0u8; 4];
                let mut rest = value;
                let mut len = 0;
                while rest != 0 {
                    bytes[len] = (rest & 0xFF) as u8;
                    rest >>= 8;
                    len += 1;
                }
                self.writer.write_i8(len as i8)?;
                self.writer.write_all(&bytes[..len])?;
            }
            -0x1_0000_0000..=-124 => {
                let mut bytes = [0u8; 4];
                let mut rest = value;
                let mut len = 0;
                while rest != -1 {
                    bytes[len] = (rest & 0xFF) as u8;
                    rest >>= 8;
                    len += 1;
                }
                self.writer.write_i8(-(len as i8))?;
                self.writer.write_all(&bytes[..len])?;
            }
            _ => return Err(Error::IntegerOutOfRange(value)),
        }
        Ok(())
    }

    fn write_len(&mut self, len: usize) -> Result<()> {
        let value = i64::try_from(len).map_err(|_| Error::IntegerOutOfRange(i64::MAX))?;
        self.write_int(value)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_len(bytes.len())?;
        self.writer.write_all(bytes)?;
        Ok(())
    }

    /// Write a symbol in full the first time, as a backreference afterwards.
    pub fn write_symbol(&mut self, symbol: &'g Symbol) -> Result<()> {
        if let Some(&index) = self.symbols.get(symbol.as_str()) {
            self.writer.write_u8(TAG_SYMLINK)?;
            return self.write_len(index);
        }
        let index = self.symbols.len();
        self.symbols.insert(symbol.as_str(), index);
        self.writer.write_u8(TAG_SYMBOL)?;
        self.write_bytes(symbol.as_str().as_bytes())
    }

    /// Write one value.
    pub fn write_value(&mut self, value: &'g Value) -> Result<()> {
        match value {
            Value::Nil => self.writer.write_u8(TAG_NIL)?,
            Value::Bool(true) => self.writer.write_u8(TAG_TRUE)?,
            Value::Bool(false) => self.writer.write_u8(TAG_FALSE)?,
            Value::Int(v) => {
                self.writer.write_u8(TAG_FIXNUM)?;
                self.write_int(*v)?;
            }
            Value::Symbol(symbol) => self.write_symbol(symbol)?,
            Value::Node(id) => {
                if self.depth >= MAX_DEPTH {
                    return Err(Error::NestingTooDeep {
                        limit: MAX_DEPTH,
                        offset: 0,
                    });
                }
                self.depth += 1;
                let result = self.write_node(*id);
                self.depth -= 1;
                result?;
            }
        }
        Ok(())
    }

    fn write_node(&mut self, id: NodeId) -> Result<()> {
        if let Some(&index) = self.objects.get(&id) {
            self.writer.write_u8(TAG_LINK)?;
            return self.write_len(index);
        }
        let graph = self.graph;
        let node = graph.node(id).ok_or(Error::DanglingNode(id.index()))?;

        if node.is_linkable() {
            // Slot taken before the tag so children can link back to this node
            let index = self.objects.len();
            self.objects.insert(id, index);
        }

        match node {
            Node::Float(text) => {
                self.writer.write_u8(TAG_FLOAT)?;
                self.write_bytes(text.as_bytes())?;
            }
            Node::Str(bytes) => {
                self.writer.write_u8(TAG_STRING)?;
                self.write_bytes(bytes)?;
            }
            Node::Array(items) => {
                self.writer.write_u8(TAG_ARRAY)?;
                self.write_len(items.len())?;
                for item in items {
                    self.write_value(item)?;
                }
            }
            Node::Hash(pairs) => {
                self.writer.write_u8(TAG_HASH)?;
                self.write_len(pairs.len())?;
                for (key, value) in pairs {
                    self.write_value(key)?;
                    self.write_value(value)?;
                }
            }
            Node::Object(object) => {
                self.writer.write_u8(TAG_OBJECT)?;
                self.write_symbol(&object.class)?;
                self.write_len(object.fields.len())?;
                for (name, value) in &object.fields {
                    self.write_symbol(name)?;
                    self.write_value(value)?;
                }
            }
            Node::UserData { class, data } => {
                self.writer.write_u8(TAG_USER_DEF)?;
                self.write_symbol(class)?;
                self.write_bytes(data)?;
            }
            Node::Annotated(annotated) => {
                self.writer.write_u8(TAG_IVAR)?;
                self.write_value(&annotated.inner)?;
                self.write_len(annotated.extras.len())?;
                for (name, value) in &annotated.extras {
                    self.write_symbol(name)?;
                    self.write_value(value)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse_marshal_bytes;
    use super::*;
    use pretty_assertions::assert_eq;

    fn int_bytes(value: i64) -> Vec<u8> {
        let graph = Graph::new();
        let mut out = Vec::new();
        MarshalWriter::new(&mut out, &graph).write_int(value).unwrap();
        out
    }

    fn roundtrip_int(value: i64) -> i64 {
        let mut data = vec![MAJOR_VERSION, MINOR_VERSION, TAG_FIXNUM];
        data.extend(int_bytes(value));
        let doc = parse_marshal_bytes(&data).unwrap();
        doc.root.as_int().unwrap()
    }

    #[test]
    fn test_int_short_form_boundaries() {
        assert_eq!(int_bytes(0), vec![0x00]);
        assert_eq!(int_bytes(1), vec![0x06]);
        assert_eq!(int_bytes(122), vec![0x7F]);
        assert_eq!(int_bytes(123), vec![0x01, 0x7B]);
        assert_eq!(int_bytes(-1), vec![0xFA]);
        assert_eq!(int_bytes(-123), vec![0x80]);
        assert_eq!(int_bytes(-124), vec![0xFF, 0x84]);
    }

    #[test]
    fn test_int_multibyte_roundtrip() {
        for value in [
            0, 1, 4, -4, 255, 256, 65535, 65536, 16_777_215, 16_777_216, -1, -256, -257, -65536,
            0xFFFF_FFFF, -0x1_0000_0000,
        ] {
            assert_eq!(roundtrip_int(value), value, "value {value}");
        }
    }

    #[test]
    fn test_int_out_of_range() {
        let graph = Graph::new();
        let mut out = Vec::new();
        let err = MarshalWriter::new(&mut out, &graph)
            .write_int(0x1_0000_0000)
            .unwrap_err();
        assert!(matches!(err, Error::IntegerOutOfRange(0x1_0000_0000)));
    }

    #[test]
    fn test_serialize_rejects_unencodable_documents() {
        let mut graph = Graph::new();
        let root = graph.array(vec![Value::Int(1 << 40)]);
        let err = serialize_marshal(&MarshalDocument::new(graph, root)).unwrap_err();
        assert!(matches!(err, Error::IntegerOutOfRange(value) if value == 1 << 40));

        let mut other = Graph::new();
        let stray = other.string("elsewhere");
        let err = serialize_marshal(&MarshalDocument::new(Graph::new(), stray)).unwrap_err();
        assert!(matches!(err, Error::DanglingNode(0)));
    }

    #[test]
    fn test_write_marshal_leaves_no_file_on_encode_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("Bad.rvdata2");
        let mut graph = Graph::new();
        let root = graph.array(vec![Value::Int(i64::MIN)]);
        assert!(write_marshal(&MarshalDocument::new(graph, root), &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_repeated_symbol_written_once() {
        let mut graph = Graph::new();
        let root = graph.array(vec![
            Value::Symbol(Symbol::new("name")),
            Value::Symbol(Symbol::new("name")),
        ]);
        let doc = MarshalDocument::new(graph, root);
        let bytes = serialize_marshal(&doc).unwrap();
        assert_eq!(
            bytes,
            vec![0x04, 0x08, b'[', 0x07, b':', 0x09, b'n', b'a', b'm', b'e', b';', 0x00]
        );

        let decoded = parse_marshal_bytes(&bytes).unwrap();
        let items = decoded.graph.as_array(&decoded.root).unwrap();
        assert_eq!(items[0], items[1]);
    }

    #[test]
    fn test_equal_strings_are_not_merged() {
        let mut graph = Graph::new();
        let a = graph.string("same");
        let b = graph.string("same");
        let first = graph.array(vec![a]);
        let second = graph.array(vec![b]);
        let root = graph.array(vec![first, second]);
        let bytes = serialize_marshal(&MarshalDocument::new(graph, root)).unwrap();
        assert!(!bytes.contains(&TAG_LINK));

        let decoded = parse_marshal_bytes(&bytes).unwrap();
        let outer = decoded.graph.as_array(&decoded.root).unwrap();
        let x = &decoded.graph.as_array(&outer[0]).unwrap()[0];
        let y = &decoded.graph.as_array(&outer[1]).unwrap()[0];
        assert_ne!(x, y);
    }

    #[test]
    fn test_shared_array_stays_shared() {
        let mut graph = Graph::new();
        let text = graph.utf8_string("shared");
        let shared = graph.array(vec![text]);
        let left = graph.object("Left", [("@list", shared.clone())]);
        let right = graph.object("Right", [("@list", shared)]);
        let root = graph.array(vec![left, right]);
        let bytes = serialize_marshal(&MarshalDocument::new(graph, root)).unwrap();

        let decoded = parse_marshal_bytes(&bytes).unwrap();
        let g = &decoded.graph;
        let outer = g.as_array(&decoded.root).unwrap();
        let l = g.as_object(&outer[0]).unwrap().get("@list").unwrap();
        let r = g.as_object(&outer[1]).unwrap().get("@list").unwrap();
        assert_eq!(l, r);
        assert_eq!(g.text(&g.as_array(l).unwrap()[0]).as_deref(), Some("shared"));
    }

    #[test]
    fn test_cycle_roundtrip() {
        let mut graph = Graph::new();
        let hash = graph.add(Node::Hash(Vec::new()));
        let id = hash.node_id().unwrap();
        let key = graph.string("self");
        if let Some(Node::Hash(pairs)) = graph.node_mut(id) {
            pairs.push((key, hash.clone()));
        }
        let bytes = serialize_marshal(&MarshalDocument::new(graph, hash)).unwrap();

        let decoded = parse_marshal_bytes(&bytes).unwrap();
        let Some(Node::Hash(pairs)) = decoded.graph.get(&decoded.root) else {
            panic!("expected hash");
        };
        assert_eq!(pairs[0].1, decoded.root);
    }

    #[test]
    fn test_reencode_is_stable() {
        let mut graph = Graph::new();
        let name = graph.utf8_string("Slime");
        let rate = graph.add(Node::Float("1.5".to_string()));
        let table = graph.add(Node::UserData {
            class: Symbol::new("Table"),
            data: vec![1, 2, 3],
        });
        let root = graph.object(
            "RPG::Enemy",
            [("@name", name), ("@rate", rate), ("@table", table), ("@id", Value::Int(-300))],
        );
        let first = serialize_marshal(&MarshalDocument::new(graph, root)).unwrap();
        let second = serialize_marshal(&parse_marshal_bytes(&first).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
