//! Error types for `NekoCore`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `NekoCore` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Marshal Format Errors ====================
    /// The Marshal stream does not carry the 4.8 version header.
    #[error("unsupported Marshal version: {major}.{minor} (supported: 4.8)")]
    UnsupportedVersion {
        /// Major version byte found in the stream.
        major: u8,
        /// Minor version byte found in the stream.
        minor: u8,
    },

    /// A type tag byte that the decoder does not understand.
    #[error("unknown Marshal type tag {tag:#04x} at offset {offset}")]
    UnknownTag {
        /// The tag byte.
        tag: u8,
        /// Stream offset of the tag byte.
        offset: u64,
    },

    /// A symbol or object link pointing past the end of its table.
    #[error("{table} backreference {index} out of range (table size: {size})")]
    BackreferenceOutOfRange {
        /// Which table was referenced ("symbol" or "object").
        table: &'static str,
        /// The index carried by the link.
        index: i64,
        /// Number of entries in the table at that point.
        size: usize,
    },

    /// The stream ended in the middle of a value.
    #[error("unexpected end of Marshal stream at offset {offset}")]
    UnexpectedEof {
        /// Offset at which more bytes were expected.
        offset: u64,
    },

    /// A class name or field name position held something other than a symbol.
    #[error("expected a symbol at offset {offset}")]
    ExpectedSymbol {
        /// Offset of the offending value.
        offset: u64,
    },

    /// A length or count decoded to a negative number.
    #[error("negative length {length} at offset {offset}")]
    NegativeLength {
        /// The decoded length.
        length: i64,
        /// Offset of the length prefix.
        offset: u64,
    },

    /// Values nested deeper than the decoder allows.
    #[error("Marshal nesting deeper than {limit} at offset {offset}")]
    NestingTooDeep {
        /// The configured depth limit.
        limit: usize,
        /// Offset of the value that exceeded it.
        offset: u64,
    },

    /// Integer that cannot be represented by the 4-byte Marshal integer form.
    #[error("integer {0} is outside the encodable Marshal range")]
    IntegerOutOfRange(i64),

    /// A value refers to a node that does not exist in its graph.
    #[error("dangling node reference: {0}")]
    DanglingNode(usize),

    // ==================== Script Errors ====================
    /// A context label that does not follow the `"<file> (<kind>)"` shape.
    #[error("invalid context label: {0:?}")]
    InvalidContextLabel(String),

    /// An event command that cannot be read or rewritten.
    #[error("malformed event command at index {index}: {reason}")]
    MalformedCommand {
        /// Position of the command in its list.
        index: usize,
        /// What was wrong with it.
        reason: &'static str,
    },

    // ==================== Engine Errors ====================
    /// The engine's script directory is absent.
    #[error("data directory not found under {path}")]
    MissingDataDirectory {
        /// The game path that was searched.
        path: PathBuf,
    },

    /// The game archive must be unpacked into the staging directory first.
    ///
    /// This is a precondition rather than a failure: the caller should ask the
    /// user to unpack `archive` into `staging` and retry.
    #[error("extract '{archive}' into {staging} and try again")]
    ExtractionRequired {
        /// The staging directory the adapter expects.
        staging: PathBuf,
        /// The archive file name to unpack.
        archive: String,
    },

    /// Reinjection failed for one file (recovered by copying the original).
    #[error("failed to apply translations to {file}: {message}")]
    FileApply {
        /// File name.
        file: String,
        /// The underlying error message.
        message: String,
    },

    /// No registered engine can handle the given path.
    #[error("no engine found for {path}")]
    NoMatchingEngine {
        /// The game path.
        path: PathBuf,
    },

    /// No registered engine has the given name.
    #[error("unknown engine: {0}")]
    UnknownEngine(String),

    // ==================== Parsing Errors ====================
    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ==================== File System Errors ====================
    /// Invalid file path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDirError(String),
}

impl Error {
    /// Whether this error comes from the Marshal codec.
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedVersion { .. }
                | Error::UnknownTag { .. }
                | Error::BackreferenceOutOfRange { .. }
                | Error::UnexpectedEof { .. }
                | Error::ExpectedSymbol { .. }
                | Error::NegativeLength { .. }
                | Error::NestingTooDeep { .. }
                | Error::IntegerOutOfRange(_)
                | Error::DanglingNode(_)
        )
    }
}

// Add conversion from walkdir::Error
impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDirError(err.to_string())
    }
}

/// A specialized Result type for `NekoCore` operations.
pub type Result<T> = std::result::Result<T, Error>;
