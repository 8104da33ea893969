//! Format conversion utilities
//!
//! Marshal data files can be dumped to JSON for inspection. The conversion is
//! one-way: the JSON view drops the information needed to rebuild the exact
//! object graph.

pub mod marshal_to_json;

pub use marshal_to_json::{convert_marshal_to_json, to_json as marshal_to_json};
