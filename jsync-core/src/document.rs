//! Helpers over the `serde_json::Value` document tree.
//!
//! The tree itself is serde_json's; this module adds the strict accessors
//! the bindings rely on (kind checks, required members) and the
//! parse/stringify entry points for whole roots.

use crate::aggregate::Syncable;
use crate::error::{SyncError, SyncResult};
use crate::format::DocumentFormat;
use serde::Serialize;
use serde_json::{Map, Value};

/// Key of the key node in associative pairs.
pub const KEY: &str = "key";
/// Key of the value node in associative pairs.
pub const VALUE: &str = "value";
/// Key of the discriminator in polymorphic entries.
pub const TYPE: &str = "type";
/// Key of the element payload in polymorphic sequence entries.
pub const DATA: &str = "data";

/// Name of a node's kind, as used in type-mismatch messages.
pub fn kind(node: &Value) -> &'static str {
    match node {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Borrows `node` as an object, or fails with `TypeMismatch`.
pub fn expect_object(node: &Value) -> SyncResult<&Map<String, Value>> {
    node.as_object().ok_or_else(|| SyncError::expected("object", node))
}

/// Borrows `node` as an array, or fails with `TypeMismatch`.
pub fn expect_array(node: &Value) -> SyncResult<&[Value]> {
    node.as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| SyncError::expected("array", node))
}

/// Looks up a required member of an object node.
pub fn member<'a>(node: &'a Value, key: &str) -> SyncResult<&'a Value> {
    expect_object(node)?
        .get(key)
        .ok_or_else(|| SyncError::MissingKey(key.to_string()))
}

/// Parses a document from serialized bytes.
pub fn parse(bytes: &[u8]) -> SyncResult<Value> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Parses a document from a string.
pub fn parse_str(text: &str) -> SyncResult<Value> {
    Ok(serde_json::from_str(text)?)
}

/// Renders a document as text.
pub fn stringify(node: &Value, format: &DocumentFormat) -> SyncResult<String> {
    if !format.pretty {
        return Ok(serde_json::to_string(node)?);
    }

    let indent = vec![b' '; format.indent];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    node.serialize(&mut serializer)?;
    // serde_json only ever writes UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Saves `root` into a fresh document.
pub fn to_document<S: Syncable + ?Sized>(root: &mut S) -> SyncResult<Value> {
    let mut node = Value::Null;
    root.save(&mut node)?;
    Ok(node)
}

/// Loads `root` from an existing document.
pub fn from_document<S: Syncable + ?Sized>(root: &mut S, node: &Value) -> SyncResult<()> {
    root.load(node)
}

/// Saves `root` and renders the result.
pub fn to_string<S: Syncable + ?Sized>(root: &mut S, format: &DocumentFormat) -> SyncResult<String> {
    let node = to_document(root)?;
    stringify(&node, format)
}

/// Parses `bytes` and loads `root` from the result.
pub fn from_slice<S: Syncable + ?Sized>(root: &mut S, bytes: &[u8]) -> SyncResult<()> {
    let node = parse(bytes)?;
    root.load(&node)
}
