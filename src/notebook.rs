//! Schema predicates, field accessors and the multiline source codec for
//! the notebook JSON tree.

use serde_json::{json, Map, Value};

use crate::{NbcodecError, Result};

/// JSON field names of the notebook wire format.
pub mod keys {
  pub const CELLS: &str = "cells";
  pub const METADATA: &str = "metadata";
  pub const APP_METADATA: &str = "nbcodec";
  pub const NBFORMAT: &str = "nbformat";
  pub const NBFORMAT_MINOR: &str = "nbformat_minor";
  pub const CELL_TYPE: &str = "cell_type";
  pub const SOURCE: &str = "source";
  pub const OUTPUT_TYPE: &str = "output_type";
  pub const EXECUTION_COUNT: &str = "execution_count";
  pub const OUTPUTS: &str = "outputs";
  pub const DATA: &str = "data";
  pub const KERNELSPEC: &str = "kernelspec";
}

/// Top-level gate deciding whether a parsed JSON document should be treated
/// as a notebook at all.
///
/// The key set of the root object must be exactly
/// `{cells, metadata, nbformat, nbformat_minor}` — stricter than the
/// official schema, which tolerates extra top-level keys. Cell contents are
/// not validated here.
pub fn is_notebook(doc: &Value) -> bool {
  match doc.as_object() {
    Some(obj) => {
      obj.len() == 4
        && obj.get(keys::CELLS).is_some_and(Value::is_array)
        && obj.get(keys::METADATA).is_some_and(Value::is_object)
        && obj.get(keys::NBFORMAT).is_some_and(Value::is_number)
        && obj.get(keys::NBFORMAT_MINOR).is_some_and(Value::is_number)
    }
    None => false,
  }
}

/// True for objects shaped like a notebook cell: a known `cell_type`, an
/// object `metadata` and a string-or-array `source`.
pub fn is_cell(cell: &Value) -> bool {
  let Some(obj) = cell.as_object() else {
    return false;
  };
  matches!(
    obj.get(keys::CELL_TYPE).and_then(Value::as_str),
    Some("markdown" | "code" | "raw")
  ) && obj.get(keys::METADATA).is_some_and(Value::is_object)
    && obj
      .get(keys::SOURCE)
      .is_some_and(|source| source.is_string() || source.is_array())
}

pub fn is_markdown_cell(cell: &Value) -> bool {
  is_cell(cell) && cell_type(cell) == "markdown"
}

pub fn is_code_cell(cell: &Value) -> bool {
  is_cell(cell) && cell_type(cell) == "code"
}

pub fn is_raw_cell(cell: &Value) -> bool {
  is_cell(cell) && cell_type(cell) == "raw"
}

/// True for objects carrying one of the four known `output_type` values.
pub fn is_output(output: &Value) -> bool {
  matches!(
    output.get(keys::OUTPUT_TYPE).and_then(Value::as_str),
    Some("stream" | "display_data" | "execute_result" | "error")
  )
}

/// A `display_data` output with the `metadata` and `data` mime-bundle
/// fields a renderer needs.
pub fn is_display_output(output: &Value) -> bool {
  is_output(output)
    && output_type(output) == "display_data"
    && output.get(keys::METADATA).is_some_and(Value::is_object)
    && output.get(keys::DATA).is_some_and(Value::is_object)
}

/// A `stream` output with a named stream and its text payload.
pub fn is_text_output(output: &Value) -> bool {
  is_output(output)
    && output_type(output) == "stream"
    && output.get("name").is_some_and(Value::is_string)
    && output
      .get("text")
      .is_some_and(|text| text.is_string() || text.is_array())
}

/// An `error` output with exception name, value and traceback.
pub fn is_error_output(output: &Value) -> bool {
  is_output(output)
    && output_type(output) == "error"
    && output.get("ename").is_some_and(Value::is_string)
    && output.get("evalue").is_some_and(Value::is_string)
    && output.get("traceback").is_some_and(Value::is_array)
}

/// An `execute_result` output with its execution count and mime-bundle.
pub fn is_execute_result(output: &Value) -> bool {
  is_output(output)
    && output_type(output) == "execute_result"
    && output.get(keys::EXECUTION_COUNT).is_some_and(Value::is_number)
    && output.get(keys::METADATA).is_some_and(Value::is_object)
    && output.get(keys::DATA).is_some_and(Value::is_object)
}

/// Encode free text into the wire representation of a `source` field:
/// single-line text stays a plain JSON string, text with newlines becomes
/// an array of lines where every line but the last keeps its trailing
/// `\n`. Text ending in a newline therefore produces a final empty-string
/// element, which `from_multiline` relies on for round-trip fidelity.
pub fn to_multiline(text: &str) -> Value {
  if !text.contains('\n') {
    return Value::String(text.to_string());
  }

  let fragments: Vec<&str> = text.split('\n').collect();
  let last = fragments.len() - 1;
  let lines = fragments
    .iter()
    .enumerate()
    .map(|(i, fragment)| {
      if i == last {
        Value::String((*fragment).to_string())
      } else {
        Value::String(format!("{fragment}\n"))
      }
    })
    .collect();

  Value::Array(lines)
}

/// Decode a `source` field back into plain text. Array elements already
/// carry their own trailing newlines, so they are concatenated without a
/// separator. Any other JSON type is a contract violation and fails with
/// [`NbcodecError::MalformedSource`] instead of guessing.
pub fn from_multiline(value: &Value) -> Result<String> {
  match value {
    Value::String(text) => Ok(text.clone()),
    Value::Array(lines) => {
      let mut text = String::new();
      for line in lines {
        match line {
          Value::String(fragment) => text.push_str(fragment),
          _ => return Err(NbcodecError::MalformedSource),
        }
      }
      Ok(text)
    }
    _ => Err(NbcodecError::MalformedSource),
  }
}

/// The `metadata` object of a notebook, cell or output (empty if absent).
pub fn metadata(object: &Value) -> Map<String, Value> {
  object
    .get(keys::METADATA)
    .and_then(Value::as_object)
    .cloned()
    .unwrap_or_default()
}

/// The application-private sub-object stored inside `metadata`.
pub fn app_metadata(object: &Value) -> Map<String, Value> {
  metadata(object)
    .get(keys::APP_METADATA)
    .and_then(Value::as_object)
    .cloned()
    .unwrap_or_default()
}

pub fn cells(notebook: &Value) -> &[Value] {
  notebook
    .get(keys::CELLS)
    .and_then(Value::as_array)
    .map(Vec::as_slice)
    .unwrap_or_default()
}

/// `(major, minor)` format version, `(0, 0)` when absent or mistyped.
pub fn nbformat_version(notebook: &Value) -> (i64, i64) {
  let major = notebook
    .get(keys::NBFORMAT)
    .and_then(Value::as_i64)
    .unwrap_or(0);
  let minor = notebook
    .get(keys::NBFORMAT_MINOR)
    .and_then(Value::as_i64)
    .unwrap_or(0);
  (major, minor)
}

pub fn cell_type(cell: &Value) -> &str {
  cell
    .get(keys::CELL_TYPE)
    .and_then(Value::as_str)
    .unwrap_or_default()
}

pub fn output_type(output: &Value) -> &str {
  output
    .get(keys::OUTPUT_TYPE)
    .and_then(Value::as_str)
    .unwrap_or_default()
}

/// The decoded text of a cell's `source` field. An absent field reads as
/// empty; a field that is neither string nor array is `MalformedSource`.
pub fn source(cell: &Value) -> Result<String> {
  match cell.get(keys::SOURCE) {
    Some(value) => from_multiline(value),
    None => Ok(String::new()),
  }
}

/// Replace a cell's `source` field with the multiline encoding of `text`,
/// leaving every other field untouched.
pub fn set_source(cell: &mut Value, text: &str) {
  if let Some(obj) = cell.as_object_mut() {
    obj.insert(keys::SOURCE.to_string(), to_multiline(text));
  }
}

/// Backend name for a `kernelspec` value, folding the historical kernel
/// aliases (`julia-1.x` kernels, `sagemath`, `ir`) to the plain backend
/// ids. Falls back to the `language` field when `name` is missing.
pub fn kernel_name(kernelspec: &Value) -> String {
  let Some(spec) = kernelspec.as_object() else {
    return String::new();
  };

  let name = spec.get("name").and_then(Value::as_str).unwrap_or_default();
  if name.is_empty() {
    return spec
      .get("language")
      .and_then(Value::as_str)
      .unwrap_or_default()
      .to_string();
  }

  if name.starts_with("julia") {
    "julia".to_string()
  } else if name == "sagemath" {
    "sage".to_string()
  } else if name == "ir" {
    "r".to_string()
  } else {
    name.to_string()
  }
}

/// Build the `kernelspec` object for a backend id, applying the inverse
/// alias mapping used by `kernel_name`.
pub fn kernelspec(id: &str, display_name: &str) -> Value {
  let name = match id {
    "sage" => "sagemath",
    "r" => "ir",
    other => other,
  };

  let language = if id.starts_with("python") { "python" } else { id };
  let language = capitalize(language);

  json!({
    "name": name,
    "language": language,
    "display_name": display_name,
  })
}

fn capitalize(word: &str) -> String {
  let mut chars = word.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}
