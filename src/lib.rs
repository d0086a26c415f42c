//! Codec for the Jupyter notebook interchange format.
//!
//! A notebook document is handled as a plain `serde_json::Value` tree; this
//! crate provides the schema predicates, field accessors, multiline source
//! codec and mime-bundle helpers needed to read and write that tree without
//! ever executing any of the code it contains.
//!
//! The predicates (`is_*`) are total and never fail, the accessors default
//! to empty values on missing or mistyped fields, and only the decode
//! operations (base64 payloads, image data) report errors. Callers rely on
//! this split: a malformed cell is skipped, a corrupt image payload is
//! surfaced as an explicit error state.

use thiserror::Error;

pub mod mime;
pub mod notebook;

pub use mime::{
  first_image_key, image_keys, is_gif_html, load_gif_html, load_image,
  load_image_data, main_bundle_key, mimes, pack_image, pack_mime_bundle,
  IMAGE_MIMES,
};
pub use notebook::{
  app_metadata, cell_type, cells, from_multiline, is_cell, is_code_cell,
  is_display_output, is_error_output, is_execute_result, is_markdown_cell,
  is_notebook, is_output, is_raw_cell, is_text_output, kernel_name,
  kernelspec, keys, metadata, nbformat_version, output_type, set_source,
  source, to_multiline,
};

#[derive(Error, Debug)]
pub enum NbcodecError {
  #[error("Document is not a Jupyter notebook")]
  NotANotebook,
  #[error("Source field is neither a string nor an array of strings")]
  MalformedSource,
  #[error("Base64 decode error: {0}")]
  Base64(#[from] base64::DecodeError),
  #[error("Image decode error: {0}")]
  Image(#[from] image::ImageError),
  #[error("No renderable MIME type: {0}")]
  UnsupportedMime(String),
}

pub type Result<T> = std::result::Result<T, NbcodecError>;
