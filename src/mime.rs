//! Mime-bundle helpers: image key scanning, default-representation
//! priority, base64 image payload decode/encode and the GIF-in-HTML
//! wrapper used for animated output.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};

use crate::notebook::from_multiline;
use crate::{NbcodecError, Result};

/// MIME type strings appearing as mime-bundle keys.
pub mod mimes {
  pub const PNG: &str = "image/png";
  pub const GIF: &str = "image/gif";
  pub const JPEG: &str = "image/jpeg";
  pub const BMP: &str = "image/bmp";
  pub const SVG: &str = "image/svg+xml";
  pub const TEXT: &str = "text/plain";
  pub const HTML: &str = "text/html";
  pub const LATEX: &str = "text/latex";
}

/// Image MIME types recognized inside a mime-bundle.
pub const IMAGE_MIMES: [&str; 5] = [
  mimes::PNG,
  mimes::GIF,
  mimes::JPEG,
  mimes::BMP,
  mimes::SVG,
];

/// All recognized image MIME keys of a bundle, in bundle key order.
pub fn image_keys(bundle: &Value) -> Vec<String> {
  match bundle.as_object() {
    Some(obj) => obj
      .keys()
      .filter(|key| IMAGE_MIMES.contains(&key.as_str()))
      .cloned()
      .collect(),
    None => Vec::new(),
  }
}

pub fn first_image_key(bundle: &Value) -> Option<String> {
  image_keys(bundle).into_iter().next()
}

/// Pick the key a viewer should render by default.
///
/// Fixed priority: image types (in bundle key order) over `text/html` over
/// `text/latex` over `text/plain`; a bundle with none of these yields its
/// first key, an empty or non-object bundle yields `None`.
pub fn main_bundle_key(bundle: &Value) -> Option<String> {
  let obj = bundle.as_object()?;

  if let Some(key) = first_image_key(bundle) {
    return Some(key);
  }
  for key in [mimes::HTML, mimes::LATEX, mimes::TEXT] {
    if obj.contains_key(key) {
      return Some(key.to_string());
    }
  }
  obj.keys().next().cloned()
}

/// Decode the raw payload bytes stored under `key` in a mime-bundle.
///
/// Image payloads are base64 strings; SVG is the exception, stored as
/// multiline text rather than base64, so its text bytes are returned
/// directly. A missing key is [`NbcodecError::UnsupportedMime`], which
/// callers must tell apart from a present-but-corrupt payload.
pub fn load_image_data(bundle: &Value, key: &str) -> Result<Vec<u8>> {
  let data = bundle
    .get(key)
    .ok_or_else(|| NbcodecError::UnsupportedMime(key.to_string()))?;
  let text = from_multiline(data)?;

  if key == mimes::SVG {
    return Ok(text.into_bytes());
  }

  // Payloads written by other tools may be wrapped across lines
  let compact: String = text.split_whitespace().collect();
  Ok(BASE64.decode(compact)?)
}

/// Decode the payload under `key` into a raster image. SVG keys cannot be
/// rasterized here; use [`load_image_data`] for their text payload.
pub fn load_image(bundle: &Value, key: &str) -> Result<image::DynamicImage> {
  let bytes = load_image_data(bundle, key)?;
  Ok(image::load_from_memory(&bytes)?)
}

/// Pack already-encoded image bytes into a single-key mime-bundle.
pub fn pack_mime_bundle(bytes: &[u8], mime: &str) -> Value {
  json!({ mime: BASE64.encode(bytes) })
}

/// Encode an image to the format `mime` names and pack it into a bundle.
pub fn pack_image(image: &image::DynamicImage, mime: &str) -> Result<Value> {
  let format = image::ImageFormat::from_mime_type(mime)
    .ok_or_else(|| NbcodecError::UnsupportedMime(mime.to_string()))?;

  let mut bytes = Vec::new();
  image.write_to(&mut std::io::Cursor::new(&mut bytes), format)?;
  Ok(pack_mime_bundle(&bytes, mime))
}

const GIF_HTML_PREFIX: &str = "<img src=\"data:image/gif;base64,";
const GIF_HTML_SUFFIX: &str = "/>";

/// True for an HTML fragment that is merely an `<img>` wrapper around a
/// base64 GIF data URI — the convention for animated output, since the
/// notebook format has no first-class animated-image MIME type.
pub fn is_gif_html(html: &Value) -> bool {
  html.as_str().is_some_and(|text| {
    text.starts_with(GIF_HTML_PREFIX) && text.ends_with(GIF_HTML_SUFFIX)
  })
}

/// Extract and decode the GIF payload out of a GIF-wrapper HTML fragment.
pub fn load_gif_html(html: &Value) -> Result<Vec<u8>> {
  let text = html.as_str().ok_or(NbcodecError::MalformedSource)?;
  let payload = text
    .strip_prefix(GIF_HTML_PREFIX)
    .and_then(|rest| rest.strip_suffix(GIF_HTML_SUFFIX))
    .ok_or_else(|| NbcodecError::UnsupportedMime(mimes::HTML.to_string()))?;

  // The base64 run is followed by the closing attribute quote and
  // possibly whitespace before the "/>"
  let payload = payload.trim_end().trim_end_matches('"');
  Ok(BASE64.decode(payload)?)
}
