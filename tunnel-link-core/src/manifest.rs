//! Local copy of the web app manifest.
//!
//! The manifest is kept as an ordered JSON object so keys this tool does not
//! own survive a load/save cycle in their original order.

use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::Path;
use tracing::info;

use crate::update::UpdateError;

/// Key owned by this tool.
pub const APP_URL_KEY: &str = "app_url";

pub type Manifest = Map<String, Value>;

/// Parsed manifest, or an empty one when `path` does not exist.
pub fn load(path: &Path) -> Result<Manifest, UpdateError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "No local manifest, starting from an empty one");
            return Ok(Manifest::new());
        }
        Err(e) => return Err(UpdateError::Manifest(e)),
    };
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(UpdateError::InvalidLocalManifestJson(format!(
            "{}: expected a JSON object, found {}",
            path.display(),
            json_kind(&other)
        ))),
        Err(e) => Err(UpdateError::InvalidLocalManifestJson(format!(
            "{}: {e}",
            path.display()
        ))),
    }
}

pub fn set_app_url(manifest: &mut Manifest, url: &str) {
    manifest.insert(APP_URL_KEY.to_string(), Value::String(url.to_string()));
}

/// Two-space indented JSON with non-ASCII characters left as-is.
pub fn to_pretty_bytes(manifest: &Manifest) -> Result<Vec<u8>, UpdateError> {
    serde_json::to_vec_pretty(manifest).map_err(|e| UpdateError::Manifest(e.into()))
}

/// Overwrites `path` with `manifest`; returns the bytes written.
pub fn save(path: &Path, manifest: &Manifest) -> Result<Vec<u8>, UpdateError> {
    let bytes = to_pretty_bytes(manifest)?;
    fs::write(path, &bytes).map_err(UpdateError::Manifest)?;
    info!(path = %path.display(), "Local manifest updated");
    Ok(bytes)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
