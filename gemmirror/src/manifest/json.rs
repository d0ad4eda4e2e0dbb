//! JSON index decoder.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{dedupe, validate_full_name, DecodeError, ManifestDecoder, ManifestRecord};

/// Platform value that is left out of full names.
const DEFAULT_PLATFORM: &str = "ruby";

/// Decodes the `index.json` manifest.
///
/// The document is an array whose items are either a full name string or an
/// object. Objects carry `full_name`, or `name` + `version` with an optional
/// `platform`. Every other field is kept as the record's metadata, encoded
/// as compact JSON.
///
/// ```json
/// [
///   "rake-13.0.6",
///   { "name": "nokogiri", "version": "1.15.0", "platform": "x86_64-linux" },
///   { "full_name": "rack-3.0.8", "sha256": "..." }
/// ]
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Entry {
    Name(String),
    Object(Map<String, Value>),
}

impl ManifestDecoder for JsonDecoder {
    fn manifest_name(&self) -> &str {
        "index.json"
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<ManifestRecord>, DecodeError> {
        let entries: Vec<Entry> = serde_json::from_slice(bytes)?;
        let mut records = Vec::with_capacity(entries.len());

        for (index, entry) in entries.into_iter().enumerate() {
            let record = match entry {
                Entry::Name(name) => ManifestRecord::new(name),
                Entry::Object(fields) => record_from_object(index, fields)?,
            };
            validate_full_name(index, &record.full_name)?;
            records.push(record);
        }

        Ok(dedupe(records))
    }
}

fn record_from_object(
    index: usize,
    mut fields: Map<String, Value>,
) -> Result<ManifestRecord, DecodeError> {
    let full_name = match take_string(&mut fields, "full_name") {
        Some(name) => name,
        None => {
            let name = take_string(&mut fields, "name");
            let version = take_string(&mut fields, "version");
            let (Some(name), Some(version)) = (name, version) else {
                return Err(DecodeError::InvalidEntry {
                    index,
                    reason: "expected 'full_name' or 'name' and 'version'".to_string(),
                });
            };
            match take_string(&mut fields, "platform") {
                Some(platform) if platform != DEFAULT_PLATFORM => {
                    format!("{}-{}-{}", name, version, platform)
                }
                _ => format!("{}-{}", name, version),
            }
        }
    };

    let record = ManifestRecord::new(full_name);
    if fields.is_empty() {
        return Ok(record);
    }
    Ok(record.with_metadata(Value::Object(fields).to_string()))
}

fn take_string(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}
