//! Line-oriented index decoder.

use super::{dedupe, validate_full_name, DecodeError, ManifestDecoder, ManifestRecord};

/// Decodes the plain-text `index` manifest.
///
/// Each non-blank line is `<full_name>[ <metadata>]`. Lines starting with
/// `#` are comments.
///
/// ```text
/// # name-version[-platform]  metadata
/// rake-13.0.6
/// nokogiri-1.15.0-x86_64-linux  x86_64-linux
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LineDecoder;

impl ManifestDecoder for LineDecoder {
    fn manifest_name(&self) -> &str {
        "index"
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<ManifestRecord>, DecodeError> {
        let text = std::str::from_utf8(bytes)?;
        let mut records = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (name, metadata) = match line.split_once(char::is_whitespace) {
                Some((name, rest)) => (name, Some(rest.trim())),
                None => (line, None),
            };
            validate_full_name(index + 1, name)?;

            let record = ManifestRecord::new(name);
            records.push(match metadata {
                Some(m) if !m.is_empty() => record.with_metadata(m),
                _ => record,
            });
        }

        Ok(dedupe(records))
    }
}
