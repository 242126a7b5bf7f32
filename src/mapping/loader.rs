// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loading mapping documents from a directory of `<language>.json` files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::DEFAULT_LANGUAGE;
use crate::mapping::FieldMapping;

fn language_file(dir: &Path, language: &str) -> PathBuf {
    dir.join(format!("{language}.json"))
}

/// Loads the mapping for `language` from `dir`.
///
/// Falls back to the [`DEFAULT_LANGUAGE`] file when the requested one does
/// not exist, and to an empty registry when neither exists or the file
/// cannot be read or parsed. Never fails: missing display metadata only
/// degrades names to raw field keys.
#[must_use]
pub fn load(dir: &Path, language: &str) -> FieldMapping {
    let mut path = language_file(dir, language);
    if !path.is_file() {
        tracing::debug!(
            language,
            fallback = DEFAULT_LANGUAGE,
            "Mapping file not found, using fallback language"
        );
        path = language_file(dir, DEFAULT_LANGUAGE);
    }

    if !path.is_file() {
        tracing::warn!(path = %path.display(), "Mapping file not found");
        return FieldMapping::new();
    }

    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read mapping file");
            return FieldMapping::new();
        }
    };

    match FieldMapping::from_json_str(&text) {
        Ok(mapping) => {
            tracing::debug!(path = %path.display(), "Loaded field mapping");
            mapping
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to parse mapping file");
            FieldMapping::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Platform;

    fn write(dir: &Path, language: &str, body: &str) {
        fs::write(language_file(dir, language), body).unwrap();
    }

    #[test]
    fn loads_requested_language() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "en", r#"{"entity": {"sensor": {"waterTemp": "Water"}}}"#);
        write(dir.path(), "zh-Hans", r#"{"entity": {"sensor": {"waterTemp": "水温"}}}"#);

        let mapping = load(dir.path(), "en");
        assert_eq!(mapping.get(Platform::Sensor, "waterTemp").name, "Water");
    }

    #[test]
    fn missing_language_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "zh-Hans", r#"{"entity": {"sensor": {"waterTemp": "水温"}}}"#);

        let mapping = load(dir.path(), "fr");
        assert_eq!(mapping.get(Platform::Sensor, "waterTemp").name, "水温");
    }

    #[test]
    fn nothing_to_load_gives_empty_registry() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(dir.path(), "en").is_empty());
    }

    #[test]
    fn unparsable_file_gives_empty_registry() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "en", "{ nope");
        assert!(load(dir.path(), "en").is_empty());
    }
}
