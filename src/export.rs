//! Save a displayed response body to disk.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::http::response::to_pretty_string;
use crate::{RestdeskError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Text,
}

/// `.json` paths get indented JSON when the content parses; anything else is
/// written verbatim.
pub fn export_body(content: &str, path: &Path) -> Result<ExportFormat> {
    let content = content.trim();
    if content.is_empty() {
        return Err(RestdeskError::NothingToExport);
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }

    let wants_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if wants_json && let Ok(value) = serde_json::from_str::<Value>(content) {
        fs::write(path, to_pretty_string(&value))?;
        return Ok(ExportFormat::Json);
    }

    fs::write(path, content)?;
    Ok(ExportFormat::Text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_json_extension_writes_pretty_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.JSON");

        let format = export_body(r#"{"ok":true}"#, &path).unwrap();
        assert_eq!(format, ExportFormat::Json);
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\n    \"ok\": true\n}");
    }

    #[test]
    fn test_json_extension_with_text_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.json");

        let format = export_body("plain text", &path).unwrap();
        assert_eq!(format, ExportFormat::Text);
        assert_eq!(fs::read_to_string(&path).unwrap(), "plain text");
    }

    #[test]
    fn test_txt_extension_keeps_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sub").join("out.txt");

        let format = export_body(r#"{"ok":true}"#, &path).unwrap();
        assert_eq!(format, ExportFormat::Text);
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"ok":true}"#);
    }

    #[test]
    fn test_empty_content_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.txt");
        assert!(matches!(
            export_body("  \n", &path),
            Err(RestdeskError::NothingToExport)
        ));
        assert!(!path.exists());
    }
}
