//! DRDL file loading and saving.
//!
//! YAML is the native DRDL format and may hold several documents separated by
//! `---`. Files with a `.json` extension are read and written as JSON instead,
//! either a single document object or an array of them.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::errors::DrdlError;
use super::model::DrdlDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrdlFormat {
    Yaml,
    Json,
}

impl DrdlFormat {
    /// Pick the format from the file extension, defaulting to YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DrdlFormat::Json,
            _ => DrdlFormat::Yaml,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonDocuments {
    One(DrdlDocument),
    Many(Vec<DrdlDocument>),
}

/// Parse every document in a DRDL string
pub fn parse_documents(content: &str, format: DrdlFormat) -> Result<Vec<DrdlDocument>, DrdlError> {
    match format {
        DrdlFormat::Yaml => {
            let mut documents = Vec::new();
            for document in serde_yaml::Deserializer::from_str(content) {
                let parsed = DrdlDocument::deserialize(document)
                    .map_err(|e| DrdlError::inline_parse_error(e.to_string()))?;
                documents.push(parsed);
            }
            Ok(documents)
        }
        DrdlFormat::Json => {
            let parsed: JsonDocuments = serde_json::from_str(content)
                .map_err(|e| DrdlError::inline_parse_error(e.to_string()))?;
            Ok(match parsed {
                JsonDocuments::One(document) => vec![document],
                JsonDocuments::Many(documents) => documents,
            })
        }
    }
}

/// Render documents back to a DRDL string
pub fn render_documents(documents: &[DrdlDocument], format: DrdlFormat) -> Result<String, DrdlError> {
    let to_error = |error: String| DrdlError::SerializeError { error };
    match format {
        DrdlFormat::Yaml => {
            let rendered = documents
                .iter()
                .map(|document| serde_yaml::to_string(document).map_err(|e| to_error(e.to_string())))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rendered.join("---\n"))
        }
        DrdlFormat::Json => {
            let rendered = match documents {
                [single] => serde_json::to_string_pretty(single),
                many => serde_json::to_string_pretty(many),
            };
            rendered.map_err(|e| to_error(e.to_string()))
        }
    }
}

pub fn load_documents<P: AsRef<Path>>(path: P) -> Result<Vec<DrdlDocument>, DrdlError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| DrdlError::ReadError {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;

    parse_documents(&content, DrdlFormat::from_path(path)).map_err(|e| match e {
        DrdlError::ParseError { error, .. } => DrdlError::ParseError {
            path: path.display().to_string(),
            error,
        },
        other => other,
    })
}

pub fn save_documents<P: AsRef<Path>>(path: P, documents: &[DrdlDocument]) -> Result<(), DrdlError> {
    let path = path.as_ref();
    let content = render_documents(documents, DrdlFormat::from_path(path))?;
    fs::write(path, content).map_err(|e| DrdlError::WriteError {
        path: path.display().to_string(),
        error: e.to_string(),
    })
}
