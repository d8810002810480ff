/*!
 * Chapter input and translated output documents.
 *
 * Input is a JSON array of `{ "title", "content" }` objects, loaded from a URL,
 * a local file, or an inline string. Output is the pretty-printed array of
 * translated items, each tagged with the backend that produced its body.
 */

use std::fmt;
use std::path::PathBuf;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::TranslationError;
use crate::translation::range::ChapterRange;

/// One untranslated chapter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl InputItem {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self { title: title.into(), content: content.into() }
    }
}

/// One translated chapter, serialized as `title`, `content`, `model`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    pub title: String,
    pub content: String,
    pub model: String,
}

/// Translated slice of the input together with the range it covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDocument {
    pub range: ChapterRange,
    pub items: Vec<ResultItem>,
}

impl OutputDocument {
    pub fn new(range: ChapterRange, items: Vec<ResultItem>) -> Self {
        Self { range, items }
    }

    /// Pretty JSON array of the items
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.items)
    }

    /// `translated_{start}_{end}.json`
    pub fn suggested_filename(&self) -> String {
        self.range.output_filename()
    }

    /// Number of items whose body was produced by the given model label
    pub fn count_by_model(&self, model: &str) -> usize {
        self.items.iter().filter(|item| item.model == model).count()
    }
}

/// Where the chapter list comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterSource {
    /// Remote JSON document
    Url(String),
    /// Local JSON file
    File(PathBuf),
    /// JSON text held in memory
    Inline(String),
    /// Chapters already parsed by the caller
    Items(Vec<InputItem>),
}

impl ChapterSource {
    /// Interpret a user-supplied location: `http(s)://` is a URL, anything else a path
    pub fn from_location(location: &str) -> Self {
        let trimmed = location.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }

    /// Load and parse the chapter list
    pub async fn load(&self) -> Result<Vec<InputItem>, TranslationError> {
        let raw = match self {
            Self::Items(items) => return Ok(items.clone()),
            Self::Url(url) => {
                info!("Fetching chapters from {}", url);
                let response = reqwest::get(url.as_str()).await
                    .map_err(|e| TranslationError::InputFormat(format!("Failed to fetch {}: {}", url, e)))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(TranslationError::InputFormat(format!("Fetching {} returned HTTP {}", url, status)));
                }
                response.text().await
                    .map_err(|e| TranslationError::InputFormat(format!("Failed to read body of {}: {}", url, e)))?
            }
            Self::File(path) => {
                info!("Reading chapters from {}", path.display());
                tokio::fs::read_to_string(path).await
                    .map_err(|e| TranslationError::InputFormat(format!("Failed to read {}: {}", path.display(), e)))?
            }
            Self::Inline(json) => json.clone(),
        };

        let items = parse_items(&raw)?;
        debug!("Loaded {} chapter(s) from {}", items.len(), self);
        Ok(items)
    }
}

impl fmt::Display for ChapterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{}", url),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Inline(_) => write!(f, "<inline>"),
            Self::Items(items) => write!(f, "<{} chapters>", items.len()),
        }
    }
}

/// Parse a JSON array of chapter objects.
///
/// Missing or `null` fields become empty strings; any other non-string field
/// is rejected.
pub fn parse_items(raw: &str) -> Result<Vec<InputItem>, TranslationError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| TranslationError::InputFormat(format!("Input is not valid JSON: {}", e)))?;

    let Value::Array(elements) = value else {
        return Err(TranslationError::InputFormat("Input must be a JSON array of chapters".to_string()));
    };

    elements.iter().enumerate()
        .map(|(index, element)| {
            let object = element.as_object().ok_or_else(|| {
                TranslationError::InputFormat(format!("Chapter {} is not a JSON object", index + 1))
            })?;
            Ok(InputItem {
                title: string_field(object, "title", index)?,
                content: string_field(object, "content", index)?,
            })
        })
        .collect()
}

fn string_field(object: &Map<String, Value>, name: &str, index: usize) -> Result<String, TranslationError> {
    match object.get(name) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(other) => Err(TranslationError::InputFormat(format!(
            "Chapter {} field '{}' must be a string, got {}", index + 1, name, other
        ))),
    }
}
