//! The assistant's knowledge base: trigger phrases and canned responses.
//!
//! The document is a JSON object keyed by category:
//!
//! ```json
//! {
//!   "luces": {
//!     "prioridad": 10,
//!     "preguntas": ["Enciende las luces"],
//!     "respuestas": { "encender": "He encendido todas las luces del hogar." }
//!   }
//! }
//! ```
//!
//! Categories are matched in ascending `prioridad`; ties keep document
//! order, as does the order of `respuestas` within a category.

use std::{io, path::Path};

use serde::Deserialize;
use serde_json::{Map, Value};

const EMBEDDED: &str = include_str!("../data/nexus-knowledge.json");

/// Priority given to categories that don't declare one.
const DEFAULT_PRIORITY: i32 = 100;

/// Errors that can occur while loading a knowledge base.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid category '{name}': {source}")]
    Category {
        name: String,
        source: serde_json::Error,
    },
}

pub type Result<T> = core::result::Result<T, KnowledgeError>;

/// A category as it appears in the document.
#[derive(Debug, Deserialize)]
struct RawCategory {
    #[serde(default)]
    prioridad: Option<i32>,
    #[serde(default)]
    preguntas: Vec<String>,
    #[serde(default)]
    respuestas: Map<String, Value>,
}

/// One topic the assistant can answer about.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    pub priority: i32,
    /// Trigger phrases, already lower-cased.
    pub triggers: Vec<String>,
    /// `(intent key, response)` pairs in document order. Blank responses
    /// are dropped on load.
    pub responses: Vec<(String, String)>,
}

impl Category {
    /// The response stored under `key`, if any.
    pub fn response(&self, key: &str) -> Option<&str> {
        self.responses
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, text)| text.as_str())
    }
}

/// Read-only set of categories, sorted by priority.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeBase {
    categories: Vec<Category>,
}

impl KnowledgeBase {
    /// Parses a knowledge base document.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: Map<String, Value> = serde_json::from_str(json)?;

        let mut categories = Vec::with_capacity(doc.len());
        for (name, value) in doc {
            let raw: RawCategory = serde_json::from_value(value)
                .map_err(|source| KnowledgeError::Category {
                    name: name.clone(),
                    source,
                })?;
            let responses = raw
                .respuestas
                .into_iter()
                .filter_map(|(key, value)| match value {
                    Value::String(text) if !text.trim().is_empty() => Some((key, text)),
                    _ => None,
                })
                .collect();
            categories.push(Category {
                name,
                priority: raw.prioridad.unwrap_or(DEFAULT_PRIORITY),
                triggers: raw.preguntas.iter().map(|p| p.to_lowercase()).collect(),
                responses,
            });
        }
        // Stable: equal priorities keep document order.
        categories.sort_by_key(|c| c.priority);

        Ok(Self { categories })
    }

    /// The knowledge base shipped with the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED)
    }

    /// Reads and parses a knowledge base file.
    pub async fn load(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    /// Categories in matching order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// The response stored under `key` in category `category`.
    pub fn response(&self, category: &str, key: &str) -> Option<&str> {
        self.category(category)?.response(key)
    }
}
