use serde::{Deserialize, Serialize};

/// Knowledge category used for diversity bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    Formula,
    Template,
    Example,
    Other,
}

impl DocType {
    /// Seeding priority for diversity selection.
    pub const SEED_ORDER: [DocType; 3] = [DocType::Formula, DocType::Template, DocType::Example];

    /// Normalize a raw ingestion label (`formula`, `template_method`,
    /// `example_solution`, ...) into a bucket.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_ascii_lowercase();
        if label == "formula" {
            DocType::Formula
        } else if label.contains("template") {
            DocType::Template
        } else if label.contains("example") {
            DocType::Example
        } else {
            DocType::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Formula => "formula",
            DocType::Template => "template",
            DocType::Example => "example",
            DocType::Other => "other",
        }
    }
}

/// Metadata attached to every indexed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub doc_type: DocType,
    /// Raw label as ingested, e.g. `template_method`.
    pub label: String,
    pub topic: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl DocumentMetadata {
    /// Build metadata from a raw label, deriving the bucket from it.
    pub fn new(label: impl Into<String>, topic: impl Into<String>, source: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            doc_type: DocType::from_label(&label),
            label,
            topic: topic.into(),
            source: source.into(),
            section: None,
        }
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }
}

/// A knowledge snippet. Immutable once it belongs to an index generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata,
        }
    }

    pub fn doc_type(&self) -> DocType {
        self.metadata.doc_type
    }
}
