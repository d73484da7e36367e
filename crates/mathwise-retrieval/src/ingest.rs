//! Knowledge-base ingestion.
//!
//! Layout under the knowledge-base root:
//! - `formulas/*.json`: `{"formulas": [{id, name, formula, description, example?}]}`
//! - `templates/*.md`: split on `## ` headers, one document per section
//! - `examples/*.md`: split on `## Example`, one document per worked example
//!
//! Document ids are `{kind}_{topic}_{n}`, where `n` counts documents within
//! one source file, so disjoint knowledge directories can share a retriever.
//! Unreadable or malformed files are logged and skipped.

use std::fs;
use std::path::{Path, PathBuf};

use mathwise_core::errors::{MathwiseResult, RetrievalError};
use mathwise_core::models::{Document, DocumentMetadata};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::engine::HybridRetriever;

/// Per-kind counts from one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub formulas: usize,
    pub templates: usize,
    pub examples: usize,
    pub skipped_files: usize,
}

impl IngestReport {
    pub fn total(&self) -> usize {
        self.formulas + self.templates + self.examples
    }
}

#[derive(Debug, Deserialize)]
struct FormulaFile {
    #[serde(default)]
    formulas: Vec<FormulaEntry>,
}

#[derive(Debug, Deserialize)]
struct FormulaEntry {
    #[serde(default)]
    id: String,
    name: String,
    formula: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    example: Option<String>,
}

#[derive(Default)]
struct Loader {
    docs: Vec<Document>,
    report: IngestReport,
}

impl Loader {
    /// `n` is the document's index within its source file.
    fn push(&mut self, kind: &str, n: usize, text: String, metadata: DocumentMetadata) {
        let id = format!("{kind}_{}_{n}", metadata.topic);
        self.docs.push(Document::new(id, text, metadata));
    }

    fn skip(&mut self, path: &Path, reason: &str) {
        error!(file = %path.display(), reason, "skipping knowledge file");
        self.report.skipped_files += 1;
    }

    fn formulas(&mut self, path: &Path) {
        let Some(content) = self.read(path) else {
            return;
        };
        let parsed: FormulaFile = match serde_json::from_str(&content) {
            Ok(p) => p,
            Err(e) => return self.skip(path, &e.to_string()),
        };
        let topic = stem(path);
        let source = file_name(path);
        for (n, entry) in parsed.formulas.into_iter().enumerate() {
            let mut text = format!(
                "Formula: {}\nExpression: {}\nDescription: {}",
                entry.name, entry.formula, entry.description
            );
            if let Some(example) = &entry.example {
                text.push_str(&format!("\nExample: {example}"));
            }
            let mut metadata = DocumentMetadata::new("formula", &topic, &source);
            if !entry.id.is_empty() {
                metadata = metadata.with_section(entry.id);
            }
            self.push("formula", n, text, metadata);
            self.report.formulas += 1;
        }
    }

    fn templates(&mut self, path: &Path) {
        let Some(content) = self.read(path) else {
            return;
        };
        let topic = stem(path).replace("_template", "");
        let source = file_name(path);
        let mut sections = content.split("\n## ");
        let mut n = 0;

        if let Some(intro) = sections.next().map(str::trim).filter(|s| !s.is_empty()) {
            let text = format!("Topic Overview: {topic}\n{intro}");
            self.push(
                "template",
                n,
                text,
                DocumentMetadata::new("template_overview", &topic, &source),
            );
            self.report.templates += 1;
            n += 1;
        }

        for section in sections {
            if section.trim().is_empty() {
                continue;
            }
            let (title, body) = section.split_once('\n').unwrap_or((section, ""));
            let title = title.trim();
            let text = format!("Method: {title}\nTopic: {topic}\n\n{}", body.trim());
            let metadata =
                DocumentMetadata::new("template_method", &topic, &source).with_section(title);
            self.push("template", n, text, metadata);
            self.report.templates += 1;
            n += 1;
        }
    }

    fn examples(&mut self, path: &Path) {
        let Some(content) = self.read(path) else {
            return;
        };
        let topic = stem(path).replace("_examples", "");
        let source = file_name(path);
        let examples = content
            .split("## Example")
            .skip(1)
            .filter(|e| !e.trim().is_empty());
        for (n, example) in examples.enumerate() {
            let text = format!("Example Problem ({topic}):\n## Example{example}");
            self.push(
                "example",
                n,
                text,
                DocumentMetadata::new("example_solution", &topic, &source),
            );
            self.report.examples += 1;
        }
    }

    fn read(&mut self, path: &Path) -> Option<String> {
        match fs::read_to_string(path) {
            Ok(c) => Some(c),
            Err(e) => {
                self.skip(path, &e.to_string());
                None
            }
        }
    }
}

/// Files in `dir` with extension `ext`, sorted by name. A missing directory
/// is just empty.
fn files_with_extension(dir: &Path, ext: &str) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|x| x == ext))
        .collect();
    files.sort();
    files
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Read every knowledge file under `root` into documents.
pub fn load_knowledge_base(
    root: &Path,
) -> Result<(Vec<Document>, IngestReport), RetrievalError> {
    if !root.is_dir() {
        return Err(RetrievalError::KnowledgeBaseNotFound {
            path: root.display().to_string(),
        });
    }

    let mut loader = Loader::default();
    for path in files_with_extension(&root.join("formulas"), "json") {
        loader.formulas(&path);
    }
    for path in files_with_extension(&root.join("templates"), "md") {
        loader.templates(&path);
    }
    for path in files_with_extension(&root.join("examples"), "md") {
        loader.examples(&path);
    }

    if loader.docs.is_empty() {
        warn!(root = %root.display(), "no knowledge documents found");
    }
    Ok((loader.docs, loader.report))
}

/// Load `root` and add everything to `retriever` as one batch.
pub fn ingest_knowledge_base(
    retriever: &HybridRetriever,
    root: &Path,
) -> MathwiseResult<IngestReport> {
    let (docs, report) = load_knowledge_base(root)?;
    retriever.add_documents(docs)?;
    info!(
        formulas = report.formulas,
        templates = report.templates,
        examples = report.examples,
        skipped = report.skipped_files,
        "knowledge base ingested"
    );
    Ok(report)
}
