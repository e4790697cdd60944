//! Extraction of marker-delimited file sections from model output.
//!
//! The model is asked to wrap every file in a pair of tags named after the
//! file path, e.g. `<README.md> ... </README.md>`. For each known template the
//! parser takes the first start marker and the first end marker that follows
//! it. Nested, duplicated or out-of-order tags are not detected.

use std::fmt;

use crate::files::GeneratedFileSet;

pub const README: &str = "README.md";
pub const REQUIREMENTS: &str = "requirements.txt";
pub const APP_ENTRYPOINT: &str = "src/app.py";
pub const WORKFLOW: &str = ".github/workflows/main.yml";

/// Paths of every file the model is asked to produce, in output order.
pub const TEMPLATE_PATHS: [&str; 4] = [README, REQUIREMENTS, APP_ENTRYPOINT, WORKFLOW];

/// A named section and the markers delimiting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTemplate {
    pub path: String,
    pub start_marker: String,
    pub end_marker: String,
}

impl FileTemplate {
    /// Template delimited by `<path>` and `</path>`.
    pub fn tagged(path: &str) -> Self {
        Self {
            path: path.to_string(),
            start_marker: format!("<{path}>"),
            end_marker: format!("</{path}>"),
        }
    }
}

pub fn default_templates() -> Vec<FileTemplate> {
    TEMPLATE_PATHS.iter().map(|p| FileTemplate::tagged(p)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingMarkers,
    EmptyContent,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingMarkers => write!(f, "markers not found in model output"),
            SkipReason::EmptyContent => write!(f, "section is empty"),
        }
    }
}

/// A template that produced no file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTemplate {
    pub path: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub files: GeneratedFileSet,
    /// Diagnostics for the caller; skipping a template is not an error.
    pub skipped: Vec<SkippedTemplate>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("No files were generated from the model output. Check the response format.")]
    NoFilesExtracted { skipped: Vec<SkippedTemplate> },
}

/// Turns raw model output into a set of generated files.
pub trait ResponseParser {
    fn parse(&self, raw: &str) -> Result<ParseOutcome, ParseError>;
}

/// [`ResponseParser`] based on start/end markers.
#[derive(Debug, Clone)]
pub struct MarkerParser {
    templates: Vec<FileTemplate>,
}

impl MarkerParser {
    pub fn new(templates: Vec<FileTemplate>) -> Self {
        Self { templates }
    }

    pub fn templates(&self) -> &[FileTemplate] {
        &self.templates
    }
}

impl Default for MarkerParser {
    fn default() -> Self {
        Self::new(default_templates())
    }
}

impl ResponseParser for MarkerParser {
    fn parse(&self, raw: &str) -> Result<ParseOutcome, ParseError> {
        let mut files = GeneratedFileSet::new();
        let mut skipped = Vec::new();

        for template in &self.templates {
            let reason = match extract_section(raw, &template.start_marker, &template.end_marker) {
                Some(content) if files.insert(template.path.as_str(), content) => continue,
                Some(_) => SkipReason::EmptyContent,
                None => SkipReason::MissingMarkers,
            };
            skipped.push(SkippedTemplate {
                path: template.path.clone(),
                reason,
            });
        }

        if files.is_empty() {
            return Err(ParseError::NoFilesExtracted { skipped });
        }

        Ok(ParseOutcome { files, skipped })
    }
}

/// Trimmed text between the first `start` and the first `end` after it.
pub fn extract_section<'a>(raw: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let begin = raw.find(start)? + start.len();
    let length = raw[begin..].find(end)?;
    Some(raw[begin..begin + length].trim())
}
