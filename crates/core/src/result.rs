//! The structured result handed back to callers of the pipeline.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Everything requested completed.
    Success,
    /// Local files exist but publishing failed.
    Warning,
    /// Nothing usable was produced.
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => write!(f, "success"),
            Status::Warning => write!(f, "warning"),
            Status::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub status: Status,
    pub message: String,
    pub generated_files: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    /// Per-file problems that did not stop the run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl PipelineResult {
    /// Local generation completed; `repo_url` is set when the project was published.
    pub fn success(slug: &str, generated_files: Vec<PathBuf>, repo_url: Option<String>) -> Self {
        let message = match &repo_url {
            Some(url) => format!("Project '{slug}' generated successfully. Pushed to GitHub: {url}"),
            None => format!(
                "Project '{slug}' generated successfully. Skipped GitHub publishing (no token supplied)."
            ),
        };

        Self {
            status: Status::Success,
            message,
            generated_files,
            repo_url,
            warnings: Vec::new(),
        }
    }

    pub fn publish_failed(generated_files: Vec<PathBuf>, reason: impl fmt::Display) -> Self {
        Self {
            status: Status::Warning,
            message: format!(
                "Project files generated locally, but failed to push to GitHub: {reason}. Please check your GitHub token and network connection."
            ),
            generated_files,
            repo_url: None,
            warnings: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            generated_files: Vec::new(),
            repo_url: None,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn is_error(&self) -> bool {
        self.status == Status::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_with_repository() {
        let result = PipelineResult::success(
            "todo_app",
            vec![PathBuf::from("/tmp/README.md")],
            Some("https://github.com/alice/codemate-todo_app".to_string()),
        );

        assert_eq!(result.status, Status::Success);
        assert_eq!(
            result.message,
            "Project 'todo_app' generated successfully. Pushed to GitHub: https://github.com/alice/codemate-todo_app"
        );
    }

    #[test]
    fn test_success_without_repository() {
        let result = PipelineResult::success("todo_app", vec![], None);
        assert!(result.message.contains("Skipped GitHub publishing"));
        assert!(result.repo_url.is_none());
    }

    #[test]
    fn test_publish_failed_keeps_files() {
        let files = vec![PathBuf::from("/tmp/a"), PathBuf::from("/tmp/b")];
        let result = PipelineResult::publish_failed(files.clone(), "Bad credentials");

        assert_eq!(result.status, Status::Warning);
        assert_eq!(result.generated_files, files);
        assert!(result.message.contains("Bad credentials"));
    }

    #[test]
    fn test_json_shape() {
        let result = PipelineResult::error("boom");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "status": "error",
                "message": "boom",
                "generated_files": []
            })
        );
    }

    #[test]
    fn test_json_includes_repo_url_and_warnings() {
        let result = PipelineResult::success("x", vec![PathBuf::from("/p/README.md")], Some("https://u".into()))
            .with_warnings(vec!["could not write src/app.py".into()]);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["status"], "success");
        assert_eq!(json["repo_url"], "https://u");
        assert_eq!(json["generated_files"][0], "/p/README.md");
        assert_eq!(json["warnings"][0], "could not write src/app.py");
    }
}
