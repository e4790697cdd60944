//! Project requests and the naming rules derived from them.

use std::fmt;
use std::path::{Path, PathBuf};

/// Number of description words used to build the slug.
pub const SLUG_WORDS: usize = 5;

/// Prefix of every repository created for a generated project.
pub const REPOSITORY_PREFIX: &str = "codemate-";

/// Longest repository name GitHub accepts.
pub const REPOSITORY_NAME_MAX_LEN: usize = 100;

/// Used when the description yields no usable characters.
pub const FALLBACK_SLUG: &str = "project";

/// One generation request. Never persisted.
#[derive(Clone)]
pub struct ProjectRequest {
    pub description: String,
    pub requester: String,
    credential: Option<String>,
}

impl ProjectRequest {
    pub fn new(
        description: impl Into<String>,
        requester: impl Into<String>,
        credential: Option<String>,
    ) -> Self {
        Self {
            description: description.into(),
            requester: requester.into(),
            credential,
        }
    }

    /// The GitHub token, if a non-blank one was supplied.
    pub fn credential(&self) -> Option<&str> {
        self.credential
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    pub fn slug(&self) -> String {
        project_slug(&self.description)
    }

    pub fn repository_name(&self) -> String {
        repository_name(&self.slug())
    }

    /// `<root>/<requester>/<slug>`
    pub fn project_directory(&self, root: &Path) -> PathBuf {
        project_directory(root, &self.requester, &self.slug())
    }
}

impl fmt::Debug for ProjectRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectRequest")
            .field("description", &self.description)
            .field("requester", &self.requester)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Lowercased first words of the description joined with `_`.
///
/// Apostrophes are dropped and path separators replaced so the slug stays a
/// single path component.
pub fn project_slug(description: &str) -> String {
    let slug = description
        .to_lowercase()
        .split_whitespace()
        .take(SLUG_WORDS)
        .collect::<Vec<_>>()
        .join("_")
        .replace('\'', "");

    let slug = sanitize_component(&slug);
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// `codemate-<slug>` as GitHub stores it: anything outside `[A-Za-z0-9._-]` becomes `-`.
pub fn repository_name(slug: &str) -> String {
    format!("{REPOSITORY_PREFIX}{slug}")
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .take(REPOSITORY_NAME_MAX_LEN)
        .collect()
}

pub fn project_directory(root: &Path, requester: &str, slug: &str) -> PathBuf {
    root.join(sanitize_component(requester)).join(slug)
}

fn sanitize_component(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();

    match cleaned.as_str() {
        "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}
