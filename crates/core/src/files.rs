//! Ordered set of generated project files.

use serde::Serialize;

/// A single generated file, keyed by its path relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// Ordered mapping from relative path to file content.
///
/// Iteration follows insertion order. An entry whose content is blank after
/// trimming is never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GeneratedFileSet {
    files: Vec<GeneratedFile>,
}

impl GeneratedFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the content stored under `path`.
    ///
    /// Returns `false` when the content is blank; any previous entry for the
    /// path is removed in that case.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) -> bool {
        let path = path.into();
        let content = content.into();

        if content.trim().is_empty() {
            self.remove(&path);
            return false;
        }

        match self.files.iter_mut().find(|f| f.path == path) {
            Some(existing) => existing.content = content,
            None => self.files.push(GeneratedFile { path, content }),
        }
        true
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.content.as_str())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.iter().any(|f| f.path == path)
    }

    pub fn remove(&mut self, path: &str) -> Option<GeneratedFile> {
        let index = self.files.iter().position(|f| f.path == path)?;
        Some(self.files.remove(index))
    }

    /// Rewrite the content stored under `path`, keeping its position.
    pub fn update(&mut self, path: &str, f: impl FnOnce(&str) -> String) {
        if let Some(content) = self.get(path) {
            let rewritten = f(content);
            self.insert(path, rewritten);
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeneratedFile> {
        self.files.iter()
    }

    pub fn paths(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.path.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a GeneratedFileSet {
    type Item = &'a GeneratedFile;
    type IntoIter = std::slice::Iter<'a, GeneratedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

impl IntoIterator for GeneratedFileSet {
    type Item = GeneratedFile;
    type IntoIter = std::vec::IntoIter<GeneratedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}
