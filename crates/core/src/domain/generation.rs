use serde::{Deserialize, Serialize};

/// Canonical file names the generation step is constrained to produce.
pub const ENTRY_FILE: &str = "index.html";
pub const README_FILE: &str = "README.md";
pub const LICENSE_FILE: &str = "LICENSE";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// A file set produced by one generation call, plus its commit message.
///
/// Produced fresh each round and never merged in-process: on an update
/// round only the generated paths are overwritten in the working tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub files: Vec<GeneratedFile>,
    pub commit_message: String,
}

impl GenerationResult {
    pub fn new(files: Vec<GeneratedFile>, commit_message: impl Into<String>) -> Self {
        Self {
            files,
            commit_message: commit_message.into(),
        }
    }

    /// File set that re-commits the previous entry file unchanged. Used
    /// when an update is rejected and the prior artifact must be kept.
    pub fn preserving(previous_entry: impl Into<String>) -> Self {
        Self {
            files: vec![GeneratedFile::new(ENTRY_FILE, previous_entry)],
            commit_message: "Keep previous version (update rejected by safety check)".to_string(),
        }
    }

    pub fn file(&self, path: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.content.as_str())
    }

    pub fn entry_content(&self) -> Option<&str> {
        self.file(ENTRY_FILE)
    }
}
