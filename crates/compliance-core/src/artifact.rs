use std::path::{Path, PathBuf};

use crate::error::FatalError;

/// The immutable source text under analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    id: String,
    content: String,
    domain_tag: String,
    path: Option<PathBuf>,
}

impl Artifact {
    /// Build an in-memory artifact. `id` is what reports show as its location.
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        domain_tag: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            domain_tag: domain_tag.into().to_ascii_lowercase(),
            path: None,
        }
    }

    /// Read an artifact from disk. The domain tag comes from `domain` when given,
    /// otherwise from the file extension.
    pub fn from_path(path: &Path, domain: Option<&str>) -> Result<Self, FatalError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| FatalError::ArtifactUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
        let domain_tag = match domain {
            Some(d) => d.to_ascii_lowercase(),
            None => detect_domain(path).unwrap_or("text").to_string(),
        };
        Ok(Self {
            id: path.to_string_lossy().to_string(),
            content,
            domain_tag,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn domain_tag(&self) -> &str {
        &self.domain_tag
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Map a file extension to a domain tag.
pub fn detect_domain(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let tag = match ext.as_str() {
        "html" | "htm" => "html",
        "css" => "css",
        "scss" => "scss",
        "sql" => "sql",
        "php" => "php",
        "js" | "mjs" | "cjs" => "js",
        "ts" => "ts",
        "jsx" => "jsx",
        "tsx" => "tsx",
        "vue" => "vue",
        "json" => "json",
        "md" | "markdown" => "markdown",
        "yaml" | "yml" => "yaml",
        _ => return None,
    };
    Some(tag)
}
