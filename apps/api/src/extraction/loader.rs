//! Guideline loading: plain text and `.docx` only.

use std::path::Path;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported document type: {0:?} (expected .txt or .docx)")]
    Unsupported(String),

    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to extract text from .docx: {0}")]
    Docx(String),

    #[error("document contains no text")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    Docx,
}

impl DocumentKind {
    /// Detects the kind from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "txt" => Ok(DocumentKind::PlainText),
            "docx" => Ok(DocumentKind::Docx),
            _ => Err(LoadError::Unsupported(extension)),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentKind::PlainText => "txt",
            DocumentKind::Docx => "docx",
        }
    }
}

/// Loads the text content of a guideline document.
pub async fn load_text(path: &Path) -> Result<String, LoadError> {
    let kind = DocumentKind::from_path(path)?;

    let text = match kind {
        DocumentKind::PlainText => {
            let bytes = tokio::fs::read(path).await?;
            let text = String::from_utf8_lossy(&bytes);
            text.trim_start_matches('\u{feff}').to_string()
        }
        DocumentKind::Docx => {
            let owned = path.to_path_buf();
            tokio::task::spawn_blocking(move || docx_lite::extract_text(&owned))
                .await
                .map_err(|e| LoadError::Docx(e.to_string()))?
                .map_err(|e| LoadError::Docx(e.to_string()))?
        }
    };

    if text.trim().is_empty() {
        return Err(LoadError::Empty);
    }

    debug!(
        "Loaded {} characters from {} ({})",
        text.chars().count(),
        path.display(),
        kind.extension()
    );
    Ok(text)
}
