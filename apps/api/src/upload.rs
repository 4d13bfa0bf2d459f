//! Multipart upload handling shared by the extraction and template endpoints.

use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::extract::Multipart;
use bytes::Bytes;
use tempfile::TempDir;

use crate::errors::AppError;
use crate::extraction::loader::DocumentKind;

/// Name of the multipart field carrying the guideline document.
pub const FILE_FIELD: &str = "file";

#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub kind: DocumentKind,
    pub bytes: Bytes,
}

/// An upload written to a private temp directory. Removed on drop.
pub struct StagedUpload {
    _dir: TempDir,
    path: PathBuf,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Reads the `file` field, rejecting anything but non-empty `.txt`/`.docx`.
pub async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("file field has no file name".to_string()))?;
        let kind = DocumentKind::from_path(Path::new(&file_name))
            .map_err(|e| AppError::UnsupportedFormat(e.to_string()))?;
        let bytes = field.bytes().await?;

        if bytes.is_empty() {
            return Err(AppError::Validation("uploaded file is empty".to_string()));
        }

        return Ok(Upload {
            file_name,
            kind,
            bytes,
        });
    }

    Err(AppError::Validation(format!(
        "multipart field '{FILE_FIELD}' is required"
    )))
}

impl Upload {
    /// File stem reduced to characters that are safe in a header value.
    pub fn safe_stem(&self) -> String {
        let stem = Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        let safe: String = stem
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if safe.is_empty() {
            "document".to_string()
        } else {
            safe
        }
    }

    /// Writes the upload to disk so the loader can read it by path.
    pub async fn stage(&self) -> Result<StagedUpload, AppError> {
        let dir = tempfile::tempdir().context("failed to create upload directory")?;
        let path = dir
            .path()
            .join(format!("guideline.{}", self.kind.extension()));
        tokio::fs::write(&path, &self.bytes)
            .await
            .context("failed to stage uploaded file")?;
        Ok(StagedUpload { _dir: dir, path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str) -> Upload {
        Upload {
            file_name: name.to_string(),
            kind: DocumentKind::PlainText,
            bytes: Bytes::from_static(b"Margin 4 cm"),
        }
    }

    #[test]
    fn test_safe_stem_replaces_unsafe_characters() {
        assert_eq!(upload("Panduan Skripsi (2024).txt").safe_stem(), "Panduan_Skripsi__2024_");
        assert_eq!(upload("pedoman-ta.docx").safe_stem(), "pedoman-ta");
    }

    #[tokio::test]
    async fn test_stage_writes_bytes_with_kind_extension() {
        let staged = upload("x.txt").stage().await.unwrap();
        assert_eq!(staged.path().extension().unwrap(), "txt");
        assert_eq!(std::fs::read(staged.path()).unwrap(), b"Margin 4 cm");
    }
}
