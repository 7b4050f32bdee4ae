//! CV artifact validation.
//!
//! An artifact must carry both an accepted MIME type and an accepted file
//! extension. Validation happens before any network call.

use crate::error::{WorkflowError, WorkflowResult};
use reqwest::multipart::Part;
use std::path::Path;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Accepted `(extension, MIME type)` pairs.
pub const ACCEPTED_TYPES: [(&str, &str); 3] =
    [("pdf", MIME_PDF), ("doc", MIME_DOC), ("docx", MIME_DOCX)];

/// A validated CV document ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadArtifact {
    file_name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

impl UploadArtifact {
    /// Validate and wrap an in-memory document.
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> WorkflowResult<Self> {
        let file_name = file_name.into();
        let mime_type = mime_type.into();
        validate(&file_name, &mime_type)?;
        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    /// Read a document from disk.
    ///
    /// Without an explicit `mime_type` the type is inferred from the extension.
    /// The file is validated before it is read.
    pub async fn from_path(path: &Path, mime_type: Option<&str>) -> WorkflowResult<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| WorkflowError::Validation(path.display().to_string()))?
            .to_string();

        let mime_type = match mime_type {
            Some(mime) => mime.to_string(),
            None => mime_for_file_name(&file_name)
                .ok_or_else(|| WorkflowError::Validation(file_name.clone()))?
                .to_string(),
        };
        validate(&file_name, &mime_type)?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| WorkflowError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Multipart body part for the `file` field.
    pub(crate) fn into_part(self) -> reqwest::Result<Part> {
        Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.mime_type)
    }
}

fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// MIME type matching the file's extension, if it is an accepted one.
pub fn mime_for_file_name(file_name: &str) -> Option<&'static str> {
    let ext = extension(file_name)?;
    ACCEPTED_TYPES
        .iter()
        .find(|(accepted, _)| *accepted == ext)
        .map(|(_, mime)| *mime)
}

/// Check that both the MIME type and the extension are accepted.
pub fn validate(file_name: &str, mime_type: &str) -> WorkflowResult<()> {
    let mime_ok = ACCEPTED_TYPES.iter().any(|(_, mime)| *mime == mime_type);
    let ext_ok = mime_for_file_name(file_name).is_some();
    if mime_ok && ext_ok {
        Ok(())
    } else {
        Err(WorkflowError::Validation(format!("{file_name} ({mime_type})")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_cv_documents() {
        assert!(validate("resume.pdf", MIME_PDF).is_ok());
        assert!(validate("Resume.DOCX", MIME_DOCX).is_ok());
        assert!(validate("cv.doc", MIME_DOC).is_ok());
    }

    #[test]
    fn test_requires_both_mime_and_extension() {
        assert!(matches!(
            validate("resume.txt", MIME_PDF),
            Err(WorkflowError::Validation(_))
        ));
        assert!(matches!(
            validate("resume.pdf", "text/plain"),
            Err(WorkflowError::Validation(_))
        ));
        assert!(validate("resume", MIME_PDF).is_err());
    }

    #[test]
    fn test_mime_inference() {
        assert_eq!(mime_for_file_name("a.PDF"), Some(MIME_PDF));
        assert_eq!(mime_for_file_name("a.docx"), Some(MIME_DOCX));
        assert_eq!(mime_for_file_name("a.png"), None);
    }

    #[tokio::test]
    async fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("resume.pdf");
        std::fs::write(&path, b"%PDF-1.4").expect("Failed to write file");

        let artifact = UploadArtifact::from_path(&path, None)
            .await
            .expect("Failed to load artifact");
        assert_eq!(artifact.file_name(), "resume.pdf");
        assert_eq!(artifact.mime_type(), MIME_PDF);
        assert_eq!(artifact.len(), 8);
    }

    #[tokio::test]
    async fn test_from_path_rejects_before_reading() {
        // The file does not exist: a validation error, not an I/O error.
        let result = UploadArtifact::from_path(Path::new("/nonexistent/photo.png"), None).await;
        assert!(matches!(result, Err(WorkflowError::Validation(_))));

        let missing = UploadArtifact::from_path(Path::new("/nonexistent/resume.pdf"), None).await;
        assert!(matches!(missing, Err(WorkflowError::Io { .. })));
    }
}
