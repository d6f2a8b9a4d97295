//! Text extraction for uploaded resume files.

use std::path::Path;

use thiserror::Error;
use tracing::debug;

/// Uploads above this size are rejected.
pub const MAX_IMPORT_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("unsupported file type {0:?}; upload a .md, .txt, or .pdf file")]
    Unsupported(String),

    #[error("file is not valid UTF-8 text")]
    NotUtf8(#[from] std::string::FromUtf8Error),

    #[error("could not extract text from PDF: {0}")]
    Pdf(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Markdown,
    PlainText,
    Pdf,
}

impl FileKind {
    /// Detects the kind from the file extension, case-insensitively.
    pub fn from_file_name(name: &str) -> Result<Self, ImportError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "md" | "markdown" => Ok(FileKind::Markdown),
            "txt" => Ok(FileKind::PlainText),
            "pdf" => Ok(FileKind::Pdf),
            _ => Err(ImportError::Unsupported(name.to_string())),
        }
    }
}

/// Extracts the text content of an uploaded file. PDF extraction is CPU-bound
/// and runs on the blocking pool.
pub async fn extract_text(file_name: &str, bytes: Vec<u8>) -> Result<String, ImportError> {
    let kind = FileKind::from_file_name(file_name)?;
    debug!(file_name, ?kind, bytes = bytes.len(), "Extracting uploaded resume");
    match kind {
        FileKind::Markdown | FileKind::PlainText => Ok(String::from_utf8(bytes)?),
        FileKind::Pdf => tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| ImportError::Pdf(e.to_string()))
        })
        .await
        .map_err(|e| ImportError::Pdf(e.to_string()))?,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(FileKind::from_file_name("cv.MD").unwrap(), FileKind::Markdown);
        assert_eq!(FileKind::from_file_name("notes.txt").unwrap(), FileKind::PlainText);
        assert_eq!(FileKind::from_file_name("resume.final.pdf").unwrap(), FileKind::Pdf);
        assert!(matches!(
            FileKind::from_file_name("resume.docx"),
            Err(ImportError::Unsupported(_))
        ));
        assert!(FileKind::from_file_name("README").is_err());
    }

    #[tokio::test]
    async fn test_text_files_are_read_as_utf8() {
        let text = extract_text("cv.md", b"# Jane\n\n## Skills".to_vec()).await.unwrap();
        assert_eq!(text, "# Jane\n\n## Skills");

        let err = extract_text("cv.txt", vec![0xff, 0xfe]).await.unwrap_err();
        assert!(matches!(err, ImportError::NotUtf8(_)));
    }

    #[tokio::test]
    async fn test_garbage_pdf_is_an_error() {
        let err = extract_text("cv.pdf", b"not a pdf".to_vec()).await.unwrap_err();
        assert!(matches!(err, ImportError::Pdf(_)));
    }
}
