//! Syllabus document reading.
//!
//! A [`FileHandle`] describes what the client picked; [`DocumentReader`] checks
//! it against the size limit and the PDF/Word allow-list, hands the bytes to the
//! [`TextExtractor`] registered for that format and cleans the result.

pub mod cleanup;
pub mod formats;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub use cleanup::{MAX_DOCUMENT_CHARS, clean_text};
pub use formats::{DocxTextExtractor, LegacyWordExtractor, PdfTextExtractor};

/// Largest accepted upload, in bytes (50 MB).
pub const MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;
/// Cleaned text shorter than this is not treated as a syllabus.
pub const MIN_DOCUMENT_CHARS: usize = 50;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("File is too large ({size} bytes); the limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    #[error("Unsupported file type: {0}. Upload a PDF or Word document")]
    UnsupportedType(String),

    #[error("Failed to read {kind} document: {message}")]
    Decode { kind: DocumentKind, message: String },

    #[error("Document contains too little readable text ({0} characters)")]
    TooLittleText(usize),

    #[error("Failed to open file: {0}")]
    Io(#[from] std::io::Error),
}

impl DocumentError {
    pub fn code(&self) -> &'static str {
        match self {
            DocumentError::TooLarge { .. } => "file_too_large",
            DocumentError::UnsupportedType(_) => "unsupported_type",
            DocumentError::Decode { .. } => "decode_failed",
            DocumentError::TooLittleText(_) => "text_too_short",
            DocumentError::Io(_) => "io",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Pdf,
    Docx,
    Doc,
}

impl DocumentKind {
    /// Resolves the format from the declared MIME type, falling back to the
    /// file extension when the type is missing or generic.
    pub fn detect(mime_type: Option<&str>, name: &str) -> Option<Self> {
        let by_mime = mime_type.and_then(|mime| {
            match mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase().as_str() {
                "application/pdf" => Some(DocumentKind::Pdf),
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                    Some(DocumentKind::Docx)
                }
                "application/msword" => Some(DocumentKind::Doc),
                _ => None,
            }
        });

        by_mime.or_else(|| {
            let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
            match ext.as_str() {
                "pdf" => Some(DocumentKind::Pdf),
                "docx" => Some(DocumentKind::Docx),
                "doc" => Some(DocumentKind::Doc),
                _ => None,
            }
        })
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::Docx => "DOCX",
            DocumentKind::Doc => "DOC",
        };
        f.write_str(label)
    }
}

/// File picked by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileHandle {
    pub uri: String,
    pub name: String,
    pub mime_type: Option<String>,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractedText {
    pub kind: DocumentKind,
    pub text: String,
}

/// Decodes the raw bytes of one document format into text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, DocumentError>;
}

pub struct DocumentReader {
    extractors: HashMap<DocumentKind, Arc<dyn TextExtractor>>,
}

impl Default for DocumentReader {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentReader {
    pub fn new() -> Self {
        Self::empty()
            .with_extractor(DocumentKind::Pdf, Arc::new(PdfTextExtractor))
            .with_extractor(DocumentKind::Docx, Arc::new(DocxTextExtractor))
            .with_extractor(DocumentKind::Doc, Arc::new(LegacyWordExtractor))
    }

    pub fn empty() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    /// Registers (or replaces) the extractor used for `kind`.
    pub fn with_extractor(mut self, kind: DocumentKind, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractors.insert(kind, extractor);
        self
    }

    /// Checks the declared metadata without touching any bytes.
    pub fn validate(&self, file: &FileHandle) -> Result<DocumentKind, DocumentError> {
        if file.size > MAX_FILE_BYTES {
            return Err(DocumentError::TooLarge {
                size: file.size,
                limit: MAX_FILE_BYTES,
            });
        }

        let kind = DocumentKind::detect(file.mime_type.as_deref(), &file.name).ok_or_else(|| {
            DocumentError::UnsupportedType(
                file.mime_type.clone().unwrap_or_else(|| file.name.clone()),
            )
        })?;

        if !self.extractors.contains_key(&kind) {
            return Err(DocumentError::UnsupportedType(kind.to_string()));
        }

        Ok(kind)
    }

    pub fn read_bytes(&self, file: &FileHandle, bytes: &[u8]) -> Result<ExtractedText, DocumentError> {
        let kind = self.validate(file)?;

        let actual = bytes.len() as u64;
        if actual > MAX_FILE_BYTES {
            return Err(DocumentError::TooLarge {
                size: actual,
                limit: MAX_FILE_BYTES,
            });
        }

        let extractor = self
            .extractors
            .get(&kind)
            .ok_or_else(|| DocumentError::UnsupportedType(kind.to_string()))?;

        let raw = extractor.extract(bytes)?;
        let text = clean_text(&raw);
        debug!(
            "cleaned {} text for {}: {} -> {} chars",
            kind,
            file.name,
            raw.chars().count(),
            text.chars().count()
        );

        let len = text.chars().count();
        if len < MIN_DOCUMENT_CHARS {
            return Err(DocumentError::TooLittleText(len));
        }

        info!("extracted {} characters from {} ({})", len, file.name, kind);
        Ok(ExtractedText { kind, text })
    }

    /// Loads the file behind a local path or `file://` URI and reads it.
    pub async fn read_file(&self, file: &FileHandle) -> Result<ExtractedText, DocumentError> {
        self.validate(file)?;
        let path = PathBuf::from(file.uri.strip_prefix("file://").unwrap_or(&file.uri));
        let bytes = tokio::fs::read(&path).await?;
        self.read_bytes(file, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixtureExtractor(&'static str);

    impl TextExtractor for FixtureExtractor {
        fn extract(&self, _bytes: &[u8]) -> Result<String, DocumentError> {
            Ok(self.0.to_string())
        }
    }

    const FIXTURE: &str = "Course Syllabus\r\n\r\n\r\nWeek 1:\tIntroduction to algorithms\nWeek 2:  Sorting and searching";

    fn handle(name: &str, mime: Option<&str>, size: u64) -> FileHandle {
        FileHandle {
            uri: format!("file:///tmp/{}", name),
            name: name.to_string(),
            mime_type: mime.map(str::to_string),
            size,
        }
    }

    fn fixture_reader() -> DocumentReader {
        DocumentReader::new()
            .with_extractor(DocumentKind::Pdf, Arc::new(FixtureExtractor(FIXTURE)))
    }

    #[test]
    fn detects_kind_from_mime_then_extension() {
        assert_eq!(DocumentKind::detect(Some("application/pdf"), "x.bin"), Some(DocumentKind::Pdf));
        assert_eq!(
            DocumentKind::detect(Some("application/octet-stream"), "notes.DOCX"),
            Some(DocumentKind::Docx)
        );
        assert_eq!(DocumentKind::detect(None, "old.doc"), Some(DocumentKind::Doc));
        assert_eq!(DocumentKind::detect(Some("image/png"), "scan.png"), None);
    }

    #[test]
    fn rejects_oversized_declared_size() {
        let reader = fixture_reader();
        let err = reader
            .read_bytes(&handle("big.pdf", Some("application/pdf"), MAX_FILE_BYTES + 1), b"%PDF")
            .unwrap_err();
        assert!(matches!(err, DocumentError::TooLarge { .. }));
    }

    #[test]
    fn rejects_types_outside_allow_list() {
        let reader = fixture_reader();
        let err = reader
            .read_bytes(&handle("slides.pptx", None, 10), b"data")
            .unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedType(_)));
    }

    #[test]
    fn substituted_extractor_output_is_cleaned() {
        let reader = fixture_reader();
        let text = reader
            .read_bytes(&handle("syllabus.pdf", Some("application/pdf"), 4), b"%PDF")
            .expect("fixture should be readable");
        assert_eq!(text.kind, DocumentKind::Pdf);
        assert_eq!(
            text.text,
            "Course Syllabus\n\nWeek 1: Introduction to algorithms\nWeek 2: Sorting and searching"
        );
    }

    #[test]
    fn rejects_documents_with_too_little_text() {
        let reader = DocumentReader::new()
            .with_extractor(DocumentKind::Docx, Arc::new(FixtureExtractor("  tiny  ")));
        let err = reader
            .read_bytes(&handle("a.docx", None, 4), b"PK..")
            .unwrap_err();
        assert!(matches!(err, DocumentError::TooLittleText(4)));
    }

    #[tokio::test]
    async fn read_file_reports_missing_path() {
        let reader = fixture_reader();
        let file = FileHandle {
            uri: "file:///definitely/not/here/syllabus.pdf".to_string(),
            name: "syllabus.pdf".to_string(),
            mime_type: Some("application/pdf".to_string()),
            size: 10,
        };
        let err = reader.read_file(&file).await.unwrap_err();
        assert!(matches!(err, DocumentError::Io(_)));
    }
}
