use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::error::LoadError;
use crate::pdf::{PdfExtractor, PdfProcessor};

/// Container formats text can be loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    Txt,
    Pdf,
}

impl DocumentType {
    /// Infer the type from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        extension.parse()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Pdf => "pdf",
        }
    }
}

impl FromStr for DocumentType {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "txt" => Ok(Self::Txt),
            "pdf" => Ok(Self::Pdf),
            other => Err(LoadError::UnsupportedType(other.to_string())),
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads the text content of a document.
pub trait DocumentLoader {
    /// Load the text of `path` as a document of type `doc_type`.
    fn load(&self, path: &Path, doc_type: DocumentType) -> Result<String, LoadError>;

    /// Load with a type given by name; unknown names fail before any read.
    fn load_declared(&self, path: &Path, declared: &str) -> Result<String, LoadError> {
        let doc_type = declared.parse()?;
        self.load(path, doc_type)
    }
}

/// Loads documents from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDocumentLoader;

impl FsDocumentLoader {
    pub fn new() -> Self {
        Self
    }

    fn read(path: &Path) -> Result<Vec<u8>, LoadError> {
        fs::read(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl DocumentLoader for FsDocumentLoader {
    fn load(&self, path: &Path, doc_type: DocumentType) -> Result<String, LoadError> {
        let data = Self::read(path)?;
        debug!("Read {} bytes from {} as {}", data.len(), path.display(), doc_type);

        match doc_type {
            DocumentType::Txt => String::from_utf8(data).map_err(|e| LoadError::Decode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }),
            DocumentType::Pdf => {
                let pdf_error = |source| LoadError::Pdf {
                    path: path.to_path_buf(),
                    source,
                };
                let mut extractor = PdfExtractor::new();
                extractor.load(&data).map_err(pdf_error)?;
                debug!("PDF has {} pages", extractor.page_count());
                extractor.extract_text().map_err(pdf_error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_document_type_parsing() {
        assert_eq!("txt".parse::<DocumentType>().unwrap(), DocumentType::Txt);
        assert_eq!(" PDF ".parse::<DocumentType>().unwrap(), DocumentType::Pdf);
        assert!(matches!(
            "docx".parse::<DocumentType>(),
            Err(LoadError::UnsupportedType(t)) if t == "docx"
        ));
    }

    #[test]
    fn test_document_type_from_path() {
        assert_eq!(
            DocumentType::from_path(Path::new("a/b/rechnung.PDF")).unwrap(),
            DocumentType::Pdf
        );
        assert!(DocumentType::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_load_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.txt");
        std::fs::write(&path, "Total: €150,00").unwrap();

        let text = FsDocumentLoader::new().load(&path, DocumentType::Txt).unwrap();
        assert_eq!(text, "Total: €150,00");
    }

    #[test]
    fn test_load_declared_unsupported_type_skips_read() {
        let err = FsDocumentLoader::new()
            .load_declared(Path::new("/does/not/exist.xls"), "xls")
            .unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedType(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = FsDocumentLoader::new()
            .load(Path::new("/does/not/exist.txt"), DocumentType::Txt)
            .unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }

    #[test]
    fn test_load_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.txt");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let err = FsDocumentLoader::new().load(&path, DocumentType::Txt).unwrap_err();
        assert!(matches!(err, LoadError::Decode { .. }));
    }

    #[test]
    fn test_load_broken_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, "%PDF-1.4 truncated").unwrap();

        let err = FsDocumentLoader::new().load(&path, DocumentType::Pdf).unwrap_err();
        assert!(matches!(err, LoadError::Pdf { .. }));
    }
}
