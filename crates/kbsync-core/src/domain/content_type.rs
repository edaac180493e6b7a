//! Payload file typing
//!
//! The catalog requires every upload to carry a declared file type. The
//! [`ExtensionContentTyper`] derives it from the file name's extension and
//! cross-checks it against the MIME type of a data-URI payload, when one is
//! present. Byte-level sniffing is left to other [`IContentTyper`]
//! implementations.
//!
//! [`IContentTyper`]: crate::ports::IContentTyper

use std::fmt::{self, Display, Formatter};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use super::errors::DomainError;
use super::external_file::ExternalFile;
use crate::ports::IContentTyper;

/// File types accepted by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Text,
    Markdown,
    Pdf,
    Html,
    Docx,
    Doc,
    Pptx,
    Ppt,
    Xlsx,
    Xls,
    Csv,
}

impl FileType {
    /// Maps a lower- or upper-case file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ty = match ext.to_ascii_lowercase().as_str() {
            "txt" | "text" => Self::Text,
            "md" | "markdown" => Self::Markdown,
            "pdf" => Self::Pdf,
            "html" | "htm" => Self::Html,
            "docx" => Self::Docx,
            "doc" => Self::Doc,
            "pptx" => Self::Pptx,
            "ppt" => Self::Ppt,
            "xlsx" => Self::Xlsx,
            "xls" => Self::Xls,
            "csv" => Self::Csv,
            _ => return None,
        };
        Some(ty)
    }

    /// Maps a MIME type (parameters such as `; charset=` are ignored)
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        let ty = match essence {
            "text/plain" => Self::Text,
            "text/markdown" => Self::Markdown,
            "application/pdf" => Self::Pdf,
            "text/html" => Self::Html,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Self::Docx
            }
            "application/msword" => Self::Doc,
            "application/vnd.openxmlformats-officedocument.presentationml.presentation" => {
                Self::Pptx
            }
            "application/vnd.ms-powerpoint" => Self::Ppt,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => Self::Xlsx,
            "application/vnd.ms-excel" => Self::Xls,
            "text/csv" => Self::Csv,
            _ => return None,
        };
        Some(ty)
    }

    /// Wire name used by the catalog service
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            Self::Text => "FILE_TYPE_TEXT",
            Self::Markdown => "FILE_TYPE_MARKDOWN",
            Self::Pdf => "FILE_TYPE_PDF",
            Self::Html => "FILE_TYPE_HTML",
            Self::Docx => "FILE_TYPE_DOCX",
            Self::Doc => "FILE_TYPE_DOC",
            Self::Pptx => "FILE_TYPE_PPTX",
            Self::Ppt => "FILE_TYPE_PPT",
            Self::Xlsx => "FILE_TYPE_XLSX",
            Self::Xls => "FILE_TYPE_XLS",
            Self::Csv => "FILE_TYPE_CSV",
        }
    }
}

impl Display for FileType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire_str())
    }
}

/// Types payloads by file-name extension
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionContentTyper;

impl IContentTyper for ExtensionContentTyper {
    fn file_type(&self, file: &ExternalFile) -> Result<FileType, DomainError> {
        let ext = file
            .name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
            .ok_or_else(|| {
                DomainError::UntypableContent(format!("no extension in name '{}'", file.name))
            })?;

        let from_name = FileType::from_extension(ext).ok_or_else(|| {
            DomainError::UntypableContent(format!("unsupported extension '{ext}'"))
        })?;

        if let Some(mime) = file.content_mime() {
            match FileType::from_mime(mime) {
                Some(from_content) if from_content != from_name => {
                    return Err(DomainError::UntypableContent(format!(
                        "file type mismatch: name says {from_name}, content says {from_content}"
                    )));
                }
                Some(_) | None => {}
            }
        }

        STANDARD.decode(file.content_base64()).map_err(|e| {
            DomainError::UntypableContent(format!("content is not valid base64: {e}"))
        })?;

        Ok(from_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, content: &str) -> ExternalFile {
        ExternalFile {
            id: "f1".to_string(),
            name: name.to_string(),
            content: content.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_type_from_extension() {
        let typer = ExtensionContentTyper;
        assert_eq!(
            typer.file_type(&file("report.pdf", "dGVzdDEyMw==")).unwrap(),
            FileType::Pdf
        );
        assert_eq!(
            typer.file_type(&file("Notes.MD", "dGVzdDEyMw==")).unwrap(),
            FileType::Markdown
        );
        assert_eq!(
            typer.file_type(&file("archive.v2.csv", "")).unwrap(),
            FileType::Csv
        );
    }

    #[test]
    fn test_missing_or_unknown_extension() {
        let typer = ExtensionContentTyper;
        assert!(matches!(
            typer.file_type(&file("README", "dGVzdA==")),
            Err(DomainError::UntypableContent(_))
        ));
        assert!(matches!(
            typer.file_type(&file("photo.jpeg", "dGVzdA==")),
            Err(DomainError::UntypableContent(_))
        ));
    }

    #[test]
    fn test_data_uri_must_agree_with_name() {
        let typer = ExtensionContentTyper;
        assert_eq!(
            typer
                .file_type(&file("a.pdf", "data:application/pdf;base64,dGVzdA=="))
                .unwrap(),
            FileType::Pdf
        );
        assert!(typer
            .file_type(&file("a.pdf", "data:text/csv;base64,dGVzdA=="))
            .is_err());
    }

    #[test]
    fn test_unknown_data_uri_mime_falls_back_to_name() {
        let typer = ExtensionContentTyper;
        assert_eq!(
            typer
                .file_type(&file("a.txt", "data:application/octet-stream;base64,dGVzdA=="))
                .unwrap(),
            FileType::Text
        );
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let typer = ExtensionContentTyper;
        let err = typer.file_type(&file("a.pdf", "not base64!!")).unwrap_err();
        assert!(err.to_string().contains("base64"));
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(FileType::Pdf.to_string(), "FILE_TYPE_PDF");
        assert_eq!(FileType::Docx.as_wire_str(), "FILE_TYPE_DOCX");
        assert_eq!(
            FileType::from_mime("text/plain; charset=utf-8"),
            Some(FileType::Text)
        );
    }
}
