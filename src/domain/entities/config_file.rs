//! ConfigFile entity - one file of the configuration tree
//!
//! Parsing happens once, when the file is constructed. A file that fails to
//! parse still exists in the tree; the validator turns the stored failure into
//! a `Malformed` error.

use std::path::Path;

use super::document::{Document, ParseFailure};
use super::reference::Reference;
use crate::domain::value_objects::Fingerprint;

/// How the content of a file is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
    /// Anything else (templates, images, python scripts) - synced byte for byte
    Opaque,
}

impl FileFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &str) -> Self {
        match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => FileFormat::Yaml,
            Some("json") => FileFormat::Json,
            _ => FileFormat::Opaque,
        }
    }

    pub fn is_structured(&self) -> bool {
        !matches!(self, FileFormat::Opaque)
    }
}

/// Result of parsing a file
#[derive(Debug, Clone, PartialEq)]
pub enum ParseState {
    Parsed(Document),
    Malformed(ParseFailure),
    NotStructured,
}

/// A single file of the configuration tree
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: String,
    content: Vec<u8>,
    format: FileFormat,
    fingerprint: Fingerprint,
    parse: ParseState,
    references: Vec<Reference>,
}

impl ConfigFile {
    /// Create a file, detecting its format from the extension
    pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let path = path.into();
        let format = FileFormat::from_path(&path);
        Self::with_format(path, content, format)
    }

    /// Create a file with an explicit format
    pub fn with_format(
        path: impl Into<String>,
        content: impl Into<Vec<u8>>,
        format: FileFormat,
    ) -> Self {
        let path = path.into();
        let content = content.into();
        let fingerprint = Fingerprint::from_bytes(&content);

        let (parse, references) = match format {
            FileFormat::Opaque => (ParseState::NotStructured, Vec::new()),
            FileFormat::Yaml | FileFormat::Json => match std::str::from_utf8(&content) {
                Err(e) => (
                    ParseState::Malformed(ParseFailure {
                        message: format!("file is not valid UTF-8: {}", e),
                        line: None,
                        column: None,
                    }),
                    Vec::new(),
                ),
                Ok(text) => {
                    let parsed = if format == FileFormat::Yaml {
                        Document::parse_yaml(text)
                    } else {
                        Document::parse_json(text)
                    };
                    match parsed {
                        Ok(doc) => {
                            let refs = doc.references(text);
                            (ParseState::Parsed(doc), refs)
                        }
                        Err(failure) => (ParseState::Malformed(failure), Vec::new()),
                    }
                }
            },
        };

        Self {
            path,
            content,
            format,
            fingerprint,
            parse,
            references,
        }
    }

    /// Re-interpret the file with another format (same content)
    pub fn into_format(self, format: FileFormat) -> Self {
        if self.format == format {
            return self;
        }
        Self::with_format(self.path, self.content, format)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Content as text, if it is valid UTF-8
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn parse_state(&self) -> &ParseState {
        &self.parse
    }

    pub fn document(&self) -> Option<&Document> {
        match &self.parse {
            ParseState::Parsed(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self.parse, ParseState::Malformed(_))
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }
}
