use std::fmt;

use chrono::{DateTime, Utc};

/// Identifier handed out at intake. Never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Scientific,
    General,
}

impl Category {
    /// Classifies a document from its file name alone.
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("research") || lower.contains("study") {
            Category::Scientific
        } else {
            Category::General
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Scientific => "scientific",
            Category::General => "general",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentStatus {
    #[default]
    Uploading,
    Processing,
    Completed,
    Error,
}

/// A raw file offered at intake: name and size, contents stay opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub byte_size: u64,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, byte_size: u64) -> Self {
        Self {
            name: name.into(),
            byte_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    id: DocumentId,
    name: String,
    category: Category,
    size_label: String,
    received_at: DateTime<Utc>,
    pub(crate) status: DocumentStatus,
    pub(crate) progress: u8,
    pub(crate) summary: Option<String>,
    pub(crate) failure: Option<String>,
}

impl Document {
    /// Creates a freshly received document at `Uploading`, progress 0.
    pub fn new(id: DocumentId, file: &CandidateFile, received_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: file.name.clone(),
            category: Category::from_name(&file.name),
            size_label: size_label(file.byte_size),
            received_at,
            status: DocumentStatus::Uploading,
            progress: 0,
            summary: None,
            failure: None,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn size_label(&self) -> &str {
        &self.size_label
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    /// Upload progress; only meaningful while uploading.
    pub fn progress(&self) -> Option<u8> {
        (self.status == DocumentStatus::Uploading).then_some(self.progress)
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn is_uploading(&self) -> bool {
        self.status == DocumentStatus::Uploading
    }
}

/// Formats a byte count as mebibytes with one decimal, e.g. `2.5 MB`.
pub fn size_label(byte_size: u64) -> String {
    let mib = byte_size as f64 / (1024.0 * 1024.0);
    format!("{mib:.1} MB")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_matches_case_insensitively() {
        assert_eq!(Category::from_name("Research_Notes.pdf"), Category::Scientific);
        assert_eq!(Category::from_name("CASE-STUDY.docx"), Category::Scientific);
        assert_eq!(Category::from_name("report.pdf"), Category::General);
    }

    #[test]
    fn size_label_uses_one_decimal_mebibytes() {
        assert_eq!(size_label(0), "0.0 MB");
        assert_eq!(size_label(1024 * 1024), "1.0 MB");
        assert_eq!(size_label(5 * 512 * 1024), "2.5 MB");
    }

    #[test]
    fn progress_is_hidden_once_upload_is_over() {
        let file = CandidateFile::new("a.pdf", 10);
        let mut doc = Document::new(DocumentId(1), &file, Utc::now());
        assert_eq!(doc.progress(), Some(0));
        doc.status = DocumentStatus::Processing;
        assert_eq!(doc.progress(), None);
    }
}
