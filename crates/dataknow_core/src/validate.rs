use std::fmt;

use crate::limits::{MAX_FILES, MAX_FILE_SIZE, SUPPORTED_EXTENSIONS};
use crate::CandidateFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    FileCountExceeded,
    SizeExceeded,
    UnsupportedFormat,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::FileCountExceeded => {
                write!(f, "at most {MAX_FILES} documents can be loaded")
            }
            RejectionReason::SizeExceeded => write!(f, "file exceeds the 100 MB limit"),
            RejectionReason::UnsupportedFormat => write!(f, "unsupported file format"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted,
    Rejected(RejectionReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub file_name: String,
    pub reason: RejectionReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    pub accepted: Vec<CandidateFile>,
    pub rejections: Vec<Rejection>,
}

impl ValidationReport {
    /// The only reason shown to the user for a batch.
    pub fn first_reason(&self) -> Option<RejectionReason> {
        self.rejections.first().map(|rejection| rejection.reason)
    }
}

/// Splits a batch into accepted files and rejections, in input order.
///
/// A rejection only affects its own candidate; later candidates are still checked.
pub fn validate(candidates: &[CandidateFile], current_count: usize) -> ValidationReport {
    let mut report = ValidationReport::default();
    for candidate in candidates {
        match check(candidate, current_count + report.accepted.len()) {
            ValidationOutcome::Accepted => report.accepted.push(candidate.clone()),
            ValidationOutcome::Rejected(reason) => report.rejections.push(Rejection {
                file_name: candidate.name.clone(),
                reason,
            }),
        }
    }
    report
}

/// Checks a single candidate against a registry that already holds `occupied` documents.
pub fn check(candidate: &CandidateFile, occupied: usize) -> ValidationOutcome {
    if occupied >= MAX_FILES {
        ValidationOutcome::Rejected(RejectionReason::FileCountExceeded)
    } else if candidate.byte_size > MAX_FILE_SIZE {
        ValidationOutcome::Rejected(RejectionReason::SizeExceeded)
    } else if !is_supported(&candidate.name) {
        ValidationOutcome::Rejected(RejectionReason::UnsupportedFormat)
    } else {
        ValidationOutcome::Accepted
    }
}

fn is_supported(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_check_ignores_case_and_requires_a_dot() {
        assert!(is_supported("report.PDF"));
        assert!(is_supported("archive.tar.csv"));
        assert!(!is_supported("pdf"));
        assert!(!is_supported("notes.md"));
        assert!(!is_supported("notes."));
    }
}
