use mime_guess::mime::{self, Mime};
use serde::Serialize;
use std::fmt;

use crate::common::FileDescriptor;
use crate::config::DEFAULT_MAX_FILE_SIZE_BYTES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    NotAVideo,
    TooLarge,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::NotAVideo => write!(f, "file is not a video"),
            RejectionReason::TooLarge => write!(f, "file exceeds the size limit"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted,
    Rejected(RejectionReason),
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted)
    }
}

/// Admission check run before a file may enter the analysis pipeline.
/// Pure: it never notifies anyone, the caller reports rejections.
#[derive(Debug, Clone)]
pub struct IntakeValidator {
    max_size_bytes: u64,
}

impl Default for IntakeValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE_BYTES)
    }
}

impl IntakeValidator {
    pub fn new(max_size_bytes: u64) -> Self {
        Self { max_size_bytes }
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    // Size wins over type: an oversized PDF reports TooLarge.
    pub fn validate(&self, file: &FileDescriptor) -> ValidationOutcome {
        if file.size_bytes() > self.max_size_bytes {
            return ValidationOutcome::Rejected(RejectionReason::TooLarge);
        }
        if !is_video_mime(file.mime_type()) {
            return ValidationOutcome::Rejected(RejectionReason::NotAVideo);
        }
        ValidationOutcome::Accepted
    }
}

fn is_video_mime(mime_type: &str) -> bool {
    match mime_type.trim().parse::<Mime>() {
        Ok(parsed) => {
            let subtype = parsed.subtype();
            parsed.type_() == mime::VIDEO && subtype != mime::STAR && !subtype.as_str().is_empty()
        }
        Err(_) => false,
    }
}
