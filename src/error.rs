use std::path::PathBuf;

use thiserror::Error;

/// The central error type for all operations in imgutil.
#[derive(Error, Debug)]
pub enum ImgUtilError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Bad buffer: {0}")]
    BadBuffer(String),

    #[error("Failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ImgUtilError {
    pub(crate) fn decode(op: &str, err: impl std::fmt::Display) -> Self {
        ImgUtilError::Decode(format!("{op}: {err}"))
    }

    pub(crate) fn encode(op: &str, err: impl std::fmt::Display) -> Self {
        ImgUtilError::Encode(format!("{op}: {err}"))
    }

    pub(crate) fn bad_buffer(op: &str) -> Self {
        ImgUtilError::BadBuffer(op.to_string())
    }
}

// Manually implement PartialEq for ImgUtilError
impl PartialEq for ImgUtilError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ImgUtilError::Decode(s1), ImgUtilError::Decode(s2)) => s1 == s2,
            (ImgUtilError::Encode(s1), ImgUtilError::Encode(s2)) => s1 == s2,
            (ImgUtilError::BadBuffer(s1), ImgUtilError::BadBuffer(s2)) => s1 == s2,
            // io::Error has no PartialEq; the failing path is what identifies the error.
            (ImgUtilError::Open { path: p1, .. }, ImgUtilError::Open { path: p2, .. }) => p1 == p2,
            (ImgUtilError::Create { path: p1, .. }, ImgUtilError::Create { path: p2, .. }) => {
                p1 == p2
            }
            _ => false,
        }
    }
}

/// A centralized result type for our library.
pub type Result<T> = std::result::Result<T, ImgUtilError>;
