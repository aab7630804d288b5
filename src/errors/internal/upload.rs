use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Failed to write upload {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove upload {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read upload directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Rejected upload: {0}")]
    Rejected(String),
}
