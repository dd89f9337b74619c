use std::io;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid file name: {name}")]
    InvalidName { name: String },

    #[error("File not found")]
    NotFound,

    #[error("Required fields are missing!")]
    MissingFile,

    #[error("Upload interrupted before completion: {source}")]
    UploadIncomplete {
        #[source]
        source: BoxError,
    },

    #[error("Upload exceeds the maximum size of {limit} bytes")]
    UploadTooLarge { limit: u64 },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] io::Error),
}

impl StoreError {
    pub(crate) fn invalid_name(name: &str) -> Self {
        StoreError::InvalidName {
            name: name.to_string(),
        }
    }

    pub(crate) fn incomplete<E: Into<BoxError>>(err: E) -> Self {
        StoreError::UploadIncomplete { source: err.into() }
    }

    /// True for failures caused by the caller's input rather than the storage.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidName { .. }
                | StoreError::NotFound
                | StoreError::MissingFile
                | StoreError::UploadTooLarge { .. }
        )
    }
}
