pub mod error;
pub mod models;
pub mod naming;
pub mod store;

pub use error::StoreError;
pub use models::{StorageStats, StoredFile};
pub use naming::{sanitize_file_name, validate_file_name};
pub use store::{FileStore, FileStoreConfig, DEFAULT_FILE_MODE};
