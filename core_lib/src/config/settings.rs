use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::files::{FileStoreConfig, DEFAULT_FILE_MODE};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub files: FileConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub upload_path: PathBuf,
    /// Zero disables the limit.
    pub max_upload_size_mb: u64,
    /// Permission bits of published files, e.g. 420 (0o644).
    pub file_mode: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            files: FileConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            upload_path: PathBuf::from("./uploads"),
            max_upload_size_mb: 200,
            file_mode: DEFAULT_FILE_MODE,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
        }
    }
}

impl FileConfig {
    pub fn store_config(&self) -> FileStoreConfig {
        let config = FileStoreConfig::new(&self.upload_path).with_file_mode(self.file_mode);

        if self.max_upload_size_mb == 0 {
            config
        } else {
            config.with_max_upload_bytes(self.max_upload_size_mb * 1024 * 1024)
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?);

        if std::path::Path::new("config.toml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder.add_source(
            Environment::with_prefix("FILESTORE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port cannot be 0".to_string()));
        }

        if self.server.host.is_empty() {
            return Err(ConfigError::Message("Server host cannot be empty".to_string()));
        }

        if self.files.upload_path.as_os_str().is_empty() {
            return Err(ConfigError::Message(
                "Upload path cannot be empty".to_string(),
            ));
        }

        if self.files.file_mode > 0o777 {
            return Err(ConfigError::Message(format!(
                "File mode {:o} has bits outside 0o777",
                self.files.file_mode
            )));
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.files.upload_path, PathBuf::from("./uploads"));
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();

        config.server.port = 0;
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.files.upload_path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bind_address() {
        let mut config = AppConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:3000");

        config.server.host = "0.0.0.0".to_string();
        config.server.port = 8080;
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_store_config_limit() {
        let mut files = FileConfig::default();
        assert_eq!(files.store_config().max_upload_bytes, Some(200 * 1024 * 1024));

        files.max_upload_size_mb = 0;
        assert_eq!(files.store_config().max_upload_bytes, None);
        assert_eq!(files.store_config().root, PathBuf::from("./uploads"));
        assert_eq!(files.store_config().file_mode, 0o644);
    }

    #[test]
    fn test_file_mode_validation() {
        let mut config = AppConfig::default();
        config.files.file_mode = 0o640;
        assert!(config.validate().is_ok());

        config.files.file_mode = 0o4755;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_loading() {
        let config = AppConfig::load().expect("Should load default configuration");

        assert!(config.validate().is_ok());
        assert!(!config.server.host.is_empty());
        assert!(config.server.port > 0);
    }
}
