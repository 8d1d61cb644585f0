use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Single append-only CSV file shared by every user.
    Csv,
    /// Per-user document collections with update and delete.
    Document,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub csv_path: PathBuf,
    /// JSON snapshot for the document backend; in-memory only when unset.
    #[serde(default)]
    pub document_path: Option<PathBuf>,
    pub app_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub allow_anonymous: bool,
    /// Sign-in token -> user id.
    #[serde(default)]
    pub tokens: HashMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
            },
            storage: StorageConfig {
                backend: StorageBackend::Csv,
                csv_path: PathBuf::from("trading_journal.csv"),
                document_path: None,
                app_id: "default-app-id".to_string(),
            },
            auth: AuthConfig {
                allow_anonymous: true,
                tokens: HashMap::new(),
            },
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
