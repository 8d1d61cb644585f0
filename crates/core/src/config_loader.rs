use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/Config.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration by layering built-in defaults, the TOML file at
    /// `path`, and `JOURNAL_`-prefixed environment variables.
    ///
    /// A missing file is not an error; nested keys use `__` in variable
    /// names, e.g. `JOURNAL_SERVER__PORT=8080`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("JOURNAL_").split("__"))
            .extract()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageBackend;
    use figment::Jail;

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::load_from("missing.toml").unwrap();
            assert_eq!(config.server.port, 5000);
            assert_eq!(config.storage.backend, StorageBackend::Csv);
            assert!(config.auth.allow_anonymous);
            Ok(())
        });
    }

    #[test]
    fn test_file_and_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "Config.toml",
                r#"
                [server]
                host = "0.0.0.0"
                port = 8000

                [storage]
                backend = "document"
                csv_path = "journal.csv"
                app_id = "journal-app"

                [auth]
                allow_anonymous = false

                [auth.tokens]
                secret-token = "alice"
                "#,
            )?;
            jail.set_env("JOURNAL_SERVER__PORT", "9000");

            let config = ConfigLoader::load_from("Config.toml").unwrap();
            assert_eq!(config.server.host, "0.0.0.0");
            assert_eq!(config.server.port, 9000);
            assert_eq!(config.storage.backend, StorageBackend::Document);
            assert_eq!(config.storage.app_id, "journal-app");
            assert!(!config.auth.allow_anonymous);
            assert_eq!(
                config.auth.tokens.get("secret-token").map(String::as_str),
                Some("alice")
            );
            Ok(())
        });
    }
}
