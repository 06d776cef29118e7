use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "planserver.toml";
pub const ENV_PREFIX: &str = "PLANSERVER_";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    /// Capacity of the broadcast channel feeding real-time subscribers.
    pub notification_buffer: usize,
    /// Empty means any origin is accepted.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "planserver.db".to_string(),
            max_connections: 8,
            host: "0.0.0.0".to_string(),
            port: 8080,
            notification_buffer: 256,
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Defaults, then `planserver.toml`, then `PLANSERVER_*` variables.
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment(CONFIG_FILE).extract()
    }

    pub fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_sources() {
        let config: AppConfig = AppConfig::figment("does-not-exist.toml")
            .extract()
            .unwrap();
        assert_eq!(config.max_connections, 8);
        assert!(config.notification_buffer > 0);
        assert!(config.cors_allowed_origins.is_empty());
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planserver.toml");
        std::fs::write(&path, "port = 9191\ndatabase_url = \"other.db\"\n").unwrap();

        let config: AppConfig = AppConfig::figment(path.to_str().unwrap())
            .extract()
            .unwrap();
        assert_eq!(config.port, 9191);
        assert_eq!(config.database_url, "other.db");
        assert_eq!(config.bind_address(), "0.0.0.0:9191");
    }
}
