use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub loregraph: LoregraphConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub http_server: HttpServerConfig,
}

/// Core configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoregraphConfig {
    pub db_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Graph discovery limits and bootstrap allow-list.
/// The caps exist to bound list traversals per expansion; fuzzy matching can
/// otherwise pull in very large unit/pilot sets for major factions.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    /// Max units surfaced per faction expansion.
    #[serde(default = "default_unit_limit")]
    pub unit_limit: usize,
    /// Max hostile individuals surfaced per rival faction.
    #[serde(default = "default_hostile_limit")]
    pub hostile_limit: usize,
    /// Faction names seeding an empty graph (roots).
    #[serde(default = "default_root_factions")]
    pub root_factions: Vec<String>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            unit_limit: default_unit_limit(),
            hostile_limit: default_hostile_limit(),
            root_factions: default_root_factions(),
        }
    }
}

fn default_unit_limit() -> usize {
    15
}

fn default_hostile_limit() -> usize {
    5
}

fn default_root_factions() -> Vec<String> {
    [
        "Earth Federation",
        "Principality of Zeon",
        "Titans",
        "AEUG",
        "ZAFT",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_http_port")]
    pub port: u16,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            port: default_http_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

fn default_http_port() -> u16 {
    8080
}

fn default_allowed_origins() -> Vec<String> {
    // Default empty — set allowed_origins in config.toml for production
    vec![]
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in LOREGRAPH_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // Load .env file if it exists (ignore errors - file is optional)
        let _ = dotenv::dotenv();

        let config_path = std::env::var("LOREGRAPH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .context("Failed to parse config.toml")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.graph.unit_limit == 0 {
            anyhow::bail!("graph.unit_limit must be greater than 0");
        }

        if self.graph.hostile_limit == 0 {
            anyhow::bail!("graph.hostile_limit must be greater than 0");
        }

        if self.graph.root_factions.is_empty() {
            anyhow::bail!(
                "graph.root_factions must name at least one faction, or the graph can never bootstrap"
            );
        }

        Ok(())
    }

    /// Get database path
    pub fn db_path(&self) -> &Path {
        &self.loregraph.db_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide cwd and env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn create_test_config() -> String {
        r#"
[loregraph]
db_path = "./test.db"
log_level = "debug"

[graph]
unit_limit = 10
hostile_limit = 3
root_factions = ["Earth Federation", "Principality of Zeon"]

[http_server]
port = 8090
"#
        .to_string()
    }

    /// Restores cwd when dropped (e.g. on panic).
    struct CwdGuard(std::path::PathBuf);
    impl Drop for CwdGuard {
        fn drop(&mut self) {
            let _ = std::env::set_current_dir(&self.0);
        }
    }

    fn with_config_env(config_path: &std::path::Path, f: impl FnOnce()) {
        let original_config = std::env::var("LOREGRAPH_CONFIG").ok();
        std::env::set_var("LOREGRAPH_CONFIG", config_path.to_str().unwrap());
        f();
        std::env::remove_var("LOREGRAPH_CONFIG");
        if let Some(val) = original_config {
            std::env::set_var("LOREGRAPH_CONFIG", val);
        }
    }

    #[test]
    fn test_config_load_success() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, create_test_config()).unwrap();
        let config_path = config_path.canonicalize().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        let _cwd = CwdGuard(original_dir.clone());
        std::env::set_current_dir(temp_dir.path()).unwrap();
        with_config_env(&config_path, || {
            let config = Config::load();
            assert!(config.is_ok(), "Config::load() failed: {:?}", config.err());
            let config = config.unwrap();
            assert_eq!(config.loregraph.log_level, "debug");
            assert_eq!(config.graph.unit_limit, 10);
            assert_eq!(config.graph.hostile_limit, 3);
            assert_eq!(config.http_server.port, 8090);
            assert_eq!(config.graph.root_factions.len(), 2);
        });
    }

    #[test]
    fn test_config_defaults_applied() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            "[loregraph]\ndb_path = \"./test.db\"\n",
        )
        .unwrap();
        let config_path = config_path.canonicalize().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        let _cwd = CwdGuard(original_dir.clone());
        std::env::set_current_dir(temp_dir.path()).unwrap();
        with_config_env(&config_path, || {
            let config = Config::load().unwrap();
            assert_eq!(config.loregraph.log_level, "info");
            assert_eq!(config.graph.unit_limit, 15);
            assert_eq!(config.graph.hostile_limit, 5);
            assert!(!config.graph.root_factions.is_empty());
            assert_eq!(config.http_server.port, 8080);
            assert!(config.http_server.allowed_origins.is_empty());
        });
    }

    #[test]
    fn test_config_rejects_zero_limits() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            "[loregraph]\ndb_path = \"./test.db\"\n\n[graph]\nunit_limit = 0\n",
        )
        .unwrap();
        let config_path = config_path.canonicalize().unwrap();
        with_config_env(&config_path, || {
            let config = Config::load();
            assert!(config.is_err());
            assert!(config.unwrap_err().to_string().contains("unit_limit"));
        });
    }

    #[test]
    fn test_config_invalid_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let original = std::env::var("LOREGRAPH_CONFIG").ok();
        std::env::set_var("LOREGRAPH_CONFIG", "nonexistent.toml");
        let config = Config::load();
        assert!(config.is_err());
        std::env::remove_var("LOREGRAPH_CONFIG");
        if let Some(v) = original {
            std::env::set_var("LOREGRAPH_CONFIG", v);
        }
    }
}
