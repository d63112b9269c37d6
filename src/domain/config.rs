use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

/// Configuration for a logbook.
///
/// This struct holds settings that control how drafts are autosaved and
/// where the logbook state is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// How long the form must be left untouched before it is autosaved, in
    /// milliseconds.
    autosave_delay_ms: u64,

    /// The key the logbook snapshot is stored under.
    ///
    /// Two logbooks sharing a storage directory but using different keys do
    /// not see each other's data.
    storage_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            autosave_delay_ms: default_autosave_delay_ms(),
            storage_key: default_storage_key(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Loads the configuration from `root/config.toml`, falling back to the
    /// defaults if the file is missing or invalid.
    #[must_use]
    pub fn load_or_default(root: &Path) -> Self {
        let path = root.join("config.toml");
        Self::load(&path).unwrap_or_else(|e| {
            tracing::debug!("Failed to load config: {e}");
            Self::default()
        })
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// The quiescence window used by the autosave scheduler.
    #[must_use]
    pub const fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    /// Sets the quiescence window used by the autosave scheduler.
    pub fn set_autosave_delay(&mut self, delay: Duration) {
        self.autosave_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
    }

    /// The key the logbook snapshot is stored under.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Sets the key the logbook snapshot is stored under.
    pub fn set_storage_key(&mut self, key: impl Into<String>) {
        self.storage_key = key.into();
    }
}

const fn default_autosave_delay_ms() -> u64 {
    400
}

fn default_storage_key() -> String {
    "service-logbook".to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_autosave_delay_ms")]
        autosave_delay_ms: u64,

        #[serde(default = "default_storage_key")]
        storage_key: String,
    },
}

impl From<Versions> for super::Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                autosave_delay_ms,
                storage_key,
            } => Self {
                autosave_delay_ms,
                storage_key,
            },
        }
    }
}

impl From<super::Config> for Versions {
    fn from(config: super::Config) -> Self {
        Self::V1 {
            autosave_delay_ms: config.autosave_delay_ms,
            storage_key: config.storage_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nautosave_delay_ms = 250\nstorage_key = \"fleet\"\n")
            .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.autosave_delay(), Duration::from_millis(250));
        assert_eq!(config.storage_key(), "fleet");
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nautosave_delay_ms = \"soon\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
        assert_eq!(actual.autosave_delay(), Duration::from_millis(400));
    }

    #[test]
    fn missing_config_falls_back_to_default() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(Config::load_or_default(tmp.path()), Config::default());
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");

        let mut config = Config::default();
        config.set_autosave_delay(Duration::from_secs(1));
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
