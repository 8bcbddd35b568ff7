//! Application configuration.
//!
//! Loaded once at startup from a TOML file. The known keys deserialize into
//! [`Config`]; the whole document is also kept so arbitrary settings can be
//! read by dot path:
//!
//! ```rust
//! use pico::Config;
//!
//! let config = Config::from_toml(r#"
//!     debug = false
//!
//!     [db]
//!     host = "127.0.0.1"
//!     port = 3306
//! "#).unwrap();
//!
//! assert!(!config.debug);
//! assert_eq!(config.get("db.host").and_then(|v| v.as_str()), Some("127.0.0.1"));
//! assert_eq!(config.get_or("db.user", "root"), "root");
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Root configuration. Every field has a default, so an empty file is valid.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub app_name: String,
    /// Absolute base used by [`site_url`](Self::site_url).
    pub base_url: String,
    pub environment: String,
    /// Debug mode renders routing and dispatch failures as plain-text
    /// diagnostics. Production mode renders the static error pages.
    pub debug: bool,
    /// Listen address for [`Server::bind`](crate::Server::bind).
    pub bind: String,
    /// Request bodies larger than this many bytes are refused with `413`.
    pub max_body_size: usize,

    #[serde(skip)]
    raw: toml::Table,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "pico".to_owned(),
            base_url: "http://localhost:8000".to_owned(),
            environment: "development".to_owned(),
            debug: true,
            bind: "127.0.0.1:8000".to_owned(),
            max_body_size: 2 * 1024 * 1024,
            raw: toml::Table::new(),
        }
    }
}

impl Config {
    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let raw: toml::Table = text.parse().map_err(|e: toml::de::Error| Error::Config(e.to_string()))?;
        let mut config: Config = toml::Value::Table(raw.clone())
            .try_into()
            .map_err(|e: toml::de::Error| Error::Config(e.to_string()))?;
        config.raw = raw;
        Ok(config)
    }

    /// Dot-path lookup into the loaded document. `None` as soon as a segment
    /// is missing or a non-table is traversed.
    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        let mut segments = key.split('.');
        let mut value = self.raw.get(segments.next()?)?;
        for segment in segments {
            value = value.as_table()?.get(segment)?;
        }
        Some(value)
    }

    /// String form of [`get`](Self::get) with a fallback.
    pub fn get_or(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(toml::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => default.to_owned(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    // ── URL helpers ──────────────────────────────────────────────────────────

    /// Root-relative URL: `base_url("users/7")` is `/users/7`.
    pub fn base_url(&self, path: &str) -> String {
        format!("/{}", path.trim_start_matches('/'))
    }

    /// Absolute URL under the configured `base_url`.
    pub fn site_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    /// Root-relative URL of a file under `assets/`.
    pub fn asset(&self, path: &str) -> String {
        self.base_url(&format!("assets/{}", path.trim_start_matches('/')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert!(config.debug);
        assert_eq!(config.app_name, "pico");
        assert_eq!(config.bind, "127.0.0.1:8000");
        assert_eq!(config.max_body_size, 2 * 1024 * 1024);
        assert!(config.get("debug").is_none());
    }

    #[test]
    fn dot_path_lookup() {
        let config = Config::from_toml(
            r#"
            app_name = "PicoPHP"
            environment = "production"

            [mail]
            from = "noreply@example.test"

            [db]
            port = 3306
            "#,
        )
        .unwrap();

        assert_eq!(config.app_name, "PicoPHP");
        assert!(config.is_production());
        assert_eq!(config.get_or("mail.from", "-"), "noreply@example.test");
        assert_eq!(config.get("db.port").and_then(|v| v.as_integer()), Some(3306));
        assert_eq!(config.get_or("db.port", "0"), "3306");
        assert!(config.get("db.port.deeper").is_none());
        assert!(config.get("mail.missing").is_none());
    }

    #[test]
    fn malformed_documents_are_config_errors() {
        assert!(matches!(Config::from_toml("debug = "), Err(Error::Config(_))));
        assert!(matches!(Config::from_toml("debug = \"yes\""), Err(Error::Config(_))));
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pico.toml");
        std::fs::write(&path, "debug = false\nbind = \"0.0.0.0:9000\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert!(!config.debug);
        assert_eq!(config.bind, "0.0.0.0:9000");

        assert!(matches!(Config::load(dir.path().join("nope.toml")), Err(Error::Config(_))));
    }

    #[test]
    fn url_helpers() {
        let config = Config { base_url: "https://pico.test/".into(), ..Config::default() };
        assert_eq!(config.base_url("/users/7"), "/users/7");
        assert_eq!(config.base_url(""), "/");
        assert_eq!(config.site_url("/users/7"), "https://pico.test/users/7");
        assert_eq!(config.asset("/css/app.css"), "/assets/css/app.css");
    }
}
