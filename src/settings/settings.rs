use crate::logger::LogFormat;
use anyhow::{Result, anyhow};
use config::{Config, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub http: Http,
    pub log: Log,
    pub store: Store,
    pub roles: Roles,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    pub tls: Option<Tls>,
}

#[derive(Debug, Deserialize)]
pub struct Tls {
    pub cert_path: String,
    pub key_path: String,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "memory" or "mysql"
    pub mysql_dsn: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct Roles {
    /// Bound on read-resolve-write cycles per role change.
    pub max_attempts: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    if settings.roles.max_attempts == 0 {
        return Err(anyhow!("roles.max_attempts must be at least 1"));
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_settings(contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("repohub-{}.toml", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_minimal_settings_with_defaults() {
        let path = write_settings(
            r#"
[http]
address = "127.0.0.1:8080"

[log]
filter = "info"

[store]
backend = "memory"

[roles]
max_attempts = 3
"#,
        );

        let settings = parse_settings(path.to_str()).unwrap();
        assert!(settings.http.tls.is_none());
        assert_eq!(settings.log.format, LogFormat::Full);
        assert_eq!(settings.store.max_connections, 10);
        assert_eq!(settings.store.acquire_timeout_secs, 5);
        assert_eq!(settings.roles.max_attempts, 3);
    }

    #[test]
    fn rejects_zero_attempts() {
        let path = write_settings(
            r#"
[http]
address = "127.0.0.1:8080"

[log]
filter = "info"

[store]
backend = "memory"

[roles]
max_attempts = 0
"#,
        );

        assert!(parse_settings(path.to_str()).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(parse_settings(Some("")).is_err());
    }
}
