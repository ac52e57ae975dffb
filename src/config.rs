use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_MEDIA_ROOT: &str = "./media";
pub const DEFAULT_MEDIA_URL: &str = "/media";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub media_root: PathBuf,
    /// URL prefix under which stored files are served.
    pub media_url: String,
    pub bind_addr: SocketAddr,
    pub max_upload_bytes: usize,
    pub run_migrations: bool,
}

fn var_or(name: &'static str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = var_or(name, default);
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

fn flag(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "" => Ok(default),
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { name, value }),
        },
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let media_root = PathBuf::from(var_or("MEDIA_ROOT", DEFAULT_MEDIA_ROOT));
        let media_url = var_or("MEDIA_URL", DEFAULT_MEDIA_URL)
            .trim_end_matches('/')
            .to_string();
        let bind_addr = parsed("BIND_ADDR", DEFAULT_BIND_ADDR)?;
        let max_upload_bytes =
            parsed("MAX_UPLOAD_BYTES", &DEFAULT_MAX_UPLOAD_BYTES.to_string())?;
        let run_migrations = flag("RUN_MIGRATIONS", true)?;

        Ok(Self {
            database_url,
            media_root,
            media_url,
            bind_addr,
            max_upload_bytes,
            run_migrations,
        })
    }

    /// Public URL of a stored file.
    pub fn media_url_for(&self, stored: &str) -> String {
        format!("{}/{}", self.media_url, stored)
    }
}
