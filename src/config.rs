use serde::{Deserialize, Serialize};

use std::{env, fs, path::Path, path::PathBuf, time::Duration};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_path: PathBuf,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub pool: PoolConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    #[serde(default = "default_max_size")]
    pub max_size: u32,
    /// How long a caller waits for a free connection before giving up
    #[serde(default = "default_connection_timeout", with = "humantime_serde")]
    pub connection_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            connection_timeout: default_connection_timeout(),
        }
    }
}

const fn default_port() -> u16 {
    8000
}

const fn default_max_size() -> u32 {
    8
}

const fn default_connection_timeout() -> Duration {
    Duration::from_secs(5)
}

fn load_from_env() -> Result<Config, Box<dyn std::error::Error>> {
    let database_path = env::var("NOTES_DB_PATH")
        .map_err(|_| "NOTES_DB_PATH environment variable is required")?;

    let port = match env::var("NOTES_PORT") {
        Ok(v) => v
            .parse::<u16>()
            .map_err(|e| format!("Failed to parse NOTES_PORT: {e}"))?,
        Err(_) => default_port(),
    };

    let mut pool = PoolConfig::default();
    if let Ok(v) = env::var("NOTES_POOL_MAX_SIZE") {
        pool.max_size = v
            .parse::<u32>()
            .map_err(|e| format!("Failed to parse NOTES_POOL_MAX_SIZE: {e}"))?;
    }
    if let Ok(v) = env::var("NOTES_POOL_TIMEOUT") {
        pool.connection_timeout = humantime::parse_duration(&v)
            .map_err(|e| format!("Failed to parse NOTES_POOL_TIMEOUT: {e}"))?;
    }

    Ok(Config {
        database_path: PathBuf::from(database_path),
        port,
        pool,
    })
}

fn load_from_file(path: &str) -> Result<Config, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(Into::into)
}

pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    // Retrieve env variable
    let config_path =
        env::var("NOTES_STORE_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

    // Try env path
    if Path::new(&config_path).exists() {
        return load_from_file(&config_path);
    }

    // Fallback to config.yaml
    if Path::new("config.yaml").exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to 'config.yaml'",
            config_path
        );
        return load_from_file("config.yaml");
    }

    // Fallback to config.example.yaml
    if Path::new("config.example.yaml").exists() {
        tracing::warn!(
            "Config file '{}' and 'config.yaml' not found, falling back to 'config.example.yaml'",
            config_path
        );
        return load_from_file("config.example.yaml");
    }

    // Fallback to environment variables
    tracing::info!(
        "No config file found, attempting to load configuration from environment variables"
    );
    load_from_env().map_err(|e| {
        format!(
            "Config file not found and environment variables are incomplete. \
             Tried: '{config_path}', 'config.yaml', 'config.example.yaml', and environment variables. \
             Error: {e}"
        )
        .into()
    })
}
