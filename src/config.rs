use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_WEB_URL: &str = "http://localhost:3000";

/// Client configuration loaded from environment variables (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the REST backend, e.g. `http://localhost:5000/api`.
    pub api_url: String,
    /// Base URL of the web front end; shareable search links are built on it.
    pub web_url: String,
    /// Substitute the bundled demo dataset when a fetch fails.
    pub demo_fallback: bool,
    pub timeout: Duration,
    pub rust_log: String,
    pub session_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("CAREERCONNECT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let web_url = lookup("CAREERCONNECT_WEB_URL").unwrap_or_else(|| DEFAULT_WEB_URL.to_string());

        let demo_fallback = match lookup("CAREERCONNECT_DEMO_DATA") {
            Some(v) => parse_bool(&v)
                .with_context(|| format!("CAREERCONNECT_DEMO_DATA must be a boolean, got '{}'", v))?,
            None => false,
        };

        let timeout_secs = match lookup("CAREERCONNECT_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .context("CAREERCONNECT_TIMEOUT_SECS must be a whole number of seconds")?,
            None => 30,
        };

        let session_path = match lookup("CAREERCONNECT_SESSION_FILE") {
            Some(p) => PathBuf::from(p),
            None => default_session_path(),
        };

        Ok(Config {
            api_url: api_url.trim_end_matches('/').to_string(),
            web_url: web_url.trim_end_matches('/').to_string(),
            demo_fallback,
            timeout: Duration::from_secs(timeout_secs),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            session_path,
        })
    }
}

fn default_session_path() -> PathBuf {
    // XDG data directory, or the current directory as a fallback
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "careerconnect") {
        proj_dirs.data_dir().join("session.json")
    } else {
        PathBuf::from("careerconnect-session.json")
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.web_url, DEFAULT_WEB_URL);
        assert!(!config.demo_fallback);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_overrides_and_trailing_slash() {
        let config = config_from(&[
            ("CAREERCONNECT_API_URL", "https://jobs.example.com/api/"),
            ("CAREERCONNECT_DEMO_DATA", "yes"),
            ("CAREERCONNECT_TIMEOUT_SECS", "5"),
            ("CAREERCONNECT_SESSION_FILE", "/tmp/s.json"),
        ])
        .unwrap();
        assert_eq!(config.api_url, "https://jobs.example.com/api");
        assert!(config.demo_fallback);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.session_path, PathBuf::from("/tmp/s.json"));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(config_from(&[("CAREERCONNECT_DEMO_DATA", "maybe")]).is_err());
        assert!(config_from(&[("CAREERCONNECT_TIMEOUT_SECS", "soon")]).is_err());
    }
}
