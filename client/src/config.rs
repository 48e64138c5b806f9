use std::path::PathBuf;

/// Client settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub session_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000/".to_string(),
            session_file: PathBuf::from(".prontio").join("session.json"),
        }
    }
}

impl ClientConfig {
    /// Reads `PRONTIO_API_URL` and `PRONTIO_SESSION_FILE`. Without the
    /// latter the session lives under `$HOME/.prontio/`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            api_url: value("PRONTIO_API_URL").unwrap_or(defaults.api_url),
            session_file: value("PRONTIO_SESSION_FILE")
                .map(PathBuf::from)
                .or_else(|| value("HOME").map(|home| PathBuf::from(home).join(&defaults.session_file)))
                .unwrap_or(defaults.session_file),
        }
    }
}
