use std::borrow::Cow;

/// Server settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name}: {value}")]
    InvalidNumber { name: &'static str, value: String },
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            database_url: "sqlite://prontio.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

impl ServerConfig {
    /// Builds the configuration from `PRONTIO_BIND`, `DATABASE_URL` and
    /// `PRONTIO_DB_MAX_CONNECTIONS`, falling back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let value = |name: &str, fallback: String| -> String {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(fallback)
        };

        let max_connections = match lookup("PRONTIO_DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidNumber {
                    name: "PRONTIO_DB_MAX_CONNECTIONS",
                    value: raw,
                })?,
            None => defaults.max_connections,
        };

        Ok(Self {
            bind_addr: value("PRONTIO_BIND", defaults.bind_addr),
            database_url: value("DATABASE_URL", defaults.database_url),
            max_connections,
        })
    }

    /// Database URL with any password-looking part hidden, for logs.
    pub fn redacted_database_url(&self) -> Cow<'_, str> {
        match self.database_url.split_once('@') {
            Some((_, host)) => Cow::Owned(format!("***@{host}")),
            None => Cow::Borrowed(&self.database_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let cfg = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg, ServerConfig::default());
    }

    #[test]
    fn values_are_overridden() {
        let cfg = ServerConfig::from_lookup(lookup_from(&[
            ("PRONTIO_BIND", "127.0.0.1:8080"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("PRONTIO_DB_MAX_CONNECTIONS", "2"),
        ]))
        .unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:8080");
        assert_eq!(cfg.database_url, "sqlite::memory:");
        assert_eq!(cfg.max_connections, 2);
    }

    #[test]
    fn bad_pool_size_is_rejected() {
        for bad in ["zero", "0", "-1"] {
            let err = ServerConfig::from_lookup(lookup_from(&[("PRONTIO_DB_MAX_CONNECTIONS", bad)]))
                .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidNumber { .. }));
        }
    }

    #[test]
    fn credentials_are_hidden_in_logs() {
        let cfg = ServerConfig {
            database_url: "postgres://user:secret@db:5432/prontio".into(),
            ..Default::default()
        };
        assert_eq!(cfg.redacted_database_url(), "***@db:5432/prontio");
        assert_eq!(
            ServerConfig::default().redacted_database_url(),
            "sqlite://prontio.db?mode=rwc"
        );
    }
}
