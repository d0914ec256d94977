//! Server configuration, built from environment variables.

/// Top-level server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: String,
    /// TCP port the server listens on.
    pub port: u16,
    /// Path of the local SQLite database file.
    pub database_path: String,
    /// Lifetime of issued login tokens, in seconds.
    pub session_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 5000,
            database_path: "./data/inquiry-router.db".to_string(),
            session_ttl_secs: 24 * 60 * 60, // 1 day
        }
    }
}

impl ServerConfig {
    /// Build config from environment variables, falling back to defaults
    /// for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_addr = std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr);

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let database_path = std::env::var("DATABASE_PATH").unwrap_or(defaults.database_path);

        let session_ttl_secs: u64 = std::env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.session_ttl_secs);

        Self {
            bind_addr,
            port,
            database_path,
            session_ttl_secs,
        }
    }
}
