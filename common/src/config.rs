// common/src/config.rs
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use config::{Config as ConfigFile, File, Environment};

use crate::routes::ProtectedRouteSet;

/// Central configuration for the shell server
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub web_server_addr: String,
    pub log_level: String,
    /// Path prefixes that require an authenticated session
    pub protected_routes: ProtectedRouteSet,
    /// Where anonymous visitors of protected pages are sent; no redirect when unset
    pub login_path: Option<String>,

    pub session: SessionConfig,
    pub identity: IdentityConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_seconds: i64,
    pub cleanup_interval_seconds: u64,
    pub secure_cookie: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityBackend {
    /// Opaque tokens resolved by the in-process session registry
    Session,
    /// Self-contained HS256 tokens
    Jwt,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub backend: IdentityBackend,
    pub jwt_secret: String,
    /// Shared secret the login backend presents as a bearer token to create sessions.
    /// Session creation is refused while it is empty.
    pub issuer_secret: String,
    /// Upper bound for one identity lookup during a page load
    pub timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web_server_addr: "127.0.0.1:8081".to_string(),
            log_level: "info".to_string(),
            protected_routes: ProtectedRouteSet::new(vec!["/dashboard".to_string()]),
            login_path: None,
            session: SessionConfig::default(),
            identity: IdentityConfig::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "shell_session".to_string(),
            ttl_seconds: 86400,
            cleanup_interval_seconds: 3600,
            secure_cookie: true,
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            backend: IdentityBackend::Session,
            jwt_secret: "dev_secret".to_string(),
            issuer_secret: "dev_issuer_secret".to_string(),
            timeout_ms: 3000,
        }
    }
}

impl IdentityConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }
}

/// Prefixed environment source; `PROTECTED_ROUTES` is read as a comma separated list
fn env_source(prefix: &str) -> Environment {
    Environment::with_prefix(prefix)
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("protected_routes")
        .try_parsing(true)
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        // Get the run mode, defaulting to "development"
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        // Locate the config directory
        let config_dir = env::var("CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                // Check if we're in the project root or a subcrate
                let mut path = PathBuf::from("./config");
                if !path.exists() {
                    path = PathBuf::from("../config");
                }
                path
            });

        tracing::info!("Loading configuration from {}", config_dir.display());
        tracing::info!("Using run mode: {}", run_mode);

        let config = ConfigFile::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", run_mode))).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Environment variables with prefix "APP", e.g. APP__SESSION__TTL_SECONDS
            .add_source(env_source("APP"))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load from files, falling back to plain environment variables
    pub fn from_env() -> Self {
        match Self::load() {
            Ok(config) => {
                tracing::info!("Configuration loaded from files and environment");
                config
            },
            Err(e) => {
                tracing::warn!("Failed to load configuration from files: {}", e);
                tracing::info!("Falling back to environment variables only");
                Self::from_plain_env()
            }
        }
    }

    fn from_plain_env() -> Self {
        let defaults = Self::default();

        let web_server_addr = env::var("WEB_SERVER_ADDR")
            .unwrap_or(defaults.web_server_addr);

        let log_level = env::var("LOG_LEVEL")
            .unwrap_or(defaults.log_level);

        // Comma separated, e.g. PROTECTED_ROUTES=/dashboard,/account
        let protected_routes = env::var("PROTECTED_ROUTES")
            .map(|v| ProtectedRouteSet::parse_list(&v))
            .unwrap_or(defaults.protected_routes);

        let login_path = env::var("LOGIN_PATH").ok().filter(|v| !v.is_empty());

        let session = SessionConfig {
            cookie_name: env::var("SESSION_COOKIE_NAME")
                .unwrap_or(defaults.session.cookie_name),
            ttl_seconds: env::var("SESSION_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(defaults.session.ttl_seconds),
            cleanup_interval_seconds: env::var("SESSION_CLEANUP_INTERVAL_SECONDS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(defaults.session.cleanup_interval_seconds),
            secure_cookie: env::var("SESSION_SECURE_COOKIE")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(defaults.session.secure_cookie),
        };

        let identity = IdentityConfig {
            backend: match env::var("IDENTITY_BACKEND").as_deref() {
                Ok("jwt") => IdentityBackend::Jwt,
                _ => defaults.identity.backend,
            },
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or(defaults.identity.jwt_secret),
            issuer_secret: env::var("ISSUER_SECRET")
                .unwrap_or(defaults.identity.issuer_secret),
            timeout_ms: env::var("IDENTITY_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(defaults.identity.timeout_ms),
        };

        Self {
            web_server_addr,
            log_level,
            protected_routes,
            login_path,
            session,
            identity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_protect_dashboard() {
        let config = Config::default();
        assert!(config.protected_routes.is_protected("/dashboard/settings"));
        assert!(!config.protected_routes.is_protected("/"));
        assert_eq!(config.identity.backend, IdentityBackend::Session);
        assert!(config.login_path.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = ConfigFile::builder()
            .add_source(config::File::from_str(
                r#"
                protected_routes = ["/account", "/admin"]
                login_path = "/login"

                [identity]
                backend = "jwt"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert!(config.protected_routes.is_protected("/admin/users"));
        assert!(!config.protected_routes.is_protected("/dashboard"));
        assert_eq!(config.login_path.as_deref(), Some("/login"));
        assert_eq!(config.identity.backend, IdentityBackend::Jwt);
        assert_eq!(config.identity.timeout_ms, 3000);
        assert_eq!(config.session.cookie_name, "shell_session");
    }

    #[test]
    fn test_env_route_list_is_split() {
        // Unique prefix keeps this independent of the real APP__ variables
        env::set_var("SHELLCFGTEST__PROTECTED_ROUTES", "/account,/admin");
        env::set_var("SHELLCFGTEST__SESSION__SECURE_COOKIE", "false");

        let config: Config = ConfigFile::builder()
            .add_source(env_source("SHELLCFGTEST"))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(
            config.protected_routes,
            ProtectedRouteSet::new(vec!["/account".into(), "/admin".into()])
        );
        assert!(!config.session.secure_cookie);
        assert_eq!(config.session.cookie_name, "shell_session");
    }
}
