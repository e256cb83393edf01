use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub admin: AdminConfig,
    pub feed: FeedConfig,
    pub pdf: PdfConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Value for Access-Control-Allow-Origin; "*" allows any origin.
    pub allow_origin: String,
    /// Must stay above the base64 size of a 2 MiB signature plus the rest of the body.
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    pub jwks_url: String,
    pub jwks_cache_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub base_url: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfConfig {
    pub renderer_url: Option<String>,
    pub timeout_secs: u64,
}

const AZURE_LOGIN_HOST: &str = "https://login.microsoftonline.com";

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. `from_env` is the
    /// production entry point; tests feed a map instead of mutating the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let mut config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };
        config.apply_overrides(&lookup);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        // Database overrides
        if let Some(v) = get("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = get("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = get("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Some(v) = get("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // API overrides
        if let Some(v) = get("ALLOW_ORIGIN") {
            self.api.allow_origin = v;
        }
        if let Some(v) = get("MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Auth overrides. Explicit values win over the Entra tenant shorthand.
        let tenant = get("AZURE_TENANT_ID");
        self.auth.issuer = get("AUTH_ISSUER")
            .or_else(|| tenant.as_ref().map(|t| format!("{AZURE_LOGIN_HOST}/{t}/v2.0")))
            .unwrap_or_default();
        self.auth.jwks_url = get("AUTH_JWKS_URL")
            .or_else(|| tenant.as_ref().map(|t| format!("{AZURE_LOGIN_HOST}/{t}/discovery/v2.0/keys")))
            .unwrap_or_default();
        self.auth.audience = get("AUTH_AUDIENCE")
            .or_else(|| get("AZURE_CLIENT_ID"))
            .unwrap_or_default();
        if let Some(v) = get("AUTH_JWKS_CACHE_SECS") {
            self.auth.jwks_cache_secs = v.parse().unwrap_or(self.auth.jwks_cache_secs);
        }

        // Admin credentials
        if let Some(v) = get("ADMIN_CLIENT_ID") {
            self.admin.client_id = v;
        }
        if let Some(v) = get("ADMIN_CLIENT_SECRET") {
            self.admin.client_secret = v;
        }

        // Reservation feed
        if let Some(v) = get("SIGNET_API_URL") {
            self.feed.base_url = Some(v);
        }
        if let Some(v) = get("SIGNET_API_KEY") {
            self.feed.api_key = v;
        }
        if let Some(v) = get("FEED_TIMEOUT_SECS") {
            self.feed.timeout_secs = v.parse().unwrap_or(self.feed.timeout_secs);
        }

        // PDF renderer
        if let Some(v) = get("PDF_RENDERER_URL") {
            self.pdf.renderer_url = Some(v);
        }
        if let Some(v) = get("PDF_TIMEOUT_SECS") {
            self.pdf.timeout_secs = v.parse().unwrap_or(self.pdf.timeout_secs);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.is_empty() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        if self.auth.issuer.is_empty() {
            return Err(ConfigError::Missing("AUTH_ISSUER or AZURE_TENANT_ID"));
        }
        if self.auth.audience.is_empty() {
            return Err(ConfigError::Missing("AUTH_AUDIENCE or AZURE_CLIENT_ID"));
        }
        if self.auth.jwks_url.is_empty() {
            return Err(ConfigError::Missing("AUTH_JWKS_URL or AZURE_TENANT_ID"));
        }
        for (key, value) in [
            ("AUTH_JWKS_URL", Some(&self.auth.jwks_url)),
            ("SIGNET_API_URL", self.feed.base_url.as_ref()),
            ("PDF_RENDERER_URL", self.pdf.renderer_url.as_ref()),
        ] {
            if let Some(raw) = value {
                url::Url::parse(raw).map_err(|e| ConfigError::Invalid { key, reason: e.to_string() })?;
            }
        }
        if self.api.allow_origin != "*" && axum::http::HeaderValue::from_str(&self.api.allow_origin).is_err() {
            return Err(ConfigError::Invalid {
                key: "ALLOW_ORIGIN",
                reason: "not a valid header value".to_string(),
            });
        }
        Ok(())
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 5,
                connection_timeout: 30,
                run_migrations: true,
            },
            api: ApiConfig {
                allow_origin: "*".to_string(),
                max_request_size_bytes: 8 * 1024 * 1024, // 8MB
            },
            auth: AuthConfig {
                issuer: String::new(),
                audience: String::new(),
                jwks_url: String::new(),
                jwks_cache_secs: 60,
            },
            admin: AdminConfig {
                client_id: String::new(),
                client_secret: String::new(),
            },
            feed: FeedConfig {
                base_url: None,
                api_key: String::new(),
                timeout_secs: 30,
            },
            pdf: PdfConfig {
                renderer_url: None,
                timeout_secs: 60,
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 10;
        config.database.connection_timeout = 10;
        config.database.run_migrations = false;
        config.api.max_request_size_bytes = 4 * 1024 * 1024; // 4MB
        config.auth.jwks_cache_secs = 600;
        config.feed.timeout_secs = 20;
        config
    }

    fn production() -> Self {
        let mut config = Self::staging();
        config.environment = Environment::Production;
        config.database.max_connections = 20;
        config.database.connection_timeout = 5;
        config.auth.jwks_cache_secs = 3600;
        config.feed.timeout_secs = 15;
        config.pdf.timeout_secs = 30;
        config
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }
}
