/// Configuration management for the API server
///
/// Loaded once at startup from environment variables (and `.env` when
/// present), then shared read-only through `AppState`.
///
/// # Environment Variables
///
/// | Variable                   | Default   |
/// |----------------------------|-----------|
/// | `API_HOST`                 | `0.0.0.0` |
/// | `API_PORT`                 | `8080`    |
/// | `DATABASE_URL`             | required  |
/// | `DATABASE_MAX_CONNECTIONS` | `10`      |
/// | `JWT_SECRET`               | required, at least 32 characters |
/// | `JWT_ALGORITHM`            | `HS256` (HS256, HS384 or HS512) |
/// | `ACCESS_TOKEN_TTL_MINUTES` | `30`      |
/// | `REFRESH_TOKEN_TTL_DAYS`   | `7`       |
/// | `PROFILE_IMAGE_DIR`        | `images`  |
/// | `CORS_ORIGINS`             | `*` (comma-separated list) |
/// | `UPLOAD_LIMIT_BYTES`       | `5242880` |
///
/// # Example
///
/// ```no_run
/// use taskboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use chrono::Duration;
use jsonwebtoken::Algorithm;
use taskboard_shared::auth::jwt::{
    TokenService, DEFAULT_ACCESS_TTL_MINUTES, DEFAULT_REFRESH_TTL_DAYS,
};

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `*` means permissive
    pub cors_origins: Vec<String>,

    /// Maximum request body size (applies to image uploads)
    pub upload_limit_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Token signing settings
#[derive(Clone)]
pub struct JwtConfig {
    /// Symmetric signing secret. Generate with `openssl rand -hex 32`
    pub secret: String,

    pub algorithm: Algorithm,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .field("refresh_ttl_days", &self.refresh_ttl_days)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory for uploaded profile images
    pub profile_image_dir: PathBuf,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(name: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var_or(name, default)
        .parse::<T>()
        .with_context(|| format!("{} has an invalid value", name))
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Fails when a required variable is missing or a value does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let algorithm = Algorithm::from_str(&var_or("JWT_ALGORITHM", "HS256"))
            .map_err(|e| anyhow::anyhow!("JWT_ALGORITHM has an invalid value: {}", e))?;
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            anyhow::bail!("JWT_ALGORITHM must be HS256, HS384 or HS512");
        }

        let cors_origins = var_or("CORS_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            api: ApiConfig {
                host: var_or("API_HOST", "0.0.0.0"),
                port: parse_var("API_PORT", "8080")?,
                cors_origins,
                upload_limit_bytes: parse_var("UPLOAD_LIMIT_BYTES", "5242880")?,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS", "10")?,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                algorithm,
                access_ttl_minutes: parse_var(
                    "ACCESS_TOKEN_TTL_MINUTES",
                    &DEFAULT_ACCESS_TTL_MINUTES.to_string(),
                )?,
                refresh_ttl_days: parse_var(
                    "REFRESH_TOKEN_TTL_DAYS",
                    &DEFAULT_REFRESH_TTL_DAYS.to_string(),
                )?,
            },
            storage: StorageConfig {
                profile_image_dir: PathBuf::from(var_or("PROFILE_IMAGE_DIR", "images")),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Builds the token service described by the JWT settings
    pub fn token_service(&self) -> anyhow::Result<TokenService> {
        let service = TokenService::new(self.jwt.secret.clone(), self.jwt.algorithm)?.with_ttls(
            Duration::minutes(self.jwt.access_ttl_minutes),
            Duration::days(self.jwt.refresh_ttl_days),
        );
        Ok(service)
    }

    /// Settings suitable for tests: local addresses, a fixed secret, default TTLs
    pub fn for_tests(profile_image_dir: impl Into<PathBuf>) -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
                upload_limit_bytes: 5 * 1024 * 1024,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                algorithm: Algorithm::HS256,
                access_ttl_minutes: DEFAULT_ACCESS_TTL_MINUTES,
                refresh_ttl_days: DEFAULT_REFRESH_TTL_DAYS,
            },
            storage: StorageConfig {
                profile_image_dir: profile_image_dir.into(),
            },
        }
    }
}
