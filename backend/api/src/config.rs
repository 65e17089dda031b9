/// Configuration management
///
/// Loads configuration from environment variables, with `.env` support
/// handled by the binary entry point.
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub database: DatabaseConfig,
    pub feed: FeedConfig,
    pub catalog: CatalogConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Feed engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Accepted posts per feed page
    pub page_size: usize,
    /// Candidate batch size = page_size * batch_multiplier
    pub batch_multiplier: usize,
    /// Cap on the following-scoped feed
    pub following_limit: i64,
    /// Trailing window for the global top shout, in hours
    pub top_shout_window_hours: i64,
}

/// External car catalog API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub base_url: String,
    pub api_key: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("CRUNCH_API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("CRUNCH_API_PORT")
                    .or_else(|_| std::env::var("PORT"))
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(4000),
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if app_env.eq_ignore_ascii_case("production") => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if app_env.eq_ignore_ascii_case("production") && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/crunch_club".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10),
            },
            feed: FeedConfig {
                page_size: std::env::var("FEED_PAGE_SIZE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(3),
                batch_multiplier: std::env::var("FEED_BATCH_MULTIPLIER")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(3),
                following_limit: std::env::var("FEED_FOLLOWING_LIMIT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(3),
                top_shout_window_hours: std::env::var("TOP_SHOUT_WINDOW_HOURS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(24),
            },
            catalog: {
                let api_key = std::env::var("CAR_API_KEY").unwrap_or_else(|_| "".to_string());
                if app_env.eq_ignore_ascii_case("production") && api_key.trim().is_empty() {
                    return Err("CAR_API_KEY must be set in production".to_string());
                }

                CatalogConfig {
                    base_url: std::env::var("CAR_API_URL")
                        .unwrap_or_else(|_| "https://api.api-ninjas.com/v1/cars".to_string()),
                    api_key,
                }
            },
        })
    }

    /// Candidate batch size for one feed page
    pub fn feed_batch_size(&self) -> usize {
        self.feed.page_size * self.feed.batch_multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_frontend_expectations() {
        let config = Config::from_env().unwrap();
        assert_eq!(config.feed.page_size, 3);
        assert_eq!(config.feed_batch_size(), 9);
        assert_eq!(config.feed.following_limit, 3);
        assert_eq!(config.feed.top_shout_window_hours, 24);
    }
}
