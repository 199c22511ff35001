//! Server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP listen port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HMAC secret for session tokens
    pub session_secret: String,
    /// Session lifetime in hours
    pub session_ttl_hours: i64,
    /// Root directory for uploaded documents
    pub documents_dir: String,
    /// ARES REST endpoint for economic subjects
    pub ares_base_url: String,
    /// Log level (used when RUST_LOG is not set)
    pub log_level: String,
    /// Optional directory for rolling log files
    pub log_dir: Option<String>,
    /// Allowed CORS origins (comma separated); empty allows none
    pub cors_origins: Vec<String>,
    /// Take the client address from `X-Forwarded-For` (behind a reverse proxy)
    pub trust_proxy: bool,
}

pub const DEFAULT_ARES_BASE_URL: &str =
    "https://ares.gov.cz/ekonomicke-subjekty-v-be/rest/ekonomicke-subjekty";

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            session_secret: Self::require_secret("SESSION_SECRET", &environment)?,
            session_ttl_hours: std::env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .filter(|h: &i64| *h > 0)
                .unwrap_or(24),
            documents_dir: std::env::var("DOCUMENTS_DIR")
                .unwrap_or_else(|_| "./data/documents".into()),
            ares_base_url: std::env::var("ARES_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_ARES_BASE_URL.into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            cors_origins: parse_origins(&std::env::var("CORS_ORIGINS").unwrap_or_default()),
            trust_proxy: parse_flag(&std::env::var("TRUST_PROXY").unwrap_or_default()),
            environment,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" http://localhost:5173, https://smeny.cz ,,"),
            vec!["http://localhost:5173", "https://smeny.cz"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(parse_flag("YES"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("false"));
    }

    #[test]
    fn test_require_secret_dev_fallback() {
        let val = Config::require_secret("SMENY_TEST_UNSET_SECRET", "development").unwrap();
        assert_eq!(val, "dev-SMENY_TEST_UNSET_SECRET-not-for-production");
    }

    #[test]
    fn test_require_secret_missing_in_production() {
        let err = Config::require_secret("SMENY_TEST_UNSET_SECRET", "production").unwrap_err();
        assert!(err.to_string().contains("must be set in production"));
    }
}
