use std::env;

/// Runtime configuration for the share-link backend
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// JWT secret key (required in production)
    pub jwt_secret: String,

    /// Issued token lifetime in hours (default: 24)
    pub token_ttl_hours: i64,

    /// Upper bound on a requested link expiry in hours (default: 1 year)
    pub max_link_ttl_hours: i64,

    /// Enforce the persisted max_views cap on resolution (default: false).
    /// The cap is stored either way; this toggle decides whether it gates
    /// anonymous access.
    pub enforce_max_views: bool,

    /// Reject log writes against expired links (default: false). The
    /// default records attempts against expired links as well, which keeps
    /// an audit trail of accesses after expiry.
    pub gate_logging_on_active: bool,

    /// Allowed CORS origins (comma separated)
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "secret".to_string(),
            token_ttl_hours: 24,
            max_link_ttl_hours: 8760, // 1 year
            enforce_max_views: false,
            gate_logging_on_active: false,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            jwt_secret: env::var("JWT_SECRET").unwrap_or(default.jwt_secret),

            token_ttl_hours: env::var("TOKEN_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.token_ttl_hours),

            max_link_ttl_hours: env::var("MAX_LINK_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_link_ttl_hours),

            enforce_max_views: env::var("ENFORCE_MAX_VIEWS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(default.enforce_max_views),

            gate_logging_on_active: env::var("GATE_LOGGING_ON_ACTIVE")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(default.gate_logging_on_active),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(default.allowed_origins),
        }
    }

    /// Create config for development and tests
    pub fn development() -> Self {
        Self::default()
    }

    /// Create config for production (strict secrets)
    pub fn production() -> Self {
        Self {
            jwt_secret: env::var("JWT_SECRET").expect("CRITICAL: JWT_SECRET must be set"),
            ..Self::from_env()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.token_ttl_hours, 24);
        assert_eq!(config.max_link_ttl_hours, 8760);
        assert!(!config.enforce_max_views);
        assert!(!config.gate_logging_on_active);
    }

    #[test]
    fn test_policy_toggles_from_env() {
        unsafe {
            env::set_var("ENFORCE_MAX_VIEWS", "true");
            env::set_var("GATE_LOGGING_ON_ACTIVE", "1");
        }
        let config = AppConfig::from_env();
        unsafe {
            env::remove_var("ENFORCE_MAX_VIEWS");
            env::remove_var("GATE_LOGGING_ON_ACTIVE");
        }
        assert!(config.enforce_max_views);
        assert!(config.gate_logging_on_active);
    }

    #[test]
    fn test_cors_fallback() {
        unsafe { env::remove_var("ALLOWED_ORIGINS") };
        let config = AppConfig::from_env();
        assert_eq!(config.allowed_origins, AppConfig::default().allowed_origins);
        assert!(!config.allowed_origins.contains(&"*".to_string()));
    }
}
