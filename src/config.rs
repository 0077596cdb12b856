use std::env;

/// Runtime configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub public_dir: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://potluck.db?mode=rwc".to_string());

        let public_dir = env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".to_string());

        Self {
            port,
            database_url,
            public_dir,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Runs without the env vars set in CI; a bad PORT value falls back too.
        let config = AppConfig::from_env();
        assert!(!config.database_url.is_empty());
        assert!(!config.public_dir.is_empty());
        assert!(config.bind_addr().starts_with("0.0.0.0:"));
    }
}
