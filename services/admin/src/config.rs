//! Service configuration loaded from `ADMIN_*` environment variables

use anyhow::Result;
use serde::Deserialize;

/// Admin service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Interface to bind (default: 0.0.0.0)
    pub host: String,
    /// Port to listen on (default: 3002)
    pub port: u16,
    /// Shared secret for HS256 admin tokens
    pub jwt_secret: String,
}

impl AdminConfig {
    /// Create a new AdminConfig from environment variables
    ///
    /// # Environment Variables
    /// - `ADMIN_HOST`: bind address (default: "0.0.0.0")
    /// - `ADMIN_PORT`: listen port (default: 3002)
    /// - `ADMIN_JWT_SECRET`: token signing secret (required)
    pub fn from_env() -> Result<Self> {
        let config = config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3002)?
            .add_source(config::Environment::with_prefix("ADMIN"))
            .build()?;

        let config: AdminConfig = config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Invalid admin configuration: {}", e))?;

        if config.jwt_secret.is_empty() {
            anyhow::bail!("ADMIN_JWT_SECRET must not be empty");
        }

        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
