use std::env;

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub escalation_scan_interval_secs: u64,
    pub escalation_batch_limit: usize,
    pub percentage_cache_ttl_secs: i64,
    pub service_name: String,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let escalation_scan_interval_secs: u64 = env::var("ESCALATION_SCAN_INTERVAL_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidScanInterval)?;
        if escalation_scan_interval_secs == 0 {
            return Err(ConfigError::InvalidScanInterval);
        }

        let escalation_batch_limit = env::var("ESCALATION_BATCH_LIMIT")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .unwrap_or(100);

        let percentage_cache_ttl_secs = env::var("SLA_PERCENTAGE_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "120".to_string())
            .parse()
            .unwrap_or(120);

        let service_name = env::var("SERVICE_NAME").unwrap_or_else(|_| "slaguard".to_string());

        Ok(EngineConfig {
            escalation_scan_interval_secs,
            escalation_batch_limit,
            percentage_cache_ttl_secs,
            service_name,
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            escalation_scan_interval_secs: 60,
            escalation_batch_limit: 100,
            percentage_cache_ttl_secs: 120,
            service_name: "slaguard".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid escalation scan interval")]
    InvalidScanInterval,
}
