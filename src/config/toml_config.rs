use crate::core::aggregate::DEFAULT_TOTAL_SENTINEL;
use crate::core::query::DEFAULT_ENDPOINT;
use crate::core::ConfigProvider;
use crate::utils::error::{Result, TradeError};
use crate::utils::validation::{
    validate_non_empty_string, validate_socket_addr, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BIND: &str = "0.0.0.0:8088";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub aggregation: AggregationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub endpoint: String,
    pub service_key: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            service_key: String::new(),
        }
    }
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("endpoint", &self.endpoint)
            .field("service_key", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// `year` value of the upstream grand-total row.
    pub total_sentinel: String,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            total_sentinel: DEFAULT_TOTAL_SENTINEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TradeError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TradeError::Config {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }
}

impl ConfigProvider for AppConfig {
    fn api_endpoint(&self) -> &str {
        &self.upstream.endpoint
    }

    fn service_key(&self) -> &str {
        &self.upstream.service_key
    }

    fn total_sentinel(&self) -> &str {
        &self.aggregation.total_sentinel
    }

    fn bind_addr(&self) -> &str {
        &self.server.bind
    }

    fn allowed_origins(&self) -> &[String] {
        &self.server.allowed_origins
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_url("upstream.endpoint", &self.upstream.endpoint)?;
        validate_socket_addr("server.bind", &self.server.bind)?;
        validate_non_empty_string("aggregation.total_sentinel", &self.aggregation.total_sentinel)?;

        // An unresolved ${VAR} placeholder counts as missing.
        if self.upstream.service_key.starts_with("${") {
            return Err(TradeError::MissingConfig {
                field: "upstream.service_key".to_string(),
            });
        }
        validate_non_empty_string("upstream.service_key", &self.upstream.service_key)?;

        for origin in &self.server.allowed_origins {
            validate_url("server.allowed_origins", origin)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[server]
bind = "127.0.0.1:9000"
allowed_origins = ["http://localhost:5173"]

[upstream]
endpoint = "https://api.example.com/trade"
service_key = "abc"

[aggregation]
total_sentinel = "Total"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.allowed_origins(), ["http://localhost:5173".to_string()]);
        assert_eq!(config.api_endpoint(), "https://api.example.com/trade");
        assert_eq!(config.service_key(), "abc");
        assert_eq!(config.total_sentinel(), "Total");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = AppConfig::from_toml_str("[upstream]\nservice_key = \"abc\"\n").unwrap();

        assert_eq!(config.bind_addr(), DEFAULT_BIND);
        assert_eq!(config.api_endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(config.total_sentinel(), "총계");
        assert!(config.allowed_origins().is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TRADE_STATS_TEST_KEY", "from-env");

        let config = AppConfig::from_toml_str(
            "[upstream]\nservice_key = \"${TRADE_STATS_TEST_KEY}\"\n",
        )
        .unwrap();
        assert_eq!(config.service_key(), "from-env");

        std::env::remove_var("TRADE_STATS_TEST_KEY");
    }

    #[test]
    fn test_unresolved_key_fails_validation() {
        let config = AppConfig::from_toml_str(
            "[upstream]\nservice_key = \"${TRADE_STATS_SURELY_UNSET_VAR}\"\n",
        )
        .unwrap();

        assert!(matches!(
            config.validate(),
            Err(TradeError::MissingConfig { ref field }) if field == "upstream.service_key"
        ));
    }

    #[test]
    fn test_config_validation() {
        let config = AppConfig::from_toml_str(
            "[upstream]\nendpoint = \"invalid-url\"\nservice_key = \"k\"\n",
        )
        .unwrap();
        assert!(config.validate().is_err());

        assert!(AppConfig::default().validate().is_err());
        assert!(AppConfig::from_toml_str("[server\nbind = 1").is_err());
    }

    #[test]
    fn test_debug_hides_service_key() {
        let config = AppConfig::from_toml_str("[upstream]\nservice_key = \"hunter2\"\n").unwrap();
        assert!(!format!("{:?}", config).contains("hunter2"));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[upstream]\nservice_key = \"file-key\"\n[server]\nbind = \"127.0.0.1:0\"\n")
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.service_key(), "file-key");
        assert_eq!(config.bind_addr(), "127.0.0.1:0");
    }
}
