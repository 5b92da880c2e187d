use crate::config::toml_config::AppConfig;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "trade-stats-etl")]
#[command(about = "Serves aggregated foreign-trade statistics from the customs trade API")]
pub struct CliConfig {
    #[arg(long, short = 'c', help = "TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Address to listen on, e.g. 0.0.0.0:8088")]
    pub bind: Option<String>,

    #[arg(long, help = "Upstream trade API endpoint")]
    pub endpoint: Option<String>,

    #[arg(long, env = "TRADE_API_KEY", hide_env_values = true, help = "Upstream service key")]
    pub service_key: Option<String>,

    #[arg(long, help = "Year value of the upstream grand-total row")]
    pub total_sentinel: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliConfig {
    /// Loads the config file (or defaults) and lets command-line flags win.
    pub fn resolve(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.upstream.endpoint = endpoint.clone();
        }
        if let Some(key) = &self.service_key {
            config.upstream.service_key = key.clone();
        }
        if let Some(sentinel) = &self.total_sentinel {
            config.aggregation.total_sentinel = sentinel.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConfigProvider;

    #[test]
    fn test_flags_override_defaults() {
        let cli = CliConfig::parse_from([
            "trade-stats-etl",
            "--bind",
            "127.0.0.1:3000",
            "--service-key",
            "cli-key",
            "--total-sentinel",
            "Total",
        ]);

        let config = cli.resolve().unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.service_key(), "cli-key");
        assert_eq!(config.total_sentinel(), "Total");
    }

    #[test]
    fn test_missing_config_file_is_io_error() {
        let cli = CliConfig::parse_from(["trade-stats-etl", "--config", "/definitely/not/here.toml"]);
        assert!(matches!(
            cli.resolve(),
            Err(crate::utils::error::TradeError::Io(_))
        ));
    }
}
