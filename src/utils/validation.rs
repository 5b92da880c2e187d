use crate::utils::error::{Result, TradeError};
use chrono::NaiveDate;
use std::net::SocketAddr;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(TradeError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(TradeError::InvalidConfigValue {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(TradeError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_socket_addr(field_name: &str, addr: &str) -> Result<SocketAddr> {
    addr.parse().map_err(|e| TradeError::InvalidConfigValue {
        field: field_name.to_string(),
        value: addr.to_string(),
        reason: format!("Invalid socket address: {}", e),
    })
}

/// Does not echo the value back: secrets go through here too.
pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TradeError::MissingConfig {
            field: field_name.to_string(),
        });
    }
    Ok(())
}

/// Checks a `YYYYMM` period token and that it names a real month.
pub fn validate_year_month(field_name: &str, value: &str) -> Result<()> {
    let invalid = |reason: &str| TradeError::InvalidQuery {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    if value.len() != 6 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("expected six digits in YYYYMM form"));
    }

    let year: i32 = value[..4]
        .parse()
        .map_err(|_| invalid("year is not a number"))?;
    let month: u32 = value[4..]
        .parse()
        .map_err(|_| invalid("month is not a number"))?;

    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|_| ())
        .ok_or_else(|| invalid("month must be between 01 and 12"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("upstream.endpoint", "https://example.com").is_ok());
        assert!(validate_url("upstream.endpoint", "http://example.com").is_ok());
        assert!(validate_url("upstream.endpoint", "").is_err());
        assert!(validate_url("upstream.endpoint", "invalid-url").is_err());
        assert!(validate_url("upstream.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_year_month() {
        assert!(validate_year_month("start", "202101").is_ok());
        assert!(validate_year_month("end", "199912").is_ok());
        assert!(validate_year_month("start", "202113").is_err());
        assert!(validate_year_month("start", "202100").is_err());
        assert!(validate_year_month("start", "2021").is_err());
        assert!(validate_year_month("start", "2021-01").is_err());
        assert!(validate_year_month("start", "").is_err());
    }

    #[test]
    fn test_validate_year_month_is_client_error() {
        let err = validate_year_month("start", "20211").unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("start"));
    }

    #[test]
    fn test_validate_non_empty_string_hides_value() {
        let err = validate_non_empty_string("upstream.service_key", "   ").unwrap_err();
        assert!(matches!(err, TradeError::MissingConfig { .. }));
        assert!(validate_non_empty_string("upstream.service_key", "abc").is_ok());
    }

    #[test]
    fn test_validate_socket_addr() {
        assert!(validate_socket_addr("server.bind", "127.0.0.1:8088").is_ok());
        assert!(validate_socket_addr("server.bind", "localhost").is_err());
    }
}
