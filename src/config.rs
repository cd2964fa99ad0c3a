use std::{
    env,
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr},
    time::Duration,
};

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig {
    pub bind_address: String,
    pub port: u16,
    /// Where the JSON documents are fetched from. Defaults to this server's own `/data`.
    pub data_base_url: String,
    pub fetch_timeout: Duration,
    /// Page sessions kept at once, each with its own service bundle.
    pub session_capacity: usize,
    pub cache_enabled: bool,
    pub trust_proxy: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            data_base_url: local_data_url("0.0.0.0", 3000),
            fetch_timeout: Duration::from_secs(10),
            session_capacity: 1024,
            cache_enabled: false,
            trust_proxy: false,
        }
    }
}

impl SiteConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(bind) = lookup("BIND_ADDRESS") {
            config.bind_address = bind;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                value: port.clone(),
            })?;
        }
        config.data_base_url = lookup("DATA_BASE_URL")
            .unwrap_or_else(|| local_data_url(&config.bind_address, config.port));
        if let Some(secs) = lookup("FETCH_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "FETCH_TIMEOUT_SECS",
                value: secs.clone(),
            })?;
            config.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(capacity) = lookup("SESSION_CAPACITY") {
            let parsed: usize = capacity.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "SESSION_CAPACITY",
                value: capacity.clone(),
            })?;
            config.session_capacity = parsed;
        }
        config.cache_enabled = lookup("CACHE_ENABLED").is_some_and(|v| is_truthy(&v));
        config.trust_proxy = lookup("TRUST_PROXY").is_some_and(|v| is_truthy(&v));
        config.validate()?;
        Ok(config)
    }

    pub fn listen_addr(&self) -> String {
        match self.bind_address.trim().parse::<IpAddr>() {
            Ok(ip) => SocketAddr::new(ip, self.port).to_string(),
            Err(_) => format!("{}:{}", self.bind_address.trim(), self.port),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| {
            Err(ConfigError::Invalid {
                message: message.to_string(),
            })
        };
        if self.data_base_url.trim().is_empty() {
            return invalid("data base URL cannot be empty");
        }
        if !self.data_base_url.starts_with("http://") && !self.data_base_url.starts_with("https://")
        {
            return invalid("data base URL must start with http:// or https://");
        }
        if self.fetch_timeout.is_zero() {
            return invalid("fetch timeout must be greater than 0");
        }
        if self.session_capacity == 0 {
            return invalid("session capacity must be greater than 0");
        }
        if self.port == 0 {
            return invalid("port must be greater than 0");
        }
        Ok(())
    }
}

/// This server's own `/data`, reached through the bound address. Wildcard
/// binds are reached over loopback.
fn local_data_url(bind_address: &str, port: u16) -> String {
    let bind = bind_address.trim();
    let host = match bind.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) if ip.is_unspecified() => Ipv4Addr::LOCALHOST.to_string(),
        Ok(IpAddr::V6(ip)) if ip.is_unspecified() => format!("[{}]", Ipv6Addr::LOCALHOST),
        Ok(IpAddr::V4(ip)) => ip.to_string(),
        Ok(IpAddr::V6(ip)) => format!("[{ip}]"),
        Err(_) => bind.to_string(),
    };
    format!("http://{host}:{port}/data")
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_local_data() {
        let config = SiteConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.data_base_url, "http://127.0.0.1:3000/data");
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.listen_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn port_override_moves_default_data_url() {
        let config = SiteConfig::from_lookup(lookup(&[("PORT", "8080")])).unwrap();
        assert_eq!(config.data_base_url, "http://127.0.0.1:8080/data");
    }

    #[test]
    fn specific_bind_address_is_used_for_data() {
        let config =
            SiteConfig::from_lookup(lookup(&[("BIND_ADDRESS", "192.168.1.20"), ("PORT", "8080")]))
                .unwrap();
        assert_eq!(config.data_base_url, "http://192.168.1.20:8080/data");
        assert_eq!(config.listen_addr(), "192.168.1.20:8080");

        let config = SiteConfig::from_lookup(lookup(&[("BIND_ADDRESS", "localhost")])).unwrap();
        assert_eq!(config.data_base_url, "http://localhost:3000/data");
        assert_eq!(config.listen_addr(), "localhost:3000");
    }

    #[test]
    fn ipv6_binds_are_bracketed() {
        let config = SiteConfig::from_lookup(lookup(&[("BIND_ADDRESS", "::")])).unwrap();
        assert_eq!(config.listen_addr(), "[::]:3000");
        assert_eq!(config.data_base_url, "http://[::1]:3000/data");
        assert!(config.listen_addr().parse::<SocketAddr>().is_ok());

        let config = SiteConfig::from_lookup(lookup(&[("BIND_ADDRESS", "fd00::7")])).unwrap();
        assert_eq!(config.listen_addr(), "[fd00::7]:3000");
        assert_eq!(config.data_base_url, "http://[fd00::7]:3000/data");
    }

    #[test]
    fn explicit_values_are_used() {
        let config = SiteConfig::from_lookup(lookup(&[
            ("DATA_BASE_URL", "https://ada.github.io/data"),
            ("FETCH_TIMEOUT_SECS", "3"),
            ("CACHE_ENABLED", "TRUE"),
            ("TRUST_PROXY", "off"),
        ]))
        .unwrap();
        assert_eq!(config.data_base_url, "https://ada.github.io/data");
        assert_eq!(config.fetch_timeout, Duration::from_secs(3));
        assert!(config.cache_enabled);
        assert!(!config.trust_proxy);
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            SiteConfig::from_lookup(lookup(&[("PORT", "eighty")])),
            Err(ConfigError::InvalidValue {
                key: "PORT",
                value: "eighty".to_string()
            })
        );
        assert!(SiteConfig::from_lookup(lookup(&[("FETCH_TIMEOUT_SECS", "0")])).is_err());
        assert!(SiteConfig::from_lookup(lookup(&[("DATA_BASE_URL", "ftp://x")])).is_err());
        assert!(SiteConfig::from_lookup(lookup(&[("PORT", "0")])).is_err());
        assert!(SiteConfig::from_lookup(lookup(&[("SESSION_CAPACITY", "0")])).is_err());
        assert!(SiteConfig::from_lookup(lookup(&[("SESSION_CAPACITY", "many")])).is_err());
    }
}
