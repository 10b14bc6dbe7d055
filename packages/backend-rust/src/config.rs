use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use affinity_algo::DomainIndex;

const DEFAULT_DOMAINS: &str = "math,physics,chemistry,biology,language,history";
const DEFAULT_ASSIGNMENT_TTL_HOURS: i64 = 168;
const DEFAULT_EXPIRY_SCHEDULE: &str = "0 0 * * * *";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub domains: DomainIndex,
    pub assignment_ttl: chrono::Duration,
    pub expiry_schedule: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("AFFINITY_DOMAINS must name at least one domain")]
    NoDomains,
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let raw_domains =
            std::env::var("AFFINITY_DOMAINS").unwrap_or_else(|_| DEFAULT_DOMAINS.to_string());
        let domains = DomainIndex::parse(&raw_domains);
        if domains.is_empty() {
            return Err(ConfigError::NoDomains);
        }

        let ttl_hours = match std::env::var("ASSIGNMENT_TTL_HOURS") {
            Ok(raw) => match raw.trim().parse::<i64>() {
                Ok(hours) if hours > 0 => hours,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "ASSIGNMENT_TTL_HOURS",
                        value: raw,
                    })
                }
            },
            Err(_) => DEFAULT_ASSIGNMENT_TTL_HOURS,
        };

        let expiry_schedule = std::env::var("ASSIGNMENT_EXPIRY_SCHEDULE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EXPIRY_SCHEDULE.to_string());

        Ok(Self {
            host,
            port,
            log_level,
            domains,
            assignment_ttl: chrono::Duration::hours(ttl_hours),
            expiry_schedule,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 3000,
            log_level: "info".to_string(),
            domains: DomainIndex::parse(DEFAULT_DOMAINS),
            assignment_ttl: chrono::Duration::hours(DEFAULT_ASSIGNMENT_TTL_HOURS),
            expiry_schedule: DEFAULT_EXPIRY_SCHEDULE.to_string(),
        }
    }
}
