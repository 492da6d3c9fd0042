use crate::error::{CodarchError, Result};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use tracing::info;

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const PORT_VAR: &str = "PORT";
pub const BIND_ADDR_VAR: &str = "BIND_ADDR";
pub const ALLOWED_ORIGINS_VAR: &str = "ALLOWED_ORIGINS";

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173";

/// Runtime settings for the API server.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`. `DATABASE_URL` is mandatory.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = load_database_url(&lookup)?;

        let port = try_load(&lookup, PORT_VAR, DEFAULT_PORT)?;
        let bind_addr = lookup(BIND_ADDR_VAR).unwrap_or_else(|| {
            info!("{BIND_ADDR_VAR} not set, using default: {DEFAULT_BIND_ADDR}");
            DEFAULT_BIND_ADDR.to_string()
        });
        let origins = lookup(ALLOWED_ORIGINS_VAR).unwrap_or_else(|| {
            info!("{ALLOWED_ORIGINS_VAR} not set, using default: {DEFAULT_ALLOWED_ORIGINS}");
            DEFAULT_ALLOWED_ORIGINS.to_string()
        });

        Ok(Self {
            database_url,
            bind_addr,
            port,
            allowed_origins: parse_origins(&origins)?,
        })
    }

    /// `host:port` the server listens on.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| CodarchError::InvalidConfig(format!("invalid {key} value '{raw}': {e}"))),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

/// The mandatory database location, trimmed. Blank counts as missing.
pub fn load_database_url<F>(lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(DATABASE_URL_VAR)
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or_else(|| {
            CodarchError::InvalidConfig(format!(
                "{DATABASE_URL_VAR} is required, set it in the environment"
            ))
        })
}

/// Split a comma-separated origin list, dropping empty entries. Each entry
/// must be `scheme://host[:port]` with no path, query or whitespace.
pub fn parse_origins(raw: &str) -> Result<Vec<String>> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            if is_valid_origin(origin) {
                Ok(origin.to_string())
            } else {
                Err(CodarchError::InvalidConfig(format!(
                    "invalid origin '{origin}', expected scheme://host[:port]"
                )))
            }
        })
        .collect()
}

fn is_valid_origin(origin: &str) -> bool {
    let Some((scheme, authority)) = origin.split_once("://") else {
        return false;
    };

    let scheme_ok = scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));

    let (host, port) = if let Some(rest) = authority.strip_prefix('[') {
        // IPv6 literal: [addr] or [addr]:port
        match rest.split_once(']') {
            Some((addr, "")) => (addr, None),
            Some((addr, tail)) => match tail.strip_prefix(':') {
                Some(port) => (addr, Some(port)),
                None => return false,
            },
            None => return false,
        }
    } else {
        match authority.split_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (authority, None),
        }
    };

    let bracketed = authority.starts_with('[');
    let host_ok = !host.is_empty()
        && host.chars().all(|c| {
            if bracketed {
                c.is_ascii_hexdigit() || matches!(c, ':' | '.')
            } else {
                c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')
            }
        });
    let port_ok = port.map_or(true, |port| port.parse::<u16>().is_ok());

    scheme_ok && host_ok && port_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_database_url_is_fatal() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, CodarchError::InvalidConfig(_)));

        let err = Config::from_lookup(lookup_from(&[(DATABASE_URL_VAR, "  ")])).unwrap_err();
        assert!(matches!(err, CodarchError::InvalidConfig(_)));
        assert!(err.to_string().contains("is required"));
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup_from(&[(DATABASE_URL_VAR, "codarch.db")])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.allowed_origins, vec![DEFAULT_ALLOWED_ORIGINS.to_string()]);
        assert_eq!(config.listen_address(), "0.0.0.0:3000");
    }

    #[test]
    fn origins_are_trimmed_and_empties_dropped() {
        let config = Config::from_lookup(lookup_from(&[
            (DATABASE_URL_VAR, ":memory:"),
            (PORT_VAR, "8080"),
            (
                ALLOWED_ORIGINS_VAR,
                " http://localhost:5173 , https://codarch.example.com,,",
            ),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.allowed_origins,
            vec![
                "http://localhost:5173".to_string(),
                "https://codarch.example.com".to_string()
            ]
        );
    }

    #[test]
    fn bad_port_and_bad_origin_are_rejected() {
        assert!(Config::from_lookup(lookup_from(&[
            (DATABASE_URL_VAR, ":memory:"),
            (PORT_VAR, "eighty"),
        ]))
        .is_err());
        assert!(parse_origins("localhost:5173").is_err());
        assert!(parse_origins("http://localhost:5173/app").is_err());
        assert!(parse_origins("http://bad host").is_err());
        assert!(parse_origins("http://a?b").is_err());
        assert!(parse_origins("http://localhost:99999").is_err());
        assert!(parse_origins("http://").is_err());
        assert!(parse_origins("1http://localhost").is_err());
        assert!(parse_origins("http://[::1]:8080, https://codarch.example.com:443").is_ok());
    }
}
