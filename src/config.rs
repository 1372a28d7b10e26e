use std::env;
use std::net::SocketAddr;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;
pub const DEFAULT_AMENDMENT_TITLE: &str = "Proposed Constitutional Amendment";
pub const DEFAULT_AMENDMENT_DESCRIPTION: &str =
    "Shall the Constitution be amended as set out in the published text of this proposal?";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is not a valid value: {value}")]
    Invalid { key: &'static str, value: String },
    #[error("BCRYPT_COST must be between {min} and {max}, got {got}")]
    BcryptCostOutOfRange { min: u32, max: u32, got: u32 },
}

/// Static text of the single amendment on the ballot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Amendment {
    pub title: String,
    pub description: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// `None` runs against the in-process store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub bcrypt_cost: u32,
    pub amendment: Amendment,
}

impl Config {
    /// Reads the process environment. `.env` is loaded by the binary before this runs.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = parse_or(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR)?;
        let db_max_connections = parse_or(
            &lookup,
            "DB_MAX_CONNECTIONS",
            &DEFAULT_MAX_CONNECTIONS.to_string(),
        )?;

        let bcrypt_cost: u32 = parse_or(&lookup, "BCRYPT_COST", &bcrypt::DEFAULT_COST.to_string())?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::BcryptCostOutOfRange {
                min: 4,
                max: 31,
                got: bcrypt_cost,
            });
        }

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let amendment = Amendment {
            title: lookup("AMENDMENT_TITLE").unwrap_or_else(|| DEFAULT_AMENDMENT_TITLE.to_string()),
            description: lookup("AMENDMENT_DESCRIPTION")
                .unwrap_or_else(|| DEFAULT_AMENDMENT_DESCRIPTION.to_string()),
        };

        Ok(Config {
            bind_addr,
            database_url,
            db_max_connections,
            bcrypt_cost,
            amendment,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let value = lookup(key).unwrap_or_else(|| default.to_string());
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}
