use thiserror::Error;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const DATABASE: &str = "travel";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("BCRYPT_COST must be a number between 4 and 31, got {0:?}")]
    InvalidBcryptCost(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// When absent the server keeps its data in memory.
    pub mongodb_uri: Option<String>,
    pub database: String,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| HOST.to_string());
        let port = lookup("PORT")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(PORT);
        let mongodb_uri = lookup("MONGODB_URI").filter(|uri| !uri.trim().is_empty());
        let database = lookup("MONGODB_DATABASE").unwrap_or_else(|| DATABASE.to_string());

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(cost) if (4..=31).contains(&cost) => cost,
                _ => return Err(ConfigError::InvalidBcryptCost(raw)),
            },
            None => bcrypt::DEFAULT_COST,
        };

        Ok(Self {
            host,
            port,
            mongodb_uri,
            database,
            bcrypt_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.mongodb_uri, None);
        assert_eq!(config.database, "travel");
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
    }

    #[test]
    fn unparsable_port_falls_back_to_default() {
        let config = AppConfig::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn blank_mongodb_uri_means_in_memory() {
        let config = AppConfig::from_lookup(lookup_from(&[("MONGODB_URI", "  ")])).unwrap();
        assert!(config.mongodb_uri.is_none());
    }

    #[test]
    fn out_of_range_bcrypt_cost_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("BCRYPT_COST", "2")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidBcryptCost("2".to_string()));
    }

    #[test]
    #[serial]
    fn reads_process_environment() {
        std::env::set_var("PORT", "9191");
        std::env::set_var("MONGODB_DATABASE", "bucket_list");
        let config = AppConfig::from_env().unwrap();
        std::env::remove_var("PORT");
        std::env::remove_var("MONGODB_DATABASE");

        assert_eq!(config.port, 9191);
        assert_eq!(config.database, "bucket_list");
    }
}
