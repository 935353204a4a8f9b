use std::{env, time::Duration};

use dotenv::dotenv;

use crate::error::ConfigError;

pub const API_URL_VAR: &str = "VERSEFEED_API_URL";
pub const TOKEN_VAR: &str = "VERSEFEED_TOKEN";
pub const TIMEOUT_VAR: &str = "VERSEFEED_TIMEOUT_SECS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the platform API, always ending in `/`.
    pub api_base_url: String,
    /// Session token. `None` means the viewer is signed out.
    pub auth_token: Option<String>,
    pub request_timeout: Duration,
}

impl Config {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Config {
            api_base_url: with_trailing_slash(api_base_url.into()),
            auth_token: None,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Loads the config from the environment, reading a local `.env` file first if there is one.
    pub fn load_env_config() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = lookup(API_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing(API_URL_VAR))?;
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                key: API_URL_VAR,
                value: api_base_url,
            });
        }

        let request_timeout = match lookup(TIMEOUT_VAR) {
            Some(secs) => secs
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::Invalid {
                    key: TIMEOUT_VAR,
                    value: secs,
                })?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Config {
            api_base_url: with_trailing_slash(api_base_url.trim().to_string()),
            auth_token: lookup(TOKEN_VAR).filter(|token| !token.trim().is_empty()),
            request_timeout,
        })
    }
}

fn with_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn loads_all_values() {
        let config = Config::from_lookup(lookup(&[
            (API_URL_VAR, "https://api.example.com/v1"),
            (TOKEN_VAR, "abc"),
            (TIMEOUT_VAR, "3"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "https://api.example.com/v1/");
        assert_eq!(config.auth_token.as_deref(), Some("abc"));
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn token_and_timeout_are_optional() {
        let config =
            Config::from_lookup(lookup(&[(API_URL_VAR, "http://localhost:8000/api/")])).unwrap();
        assert_eq!(config.auth_token, None);
        assert_eq!(config.request_timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn blank_token_means_signed_out() {
        let config = Config::from_lookup(lookup(&[
            (API_URL_VAR, "http://localhost:8000/"),
            (TOKEN_VAR, "  "),
        ]))
        .unwrap();
        assert_eq!(config.auth_token, None);
    }

    #[test]
    fn api_url_is_required() {
        assert_eq!(
            Config::from_lookup(lookup(&[])),
            Err(ConfigError::Missing(API_URL_VAR))
        );
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Config::from_lookup(lookup(&[(API_URL_VAR, "ftp://nope")])),
            Err(ConfigError::Invalid { key: API_URL_VAR, .. })
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[
                (API_URL_VAR, "http://localhost/"),
                (TIMEOUT_VAR, "zero")
            ])),
            Err(ConfigError::Invalid { key: TIMEOUT_VAR, .. })
        ));
    }
}
