use std::env;

pub const DEFAULT_ENDPOINT: &str = "https://api.nsone.net/v1/";
pub const DEFAULT_USER_AGENT: &str = concat!("ns1-provider/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub endpoint: String,
    pub ignore_ssl: bool,
    pub user_agent: String,
}

impl ProviderConfig {
    /// # Errors
    ///
    /// Returns an error if `NS1_APIKEY` is unset or `NS1_IGNORE_SSL` is not a boolean.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if `NS1_APIKEY` is missing or empty, or if
    /// `NS1_IGNORE_SSL` holds something other than a boolean.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("NS1_APIKEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| "NS1_APIKEY: environment variable not found".to_string())?;

        let mut endpoint = lookup("NS1_ENDPOINT")
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }

        let ignore_ssl = match lookup("NS1_IGNORE_SSL") {
            None => false,
            Some(raw) => parse_bool(&raw).ok_or_else(|| format!("NS1_IGNORE_SSL: invalid boolean {raw:?}"))?,
        };

        Ok(Self {
            api_key,
            endpoint,
            ignore_ssl,
            user_agent: lookup("NS1_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "" | "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
