//! Client configuration (environment driven).

use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const API_URL_VAR: &str = "CLINICA_API_URL";
pub const REQUEST_TIMEOUT_VAR: &str = "CLINICA_REQUEST_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash.
    pub api_base_url: String,
    /// Per-request timeout (native builds only; browsers apply their own).
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        let api_base_url = api_base_url.into();
        Self {
            api_base_url: api_base_url.trim().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Read `CLINICA_API_URL` / `CLINICA_REQUEST_TIMEOUT_SECS`.
    ///
    /// On wasm32 the URL is baked in at compile time.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    #[cfg(target_arch = "wasm32")]
    pub fn from_env() -> Self {
        Self::new(option_env!("CLINICA_API_URL").unwrap_or(DEFAULT_API_URL))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let url = lookup(API_URL_VAR)
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout = match lookup(REQUEST_TIMEOUT_VAR) {
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    tracing::warn!(value = %raw, "invalid {REQUEST_TIMEOUT_VAR}; using default");
                    DEFAULT_REQUEST_TIMEOUT_SECS
                }
            },
        };

        Self::new(url).with_timeout(Duration::from_secs(timeout))
    }

    /// Absolute URL for a backend path (`"auth/login"` or `"/auth/login"`).
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn reads_overrides_and_normalizes_slashes() {
        let config = ClientConfig::from_lookup(lookup(&[
            (API_URL_VAR, "https://clinica.example/api/ "),
            (REQUEST_TIMEOUT_VAR, "5"),
        ]));
        assert_eq!(config.api_base_url, "https://clinica.example/api");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.endpoint("/auth/login"), "https://clinica.example/api/auth/login");
        assert_eq!(config.endpoint("citas"), "https://clinica.example/api/citas");
    }

    #[test]
    fn bad_timeout_falls_back() {
        for raw in ["0", "soon", "-3"] {
            let config = ClientConfig::from_lookup(lookup(&[(REQUEST_TIMEOUT_VAR, raw)]));
            assert_eq!(config.request_timeout, Duration::from_secs(30));
        }
    }
}
