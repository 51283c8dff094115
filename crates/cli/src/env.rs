use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use connectors::{HttpConfig, RetryPolicy};
use tracing::debug;

use crate::error::CliError;

pub const DEV_KEY_VAR: &str = "TUBEFEED_DEV_KEY";
pub const TIMEOUT_VAR: &str = "TUBEFEED_TIMEOUT_SECS";
pub const MAX_RETRIES_VAR: &str = "TUBEFEED_MAX_RETRIES";
pub const USER_AGENT_VAR: &str = "TUBEFEED_USER_AGENT";

/// Environment variable manager that loads from system and .env files
#[derive(Debug, Clone)]
pub struct EnvManager {
    vars: HashMap<String, String>,
    sensitive_patterns: Vec<String>,
}

impl EnvManager {
    pub fn new() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            vars: vars.into_iter().collect(),
            sensitive_patterns: Self::default_sensitive_patterns(),
        }
    }

    /// Load variables from a .env file; file values win over the process
    /// environment.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CliError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read env file {}: {}", path.display(), e))
        })?;

        self.parse_env_content(&content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Builds the HTTP source configuration from the `TUBEFEED_*` variables.
    pub fn http_config(&self) -> Result<HttpConfig, CliError> {
        let mut config = HttpConfig::default();

        if let Some(key) = self.get(DEV_KEY_VAR) {
            config = config.with_dev_key(key);
        }
        if let Some(secs) = self.parse_var::<u64>(TIMEOUT_VAR)? {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(retries) = self.parse_var::<usize>(MAX_RETRIES_VAR)? {
            let base = config.retry.clone();
            config = config.with_retry(RetryPolicy::new(
                retries + 1,
                base.base_delay,
                base.max_delay,
            ));
        }
        if let Some(agent) = self.get(USER_AGENT_VAR) {
            config.user_agent = Some(agent.to_string());
        }

        debug!(
            "HTTP config: timeout={:?}, attempts={}, {}={}",
            config.timeout,
            config.retry.max_attempts,
            DEV_KEY_VAR,
            self.display_value(DEV_KEY_VAR)
        );
        Ok(config)
    }

    /// Value of `key` fit for logs: sensitive values are masked.
    pub fn display_value(&self, key: &str) -> String {
        match self.get(key) {
            None => "<unset>".to_string(),
            Some(_) if self.is_sensitive(key) => "****".to_string(),
            Some(value) => value.to_string(),
        }
    }

    fn is_sensitive(&self, key: &str) -> bool {
        let key = key.to_ascii_lowercase();
        self.sensitive_patterns.iter().any(|p| key.contains(p.as_str()))
    }

    fn parse_var<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>, CliError>
    where
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|e| CliError::Config(format!("Invalid value for {key}: {e}")))
            })
            .transpose()
    }

    fn parse_env_content(&mut self, content: &str) -> Result<(), CliError> {
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid env file: malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(CliError::Config(format!(
                    "Invalid env file: empty key at line {}",
                    line_num + 1
                )));
            }

            self.vars
                .insert(key.to_string(), Self::unquote_value(value));
        }

        Ok(())
    }

    fn unquote_value(value: &str) -> String {
        let value = value.trim();

        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                return value[1..value.len() - 1].to_string();
            }
        }

        value.to_string()
    }

    /// Default patterns for sensitive variable detection
    fn default_sensitive_patterns() -> Vec<String> {
        ["key", "secret", "token", "password", "auth"]
            .into_iter()
            .map(String::from)
            .collect()
    }
}

impl Default for EnvManager {
    fn default() -> Self {
        Self::new()
    }
}
