//! Configuration management for the task runner.
//!
//! Configuration can be set via environment variables:
//! - `AIPROXY_TOKEN` - Bearer token for the completion API. When unset the literal
//!   `None` is sent and the remote service rejects the call.
//! - `COMPLETIONS_URL` - Optional. Chat completion endpoint. Defaults to the AI proxy.
//! - `DEFAULT_MODEL` - Optional. Model identifier. Defaults to `gpt-4o-mini`.
//! - `WORKSPACE_PATH` - Optional. Working directory for scripts and `/read`. Defaults to current directory.
//! - `HOST` - Optional. Server host. Defaults to `0.0.0.0`.
//! - `PORT` - Optional. Server port. Defaults to `8000`.
//! - `RUNNER_COMMAND` - Optional. Command that runs a script file. Defaults to `uv run`.
//! - `REQUIRES_PYTHON` - Optional. Runtime constraint in the script header. Defaults to `>= 3.12`.
//! - `SCRIPT_TIMEOUT_SECS` - Optional. Execution limit, `0` for none. Defaults to `300`.
//! - `READ_ANYWHERE` - Optional. Let `/read` serve paths outside the workspace. Defaults to `false`.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_COMPLETIONS_URL: &str =
    "https://aiproxy.sanand.workers.dev/openai/v1/chat/completions";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer token for the completion API (`None` when unset)
    pub api_token: Option<String>,

    /// Chat completion endpoint
    pub completions_url: String,

    /// Model identifier sent with every completion request
    pub default_model: String,

    /// Working directory for executed scripts and root for file reads
    pub workspace_path: PathBuf,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Program plus leading arguments; the script path is appended
    pub runner_command: Vec<String>,

    /// `requires-python` constraint written into the dependency header
    pub requires_python: String,

    /// Wall-clock limit for a single script execution
    pub script_timeout: Option<Duration>,

    /// Allow `/read` outside the workspace
    pub read_anywhere: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a numeric or boolean variable
    /// cannot be parsed, or if `RUNNER_COMMAND` is set but empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_token = std::env::var("AIPROXY_TOKEN").ok();

        let completions_url = std::env::var("COMPLETIONS_URL")
            .unwrap_or_else(|_| DEFAULT_COMPLETIONS_URL.to_string());

        let default_model =
            std::env::var("DEFAULT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let workspace_path = std::env::var("WORKSPACE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let runner_command = match std::env::var("RUNNER_COMMAND") {
            Ok(raw) => parse_runner_command(&raw)?,
            Err(_) => default_runner_command(),
        };

        let requires_python =
            std::env::var("REQUIRES_PYTHON").unwrap_or_else(|_| ">= 3.12".to_string());

        let timeout_secs: u64 = std::env::var("SCRIPT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidValue("SCRIPT_TIMEOUT_SECS".to_string(), format!("{}", e))
            })?;
        let script_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        let read_anywhere = std::env::var("READ_ANYWHERE")
            .ok()
            .map(|v| {
                parse_bool(&v).map_err(|e| ConfigError::InvalidValue("READ_ANYWHERE".to_string(), e))
            })
            .transpose()?
            .unwrap_or(false);

        Ok(Self {
            api_token,
            completions_url,
            default_model,
            workspace_path,
            host,
            port,
            runner_command,
            requires_python,
            script_timeout,
            read_anywhere,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(workspace_path: PathBuf) -> Self {
        Self {
            api_token: None,
            completions_url: DEFAULT_COMPLETIONS_URL.to_string(),
            default_model: "gpt-4o-mini".to_string(),
            workspace_path,
            host: "127.0.0.1".to_string(),
            port: 8000,
            runner_command: default_runner_command(),
            requires_python: ">= 3.12".to_string(),
            script_timeout: Some(Duration::from_secs(300)),
            read_anywhere: false,
        }
    }

    /// Token value placed in the `Authorization` header.
    pub fn bearer_token(&self) -> &str {
        self.api_token.as_deref().unwrap_or("None")
    }
}

fn default_runner_command() -> Vec<String> {
    vec!["uv".to_string(), "run".to_string()]
}

/// Split on whitespace; at least the program name is required.
fn parse_runner_command(raw: &str) -> Result<Vec<String>, ConfigError> {
    let parts: Vec<String> = raw.split_whitespace().map(str::to_string).collect();
    if parts.is_empty() {
        return Err(ConfigError::InvalidValue(
            "RUNNER_COMMAND".to_string(),
            "empty".to_string(),
        ));
    }
    Ok(parts)
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
        other => Err(format!("expected boolean-like value, got: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_token_falls_back_to_literal_none() {
        let config = Config::new(PathBuf::from("."));
        assert_eq!(config.bearer_token(), "None");

        let config = Config {
            api_token: Some("secret".to_string()),
            ..config
        };
        assert_eq!(config.bearer_token(), "secret");
    }

    #[test]
    fn runner_command_splits_on_whitespace() {
        assert_eq!(
            parse_runner_command("  uv   run --quiet ").unwrap(),
            vec!["uv", "run", "--quiet"]
        );
    }

    #[test]
    fn empty_runner_command_is_invalid_value() {
        let err = parse_runner_command("   ").unwrap_err();
        match err {
            ConfigError::InvalidValue(name, reason) => {
                assert_eq!(name, "RUNNER_COMMAND");
                assert_eq!(reason, "empty");
            }
        }
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("Yes"), Ok(true));
        assert_eq!(parse_bool(" off "), Ok(false));
        assert!(parse_bool("maybe").is_err());
    }
}
