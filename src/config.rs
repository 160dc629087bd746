//! Startup configuration.
//!
//! Two sources feed a session: the tool-server JSON document, which says which
//! MCP servers to launch, and the process environment, which carries the API
//! credential and runtime knobs. Both are read once and never mutated.

use crate::error::{McpChatError, Result};
use crate::llm::broker::DEFAULT_MAX_STEPS;
use crate::llm::gateways::DEFAULT_GROQ_BASE_URL;
use serde::Deserialize;
use serde_json::Value;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const API_KEY_VAR: &str = "GROQ_API_KEY";
pub const MODEL_VAR: &str = "GROQ_MODEL";
pub const BASE_URL_VAR: &str = "GROQ_API_ENDPOINT";
pub const CONFIG_PATH_VAR: &str = "MCP_CHAT_CONFIG";
pub const TEMPERATURE_VAR: &str = "MCP_CHAT_TEMPERATURE";
pub const MAX_STEPS_VAR: &str = "MCP_CHAT_MAX_STEPS";
pub const MAX_TURNS_VAR: &str = "MCP_CHAT_MAX_TURNS";
pub const MAX_TOKENS_VAR: &str = "MCP_CHAT_MAX_TOKENS";

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_CONFIG_PATH: &str = "browser_mcp.json";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Launch descriptor for one tool server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolServerConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// The set of named tool servers to start, in the order the file lists them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct McpConfig {
    pub servers: IndexMap<String, ToolServerConfig>,
}

impl McpConfig {
    /// Read and validate the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => McpChatError::ConfigError(format!(
                "configuration file not found: {}",
                path.display()
            )),
            _ => McpChatError::ConfigError(format!("cannot read {}: {}", path.display(), e)),
        })?;

        let config = Self::from_json(&raw).map_err(|e| match e {
            McpChatError::ConfigError(msg) => {
                McpChatError::ConfigError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;

        debug!(path = %path.display(), servers = config.servers.len(), "Configuration loaded");
        Ok(config)
    }

    /// Parse a configuration document.
    ///
    /// Accepts `{"mcpServers": {...}}` as well as a bare map of server name to
    /// descriptor. Every entry must carry a non-empty `command`.
    pub fn from_json(raw: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(raw)
            .map_err(|e| McpChatError::ConfigError(format!("invalid JSON: {}", e)))?;

        let Value::Object(mut root) = document else {
            return Err(McpChatError::ConfigError(
                "top level must be a JSON object".to_string(),
            ));
        };

        let entries = match root.remove("mcpServers") {
            Some(Value::Object(servers)) => servers,
            Some(_) => {
                return Err(McpChatError::ConfigError(
                    "\"mcpServers\" must be a JSON object".to_string(),
                ))
            }
            None => root,
        };

        let mut servers = IndexMap::new();
        for (name, entry) in entries {
            let server: ToolServerConfig = serde_json::from_value(entry).map_err(|e| {
                McpChatError::ConfigError(format!("tool server '{}': {}", name, e))
            })?;

            if server.command.trim().is_empty() {
                return Err(McpChatError::ConfigError(format!(
                    "tool server '{}': command must not be empty",
                    name
                )));
            }

            servers.insert(name, server);
        }

        if servers.is_empty() {
            warn!("No tool servers configured; chatting without tools");
        }

        Ok(Self { servers })
    }
}

/// Runtime settings taken from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub config_path: PathBuf,
    pub temperature: f32,
    pub max_steps: usize,
    pub max_turns: Option<usize>,
    /// Per-reply token cap, left to the provider when unset
    pub max_tokens: Option<usize>,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key =
            var(API_KEY_VAR).ok_or_else(|| McpChatError::MissingCredential(API_KEY_VAR.into()))?;

        Ok(Self {
            api_key,
            model: var(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: var(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_GROQ_BASE_URL.to_string()),
            config_path: var(CONFIG_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
            temperature: parse_var(TEMPERATURE_VAR, var(TEMPERATURE_VAR))?
                .unwrap_or(DEFAULT_TEMPERATURE),
            max_steps: parse_var(MAX_STEPS_VAR, var(MAX_STEPS_VAR))?.unwrap_or(DEFAULT_MAX_STEPS),
            max_turns: parse_var(MAX_TURNS_VAR, var(MAX_TURNS_VAR))?,
            max_tokens: parse_var(MAX_TOKENS_VAR, var(MAX_TOKENS_VAR))?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: Option<String>) -> Result<Option<T>> {
    value
        .map(|v| {
            v.trim().parse().map_err(|_| {
                McpChatError::ConfigError(format!("{} has an invalid value: {}", key, v))
            })
        })
        .transpose()
}
