//! Sessions with individual tool servers, driven by the `rmcp` client.

use crate::config::ToolServerConfig;
use crate::error::{McpChatError, Result};
use crate::mcp::protocol::{CallToolResult, McpToolInfo};
use async_trait::async_trait;
use rmcp::model::{
    CallToolRequestParam, ClientCapabilities, ClientInfo, Implementation, JsonObject,
    LoggingLevel, LoggingMessageNotificationParam, ProtocolVersion,
};
use rmcp::service::{NotificationContext, Peer, RunningService, ServiceError};
use rmcp::transport::{IntoTransport, TokioChildProcess};
use rmcp::{ClientHandler, RoleClient};
use serde_json::Value;
use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

pub const CLIENT_NAME: &str = "mcp-chat";

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// A live connection to one tool server.
///
/// This is the seam between the chat agent and the outside world: tools are
/// discovered with `list_tools` and invoked with `call_tool`.
#[async_trait]
pub trait ToolSession: Send + Sync {
    /// Name of the server as given in the configuration
    fn server_name(&self) -> &str;

    /// List every tool the server exposes
    async fn list_tools(&self) -> Result<Vec<McpToolInfo>>;

    /// Invoke a tool by name
    async fn call_tool(&self, name: &str, arguments: &HashMap<String, Value>)
        -> Result<CallToolResult>;

    /// End the session and release the server
    async fn close(&self) -> Result<()>;
}

/// Identifies this client during the handshake and routes server log
/// notifications into `tracing`.
#[derive(Clone)]
struct ChatClientHandler {
    server: String,
    info: ClientInfo,
}

impl ChatClientHandler {
    fn new(server: &str) -> Self {
        Self {
            server: server.to_string(),
            info: ClientInfo {
                protocol_version: ProtocolVersion::LATEST,
                capabilities: ClientCapabilities::default(),
                client_info: Implementation {
                    name: CLIENT_NAME.to_string(),
                    title: None,
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    icons: None,
                    website_url: None,
                },
            },
        }
    }
}

impl ClientHandler for ChatClientHandler {
    fn get_info(&self) -> ClientInfo {
        self.info.clone()
    }

    async fn on_logging_message(
        &self,
        params: LoggingMessageNotificationParam,
        _context: NotificationContext<RoleClient>,
    ) {
        let LoggingMessageNotificationParam {
            level,
            logger,
            data,
        } = params;
        let logger = logger.as_deref().unwrap_or("-");
        match level {
            LoggingLevel::Debug => debug!(server = %self.server, logger, %data, "Tool server log"),
            LoggingLevel::Info | LoggingLevel::Notice => {
                info!(server = %self.server, logger, %data, "Tool server log")
            }
            LoggingLevel::Warning => warn!(server = %self.server, logger, %data, "Tool server log"),
            _ => error!(server = %self.server, logger, %data, "Tool server log"),
        }
    }
}

/// MCP client session with one server.
pub struct McpSession {
    name: String,
    peer: Peer<RoleClient>,
    service: Mutex<Option<RunningService<RoleClient, ChatClientHandler>>>,
}

impl McpSession {
    /// Launch the server process described by `config` and run the handshake.
    ///
    /// The server's stderr is discarded so it cannot interleave with the prompt.
    pub async fn spawn(name: &str, config: &ToolServerConfig) -> Result<Self> {
        info!(server = name, command = %config.command, "Starting tool server");

        let mut command = Command::new(&config.command);
        command.args(&config.args).envs(&config.env).kill_on_drop(true);

        let (transport, _stderr) = TokioChildProcess::builder(command)
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                McpChatError::ToolSessionError(format!(
                    "failed to start '{}' ({}): {}",
                    name, config.command, e
                ))
            })?;

        Self::connect(name, transport).await
    }

    /// Run the `initialize` handshake over an already-open transport.
    pub async fn connect<T, E, A>(name: &str, transport: T) -> Result<Self>
    where
        T: IntoTransport<RoleClient, E, A>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let service = rmcp::serve_client(ChatClientHandler::new(name), transport)
            .await
            .map_err(|e| {
                McpChatError::ToolSessionError(format!("'{}' failed to initialize: {}", name, e))
            })?;
        let peer = service.peer().clone();

        if let Some(info) = peer.peer_info() {
            debug!(
                server = name,
                server_name = %info.server_info.name,
                protocol = %info.protocol_version,
                "Tool session initialized"
            );
        }

        Ok(Self {
            name: name.to_string(),
            peer,
            service: Mutex::new(Some(service)),
        })
    }

    /// What the server reported about itself during the handshake
    pub fn server_info(&self) -> Option<&rmcp::model::ServerInfo> {
        self.peer.peer_info()
    }

    fn request_failed(&self, e: ServiceError) -> McpChatError {
        match e {
            ServiceError::McpError(error) => McpChatError::ToolError(error.message.to_string()),
            other => McpChatError::ToolSessionError(format!("'{}': {}", self.name, other)),
        }
    }
}

#[async_trait]
impl ToolSession for McpSession {
    fn server_name(&self) -> &str {
        &self.name
    }

    async fn list_tools(&self) -> Result<Vec<McpToolInfo>> {
        let tools = self
            .peer
            .list_all_tools()
            .await
            .map_err(|e| self.request_failed(e))?;

        debug!(server = %self.name, count = tools.len(), "Listed tools");
        Ok(tools.into_iter().map(McpToolInfo::from).collect())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: &HashMap<String, Value>,
    ) -> Result<CallToolResult> {
        let arguments: JsonObject = arguments
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let result = self
            .peer
            .call_tool(CallToolRequestParam {
                name: name.to_string().into(),
                arguments: Some(arguments),
            })
            .await
            .map_err(|e| self.request_failed(e))?;

        Ok(result.into())
    }

    async fn close(&self) -> Result<()> {
        let Some(service) = self.service.lock().await.take() else {
            return Ok(());
        };

        match tokio::time::timeout(SHUTDOWN_GRACE, service.cancel()).await {
            Ok(Ok(reason)) => debug!(server = %self.name, reason = ?reason, "Tool session closed"),
            Ok(Err(e)) => warn!(server = %self.name, error = %e, "Tool session task failed"),
            Err(_) => warn!(server = %self.name, "Tool server did not shut down in time"),
        }

        Ok(())
    }
}
