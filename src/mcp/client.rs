use crate::config::McpConfig;
use crate::error::Result;
use crate::llm::tools::LlmTool;
use crate::mcp::session::{McpSession, ToolSession};
use crate::mcp::tool::McpTool;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Owns every tool session for the lifetime of a chat.
///
/// Create it once before the loop starts and call [`McpClient::close`] once
/// after the loop ends.
pub struct McpClient {
    sessions: Vec<Arc<dyn ToolSession>>,
}

impl McpClient {
    /// Start every server in `config`.
    ///
    /// If any server fails to start, the ones already running are closed and
    /// the error is returned.
    pub async fn connect(config: &McpConfig) -> Result<Self> {
        let mut sessions: Vec<Arc<dyn ToolSession>> = Vec::with_capacity(config.servers.len());

        for (name, server) in &config.servers {
            match McpSession::spawn(name, server).await {
                Ok(session) => sessions.push(Arc::new(session)),
                Err(e) => {
                    Self::from_sessions(sessions).close().await;
                    return Err(e);
                }
            }
        }

        info!("Connected to {} tool server(s)", sessions.len());
        Ok(Self::from_sessions(sessions))
    }

    /// Wrap sessions that are already established.
    pub fn from_sessions(sessions: Vec<Arc<dyn ToolSession>>) -> Self {
        Self { sessions }
    }

    pub fn server_names(&self) -> Vec<&str> {
        self.sessions.iter().map(|s| s.server_name()).collect()
    }

    /// Discover the tools of every server, ready to hand to the LLM.
    ///
    /// Tool names must be unique across servers; on a clash the server listed
    /// first in the configuration file keeps the name.
    pub async fn tools(&self) -> Result<Vec<Box<dyn LlmTool>>> {
        let mut seen = HashSet::new();
        let mut tools: Vec<Box<dyn LlmTool>> = Vec::new();

        for session in &self.sessions {
            for info in session.list_tools().await? {
                if !seen.insert(info.name.clone()) {
                    warn!(
                        server = session.server_name(),
                        tool = %info.name,
                        "Duplicate tool name, skipping"
                    );
                    continue;
                }
                tools.push(Box::new(McpTool::new(session.clone(), info)));
            }
        }

        info!("Discovered {} tool(s)", tools.len());
        Ok(tools)
    }

    /// Close every session; failures are logged and do not stop the others.
    pub async fn close(&self) {
        for session in &self.sessions {
            if let Err(e) = session.close().await {
                warn!(server = session.server_name(), error = %e, "Failed to close tool session");
            }
        }
    }
}
