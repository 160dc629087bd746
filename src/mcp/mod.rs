//! Model Context Protocol client.
//!
//! Each configured tool server is launched as a child process and driven
//! through the `rmcp` SDK over its stdin/stdout. The chat side only sees the
//! [`ToolSession`] seam and the tools it exposes as [`McpTool`]s.

pub mod client;
pub mod protocol;
pub mod session;
pub mod tool;

pub use client::McpClient;
pub use protocol::{CallToolResult, McpToolInfo, ToolContent};
pub use session::{McpSession, ToolSession};
pub use tool::McpTool;
