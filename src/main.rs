//! Interactive chat with a Groq-hosted model that can use MCP tool servers.
//!
//! Run with: GROQ_API_KEY=... cargo run

use anyhow::Context;
use mcp_chat::chat::ExitReason;
use mcp_chat::config::API_KEY_VAR;
use mcp_chat::prelude::*;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::sync::watch;
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Fatal Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let code = match runtime.block_on(run()) {
        Ok(summary) => {
            println!("{}", "=".repeat(60));
            println!("Session ended. Total turns: {}", summary.turns);
            println!("{}", "=".repeat(60));
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_fatal(&e);
            ExitCode::FAILURE
        }
    };

    // A pending stdin read sits on a blocking thread and cannot be cancelled
    runtime.shutdown_timeout(Duration::from_millis(200));
    code
}

/// Listen for Ctrl-C for the whole life of the process.
///
/// Installed before any tool server starts, so an early Ctrl-C still goes
/// through the normal shutdown path.
fn listen_for_ctrl_c() -> watch::Receiver<bool> {
    let (pressed, signal) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = pressed.send(true);
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for Ctrl-C");
                // Keep the sender alive so listeners never see a false interrupt
                std::future::pending::<()>().await;
            }
        }
    });
    signal
}

/// Resolves once Ctrl-C has been pressed.
async fn interrupted(mut signal: watch::Receiver<bool>) {
    if signal.wait_for(|pressed| *pressed).await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn interrupted_at_startup() -> SessionSummary {
    println!("\nInterrupted by user.");
    SessionSummary {
        reason: ExitReason::Interrupted,
        turns: 0,
    }
}

async fn run() -> anyhow::Result<SessionSummary> {
    let signal = listen_for_ctrl_c();

    let settings = Settings::from_env()?;

    let config = McpConfig::load(&settings.config_path)?;
    println!("✓ Configuration loaded from {}", settings.config_path.display());

    let gateway = GroqGateway::with_config(
        GroqConfig::new(&settings.api_key).with_base_url(&settings.base_url),
    )
    .context("Failed to initialize the LLM client")?;
    let broker =
        LlmBroker::new(&settings.model, Arc::new(gateway)).with_max_steps(settings.max_steps);
    println!("✓ Groq LLM initialized ({})", settings.model);

    let client = tokio::select! {
        biased;
        _ = interrupted(signal.clone()) => return Ok(interrupted_at_startup()),
        client = McpClient::connect(&config) => client.context("Failed to start tool servers")?,
    };

    let outcome = chat(&settings, broker, &client, signal).await;
    client.close().await;
    outcome
}

async fn chat(
    settings: &Settings,
    broker: LlmBroker,
    client: &McpClient,
    signal: watch::Receiver<bool>,
) -> anyhow::Result<SessionSummary> {
    let tools = tokio::select! {
        biased;
        _ = interrupted(signal.clone()) => return Ok(interrupted_at_startup()),
        tools = client.tools() => tools.context("Failed to list tools")?,
    };
    println!(
        "✓ MCP client initialized ({} server(s), {} tool(s))\n",
        client.server_names().len(),
        tools.len()
    );

    let agent = McpAgent::builder(broker)
        .tools(tools)
        .temperature(settings.temperature)
        .max_tokens(settings.max_tokens)
        .build();
    let mut repl = Repl::new(agent).with_max_turns(settings.max_turns);

    let mut stdout = std::io::stdout();
    repl.write_banner(&mut stdout)?;

    let summary = repl
        .run(
            BufReader::new(tokio::io::stdin()),
            &mut stdout,
            interrupted(signal),
        )
        .await?;
    Ok(summary)
}

fn report_fatal(error: &anyhow::Error) {
    match error.downcast_ref::<McpChatError>() {
        Some(McpChatError::MissingCredential(_)) => {
            eprintln!("Configuration Error: {:#}", error);
            eprintln!("\nPlease set the {} environment variable:", API_KEY_VAR);
            eprintln!("  Linux/Mac: export {}='your-api-key'", API_KEY_VAR);
            eprintln!("  Windows (PowerShell): $env:{}='your-api-key'", API_KEY_VAR);
            eprintln!("  or add {}=your-api-key to a .env file", API_KEY_VAR);
        }
        Some(McpChatError::ConfigError(_)) => eprintln!("Configuration Error: {:#}", error),
        _ => eprintln!("Fatal Error: {:#}", error),
    }
}
