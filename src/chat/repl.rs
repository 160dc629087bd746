use crate::agent::ChatAgent;
use crate::chat::transcript::Transcript;
use crate::error::Result;
use std::future::Future;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

pub const PROMPT: &str = "You: ";

/// What a line of input asks the loop to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    History,
    Clear,
    Chat(String),
    Empty,
}

impl Command {
    /// Commands are matched case-insensitively after trimming.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return Command::Empty;
        }

        match input.to_lowercase().as_str() {
            "exit" => Command::Exit,
            "history" => Command::History,
            "clear" => Command::Clear,
            _ => Command::Chat(input.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The user typed `exit`
    Exit,
    /// An interrupt signal arrived
    Interrupted,
    /// Input was closed
    EndOfInput,
    /// The configured number of chat turns was reached
    TurnLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub reason: ExitReason,
    pub turns: usize,
}

/// The read-eval-print loop and the transcript it owns.
pub struct Repl<A> {
    agent: A,
    transcript: Transcript,
    max_turns: Option<usize>,
    turns: usize,
}

impl<A: ChatAgent> Repl<A> {
    pub fn new(agent: A) -> Self {
        Self {
            agent,
            transcript: Transcript::new(),
            max_turns: None,
            turns: 0,
        }
    }

    /// End the session after this many successful chat turns.
    pub fn with_max_turns(mut self, max_turns: Option<usize>) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Number of chat turns completed so far
    pub fn turns(&self) -> usize {
        self.turns
    }

    /// Run one chat turn.
    ///
    /// The user message is recorded before the agent is called; the reply is
    /// recorded only if the agent succeeds.
    pub async fn send(&mut self, message: &str) -> Result<String> {
        self.transcript.push_user(message);

        let reply = self.agent.respond(self.transcript.messages()).await?;

        self.transcript.push_assistant(reply.as_str());
        self.turns += 1;
        Ok(reply)
    }

    pub fn write_banner<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", "=".repeat(60))?;
        writeln!(out, "MCP Chat - interactive agent with conversation memory")?;
        writeln!(out, "{}", "=".repeat(60))?;
        if let Some(max_turns) = self.max_turns {
            writeln!(out, "Max turns: {}", max_turns)?;
        }
        writeln!(out, "Type 'exit' to quit, 'history' to see memory, 'clear' to reset")?;
        writeln!(out)
    }

    /// Print the transcript as `role: content` lines.
    pub fn write_history<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.transcript.is_empty() {
            return writeln!(out, "No conversation history yet.");
        }

        for line in self.transcript.lines() {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }

    /// Read commands from `input` until the session ends.
    ///
    /// `interrupt` resolves when the user asks to stop (Ctrl-C); it is raced
    /// against both reading input and generating a reply.
    pub async fn run<R, W, I>(
        &mut self,
        input: R,
        output: &mut W,
        interrupt: I,
    ) -> Result<SessionSummary>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
        I: Future<Output = ()>,
    {
        tokio::pin!(interrupt);
        let mut input = input;
        let mut buf = Vec::new();

        let reason = loop {
            if self.limit_reached() {
                writeln!(output, "\nReached the limit of {} chat turns.", self.turns)?;
                break ExitReason::TurnLimit;
            }

            write!(output, "{}", PROMPT)?;
            output.flush()?;

            buf.clear();
            let read = tokio::select! {
                biased;
                _ = &mut interrupt => {
                    writeln!(output, "\n\nInterrupted by user.")?;
                    break ExitReason::Interrupted;
                }
                read = input.read_until(b'\n', &mut buf) => read?,
            };

            if read == 0 {
                writeln!(output, "\nGoodbye!")?;
                break ExitReason::EndOfInput;
            }

            let Ok(line) = std::str::from_utf8(&buf) else {
                warn!(bytes = buf.len(), "Ignoring input line that is not valid UTF-8");
                writeln!(output, "\nError: input is not valid UTF-8, line ignored.\n")?;
                continue;
            };

            match Command::parse(line) {
                Command::Empty => continue,
                Command::Exit => {
                    writeln!(output, "\nGoodbye! Thanks for chatting.")?;
                    break ExitReason::Exit;
                }
                Command::History => {
                    writeln!(output)?;
                    self.write_history(output)?;
                    writeln!(output)?;
                }
                Command::Clear => {
                    self.transcript.clear();
                    writeln!(output, "\nMemory cleared.\n")?;
                }
                Command::Chat(message) => {
                    let outcome = tokio::select! {
                        biased;
                        _ = &mut interrupt => None,
                        result = self.send(&message) => Some(result),
                    };

                    match outcome {
                        None => {
                            writeln!(output, "\n\nInterrupted by user.")?;
                            break ExitReason::Interrupted;
                        }
                        Some(Ok(reply)) => writeln!(output, "\nAgent: {}\n", reply)?,
                        Some(Err(e)) => {
                            warn!(error = %e, "Chat turn failed");
                            writeln!(output, "\nError: {}\n", e)?;
                        }
                    }
                }
            }
        };

        debug!(reason = ?reason, turns = self.turns, "Session ended");
        Ok(SessionSummary {
            reason,
            turns: self.turns,
        })
    }

    fn limit_reached(&self) -> bool {
        self.max_turns.is_some_and(|max| self.turns >= max)
    }
}
