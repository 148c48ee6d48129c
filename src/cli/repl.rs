//! Single-shot and interactive chat loops

use super::commands::{ReplCommand, HELP_TEXT};
use super::config::{AppConfig, SessionFactory};
use super::display::{write_reply, write_stats, write_usage_line};
use anyhow::{Context, Result};
use parley_llm::ChatSession;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

/// Send one prompt in a fresh session and print the reply
pub async fn single_shot<W: Write>(
    factory: &SessionFactory,
    config: &AppConfig,
    prompt: &str,
    out: &mut W,
) -> Result<()> {
    let session = factory.open()?;
    let result = session.exchange(prompt, config.delivery_mode()).await?;
    let usage = write_reply(out, result).await?;

    if config.show_stats {
        write_stats(out, usage.as_ref())?;
    }
    Ok(())
}

/// Read prompts line by line until an exit word, EOF or Ctrl+C.
///
/// With memory enabled one session carries context across prompts;
/// otherwise every prompt gets a fresh session and the memory commands only
/// report that memory is off. Failed exchanges are reported and the loop
/// continues.
pub async fn interactive<R, W>(
    factory: &SessionFactory,
    config: &AppConfig,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let memory = config.conversation.memory;
    let session = factory.open()?;

    writeln!(
        out,
        "Starting interactive chat ({} via {}). Conversation memory: {}.",
        factory.model(),
        session.backend_name(),
        if memory { "enabled" } else { "disabled" }
    )?;
    writeln!(
        out,
        "Type 'exit', 'quit', or 'bye' to end. Type '/help' for commands.{}",
        if config.show_stats {
            " Token usage will be displayed."
        } else {
            ""
        }
    )?;
    writeln!(out, "{}", "-".repeat(70))?;

    let mut lines = input.lines();
    loop {
        write!(out, "\nYou: ")?;
        out.flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read input")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            writeln!(out, "\nGoodbye!")?;
            break;
        };

        match ReplCommand::parse(&line) {
            ReplCommand::Empty => continue,
            ReplCommand::Exit => {
                writeln!(out, "Goodbye!")?;
                break;
            }
            ReplCommand::Clear => {
                if memory {
                    session.clear().await;
                    writeln!(out, "Conversation history cleared.")?;
                } else {
                    writeln!(out, "No conversation memory to clear.")?;
                }
            }
            ReplCommand::Status => {
                if memory {
                    writeln!(out, "Status: {}", session.summary().await)?;
                } else {
                    writeln!(out, "Status: Conversation memory disabled")?;
                }
            }
            ReplCommand::Usage => {
                if memory {
                    writeln!(out, "Usage: {}", session.usage_summary().await)?;
                } else {
                    writeln!(out, "Usage tracking not available without conversation memory")?;
                }
            }
            ReplCommand::Reset => {
                if memory {
                    session.reset_usage().await;
                    writeln!(out, "Usage tracking reset.")?;
                } else {
                    writeln!(out, "No usage tracking to reset")?;
                }
            }
            ReplCommand::Help => writeln!(out, "{}", HELP_TEXT)?,
            ReplCommand::Unknown(command) => writeln!(
                out,
                "Unknown command: {}. Type '/help' for a list of commands.",
                command
            )?,
            ReplCommand::Prompt(prompt) => {
                let turn = if memory {
                    exchange_turn(&session, &prompt, config, out).await
                } else {
                    let single = factory.open()?;
                    exchange_turn(&single, &prompt, config, out).await
                };
                if let Err(err) = turn {
                    debug!(error = %err, "Exchange failed in interactive mode");
                    writeln!(out, "Error: {}", err)?;
                }
            }
        }
    }

    Ok(())
}

async fn exchange_turn<W: Write>(
    session: &ChatSession,
    prompt: &str,
    config: &AppConfig,
    out: &mut W,
) -> Result<()> {
    write!(out, "Assistant: ")?;
    out.flush()?;

    let result = match session.exchange(prompt, config.delivery_mode()).await {
        Ok(result) => result,
        Err(err) => {
            writeln!(out)?;
            return Err(err.into());
        }
    };
    let usage = write_reply(out, result).await?;

    if config.show_stats {
        let summary = if config.conversation.memory {
            Some(session.usage_summary().await)
        } else {
            None
        };
        write_usage_line(out, usage.as_ref(), summary.as_deref())?;
    }
    Ok(())
}
