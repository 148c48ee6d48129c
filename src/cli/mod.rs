//! CLI module for Parley
//!
//! - single-shot: `parley "prompt"` or `echo prompt | parley`
//! - interactive: `parley -i` with slash commands

use anyhow::{bail, Context};
use clap::Parser;
use std::io::IsTerminal;
use tokio::io::AsyncReadExt;

pub mod commands;
pub mod config;
pub mod display;
pub mod loader;
pub mod repl;

use config::SessionFactory;

/// Parley chat client
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(about = "Chat with a language model from the terminal")]
#[command(version)]
#[command(after_help = "Examples:
  parley 'What is Rust?'              # Single prompt
  parley -i                           # Interactive mode
  parley -s 'Tell me a story'         # Streaming reply
  parley --stats 'Explain ownership'  # Show token usage
  echo 'Summarize this' | parley      # Prompt from stdin")]
pub struct Cli {
    /// Prompt to send (read from stdin when omitted and input is piped)
    pub prompt: Option<String>,

    /// Model to use, overrides the configured model
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Stream the reply as it arrives (no usage stats)
    #[arg(short, long)]
    pub stream: bool,

    /// Interactive conversation with context
    #[arg(short, long)]
    pub interactive: bool,

    /// Show token usage and estimated cost
    #[arg(long, visible_alias = "show-tokens")]
    pub stats: bool,

    /// Maximum tokens per reply
    #[arg(long, value_name = "N")]
    pub max_tokens: Option<u32>,

    /// History bound, in messages
    #[arg(long, value_name = "N")]
    pub max_history: Option<usize>,

    /// Send every prompt without earlier context
    #[arg(long)]
    pub no_memory: bool,

    /// Chat backend
    #[arg(long, value_name = "NAME")]
    pub backend: Option<String>,
}

/// Run the CLI
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = loader::load_config()?;
    config.apply_cli(&cli);

    let factory = SessionFactory::from_config(&config).context("Invalid configuration")?;

    if cli.interactive {
        let input = tokio::io::BufReader::new(tokio::io::stdin());
        return repl::interactive(&factory, &config, input, &mut std::io::stdout()).await;
    }

    let prompt = match cli.prompt {
        Some(prompt) => prompt,
        None if !std::io::stdin().is_terminal() => {
            let mut input = String::new();
            tokio::io::stdin()
                .read_to_string(&mut input)
                .await
                .context("Failed to read prompt from stdin")?;
            input.trim().to_string()
        }
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            bail!("No prompt provided. Use -i for interactive mode or pass a prompt.");
        }
    };

    if prompt.is_empty() {
        bail!("Prompt is empty");
    }

    repl::single_shot(&factory, &config, &prompt, &mut std::io::stdout()).await
}
