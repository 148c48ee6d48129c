//! Interactive input classification

/// Words that end an interactive session
pub const EXIT_WORDS: [&str; 3] = ["exit", "quit", "bye"];

/// One line of interactive input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Blank line
    Empty,
    /// Leave the session
    Exit,
    /// `/clear`: empty the history
    Clear,
    /// `/status`: history summary
    Status,
    /// `/usage`: usage summary
    Usage,
    /// `/reset`: zero usage totals
    Reset,
    /// `/help`
    Help,
    /// Unrecognized slash command
    Unknown(String),
    /// Anything else is sent to the model
    Prompt(String),
}

impl ReplCommand {
    /// Classify a raw input line
    pub fn parse(line: &str) -> Self {
        let input = line.trim();
        if input.is_empty() {
            return Self::Empty;
        }

        let lowered = input.to_lowercase();
        if EXIT_WORDS.contains(&lowered.as_str()) {
            return Self::Exit;
        }

        if input.starts_with('/') {
            return match lowered.as_str() {
                "/clear" => Self::Clear,
                "/status" => Self::Status,
                "/usage" => Self::Usage,
                "/reset" => Self::Reset,
                "/help" => Self::Help,
                _ => Self::Unknown(input.to_string()),
            };
        }

        Self::Prompt(input.to_string())
    }
}

/// Slash command reference shown by `/help`
pub const HELP_TEXT: &str = "Commands:
  /clear   clear conversation history
  /status  conversation info
  /usage   token usage and cost so far
  /reset   reset usage tracking
  /help    show this help
  exit, quit or bye to leave";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_words() {
        for word in ["exit", "QUIT", "  Bye  "] {
            assert_eq!(ReplCommand::parse(word), ReplCommand::Exit);
        }
    }

    #[test]
    fn test_slash_commands() {
        assert_eq!(ReplCommand::parse("/clear"), ReplCommand::Clear);
        assert_eq!(ReplCommand::parse("/STATUS"), ReplCommand::Status);
        assert_eq!(ReplCommand::parse("/usage"), ReplCommand::Usage);
        assert_eq!(ReplCommand::parse("/reset"), ReplCommand::Reset);
        assert_eq!(ReplCommand::parse("/help"), ReplCommand::Help);
        assert_eq!(
            ReplCommand::parse("/teleport"),
            ReplCommand::Unknown("/teleport".to_string())
        );
    }

    #[test]
    fn test_prompts_and_blanks() {
        assert_eq!(ReplCommand::parse("   "), ReplCommand::Empty);
        assert_eq!(
            ReplCommand::parse("  exit the vim editor? "),
            ReplCommand::Prompt("exit the vim editor?".to_string())
        );
    }
}
