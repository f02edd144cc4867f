//! CLI entry point for foundry-agents.

pub mod auth;

use clap::{Parser, Subcommand};

use crate::session::{DEFAULT_AGENT_NAME, DEFAULT_INSTRUCTIONS, DEFAULT_MESSAGE, DEFAULT_MODEL};

/// Drive hosted Azure AI Foundry agents.
#[derive(Parser, Debug)]
#[command(name = "foundry-agents", version, about = "Run and inspect hosted Azure AI Foundry agents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an agent with the sample tools, run one message through it,
    /// then delete the agent and print the thread
    Run(RunArgs),
    /// Print every message of a thread, oldest first
    Messages(MessagesArgs),
    /// Delete an agent
    DeleteAgent(DeleteAgentArgs),
    /// Credential management
    Auth(AuthArgs),
}

/// Arguments for `foundry-agents run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Model deployment name
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Agent name
    #[arg(short, long, default_value = DEFAULT_AGENT_NAME)]
    pub name: String,

    /// Agent instructions
    #[arg(short, long, default_value = DEFAULT_INSTRUCTIONS)]
    pub instructions: String,

    /// User message posted to the thread
    #[arg(long, default_value = DEFAULT_MESSAGE)]
    pub message: String,

    /// Give up (and cancel the run) after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Do not attach the code interpreter tool
    #[arg(long)]
    pub no_code_interpreter: bool,
}

#[derive(Parser, Debug)]
pub struct MessagesArgs {
    pub thread_id: String,
}

#[derive(Parser, Debug)]
pub struct DeleteAgentArgs {
    pub agent_id: String,
}

/// Arguments for the `auth` subcommand group.
#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommands,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Acquire a token through the default credential chain
    Token(TokenArgs),
    /// Remove cached tokens
    Logout,
}

#[derive(Parser, Debug)]
pub struct TokenArgs {
    /// Print the raw access token
    #[arg(long)]
    pub show: bool,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_run_with_defaults() {
        let cli = Cli::try_parse_from(["foundry-agents", "run"]).unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.model, "gpt-4o-mini");
                assert_eq!(args.name, "my-assistant");
                assert_eq!(args.instructions, "You are a helpful assistant");
                assert!(args.message.contains("New York"));
                assert!(args.timeout_secs.is_none());
                assert!(!args.no_code_interpreter);
            }
            other => panic!("expected Run, got {other:?}"),
        }
    }

    #[test]
    fn parse_run_with_all_options() {
        let cli = Cli::try_parse_from([
            "foundry-agents",
            "run",
            "-m",
            "gpt-4o",
            "--name",
            "weather-bot",
            "--message",
            "What is the weather in Tokyo?",
            "--timeout-secs",
            "90",
            "--no-code-interpreter",
        ])
        .unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.model, "gpt-4o");
                assert_eq!(args.name, "weather-bot");
                assert_eq!(args.message, "What is the weather in Tokyo?");
                assert_eq!(args.timeout_secs, Some(90));
                assert!(args.no_code_interpreter);
            }
            other => panic!("expected Run, got {other:?}"),
        }
    }

    #[test]
    fn parse_messages_and_delete_agent() {
        let cli = Cli::try_parse_from(["foundry-agents", "messages", "thread_1"]).unwrap();
        assert!(matches!(cli.command, Commands::Messages(args) if args.thread_id == "thread_1"));

        let cli = Cli::try_parse_from(["foundry-agents", "delete-agent", "asst_1"]).unwrap();
        assert!(matches!(cli.command, Commands::DeleteAgent(args) if args.agent_id == "asst_1"));
    }

    #[test]
    fn parse_auth_commands() {
        let cli = Cli::try_parse_from(["foundry-agents", "auth", "token", "--show"]).unwrap();
        match cli.command {
            Commands::Auth(auth) => {
                assert!(matches!(auth.command, AuthCommands::Token(TokenArgs { show: true })))
            }
            other => panic!("expected Auth, got {other:?}"),
        }

        let cli = Cli::try_parse_from(["foundry-agents", "auth", "logout"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Auth(AuthArgs {
                command: AuthCommands::Logout
            })
        ));
    }

    #[test]
    fn parse_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["foundry-agents"]).is_err());
        assert!(Cli::try_parse_from(["foundry-agents", "messages"]).is_err());
    }
}
