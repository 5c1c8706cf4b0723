//! CLI module for the retrieval agent
//!
//! Provides subcommands for running the agent in different modes:
//! - `serve`: HTTP API
//! - `chat`: interactive terminal session
//! - `ask`: one-shot question with scripted feedback

pub mod ask;
pub mod chat;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;

/// Retrieval agent that asks for clarification when evidence is weak
#[derive(Parser)]
#[command(name = "rag-agent")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Interactive question/answer loop on the terminal
    Chat,

    /// Answer one question, replying to clarification requests from --feedback
    Ask(ask::AskArgs),
}

/// Load `.env` and layered configuration, then install logging
pub fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging);

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask_with_feedback() {
        let cli = Cli::try_parse_from([
            "rag-agent",
            "ask",
            "who won in 98?",
            "--feedback",
            "football",
            "-f",
            "the World Cup",
        ])
        .unwrap();

        match cli.command {
            Command::Ask(args) => {
                assert_eq!(args.question, "who won in 98?");
                assert_eq!(args.feedback, vec!["football", "the World Cup"]);
                assert!(!args.json);
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_ask_requires_question() {
        assert!(Cli::try_parse_from(["rag-agent", "ask"]).is_err());
    }
}
