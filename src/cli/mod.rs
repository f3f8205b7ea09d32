//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod chat;
pub mod model_list;
pub mod probe;
pub mod render;
pub mod say;
pub mod settings;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::chat::run_chat;
use crate::cli::model_list::list_models;
use crate::cli::probe::run_probe;
use crate::cli::say::run_say;
use crate::cli::settings::{apply_set, apply_unset, save_config, SettingError};
use crate::core::config::Config;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("VERGEN_GIT_SHA"),
    "\nbuilt: ",
    env!("VERGEN_BUILD_TIMESTAMP"),
    "\nrustc: ",
    env!("VERGEN_RUSTC_SEMVER"),
);

#[derive(Parser)]
#[command(name = "accessai", version, long_version = LONG_VERSION)]
#[command(about = "A terminal chat client for Google's Gemini API")]
#[command(
    long_about = "Access.AI is a terminal chat client for Google's Gemini models. \
Each message is sent as a single request, and a pipeline indicator shows the \
request moving from input capture to the model and back.\n\n\
Environment Variables:\n\
  GEMINI_API_KEY    Your Gemini API key (GOOGLE_API_KEY is also accepted)\n\
  GEMINI_API_BASE   Custom API base URL (optional)\n\
  ACCESSAI_LOG      Diagnostic log filter, e.g. 'accessai=debug' (optional)\n\n\
Chat commands:\n\
  /image <path>     Attach an image to the next message\n\
  /model [id]       Show or switch the model\n\
  /log [file]       Enable or toggle transcript logging\n\
  /status           Show the model, endpoint and transcript state\n\
  /help             Show chat commands\n\
  /quit             Leave the chat"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use (defaults to the configured default-model)
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Write the conversation transcript to this file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, global = true, value_name = "FILE")]
    pub debug_log: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive chat (default)
    Chat,
    /// Send one message and print the reply
    Say {
        /// Image file to attach
        #[arg(short, long, value_name = "PATH")]
        image: Option<PathBuf>,
        /// Prompt text
        #[arg(trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// List models that support text generation
    Models {
        /// Include every model the API reports
        #[arg(long)]
        all: bool,
    },
    /// Find a model identifier that answers for the configured key
    Probe {
        /// Keep probing after the first working model
        #[arg(long)]
        all: bool,
        /// Models to try, in order (defaults to the remote model list)
        candidates: Vec<String>,
    },
    /// Show the current configuration
    Config,
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key (can be multiple words)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    crate::logging::init(args.debug_log.as_deref())?;

    tokio::runtime::Runtime::new()?.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat(&config, args.model, args.log).await,
        Commands::Say { image, prompt } => {
            run_say(&config, prompt, image, args.model, args.log).await
        }
        Commands::Models { all } => list_models(&config, all).await,
        Commands::Probe { all, candidates } => run_probe(&config, candidates, all).await,
        Commands::Config => {
            config.print_all();
            Ok(())
        }
        Commands::Set { key, value } => {
            finish_setting(config, |config| apply_set(config, &key, &value))
        }
        Commands::Unset { key } => finish_setting(config, |config| apply_unset(config, &key)),
    }
}

/// Apply a setting change and persist it, exiting non-zero on failure.
fn finish_setting<F>(mut config: Config, apply: F) -> Result<(), Box<dyn Error>>
where
    F: FnOnce(&mut Config) -> Result<String, SettingError>,
{
    let result = apply(&mut config).and_then(|message| {
        let path =
            Config::config_path().map_err(|err| SettingError::ConfigError(err.to_string()))?;
        save_config(&config, &path)?;
        Ok(message)
    });

    match result {
        Ok(message) => {
            println!("{message}");
            Ok(())
        }
        Err(err) => {
            err.print();
            std::process::exit(err.exit_code());
        }
    }
}
