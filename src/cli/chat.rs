//! Interactive line-based chat session.

use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, Notify};
use tracing::{debug, warn};

use crate::api::gemini::GeminiClient;
use crate::cli::render::{render_message, render_pipeline};
use crate::core::config::Config;
use crate::core::controller::{ControllerSettings, RequestController, SubmitOutcome};
use crate::core::conversation::ConversationEvent;
use crate::core::image::ImageAttachment;
use crate::utils::transcript::TranscriptLog;

const HELP_TEXT: &str = "\
Commands:
  /image <path>     Attach an image to the next message
  /clear-image      Drop the pending image
  /model [id]       Show or switch the model
  /log [file]       Start logging to a file, or toggle pause/resume
  /status           Show the model, endpoint, transcript and pending image
  /help             Show this help
  /quit             Leave the chat";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Message(String),
    AttachImage(PathBuf),
    ClearImage,
    Model(Option<String>),
    Log(Option<PathBuf>),
    Status,
    Help,
    Quit,
    /// Slash command that is not recognized, or missing its argument.
    Invalid(String),
}

pub fn parse_input(line: &str) -> ChatInput {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix('/') else {
        return ChatInput::Message(line.trim_end_matches(['\r', '\n']).to_string());
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim()).filter(|arg| !arg.is_empty())),
        None => (command, None),
    };

    match (name, arg) {
        ("image", Some(path)) => ChatInput::AttachImage(PathBuf::from(path)),
        ("image", None) => ChatInput::Invalid("Usage: /image <path>".to_string()),
        ("clear-image", _) => ChatInput::ClearImage,
        ("model", arg) => ChatInput::Model(arg.map(str::to_string)),
        ("log", arg) => ChatInput::Log(arg.map(PathBuf::from)),
        ("status", _) => ChatInput::Status,
        ("help", _) => ChatInput::Help,
        ("quit" | "exit", _) => ChatInput::Quit,
        _ => ChatInput::Invalid(format!("Unknown command: /{name}. Type /help for commands.")),
    }
}

/// Next line of input that is valid UTF-8, or `None` at end of input.
/// Lines that fail to decode are reported and skipped.
async fn read_input_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        buf.clear();
        if reader.read_until(b'\n', buf).await? == 0 {
            return Ok(None);
        }

        match std::str::from_utf8(buf.as_slice()) {
            Ok(line) => return Ok(Some(line.to_string())),
            Err(err) => {
                warn!(error = %err, bytes = buf.len(), "skipping input line that is not UTF-8");
                eprintln!("⚠️  Ignored a line that is not valid UTF-8.");
            }
        }
    }
}

fn status_report(
    model: &str,
    endpoint: &str,
    transcript: &TranscriptLog,
    pending_image: bool,
) -> String {
    format!(
        "Model: {model}\nEndpoint: {endpoint}\nTranscript: {}\nPending image: {}",
        transcript.status_string(),
        if pending_image { "attached" } else { "none" }
    )
}

/// Print conversation events as they happen. Notifies `settled` each time
/// the status returns to idle.
fn spawn_event_printer(
    mut rx: mpsc::UnboundedReceiver<ConversationEvent>,
    settled: Arc<Notify>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                ConversationEvent::StatusChanged(status) if status.is_idle() => {
                    settled.notify_one();
                }
                ConversationEvent::StatusChanged(status) => {
                    eprintln!("  {}", render_pipeline(status));
                }
                ConversationEvent::MessageAppended(message) if message.is_assistant() => {
                    println!("\n{}\n", render_message(&message));
                }
                ConversationEvent::MessageAppended(message) => {
                    debug!(has_image = message.has_image(), "user message appended");
                }
            }
        }
    })
}

pub async fn run_chat(
    config: &Config,
    model: Option<String>,
    log: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let client = GeminiClient::from_config(config)?;
    if !client.has_api_key() {
        eprintln!("⚠️  GEMINI_API_KEY is not set; requests will fail until it is.");
    }

    let settings = ControllerSettings {
        model: config.resolve_model(model.as_deref()),
        system_instruction: config.system_instruction.clone(),
    };
    let mut controller =
        RequestController::new(client, settings).with_transcript(TranscriptLog::new(log)?);

    let settled = Arc::new(Notify::new());
    let printer = spawn_event_printer(controller.subscribe(), Arc::clone(&settled));

    println!("💬 Access.AI Assistant ({})", controller.model());
    println!("Type a message and press Enter. /help lists commands.");

    let mut pending_image: Option<String> = None;
    let mut input = BufReader::new(tokio::io::stdin());
    let mut buf = Vec::new();
    let mut stdout = tokio::io::stdout();

    loop {
        let prompt = if pending_image.is_some() { "📎 > " } else { "> " };
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = read_input_line(&mut input, &mut buf).await? else {
            break;
        };

        match parse_input(&line) {
            ChatInput::Message(text) => {
                let outcome = controller.submit(&text, pending_image.take()).await?;
                match outcome {
                    SubmitOutcome::Ignored => {}
                    SubmitOutcome::Replied | SubmitOutcome::Failed(_) => settled.notified().await,
                }
            }
            ChatInput::AttachImage(path) => match ImageAttachment::from_path(&path) {
                Ok(image) => {
                    println!(
                        "Attached {} ({}). It will be sent with your next message.",
                        path.display(),
                        image.mime_type
                    );
                    pending_image = Some(image.to_data_url());
                }
                Err(err) => eprintln!("❌ {err}"),
            },
            ChatInput::ClearImage => {
                if pending_image.take().is_some() {
                    println!("Image removed.");
                }
            }
            ChatInput::Model(None) => println!("Current model: {}", controller.model()),
            ChatInput::Model(Some(model)) => {
                controller.set_model(model);
                println!("Switched to model: {}", controller.model());
            }
            ChatInput::Log(Some(path)) => match controller.transcript_mut().set_log_file(path) {
                Ok(message) => println!("{message}"),
                Err(err) => eprintln!("❌ Failed to open log file: {err}"),
            },
            ChatInput::Log(None) => match controller.transcript_mut().toggle() {
                Ok(message) => println!("{message}"),
                Err(message) => eprintln!("⚠️  {message}"),
            },
            ChatInput::Status => println!(
                "{}",
                status_report(
                    controller.model(),
                    controller.adapter().base_url(),
                    controller.transcript(),
                    pending_image.is_some(),
                )
            ),
            ChatInput::Help => println!("{HELP_TEXT}"),
            ChatInput::Quit => break,
            ChatInput::Invalid(message) => eprintln!("⚠️  {message}"),
        }
    }

    drop(controller);
    let _ = printer.await;
    Ok(())
}
