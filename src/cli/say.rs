//! One-shot "say" command

use std::error::Error;
use std::path::PathBuf;

use crate::api::gemini::GeminiClient;
use crate::core::config::Config;
use crate::core::controller::{ControllerSettings, RequestController, SubmitOutcome};
use crate::core::image::ImageAttachment;
use crate::utils::transcript::TranscriptLog;

pub async fn run_say(
    config: &Config,
    prompt: Vec<String>,
    image: Option<PathBuf>,
    model: Option<String>,
    log: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    let image = image
        .map(|path| ImageAttachment::from_path(&path).map(|image| image.to_data_url()))
        .transpose()?;

    if prompt.trim().is_empty() && image.is_none() {
        eprintln!("Usage: accessai say [--image <path>] <prompt>");
        std::process::exit(1);
    }

    let client = GeminiClient::from_config(config)?;
    let settings = ControllerSettings {
        model: config.resolve_model(model.as_deref()),
        system_instruction: config.system_instruction.clone(),
    };
    let mut controller =
        RequestController::new(client, settings).with_transcript(TranscriptLog::new(log)?);

    match controller.submit(&prompt, image).await? {
        SubmitOutcome::Replied => {
            if let Some(reply) = controller.state().last_message() {
                println!("{}", reply.text);
            }
            Ok(())
        }
        SubmitOutcome::Failed(err) => {
            if let Some(reply) = controller.state().last_message() {
                println!("{}", reply.text);
            }
            eprintln!("❌ {err}");
            std::process::exit(1);
        }
        SubmitOutcome::Ignored => Ok(()),
    }
}
