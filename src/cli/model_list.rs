//! Model listing functionality

use std::error::Error;

use crate::api::gemini::GeminiClient;
use crate::api::models::{fetch_models, is_chat_candidate};
use crate::core::config::Config;

pub async fn list_models(config: &Config, show_all: bool) -> Result<(), Box<dyn Error>> {
    let client = GeminiClient::from_config(config)?;
    let default_model = config.resolve_model(None);

    println!("🤖 Available Gemini models");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();
    println!("🎯 Default model: {default_model}");
    println!();

    let mut models = fetch_models(&client).await?;
    if !show_all {
        models.retain(|model| model.supports_generate_content() && is_chat_candidate(model.id()));
    }

    if models.is_empty() {
        println!("No models found.");
        return Ok(());
    }

    println!("Found {} models:", models.len());
    println!();
    for model in &models {
        let marker = if model.id() == default_model { "*" } else { " " };
        match &model.display_name {
            Some(display_name) => println!("{marker} {} ({display_name})", model.id()),
            None => println!("{marker} {}", model.id()),
        }
        if show_all && !model.supported_generation_methods.is_empty() {
            println!("    methods: {}", model.supported_generation_methods.join(", "));
        }
    }

    Ok(())
}
