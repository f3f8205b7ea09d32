//! Probe which model identifiers actually answer for the configured key.

use std::error::Error;
use std::time::Duration;

use tracing::info;

use crate::api::gemini::GeminiClient;
use crate::api::models::{fetch_models, generation_candidates};
use crate::api::{AdapterError, GenerateRequest, GenerativeAdapter};
use crate::core::config::Config;
use crate::core::constants::PROBE_PROMPT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub model: String,
    pub outcome: Result<String, AdapterError>,
}

impl ProbeResult {
    pub fn passed(&self) -> bool {
        self.outcome.is_ok()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProbeOptions {
    pub delay: Duration,
    /// Keep probing after the first model that answers.
    pub probe_all: bool,
    /// Sent with every probe so a pass means the chat's requests work too.
    pub system_instruction: Option<String>,
}

/// Try each candidate with a tiny prompt, in order.
///
/// `on_result` is called as each probe settles. Stops after the first
/// working model unless `probe_all` is set.
pub async fn probe_candidates<A, F>(
    adapter: &A,
    candidates: &[String],
    options: &ProbeOptions,
    mut on_result: F,
) -> Vec<ProbeResult>
where
    A: GenerativeAdapter + ?Sized,
    F: FnMut(&ProbeResult),
{
    let mut results = Vec::with_capacity(candidates.len());

    for (index, model) in candidates.iter().enumerate() {
        if index > 0 && !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }

        let request = GenerateRequest {
            system_instruction: options.system_instruction.clone(),
            ..GenerateRequest::text(model.clone(), PROBE_PROMPT)
        };
        let outcome = adapter
            .generate(request)
            .await
            .map(|response| response.text);
        let result = ProbeResult {
            model: model.clone(),
            outcome,
        };
        on_result(&result);

        let passed = result.passed();
        results.push(result);
        if passed && !options.probe_all {
            break;
        }
    }

    results
}

pub async fn run_probe(
    config: &Config,
    explicit: Vec<String>,
    probe_all: bool,
) -> Result<(), Box<dyn Error>> {
    let client = GeminiClient::from_config(config)?;

    let candidates = if explicit.is_empty() {
        let models = fetch_models(&client).await.map_err(|err| {
            format!("Failed to list models: {err}")
        })?;
        let candidates = generation_candidates(&models);
        println!(
            "Found {} models. Testing {} candidates...",
            models.len(),
            candidates.len()
        );
        candidates
    } else {
        explicit
    };

    if candidates.is_empty() {
        println!("No candidate models to probe.");
        return Ok(());
    }

    let options = ProbeOptions {
        delay: config.probe_delay(),
        probe_all,
        system_instruction: config.system_instruction.clone(),
    };

    let results = probe_candidates(&client, &candidates, &options, |result| {
        match &result.outcome {
            Ok(text) => {
                let preview: String = text.chars().take(15).collect();
                println!("[PASS] {}  {preview}...", result.model);
            }
            Err(err) => {
                info!(model = %result.model, error = %err, "probe failed");
                println!("[FAIL] {}  {}", result.model, err.classify());
            }
        }
    })
    .await;

    let working: Vec<&str> = results
        .iter()
        .filter(|result| result.passed())
        .map(|result| result.model.as_str())
        .collect();

    match working.first() {
        Some(first) if !probe_all => {
            println!(">>> FOUND WORKING MODEL: {first} <<<");
            println!("Use it with: accessai set default-model {first}");
        }
        Some(_) => println!("Working models: {}", working.join(", ")),
        None => {
            return Err("No candidate model answered. Check the API key and quota.".into());
        }
    }

    Ok(())
}
