//! Plain-text rendering for the terminal presentation.

use crate::core::image::ImageAttachment;
use crate::core::message::Message;
use crate::core::status::{pipeline, LifecycleStatus, StageState};

fn stage_glyph(state: StageState) -> &'static str {
    match state {
        StageState::Idle => "○",
        StageState::Active => "●",
        StageState::Working => "◉",
        StageState::Done => "✔",
    }
}

/// One-line pipeline indicator, e.g.
/// `● User Input ─ ◉ API Request ─ ○ Gemini Model ─ ○ Response  Connecting to API`.
pub fn render_pipeline(status: LifecycleStatus) -> String {
    let stages: Vec<String> = pipeline(status)
        .iter()
        .map(|(stage, state)| format!("{} {}", stage_glyph(*state), stage.title()))
        .collect();
    format!("{}  {}", stages.join(" ─ "), status.caption())
}

pub fn render_message(message: &Message) -> String {
    let mut out = format!("{}: {}", message.sender.display_name(), message.text);
    if let Some(url) = &message.image {
        let label = match ImageAttachment::from_data_url(url) {
            Ok(image) => format!(
                "[image: {}, {}]",
                image.mime_type,
                human_size(image.decoded_len())
            ),
            Err(_) => "[image]".to_string(),
        };
        if message.text.is_empty() {
            out.push_str(&label);
        } else {
            out.push('\n');
            out.push_str(&label);
        }
    }
    out
}

fn human_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}
