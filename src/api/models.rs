use super::gemini::GeminiClient;
use super::wire::{ModelInfo, ModelsResponse};
use super::AdapterError;

/// Upper bound on followed pages, in case the API keeps returning tokens.
const MAX_PAGES: usize = 20;

pub async fn fetch_models(client: &GeminiClient) -> Result<Vec<ModelInfo>, AdapterError> {
    let url = client.endpoint("models");
    let mut models = Vec::new();
    let mut page_token: Option<String> = None;

    for _ in 0..MAX_PAGES {
        let mut query = vec![("pageSize", "1000")];
        if let Some(token) = page_token.as_deref() {
            query.push(("pageToken", token));
        }

        let page: ModelsResponse = client.get_json(url.clone(), &query).await?;
        models.extend(page.models);

        match page.next_page_token.filter(|token| !token.is_empty()) {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(models)
}

impl ModelInfo {
    /// Identifier without the `models/` prefix.
    pub fn id(&self) -> &str {
        self.name.strip_prefix("models/").unwrap_or(&self.name)
    }

    pub fn supports_generate_content(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|method| method == "generateContent")
    }

    pub fn is_preview(&self) -> bool {
        let id = self.id();
        id.contains("preview") || id.contains("-exp")
    }
}

/// Whether a model id looks like a chat-capable text model.
pub fn is_chat_candidate(id: &str) -> bool {
    (id.contains("gemini") || id.contains("gemma"))
        && !id.contains("embedding")
        && !id.contains("imagen")
}

/// Chat-capable models, stable releases ahead of previews, otherwise in
/// the order the API listed them.
pub fn generation_candidates(models: &[ModelInfo]) -> Vec<String> {
    let mut candidates: Vec<&ModelInfo> = models
        .iter()
        .filter(|model| {
            is_chat_candidate(model.id())
                && (model.supported_generation_methods.is_empty()
                    || model.supports_generate_content())
        })
        .collect();
    candidates.sort_by_key(|model| model.is_preview());
    candidates.iter().map(|model| model.id().to_string()).collect()
}
