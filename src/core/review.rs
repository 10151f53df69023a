use tracing::{error, info};

use crate::adapters::llm::{self, LLMRequest, ModelConfig};
use crate::config::Config;
use crate::core::{ReviewContext, ReviewPromptBuilder};

pub struct ReviewGenerator;

impl ReviewGenerator {
    /// Generates a misformalization review for the assembled context.
    ///
    /// Every failure mode — missing credential, transport error, bad
    /// response — is rendered into the returned string; callers never see
    /// an error value.
    pub async fn generate(context: &ReviewContext, settings: &Config) -> String {
        let api_key = settings
            .api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok());
        Self::generate_with_key(context, api_key, settings).await
    }

    async fn generate_with_key(
        context: &ReviewContext,
        api_key: Option<String>,
        settings: &Config,
    ) -> String {
        let Some(api_key) = api_key else {
            error!("GEMINI_API_KEY environment variable not set.");
            return "Error: GEMINI_API_KEY environment variable not set.".to_string();
        };

        info!("Configuring Gemini API with model: {}", context.model);
        let model_config = ModelConfig {
            model_name: context.model.clone(),
            api_key: Some(api_key),
            base_url: settings.base_url.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        };

        let adapter = match llm::create_adapter(&model_config) {
            Ok(adapter) => adapter,
            Err(err) => return render_api_error(&err),
        };

        let (system_prompt, user_prompt) = ReviewPromptBuilder::build_review_prompt(context);
        let request = LLMRequest {
            system_prompt,
            user_prompt,
            temperature: None,
            max_tokens: None,
        };

        info!(
            "Generating code review with Gemini API ({})...",
            adapter.model_name()
        );
        match adapter.complete(request).await {
            Ok(response) => {
                info!("Successfully generated review.");
                response.content
            }
            Err(err) => render_api_error(&err),
        }
    }
}

fn render_api_error(err: &anyhow::Error) -> String {
    let message = format!("An error occurred while calling the Gemini API: {:#}", err);
    error!("{}", message);
    message
}
