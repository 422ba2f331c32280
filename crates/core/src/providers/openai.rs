use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::settings::SummarizerSettings;
use super::traits::Summarizer;

const PROVIDER: &str = "OpenAI";

/// Summarizer backed by an OpenAI-compatible `/chat/completions` endpoint.
///
/// A missing API key is reported per call as a configuration error, so the
/// rest of the report still goes out.
pub struct OpenAiSummarizer {
    client: Client,
    settings: SummarizerSettings,
}

impl OpenAiSummarizer {
    pub fn new(settings: SummarizerSettings) -> Self {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, settings }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }
}

// ── Chat completions wire types ─────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn summarize(&self, system_prompt: &str, content: &str) -> Result<String, CoreError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or_else(|| CoreError::Configuration("OPENAI_API_KEY is not set".into()))?;

        let request = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content,
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            top_p: self.settings.top_p,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            stream: false,
        };

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CoreError::Summarizer(format!(
                "{PROVIDER} returned {status}: {}",
                body.chars().take(300).collect::<String>()
            )));
        }

        let parsed: ChatResponse = resp.json().await.map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse chat completion: {e}"),
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| CoreError::Summarizer(format!("{PROVIDER} returned an empty completion")))
    }
}
