use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::core::config::ChatConfig;
use crate::core::ApiError;

use super::provider::ChatProvider;
use super::types::ChatRequest;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// OpenAI-compatible `/v1/chat/completions` client.
#[derive(Clone)]
pub struct GradientChatProvider {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl GradientChatProvider {
    pub fn new(config: &ChatConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ApiError::internal)?;

        Ok(Self {
            base_url: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
        })
    }
}

#[async_trait]
impl ChatProvider for GradientChatProvider {
    fn name(&self) -> &str {
        "gradient"
    }

    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, ApiError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ApiError::Configuration("chat api_key is not set".to_string()))?;

        let url = format!("{}/v1/chat/completions", self.base_url);
        let mut body = json!({
            "model": model_id,
            "messages": request.messages,
        });
        if let Some(obj) = body.as_object_mut() {
            if let Some(t) = request.temperature {
                obj.insert("temperature".to_string(), json!(t));
            }
            if let Some(t) = request.max_tokens {
                obj.insert("max_tokens".to_string(), json!(t));
            }
        }

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| ApiError::Upstream(format!("chat request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!(
                "chat completion returned {}: {}",
                status,
                truncate_for_log(&text, 200)
            )));
        }

        let payload: ChatCompletionResponse = response.json().await.map_err(|err| {
            ApiError::Upstream(format!("malformed chat completion response: {err}"))
        })?;

        let content = payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                ApiError::Upstream("chat completion response contained no choices".to_string())
            })?;

        Ok(content.trim().to_string())
    }
}

fn truncate_for_log(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}
