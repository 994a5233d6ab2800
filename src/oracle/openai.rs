//! OpenAI-compatible chat-completions client.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{Oracle, RetryPolicy};
use crate::settings::OracleSettings;

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
struct ImageUrl {
    url: String,
    detail: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

impl ChatMessage {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: MessageContent::Text(content.into()),
        }
    }

    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Text(content.into()),
        }
    }

    fn user_with_image(prompt: &str, data_url: String) -> Self {
        Self {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::Text {
                    text: prompt.to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: data_url,
                        detail: "high",
                    },
                },
            ]),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

pub struct HttpOracle {
    client: Client,
    settings: OracleSettings,
    api_key: String,
    retry: RetryPolicy,
}

impl HttpOracle {
    pub fn new(settings: OracleSettings, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;
        let retry = RetryPolicy::from_settings(&settings);
        Ok(Self {
            client,
            settings,
            api_key,
            retry,
        })
    }

    async fn chat_completion(&self, model: &str, messages: Vec<ChatMessage>, max_tokens: u32) -> Result<String> {
        let url = format!(
            "{}/v1/chat/completions",
            self.settings.api_url.trim_end_matches('/')
        );
        let request = ChatCompletionRequest {
            model,
            messages,
            max_tokens,
        };

        self.retry
            .run("chat completion", || async {
                let response = self
                    .client
                    .post(&url)
                    .bearer_auth(&self.api_key)
                    .json(&request)
                    .send()
                    .await
                    .context("Failed to send request")?;

                let status = response.status();
                if !status.is_success() {
                    let error_text = response.text().await.unwrap_or_default();
                    if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_text) {
                        bail!("API error ({}): {}", status.as_u16(), api_error.error.message);
                    }
                    bail!("API error ({}): {}", status.as_u16(), error_text);
                }

                let completion: ChatCompletionResponse =
                    response.json().await.context("Failed to parse response")?;
                completion
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.message.content)
                    .ok_or_else(|| anyhow!("response has no message content"))
            })
            .await
    }
}

#[async_trait]
impl Oracle for HttpOracle {
    async fn describe_image(&self, image: &[u8], mime: &str, prompt: &str, max_tokens: u32) -> Result<String> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let data_url = format!("data:{mime};base64,{encoded}");
        let messages = vec![ChatMessage::user_with_image(prompt, data_url)];
        self.chat_completion(&self.settings.vision_model, messages, max_tokens)
            .await
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let messages = vec![ChatMessage::user(prompt)];
        self.chat_completion(&self.settings.text_model, messages, max_tokens)
            .await
    }

    async fn complete_with_system(&self, system: &str, prompt: &str, max_tokens: u32) -> Result<String> {
        let messages = vec![ChatMessage::system(system), ChatMessage::user(prompt)];
        self.chat_completion(&self.settings.vision_model, messages, max_tokens)
            .await
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
