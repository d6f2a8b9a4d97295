//! OpenAI-style chat-completions client shared by the OpenRouter and xAI providers.
//!
//! No other module talks to a model provider directly.

use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::tailor::{Provider, TailorError};

const OPENROUTER_CHAT_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const XAI_CHAT_URL: &str = "https://api.x.ai/v1/chat/completions";
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Text of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    openrouter_key: Option<String>,
    xai_key: Option<String>,
}

impl ChatClient {
    pub fn new(
        openrouter_key: Option<String>,
        xai_key: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            openrouter_key,
            xai_key,
        })
    }

    /// Underlying HTTP client, shared with the model catalogue.
    pub fn http(&self) -> &Client {
        &self.client
    }

    fn endpoint(&self, provider: Provider) -> Result<(&'static str, &str), TailorError> {
        let (url, key) = match provider {
            Provider::OpenRouter => (OPENROUTER_CHAT_URL, self.openrouter_key.as_deref()),
            Provider::Grok => (XAI_CHAT_URL, self.xai_key.as_deref()),
        };
        let key = key.ok_or(TailorError::MissingApiKey(provider))?;
        Ok((url, key))
    }

    /// One chat completion. Retries on 429 and 5xx with exponential backoff.
    pub async fn complete(
        &self,
        provider: Provider,
        model: &str,
        system: &str,
        prompt: &str,
    ) -> Result<ChatResponse, TailorError> {
        let (url, key) = self.endpoint(provider)?;
        let body = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let mut last_error: Option<TailorError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = retry_delay(attempt);
                warn!(
                    provider = %provider,
                    "Chat call attempt {} failed, retrying after {}ms",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(url)
                .bearer_auth(key)
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(TailorError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!(provider = %provider, "Provider returned {}: {}", status, body);
                last_error = Some(TailorError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ProviderError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(TailorError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let chat: ChatResponse = response.json().await?;
            if let Some(usage) = &chat.usage {
                debug!(
                    provider = %provider,
                    model,
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "Chat call succeeded"
                );
            }
            return Ok(chat);
        }

        Err(last_error.unwrap_or(TailorError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Calls the model and parses its reply as JSON. The prompt must ask for JSON.
    pub async fn complete_json<T: DeserializeOwned>(
        &self,
        provider: Provider,
        model: &str,
        system: &str,
        prompt: &str,
    ) -> Result<T, TailorError> {
        let response = self.complete(provider, model, system, prompt).await?;
        let text = response.text().ok_or(TailorError::EmptyContent)?;
        serde_json::from_str(strip_json_fences(text)).map_err(TailorError::Parse)
    }
}

/// Wait before retry `attempt` (1-based): 1s, then 2s, doubling. With
/// `MAX_RETRIES` attempts there are `MAX_RETRIES - 1` waits.
fn retry_delay(attempt: u32) -> Duration {
    Duration::from_millis(1000 * (1 << (attempt - 1)))
}

/// Strips ```json ... ``` or ``` ... ``` fences from model output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => {
            let stripped = stripped.trim_start();
            stripped
                .strip_suffix("```")
                .map(str::trim)
                .unwrap_or(stripped)
        }
        None => text,
    }
}
