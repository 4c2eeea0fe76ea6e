use crate::config::AiConfig;
use crate::error::{AgriError, AgriResult};
use serde::{Deserialize, Serialize};

pub const FALLBACK_ANSWER: &str = "Unable to generate response";

const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, or the fixed fallback when the gateway returned none.
    pub fn answer(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_ANSWER.to_string())
    }
}

/// Maps a non-success gateway status onto the error the caller should see.
pub fn classify_gateway_failure(status: reqwest::StatusCode, body: String) -> AgriError {
    match status {
        reqwest::StatusCode::TOO_MANY_REQUESTS => AgriError::RateLimited,
        reqwest::StatusCode::PAYMENT_REQUIRED => AgriError::PaymentRequired,
        _ => AgriError::Gateway {
            status: status.as_u16(),
            body,
        },
    }
}

pub async fn call_chat_completion(
    client: &reqwest::Client,
    config: &AiConfig,
    system_prompt: &str,
    user_prompt: &str,
) -> AgriResult<String> {
    let api_key = config.api_key.as_deref().ok_or_else(|| {
        tracing::error!("AI_API_KEY is not configured");
        AgriError::Internal("Internal server error".to_string())
    })?;

    let body = ChatCompletionRequest {
        model: &config.model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: system_prompt,
            },
            ChatMessage {
                role: "user",
                content: user_prompt,
            },
        ],
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
    };

    let resp = client
        .post(&config.gateway_url)
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await?;

    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        return Err(classify_gateway_failure(status, text));
    }

    let parsed: ChatCompletionResponse = serde_json::from_str(&text)?;
    Ok(parsed.answer())
}
