//! Client side of the external classification service.
//!
//! The service is consumed through the [`Oracle`] trait. Replies are free
//! text that should contain JSON; [`parse_json_reply`] digs it out.

mod openai;
mod retry;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

pub use openai::HttpOracle;
pub use retry::RetryPolicy;

#[async_trait]
pub trait Oracle: Send + Sync {
    /// Ask a vision model about one image. `mime` is the image media type.
    async fn describe_image(&self, image: &[u8], mime: &str, prompt: &str, max_tokens: u32) -> Result<String>;

    /// Plain text completion.
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;

    /// Text completion under a system instruction.
    async fn complete_with_system(&self, system: &str, prompt: &str, max_tokens: u32) -> Result<String> {
        self.complete(&format!("{system}\n\n{prompt}"), max_tokens).await
    }

    fn name(&self) -> &'static str;
}

/// Stand-in used when no API key is configured. Every call fails, so each
/// frame takes the fallback path.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineOracle;

#[async_trait]
impl Oracle for OfflineOracle {
    async fn describe_image(&self, _image: &[u8], _mime: &str, _prompt: &str, _max_tokens: u32) -> Result<String> {
        bail!("oracle offline: no API key configured")
    }

    async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String> {
        bail!("oracle offline: no API key configured")
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}

/// Strip a ```json fence (or a bare ``` fence) if the reply carries one.
pub fn unfence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let body = if let Some((_, rest)) = trimmed.split_once("```json") {
        rest
    } else if let Some((_, rest)) = trimmed.split_once("```") {
        rest
    } else {
        return trimmed;
    };
    body.split("```").next().unwrap_or(body).trim()
}

/// Parse a JSON reply, tolerating code fences and prose around a single
/// top-level object.
pub fn parse_json_reply<T: DeserializeOwned>(reply: &str) -> Result<T> {
    let body = unfence(reply);
    if let Ok(value) = serde_json::from_str(body) {
        return Ok(value);
    }

    let start = body.find('{').ok_or_else(|| anyhow!("reply contains no JSON object"))?;
    let end = body.rfind('}').ok_or_else(|| anyhow!("reply contains no JSON object"))?;
    if end < start {
        bail!("reply contains no JSON object");
    }
    serde_json::from_str(&body[start..=end]).context("reply is not valid JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Tone {
        sentiment: String,
        #[serde(default)]
        score: f64,
    }

    #[test]
    fn parses_fenced_json() {
        let reply = "Here you go:\n```json\n{\"sentiment\": \"positive\", \"score\": 0.4}\n```\nThanks";
        let tone: Tone = parse_json_reply(reply).unwrap();
        assert_eq!(tone.sentiment, "positive");
        assert_eq!(tone.score, 0.4);
    }

    #[test]
    fn parses_bare_fence_and_prose() {
        let tone: Tone = parse_json_reply("```\n{\"sentiment\": \"mixed\"}\n```").unwrap();
        assert_eq!(tone.score, 0.0);
        let tone: Tone = parse_json_reply("Result: {\"sentiment\": \"neutral\"} done").unwrap();
        assert_eq!(tone.sentiment, "neutral");
    }

    #[test]
    fn rejects_non_json() {
        assert!(parse_json_reply::<Tone>("I cannot help with that.").is_err());
        assert!(parse_json_reply::<Tone>("} backwards {").is_err());
    }

    #[tokio::test]
    async fn offline_oracle_always_fails() {
        let oracle = OfflineOracle;
        assert!(oracle.complete("hi", 10).await.is_err());
        assert!(oracle.describe_image(&[1, 2, 3], "image/png", "what", 10).await.is_err());
        assert!(oracle.complete_with_system("sys", "hi", 10).await.is_err());
    }
}
