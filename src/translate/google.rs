

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use super::{TranslateError, Translator, MAX_TRANSLATION_CHARS};
use crate::core::retry::{retry_with, RetryPolicy};
use crate::utils::char_len;


/// Client for the public Google Translate endpoint.
pub struct GoogleTranslator {
    base_url: String,
    client: Client,
    retry: RetryPolicy,
}

impl GoogleTranslator {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TranslateError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder().timeout(timeout).build()?;
        info!("Google translator initialized (url={})", base_url);
        Ok(Self {
            base_url,
            client,
            retry: RetryPolicy::exponential(3, Duration::from_millis(500), Duration::from_secs(4)),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn request(&self, text: &str, target: &str) -> Result<String, TranslateError> {
        let response = self
            .client
            .get(format!("{}/translate_a/single", self.base_url))
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        parse_translation(&body)
    }
}


/// The endpoint answers with nested arrays; the first element lists
/// `[translated, original, ...]` segments in order.
pub(crate) fn parse_translation(body: &Value) -> Result<String, TranslateError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslateError::InvalidResponse("missing segment list".into()))?;

    let mut out = String::new();
    for segment in segments {
        if let Some(text) = segment.get(0).and_then(Value::as_str) {
            out.push_str(text);
        }
    }
    Ok(out)
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target: &str) -> Result<String, TranslateError> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let len = char_len(text);
        if len > MAX_TRANSLATION_CHARS {
            return Err(TranslateError::TooLong(len));
        }

        debug!("Translating {} characters into '{}'", len, target);
        retry_with(&self.retry, "translation", |_| self.request(text, target))
            .await
            .map_err(|e| e.last)
    }

    fn name(&self) -> &str {
        "google"
    }
}
