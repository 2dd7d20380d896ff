use super::*;
use serde::{Deserialize, Serialize};

/// Ollama provider, talks to a local instance via `/api/generate`.
pub struct OllamaProvider {
    base_url: String,
    model: String,
    client: reqwest::Client,
    timeout: Duration,
    max_tokens: u32,
}

impl OllamaProvider {
    pub fn new(base_url: String, model: String, timeout: Duration, max_tokens: u32) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();

        Self {
            base_url,
            model,
            client,
            timeout,
            max_tokens,
        }
    }

    async fn complete(&self, prompt: String) -> LlmResult<String> {
        let ollama_request = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
            options: Some(OllamaOptions {
                num_predict: Some(self.max_tokens),
            }),
        };

        let url = format!("{}/api/generate", self.base_url);

        let response = tokio::time::timeout(
            self.timeout,
            self.client.post(&url).json(&ollama_request).send(),
        )
        .await
        .map_err(|_| LlmError::Timeout(self.timeout))?
        .map_err(|e| LlmError::ApiError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LlmError::ApiError(format!(
                "Ollama API returned status: {}",
                response.status()
            )));
        }

        let ollama_response: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        Ok(ollama_response.response)
    }
}

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[serde(default)]
    #[allow(dead_code)] // Part of Ollama API response format
    done: bool,
}

#[async_trait]
impl TopicSupplier for OllamaProvider {
    async fn generate_topics(&self, used_topics: &[String]) -> LlmResult<Vec<String>> {
        // The generate endpoint has no system message, so it is merged in.
        let prompt = format!("{}\n\n{}", TOPICS_SYSTEM_PROMPT, topics_prompt(used_topics));
        let text = self.complete(prompt).await?;
        Ok(split_lines(&text, TOPIC_BATCH_SIZE))
    }
}

#[async_trait]
impl CommentGenerator for OllamaProvider {
    async fn generate_comments(&self, topic: &str, answers: &[Answer]) -> LlmResult<Vec<String>> {
        let text = self.complete(comments_prompt(topic, answers)).await?;
        Ok(split_lines(&text, COMMENT_BATCH_SIZE))
    }
}
