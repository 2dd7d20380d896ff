mod ollama;
mod openai;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use crate::types::Answer;

/// Result type for generation-capability operations
pub type LlmResult<T> = Result<T, LlmError>;

/// Topics requested per supplier call. Callers tolerate shorter batches.
pub const TOPIC_BATCH_SIZE: usize = 10;
/// Reaction comments requested per generator call.
pub const COMMENT_BATCH_SIZE: usize = 30;

/// Errors that can occur during generation calls
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Response parsing failed: {0}")]
    ParseError(String),

    #[error("Provider returned an empty batch")]
    EmptyBatch,
}

/// Supplies batches of game topics.
#[async_trait]
pub trait TopicSupplier: Send + Sync {
    /// Generate roughly [`TOPIC_BATCH_SIZE`] fresh topics. The used-topic
    /// history biases the prompt away from repeats, nothing more.
    async fn generate_topics(&self, used_topics: &[String]) -> LlmResult<Vec<String>>;
}

/// Produces spectator-style reaction comments for a judged round.
#[async_trait]
pub trait CommentGenerator: Send + Sync {
    async fn generate_comments(&self, topic: &str, answers: &[Answer]) -> LlmResult<Vec<String>>;
}

/// Configuration for generation providers
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub ollama_base_url: Option<String>,
    pub ollama_model: String,
    /// Per-call timeout applied to every provider request
    pub timeout: Duration,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
            ollama_base_url: Some("http://localhost:11434".to_string()),
            ollama_model: "llama3.2".to_string(),
            timeout: Duration::from_secs(30),
            max_tokens: 1000,
        }
    }
}

impl LlmConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok().and_then(|key| {
            let trimmed = key.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        });

        let openai_model = std::env::var("OPENAI_MODEL")
            .ok()
            .and_then(|model| {
                let trimmed = model.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| "gpt-4o-mini".to_string());

        let ollama_base_url = match std::env::var("OLLAMA_BASE_URL") {
            Ok(url) => {
                let trimmed = url.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Err(_) => Some("http://localhost:11434".to_string()),
        };

        let ollama_model = std::env::var("OLLAMA_MODEL")
            .ok()
            .and_then(|model| {
                let trimmed = model.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| "llama3.2".to_string());

        Self {
            openai_api_key,
            openai_model,
            ollama_base_url,
            ollama_model,
            timeout: std::env::var("LLM_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(30)),
            max_tokens: std::env::var("LLM_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1000),
        }
    }

    /// Build the configured provider, preferring OpenAI when a key is set.
    /// One provider instance serves both capabilities.
    pub fn build_provider(
        &self,
    ) -> LlmResult<(Arc<dyn TopicSupplier>, Arc<dyn CommentGenerator>)> {
        if let Some(api_key) = &self.openai_api_key {
            let provider = Arc::new(OpenAiProvider::new(
                api_key.clone(),
                self.openai_model.clone(),
                self.timeout,
                self.max_tokens,
            ));
            let topics: Arc<dyn TopicSupplier> = provider.clone();
            let comments: Arc<dyn CommentGenerator> = provider;
            return Ok((topics, comments));
        }

        if let Some(base_url) = &self.ollama_base_url {
            let provider = Arc::new(OllamaProvider::new(
                base_url.clone(),
                self.ollama_model.clone(),
                self.timeout,
                self.max_tokens,
            ));
            let topics: Arc<dyn TopicSupplier> = provider.clone();
            let comments: Arc<dyn CommentGenerator> = provider;
            return Ok((topics, comments));
        }

        Err(LlmError::ConfigError(
            "No generation provider configured. Set OPENAI_API_KEY or OLLAMA_BASE_URL".to_string(),
        ))
    }
}

/// System framing shared by both providers for topic generation.
pub(crate) const TOPICS_SYSTEM_PROMPT: &str =
    "You write topics for a party game where every player answers the same prompt \
     and the group checks whether their answers match. Topics must be short, \
     concrete and answerable in a word or two by anyone.";

/// Build the topic-batch prompt. Used topics are embedded so the model
/// steers away from repeats; this is best-effort only.
pub(crate) fn topics_prompt(used_topics: &[String]) -> String {
    let mut prompt = format!(
        "Generate exactly {TOPIC_BATCH_SIZE} party game topics, one per line, \
         with no numbering, bullets or extra commentary. \
         Examples of the style: \"A red food\", \"Something you find at the beach\", \
         \"A famous scientist\"."
    );
    if !used_topics.is_empty() {
        prompt.push_str("\n\nAvoid anything close to these already-used topics:\n");
        for topic in used_topics {
            prompt.push_str("- ");
            prompt.push_str(topic);
            prompt.push('\n');
        }
    }
    prompt
}

/// Build the reaction-comment prompt for a judged round. Drawing answers are
/// described rather than inlined.
pub(crate) fn comments_prompt(topic: &str, answers: &[Answer]) -> String {
    let mut prompt = format!(
        "A party game round just finished. The topic was: \"{topic}\". \
         The players answered:\n"
    );
    for answer in answers {
        prompt.push_str(&format!(
            "- {}: {}\n",
            answer.player_name,
            answer.display_text()
        ));
    }
    prompt.push_str(&format!(
        "\nWrite exactly {COMMENT_BATCH_SIZE} short, playful spectator reactions \
         to these answers, one per line, no numbering or bullets. Each at most a \
         dozen words, like live chat messages."
    ));
    prompt
}

/// Split a raw completion into a capped list of non-empty trimmed lines.
pub(crate) fn split_lines(text: &str, cap: usize) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.trim_start_matches(['-', '*', ' ']).to_string())
        .filter(|line| !line.is_empty())
        .take(cap)
        .collect()
}
