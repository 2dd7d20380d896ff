use super::*;
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};

/// OpenAI provider, serves both topic and comment generation.
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
    max_tokens: u32,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String, timeout: Duration, max_tokens: u32) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        let client = Client::with_config(config);

        Self {
            client,
            model,
            timeout,
            max_tokens,
        }
    }

    async fn complete(&self, system: Option<&str>, user: String) -> LlmResult<String> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::new();
        if let Some(system) = system {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system)
                    .build()
                    .map_err(|e| LlmError::ApiError(e.to_string()))?
                    .into(),
            );
        }
        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()
                .map_err(|e| LlmError::ApiError(e.to_string()))?
                .into(),
        );

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.9)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| LlmError::ApiError(e.to_string()))?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(chat_request))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout))?
            .map_err(|e| LlmError::ApiError(e.to_string()))?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| LlmError::ParseError("No content in response".to_string()))
    }
}

#[async_trait]
impl TopicSupplier for OpenAiProvider {
    async fn generate_topics(&self, used_topics: &[String]) -> LlmResult<Vec<String>> {
        let text = self
            .complete(Some(TOPICS_SYSTEM_PROMPT), topics_prompt(used_topics))
            .await?;
        Ok(split_lines(&text, TOPIC_BATCH_SIZE))
    }
}

#[async_trait]
impl CommentGenerator for OpenAiProvider {
    async fn generate_comments(&self, topic: &str, answers: &[Answer]) -> LlmResult<Vec<String>> {
        let text = self.complete(None, comments_prompt(topic, answers)).await?;
        Ok(split_lines(&text, COMMENT_BATCH_SIZE))
    }
}
