use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::{
    DomainError, LlmProvider, LlmRequest, RepositoryAnalysis, RepositoryDigest,
    RepositorySummarizer,
};

pub const DEFAULT_SUMMARY_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "You are a technical analyst who summarizes GitHub repositories. \
Respond with a single JSON object with these fields:
- \"purpose\": one or two sentences on what the project does
- \"features\": an array of its key features and capabilities
- \"techStack\": an array of the languages, frameworks and tools it uses
- \"targetAudience\": who would benefit from using it
- \"summary\": a concise overview of at most three paragraphs";

/// Summarizer backed by a chat-completion model
#[derive(Debug)]
pub struct LlmRepositorySummarizer {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
}

impl LlmRepositorySummarizer {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            model: DEFAULT_SUMMARY_MODEL.to_string(),
            temperature: 0.0,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn build_context(digest: &RepositoryDigest) -> String {
        let topics = if digest.topics.is_empty() {
            "None".to_string()
        } else {
            digest.topics.join(", ")
        };

        let mut context = format!(
            "Repository: {}\nDescription: {}\nPrimary Language: {}\nTopics: {}\nStars: {}\nForks: {}\n",
            digest.full_name,
            digest.description.as_deref().unwrap_or("No description provided"),
            digest.language.as_deref().unwrap_or("Not specified"),
            topics,
            digest.stars,
            digest.forks,
        );

        if let Some(readme) = &digest.readme {
            context.push_str("\nREADME Content:\n");
            context.push_str(readme);
            context.push('\n');
        }

        format!("Please summarize this GitHub repository:\n{}", context)
    }

    fn parse_analysis(content: &str) -> RepositoryAnalysis {
        match serde_json::from_str::<RepositoryAnalysis>(content.trim()) {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(error = %e, "Model returned non-JSON summary; using raw text");
                RepositoryAnalysis {
                    summary: content.to_string(),
                    ..Default::default()
                }
            }
        }
    }
}

#[async_trait]
impl RepositorySummarizer for LlmRepositorySummarizer {
    async fn summarize(&self, digest: &RepositoryDigest) -> Result<RepositoryAnalysis, DomainError> {
        let request = LlmRequest::builder()
            .system(SYSTEM_PROMPT)
            .user(Self::build_context(digest))
            .temperature(self.temperature)
            .json_object()
            .build();

        let response = self.provider.chat(&self.model, request).await?;

        debug!(
            repository = %digest.full_name,
            provider = self.provider.provider_name(),
            model = %response.model,
            truncated = response.is_truncated(),
            "Summary generated"
        );

        Ok(Self::parse_analysis(response.content()))
    }

    fn is_ai_powered(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::{MessageRole, MockLlmProvider, ResponseFormat};

    fn digest() -> RepositoryDigest {
        RepositoryDigest {
            full_name: "tokio-rs/axum".to_string(),
            description: Some("Web framework".to_string()),
            language: Some("Rust".to_string()),
            topics: vec!["http".to_string(), "web".to_string()],
            stars: 20000,
            forks: 900,
            readme: Some("# axum".to_string()),
        }
    }

    #[tokio::test]
    async fn test_summarize_parses_json() {
        let content = r#"{"purpose":"Serve HTTP","features":["Routing"],"techStack":["Rust"],"targetAudience":"Rust developers","summary":"axum is a web framework."}"#;
        let provider = Arc::new(MockLlmProvider::new().with_content(content));
        let summarizer = LlmRepositorySummarizer::new(provider.clone());

        let analysis = summarizer.summarize(&digest()).await.unwrap();

        assert_eq!(analysis.purpose, "Serve HTTP");
        assert_eq!(analysis.tech_stack, vec!["Rust"]);
        assert!(summarizer.is_ai_powered());

        let request = provider.last_request().unwrap();
        assert_eq!(request.messages[0].role, MessageRole::System);
        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.response_format, ResponseFormat::JsonObject);
    }

    #[tokio::test]
    async fn test_raw_text_degrades_to_summary() {
        let provider = Arc::new(MockLlmProvider::new().with_content("Just prose."));
        let summarizer = LlmRepositorySummarizer::new(provider);

        let analysis = summarizer.summarize(&digest()).await.unwrap();

        assert_eq!(analysis.summary, "Just prose.");
        assert!(analysis.features.is_empty());
        assert!(analysis.purpose.is_empty());
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = Arc::new(MockLlmProvider::new().with_error("HTTP 500"));
        let summarizer = LlmRepositorySummarizer::new(provider);

        let result = summarizer.summarize(&digest()).await;
        assert!(matches!(result, Err(DomainError::Provider { .. })));
    }

    #[test]
    fn test_context_lists_repository_facts() {
        let context = LlmRepositorySummarizer::build_context(&digest());

        assert!(context.contains("Repository: tokio-rs/axum"));
        assert!(context.contains("Topics: http, web"));
        assert!(context.contains("Stars: 20000"));
        assert!(context.contains("README Content:\n# axum"));
    }

    #[test]
    fn test_context_placeholders() {
        let digest = RepositoryDigest {
            description: None,
            language: None,
            topics: vec![],
            readme: None,
            ..digest()
        };
        let context = LlmRepositorySummarizer::build_context(&digest);

        assert!(context.contains("Description: No description provided"));
        assert!(context.contains("Primary Language: Not specified"));
        assert!(context.contains("Topics: None"));
        assert!(!context.contains("README Content"));
    }
}
