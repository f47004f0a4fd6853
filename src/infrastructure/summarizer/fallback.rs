use async_trait::async_trait;

use crate::domain::{DomainError, RepositoryAnalysis, RepositoryDigest, RepositorySummarizer};

/// Deterministic summary assembled from repository metadata alone
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackSummarizer;

impl FallbackSummarizer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, digest: &RepositoryDigest) -> RepositoryAnalysis {
        let language = digest.language.as_deref().unwrap_or("Unknown");
        let top_topics = digest.topics.iter().take(3).cloned().collect::<Vec<_>>().join(", ");
        let stars = group_thousands(digest.stars);
        let forks = group_thousands(digest.forks);

        let purpose = digest
            .description
            .clone()
            .unwrap_or_else(|| format!("A {} project hosted on GitHub.", language));

        let features = vec![
            format!("Written primarily in {}", language),
            format!("{} stars on GitHub", stars),
            format!("{} forks", forks),
            if digest.topics.is_empty() {
                "Open source project".to_string()
            } else {
                format!("Topics: {}", top_topics)
            },
        ];

        let tech_stack = std::iter::once(language.to_string())
            .chain(digest.topics.iter().take(4).cloned())
            .collect();

        let target_audience = format!(
            "Developers interested in {} and {} projects.",
            language,
            digest.topics.first().map(String::as_str).unwrap_or("open source")
        );

        let subject = match &digest.description {
            Some(description) => format!("a project that {}", description.to_lowercase()),
            None => format!("a {} repository", language),
        };
        let focus = if digest.topics.is_empty() {
            String::new()
        } else {
            format!("The project focuses on {}.", top_topics)
        };
        let summary = format!(
            "{} is {}. With {} stars and {} forks, it has gained attention in the developer community. {} This is a demo response - sign up for full AI-powered analysis.",
            digest.full_name, subject, stars, forks, focus
        );

        RepositoryAnalysis {
            purpose,
            features,
            tech_stack,
            target_audience,
            summary,
        }
    }
}

#[async_trait]
impl RepositorySummarizer for FallbackSummarizer {
    async fn summarize(&self, digest: &RepositoryDigest) -> Result<RepositoryAnalysis, DomainError> {
        Ok(self.analyze(digest))
    }

    fn is_ai_powered(&self) -> bool {
        false
    }
}

/// `1234567` -> `1,234,567`
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    grouped
}
