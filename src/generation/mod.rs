//! Confidence-aware answer generation

pub mod prompt;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::config::GenerationConfig;
use crate::error::{Error, Result};
use crate::providers::LlmProvider;
use crate::retrieval::RetrievalResult;
use crate::types::{Answer, Citation, QueryRequest, VerificationStatus};

pub use prompt::PromptBuilder;

/// Uncertainty markers that depress confidence when they appear in output
const HEDGE_MARKERS: &[&str] = &[
    "might",
    "may be",
    "possibly",
    "perhaps",
    "not sure",
    "unclear",
    "cannot determine",
    "it seems",
    "शायद",
    "स्पष्ट नहीं",
    "कदाचित",
    "खात्री नाही",
];

/// Answer generator with confidence estimation
///
/// Read-only with respect to the chunk store and embedding index; the only
/// effect is the returned `Answer`.
pub struct AnswerGenerator {
    llm: Arc<dyn LlmProvider>,
    config: GenerationConfig,
}

impl AnswerGenerator {
    /// Create a generator; config must already be validated
    pub fn new(llm: Arc<dyn LlmProvider>, config: GenerationConfig) -> Self {
        Self { llm, config }
    }

    /// Generate a confidence-scored answer from retrieved context
    ///
    /// Fails with `GenerationTimeout` when the deadline elapses; the caller
    /// may retry with a smaller context.
    pub async fn generate(
        &self,
        query: &QueryRequest,
        retrieval: &RetrievalResult,
    ) -> Result<Answer> {
        let deadline_ms = query.deadline_ms.unwrap_or(self.config.deadline_ms);
        let target = query.resolved_target_language();

        let (context, used) =
            PromptBuilder::build_context(&retrieval.passages, self.config.max_context_chars);
        let prompt = PromptBuilder::build_answer_prompt(
            &query.question,
            &context,
            target,
            &query.conversation,
        );

        let samples = self.config.consistency_samples.max(1);
        tracing::debug!(model = self.llm.model(), samples, "generating answer");

        let generations = tokio::time::timeout(
            Duration::from_millis(deadline_ms),
            futures::future::try_join_all((0..samples).map(|_| self.llm.generate(&prompt))),
        )
        .await
        .map_err(|_| Error::GenerationTimeout(deadline_ms))??;

        let text = generations[0].clone();
        let agreement = self_consistency(&generations);
        let hedging_factor = 1.0 - hedging_penalty(&text);
        let confidence = self.combine_confidence(retrieval.top_score(), agreement, hedging_factor);

        let citations: Vec<Citation> = used
            .iter()
            .map(|p| Citation::from_chunk(&p.chunk, p.score))
            .collect();

        let mut answer = Answer {
            text,
            language: target,
            confidence,
            citations,
            verification_status: VerificationStatus::Unverified,
            claims: Vec::new(),
            verification_degraded: false,
        };
        answer.clamp_confidence();

        // Low confidence gets a disclaimer, never silent suppression
        if answer.confidence < self.config.disclaimer_floor {
            answer.text.push_str("\n\n");
            answer.text.push_str(PromptBuilder::disclaimer(target));
        }

        Ok(answer)
    }

    fn combine_confidence(&self, top_score: f32, agreement: f32, hedging_factor: f32) -> f32 {
        let total = self.config.retrieval_weight
            + self.config.consistency_weight
            + self.config.hedging_weight;
        let sum = self.config.retrieval_weight * top_score.clamp(0.0, 1.0)
            + self.config.consistency_weight * agreement
            + self.config.hedging_weight * hedging_factor;
        sum / total
    }
}

/// Mean pairwise token-set agreement across samples (1.0 for a single sample)
fn self_consistency(generations: &[String]) -> f32 {
    if generations.len() < 2 {
        return 1.0;
    }

    let token_sets: Vec<HashSet<String>> = generations
        .iter()
        .map(|g| crate::retrieval::scoring::tokenize(g).into_iter().collect())
        .collect();

    let mut total = 0.0f32;
    let mut pairs = 0usize;
    for i in 0..token_sets.len() {
        for j in (i + 1)..token_sets.len() {
            total += jaccard(&token_sets[i], &token_sets[j]);
            pairs += 1;
        }
    }

    total / pairs as f32
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f32 / union as f32
}

/// Penalty in [0, 0.6] for hedging/uncertainty language in the output
fn hedging_penalty(text: &str) -> f32 {
    let lower = text.to_lowercase();
    let matches = HEDGE_MARKERS
        .iter()
        .filter(|marker| lower.contains(*marker))
        .count();
    (matches as f32 * 0.15).min(0.6)
}

/// Suggested follow-up questions by query topic
pub fn followup_questions(question: &str) -> Vec<String> {
    let lower = question.to_lowercase();

    let suggestions: &[&str] = if lower.contains("cover") {
        &[
            "What is not covered by my policy?",
            "How much coverage do I have?",
            "Can I add additional coverage?",
        ]
    } else if lower.contains("premium") || lower.contains("cost") {
        &[
            "When is my premium due?",
            "How can I pay my premium?",
            "What happens if I miss a payment?",
        ]
    } else if lower.contains("claim") {
        &[
            "What documents do I need for a claim?",
            "How long does claim processing take?",
            "Can I track my claim status?",
        ]
    } else {
        &[
            "What does my policy cover?",
            "When does my policy expire?",
            "How do I contact customer service?",
        ]
    };

    suggestions.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::{Granularity, RankedPassage};
    use crate::types::Language;
    use crate::types::{Chunk, SectionLabel};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use uuid::Uuid;

    /// Fake LLM returning scripted outputs in order
    struct ScriptedLlm {
        outputs: Mutex<Vec<String>>,
        delay_ms: u64,
    }

    impl ScriptedLlm {
        fn new(outputs: &[&str]) -> Self {
            let mut outputs: Vec<String> = outputs.iter().map(|s| s.to_string()).collect();
            outputs.reverse();
            Self {
                outputs: Mutex::new(outputs),
                delay_ms: 0,
            }
        }

        fn slow(output: &str, delay_ms: u64) -> Self {
            Self {
                outputs: Mutex::new(vec![output.to_string()]),
                delay_ms,
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        async fn generate(&self, _prompt: &str) -> crate::error::Result<String> {
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            let mut outputs = self.outputs.lock();
            Ok(outputs.pop().unwrap_or_else(|| "The waiting period is 48 months.".to_string()))
        }

        async fn health_check(&self) -> crate::error::Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    fn retrieval(score: f32) -> RetrievalResult {
        let content = "Pre-existing conditions: 48-month waiting period.";
        RetrievalResult {
            passages: vec![RankedPassage {
                chunk: Chunk::new(
                    Uuid::new_v4(),
                    content.to_string(),
                    SectionLabel::Exclusions,
                    Language::En,
                    0,
                    content.len(),
                    0,
                ),
                score,
                granularity: Granularity::Passage,
            }],
        }
    }

    fn config(samples: usize) -> GenerationConfig {
        GenerationConfig {
            consistency_samples: samples,
            ..GenerationConfig::default()
        }
    }

    #[tokio::test]
    async fn consistent_samples_score_higher_than_divergent() {
        let query = QueryRequest::new("What is the waiting period?");

        let consistent = AnswerGenerator::new(
            Arc::new(ScriptedLlm::new(&[
                "The waiting period is 48 months [1].",
                "The waiting period is 48 months [1].",
                "The waiting period is 48 months [1].",
            ])),
            config(3),
        );
        let divergent = AnswerGenerator::new(
            Arc::new(ScriptedLlm::new(&[
                "The waiting period is 48 months [1].",
                "Dental treatment is excluded entirely.",
                "Premiums are payable each January.",
            ])),
            config(3),
        );

        let high = consistent.generate(&query, &retrieval(0.9)).await.unwrap();
        let low = divergent.generate(&query, &retrieval(0.9)).await.unwrap();
        assert!(high.confidence > low.confidence);
    }

    #[tokio::test]
    async fn hedged_output_lowers_confidence() {
        let query = QueryRequest::new("What is the waiting period?");

        let direct = AnswerGenerator::new(
            Arc::new(ScriptedLlm::new(&["The waiting period is 48 months [1]."])),
            config(1),
        );
        let hedged = AnswerGenerator::new(
            Arc::new(ScriptedLlm::new(&[
                "It might possibly be 48 months, but this is unclear and I am not sure.",
            ])),
            config(1),
        );

        let high = direct.generate(&query, &retrieval(0.9)).await.unwrap();
        let low = hedged.generate(&query, &retrieval(0.9)).await.unwrap();
        assert!(high.confidence > low.confidence);
    }

    #[tokio::test]
    async fn low_confidence_appends_localized_disclaimer() {
        let query = QueryRequest::new("What is the waiting period?")
            .with_target_language(Language::Mr);

        let generator = AnswerGenerator::new(
            Arc::new(ScriptedLlm::new(&[
                "It might possibly be 48 months, but this is unclear and I am not sure.",
            ])),
            config(1),
        );

        // Weak retrieval + hedged output lands below the 0.5 floor
        let answer = generator.generate(&query, &retrieval(0.1)).await.unwrap();
        assert!(answer.confidence < 0.5);
        assert!(answer.text.contains("खात्री"));
        assert_eq!(answer.language, Language::Mr);
    }

    #[tokio::test]
    async fn deadline_overrun_is_generation_timeout() {
        let mut query = QueryRequest::new("What is the waiting period?");
        query.deadline_ms = Some(20);

        let generator = AnswerGenerator::new(
            Arc::new(ScriptedLlm::slow("too late", 200)),
            config(1),
        );

        let err = generator.generate(&query, &retrieval(0.9)).await.unwrap_err();
        assert!(matches!(err, Error::GenerationTimeout(20)));
    }

    #[tokio::test]
    async fn citations_come_from_context_passages() {
        let query = QueryRequest::new("What is the waiting period?");
        let generator = AnswerGenerator::new(
            Arc::new(ScriptedLlm::new(&["The waiting period is 48 months [1]."])),
            config(1),
        );

        let retrieval = retrieval(0.9);
        let answer = generator.generate(&query, &retrieval).await.unwrap();
        assert_eq!(answer.citations.len(), 1);
        assert_eq!(answer.citations[0].chunk_id, retrieval.passages[0].chunk.id);
        assert_eq!(answer.verification_status, VerificationStatus::Unverified);
    }

    #[test]
    fn followups_route_by_topic() {
        assert!(followup_questions("How do I make a claim?")[0].contains("claim"));
        assert!(followup_questions("What does my policy cover?")[0].contains("covered"));
    }
}
