//! Prompt templates for grounded, multilingual answer generation

use crate::retrieval::RankedPassage;
use crate::types::{ConversationTurn, Language};

/// Prompt builder for policy Q&A
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the evidence context from ranked passages, most relevant first
    ///
    /// Stops once `max_chars` is reached and returns the passages that made
    /// it in, so citations match what the model actually saw.
    pub fn build_context<'a>(
        passages: &'a [RankedPassage],
        max_chars: usize,
    ) -> (String, Vec<&'a RankedPassage>) {
        let mut context = String::new();
        let mut used = Vec::new();

        for (i, passage) in passages.iter().enumerate() {
            let entry = format!(
                "[{}] Section: {} ({})\n{}\n\n",
                i + 1,
                passage.chunk.section.display_name(),
                passage.chunk.language.display_name(),
                passage.chunk.content
            );
            if !context.is_empty() && context.len() + entry.len() > max_chars {
                break;
            }
            context.push_str(&entry);
            used.push(passage);
        }

        (context, used)
    }

    /// Build the grounded answer prompt
    pub fn build_answer_prompt(
        question: &str,
        context: &str,
        target_language: Language,
        conversation: &[ConversationTurn],
    ) -> String {
        let history = if conversation.is_empty() {
            String::new()
        } else {
            let turns: Vec<String> = conversation
                .iter()
                .rev()
                .take(4)
                .rev()
                .map(|turn| format!("{}: {}", turn.role, turn.content))
                .collect();
            format!("\nCONVERSATION SO FAR:\n{}\n", turns.join("\n"))
        };

        format!(
            r#"You are an insurance policy assistant that ONLY uses information from the provided policy excerpts.

GROUNDING RULES:
1. ONLY use information that is EXPLICITLY stated in the EXCERPTS below
2. If the answer is not in the excerpts, say the information is not available in the policy
3. NEVER use external knowledge or make assumptions beyond what is stated
4. Reference supporting excerpts inline as [1], [2], ...

LANGUAGE RULES:
- Write the entire answer in {language}
- When an excerpt is in a different language, restate its meaning in {language}; do not translate insurance terms word-for-word
- Keep amounts, durations, and policy numbers exactly as written in the excerpts
{history}
POLICY EXCERPTS:
{context}

QUESTION: {question}

Answer in {language} using only the excerpts above:"#,
            language = target_language.display_name(),
            history = history,
            context = context,
            question = question
        )
    }

    /// Low-confidence disclaimer in the answer language
    pub fn disclaimer(language: Language) -> &'static str {
        match language {
            Language::En => {
                "Note: I am not fully confident in this answer. \
                 Please verify against your policy document or contact your insurer."
            }
            Language::Hi => {
                "नोट: मुझे इस उत्तर पर पूरा भरोसा नहीं है। \
                 कृपया अपने पॉलिसी दस्तावेज़ से पुष्टि करें या अपने बीमाकर्ता से संपर्क करें।"
            }
            Language::Mr => {
                "टीप: मला या उत्तराची पूर्ण खात्री नाही. \
                 कृपया तुमच्या पॉलिसी दस्तऐवजातून खात्री करा किंवा तुमच्या विमा कंपनीशी संपर्क साधा."
            }
        }
    }
}
