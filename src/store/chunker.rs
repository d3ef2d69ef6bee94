//! Sentence-respecting text chunker for raw-text ingests

use unicode_segmentation::UnicodeSegmentation;
use uuid::Uuid;

use crate::config::ChunkingConfig;
use crate::types::{Chunk, Language, SectionLabel};

/// Text chunker with configurable size
///
/// Chunks never overlap; retrieval offsets must stay disjoint within a
/// document.
pub struct TextChunker {
    chunk_size: usize,
    min_size: usize,
}

impl TextChunker {
    /// Create a chunker from configuration
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            min_size: config.min_chunk_size,
        }
    }

    /// Split raw policy text into chunks with monotonic, disjoint offsets
    ///
    /// Section labels are detected from each chunk's leading text.
    pub fn chunk_text(&self, document_id: Uuid, text: &str, language: Language) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_start = 0usize;
        let mut char_pos = 0usize;
        let mut chunk_index = 0u32;

        for sentence in text.split_sentence_bounds() {
            let sentence_len = sentence.len();

            if !current.is_empty() && current.len() + sentence_len > self.chunk_size {
                if current.trim().len() >= self.min_size {
                    chunks.push(self.make_chunk(
                        document_id,
                        &current,
                        language,
                        current_start,
                        char_pos,
                        chunk_index,
                    ));
                    chunk_index += 1;
                }
                current.clear();
                current_start = char_pos;
            }

            current.push_str(sentence);
            char_pos += sentence_len;
        }

        if current.trim().len() >= self.min_size {
            chunks.push(self.make_chunk(
                document_id,
                &current,
                language,
                current_start,
                char_pos,
                chunk_index,
            ));
        }

        chunks
    }

    fn make_chunk(
        &self,
        document_id: Uuid,
        text: &str,
        language: Language,
        start: usize,
        end: usize,
        index: u32,
    ) -> Chunk {
        let trimmed = text.trim();
        // Char-safe head; byte slicing could split a Devanagari char
        let head: String = trimmed.chars().take(120).collect();
        let section = SectionLabel::detect(&head);
        Chunk::new(
            document_id,
            trimmed.to_string(),
            section,
            language,
            start,
            end,
            index,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChunkingConfig;

    fn chunker(size: usize) -> TextChunker {
        TextChunker::new(&ChunkingConfig {
            chunk_size: size,
            min_chunk_size: 10,
        })
    }

    #[test]
    fn offsets_are_monotonic_and_disjoint() {
        let text = "Hospitalization expenses are covered up to the sum insured. \
                    Pre-existing conditions carry a waiting period. \
                    Claims must be intimated within 48 hours of admission. \
                    Premium is payable annually before the due date.";
        let chunks = chunker(80).chunk_text(Uuid::new_v4(), text, Language::En);

        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            assert!(pair[0].char_end <= pair[1].char_start);
            assert!(pair[0].chunk_index < pair[1].chunk_index);
        }
    }

    #[test]
    fn exclusion_text_gets_the_exclusions_label() {
        let text = "Exclusions: cosmetic surgery and dental treatment are not covered under this policy.";
        let chunks = chunker(200).chunk_text(Uuid::new_v4(), text, Language::En);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].section, SectionLabel::Exclusions);
    }
}
