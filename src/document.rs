//! Ask questions about a PDF.
//!
//! The whole document is split into overlapping chunks and sent along with
//! every question; there is no retrieval step.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, instrument, warn};

use crate::config::DocumentConfig;
use crate::llm::ChatModel;
use crate::{PromptCraftError, Result};

const PAGE_SEPARATOR: &str = "\n\n";

/// Text of every page, joined with a blank line.
#[instrument]
pub fn load_pdf(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("PDF not found: {}", path.display()),
        )
        .into());
    }

    let pages = pdf_extract::extract_text_by_pages(path).map_err(|e| {
        PromptCraftError::general(format!("Failed to extract text from {}: {e}", path.display()))
    })?;
    info!("Loaded {} pages from {}", pages.len(), path.display());
    Ok(pages.join(PAGE_SEPARATOR))
}

/// Splits on the coarsest separator present, recursing into pieces that are
/// still too long, then merges neighbours back up to `chunk_size` characters
/// with up to `chunk_overlap` characters repeated between chunks.
#[derive(Debug, Clone)]
pub struct RecursiveCharacterTextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveCharacterTextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_overlap > chunk_size {
            return Err(PromptCraftError::validation(format!(
                "Got a larger chunk overlap ({chunk_overlap}) than chunk size ({chunk_size}), should be smaller."
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: ["\n\n", "\n", " ", ""].map(String::from).to_vec(),
        })
    }

    pub fn from_config(config: &DocumentConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    #[must_use]
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let (separator, remaining) = match separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s.as_str()))
        {
            Some(i) => (separators[i].as_str(), &separators[i + 1..]),
            None => (separators.last().map_or("", String::as_str), &[][..]),
        };

        let mut chunks = Vec::new();
        let mut short = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if piece.chars().count() < self.chunk_size {
                short.push(piece);
                continue;
            }
            if !short.is_empty() {
                chunks.extend(self.merge(&short));
                short.clear();
            }
            if remaining.is_empty() || separator.is_empty() {
                chunks.push(piece);
            } else {
                chunks.extend(self.split_recursive(&piece, remaining));
            }
        }
        if !short.is_empty() {
            chunks.extend(self.merge(&short));
        }
        chunks
    }

    fn merge(&self, pieces: &[String]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0;

        for piece in pieces {
            let len = piece.chars().count();
            if total + len > self.chunk_size {
                if total > self.chunk_size {
                    warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total, self.chunk_size
                    );
                }
                if !current.is_empty() {
                    push_trimmed(&mut docs, &current);
                    while total > self.chunk_overlap
                        || (total + len > self.chunk_size && total > 0)
                    {
                        let Some(dropped) = current.pop_front() else {
                            break;
                        };
                        total -= dropped.chars().count();
                    }
                }
            }
            current.push_back(piece.as_str());
            total += len;
        }
        push_trimmed(&mut docs, &current);
        docs
    }
}

fn push_trimmed(docs: &mut Vec<String>, parts: &VecDeque<&str>) {
    let joined: String = parts.iter().copied().collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        docs.push(trimmed.to_string());
    }
}

/// Splits on `separator`, keeping it at the start of the following piece.
/// An empty separator splits into characters. Empty pieces are dropped.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }
    let mut parts = text.split(separator);
    let mut pieces: Vec<String> = parts.next().map(String::from).into_iter().collect();
    pieces.extend(parts.map(|p| format!("{separator}{p}")));
    pieces.retain(|p| !p.is_empty());
    pieces
}

/// A document held in memory, answered against one question at a time.
pub struct DocumentChat {
    model: Arc<dyn ChatModel>,
    context: String,
}

impl DocumentChat {
    pub fn new(model: Arc<dyn ChatModel>, chunks: &[String]) -> Self {
        Self {
            model,
            context: chunks.join(PAGE_SEPARATOR),
        }
    }

    /// Load, split and wrap the PDF at `path`.
    pub fn from_pdf(model: Arc<dyn ChatModel>, path: &Path, config: &DocumentConfig) -> Result<Self> {
        let text = load_pdf(path)?;
        let chunks = RecursiveCharacterTextSplitter::from_config(config)?.split_text(&text);
        debug!("Split {} into {} chunks", path.display(), chunks.len());
        Ok(Self::new(model, &chunks))
    }

    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    #[must_use]
    pub fn prompt_for(&self, question: &str) -> String {
        format!("Document: {}\n\nQuestion: {question}", self.context)
    }

    #[instrument(skip(self))]
    pub async fn ask(&self, question: &str) -> Result<String> {
        self.model.invoke(&self.prompt_for(question)).await
    }

    /// Reads questions from stdin until `quit` or end of input.
    pub async fn interactive(&self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        println!("Ask questions about the document (type 'quit' to exit):");
        loop {
            stdout.write_all(b"\nQuestion: ").await?;
            stdout.flush().await?;

            let Some(question) = lines.next_line().await? else {
                println!();
                break;
            };
            if question.trim().eq_ignore_ascii_case("quit") {
                break;
            }

            match self.ask(&question).await {
                Ok(answer) => println!("Answer: {answer}"),
                Err(e) => {
                    error!("Question failed: {e}");
                    println!("Error: {}", e.user_message());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;
    use async_trait::async_trait;
    use rstest::rstest;

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = RecursiveCharacterTextSplitter::new(1000, 200).unwrap();
        assert_eq!(splitter.split_text("  Hello world.  "), vec!["Hello world."]);
        assert!(splitter.split_text("   \n\n  ").is_empty());
    }

    #[test]
    fn test_words_merge_with_overlap() {
        let splitter = RecursiveCharacterTextSplitter::new(10, 4).unwrap();
        let chunks = splitter.split_text("aaa bbb ccc ddd");
        assert_eq!(chunks, vec!["aaa bbb", "bbb ccc", "ccc ddd"]);
    }

    #[test]
    fn test_paragraphs_are_preferred() {
        let splitter = RecursiveCharacterTextSplitter::new(12, 0).unwrap();
        let chunks = splitter.split_text("first para\n\nsecond one");
        assert_eq!(chunks, vec!["first para", "second one"]);
    }

    #[test]
    fn test_long_word_falls_back_to_characters() {
        let splitter = RecursiveCharacterTextSplitter::new(4, 0).unwrap();
        let chunks = splitter.split_text("abcdefghij");
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[rstest]
    #[case(1000, 200)]
    #[case(50, 10)]
    #[case(7, 3)]
    fn test_chunks_respect_size(#[case] size: usize, #[case] overlap: usize) {
        let text = "The quick brown fox jumps over the lazy dog.\n".repeat(40);
        let splitter = RecursiveCharacterTextSplitter::new(size, overlap).unwrap();
        let chunks = splitter.split_text(&text);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.chars().count() <= size, "{chunk:?}");
            assert_eq!(chunk.trim(), chunk);
        }
    }

    #[test]
    fn test_overlap_larger_than_size_rejected() {
        assert!(RecursiveCharacterTextSplitter::new(10, 20).is_err());
    }

    #[test]
    fn test_split_keeps_separator_at_start() {
        assert_eq!(split_keeping_separator("a b c", " "), vec!["a", " b", " c"]);
        assert_eq!(split_keeping_separator(" a", " "), vec![" a"]);
    }

    #[test]
    fn test_missing_pdf_is_io_error() {
        let err = load_pdf(Path::new("does/not/exist.pdf")).unwrap_err();
        assert!(matches!(err, PromptCraftError::Io { .. }));
    }

    struct Echo;

    #[async_trait]
    impl ChatModel for Echo {
        fn model_name(&self) -> &str {
            "echo"
        }

        async fn chat(&self, messages: &[ChatMessage], _stop: &[String]) -> Result<String> {
            Ok(messages[0].content.clone())
        }
    }

    #[tokio::test]
    async fn test_ask_sends_document_and_question() {
        let chat = DocumentChat::new(Arc::new(Echo), &["page one".into(), "page two".into()]);
        let answer = chat.ask("What is on page two?").await.unwrap();
        assert_eq!(
            answer,
            "Document: page one\n\npage two\n\nQuestion: What is on page two?"
        );
    }
}
