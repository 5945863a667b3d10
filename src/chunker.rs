/// Punctuation typed as its own individually-timed chunk.
const CHUNK_PUNCTUATION: &str = "*-#`_[](){}<>!~+|\"'.,:;/?\\";

/// Longest word-like run returned as a single chunk.
const MAX_WORD_RUN: usize = 12;

/// Splits input text into typing units consumed one at a time: a word-like
/// run of up to 12 plain characters, or exactly one newline/tab,
/// punctuation or whitespace character. Delay and burst/pause decisions
/// operate on these units rather than on raw characters.
#[derive(Debug)]
pub struct TextChunker {
    text: String,
    cursor: usize,
}

impl TextChunker {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cursor: 0,
        }
    }

    pub fn has_more(&self) -> bool {
        self.cursor < self.text.len()
    }

    /// Progress through the source text as a percentage. Empty input is
    /// complete immediately.
    pub fn progress_percent(&self) -> u32 {
        if self.text.is_empty() {
            return 100;
        }
        (self.cursor * 100 / self.text.len()) as u32
    }

    pub fn next_chunk(&mut self) -> Option<&str> {
        let rest = &self.text[self.cursor..];
        let first = rest.chars().next()?;

        if first == '\n' || first == '\t' || is_chunk_punctuation(first) || first.is_whitespace() {
            let end = self.cursor + first.len_utf8();
            let chunk = &self.text[self.cursor..end];
            self.cursor = end;
            return Some(chunk);
        }

        let mut len = 0usize;
        for (count, (idx, c)) in rest.char_indices().enumerate() {
            if count == MAX_WORD_RUN || is_chunk_boundary(c) {
                break;
            }
            len = idx + c.len_utf8();
        }

        let end = self.cursor + len;
        let chunk = &self.text[self.cursor..end];
        self.cursor = end;
        Some(chunk)
    }
}

fn is_chunk_punctuation(c: char) -> bool {
    CHUNK_PUNCTUATION.contains(c)
}

fn is_chunk_boundary(c: char) -> bool {
    c == '\n' || c == '\t' || is_chunk_punctuation(c) || c.is_whitespace()
}
