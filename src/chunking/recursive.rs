//! Recursive character splitting.
//!
//! Splits on the coarsest separator present in the text (paragraphs, then
//! lines, then words, then characters), merges the pieces back into chunks of
//! at most `chunk_size` characters and carries up to `chunk_overlap`
//! characters of trailing context into the next chunk.

use std::collections::VecDeque;

/// Separators tried in order, coarsest first.
pub const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

pub(super) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Recursive character splitter with a fixed window and overlap.
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveSplitter {
    pub(super) fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Split `text` into chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &self.separators)
    }

    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut finer: &[String] = &[];

        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate;
                finer = &separators[i + 1..];
                break;
            }
        }

        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|s| !s.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();

        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting, separator));
                fitting.clear();
            }

            if finer.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_with(piece, finer));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting, separator));
        }

        chunks
    }

    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let separator_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            let joiner = |window: &VecDeque<&str>| if window.is_empty() { 0 } else { separator_len };

            if total + len + joiner(&window) > self.chunk_size && !window.is_empty() {
                if let Some(chunk) = join(&window, separator) {
                    chunks.push(chunk);
                }

                // Drop from the front until only the overlap tail remains and
                // the next piece fits.
                while total > self.chunk_overlap
                    || (total + len + joiner(&window) > self.chunk_size && total > 0)
                {
                    let extra = if window.len() > 1 { separator_len } else { 0 };
                    match window.pop_front() {
                        Some(first) => total = total.saturating_sub(char_len(first) + extra),
                        None => {
                            total = 0;
                            break;
                        }
                    }
                }
            }

            window.push_back(piece);
            total += len + if window.len() > 1 { separator_len } else { 0 };
        }

        if let Some(chunk) = join(&window, separator) {
            chunks.push(chunk);
        }

        chunks
    }
}

fn join(window: &VecDeque<&str>, separator: &str) -> Option<String> {
    let text = window.iter().copied().collect::<Vec<_>>().join(separator);
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_windows_overlap() {
        let splitter = RecursiveSplitter::new(10, 4);
        let chunks = splitter.split("aaa bbb ccc ddd eee");
        assert_eq!(chunks, vec!["aaa bbb", "bbb ccc", "ccc ddd", "ddd eee"]);
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let splitter = RecursiveSplitter::new(10, 2);
        let chunks = splitter.split("para one\n\npara two");
        assert_eq!(chunks, vec!["para one", "para two"]);
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let splitter = RecursiveSplitter::new(1000, 100);
        let chunks = splitter.split("Degree requirements\nCore courses");
        assert_eq!(chunks, vec!["Degree requirements\nCore courses"]);
    }

    #[test]
    fn test_unbroken_text_falls_back_to_characters() {
        let splitter = RecursiveSplitter::new(4, 1);
        let chunks = splitter.split("abcdefghij");
        assert!(chunks.iter().all(|c| char_len(c) <= 4));
        assert_eq!(chunks.first().map(String::as_str), Some("abcd"));
        assert!(chunks.last().unwrap().ends_with('j'));
    }

    #[test]
    fn test_chunks_respect_size_on_long_text() {
        let sentence = "The practicum pairs students with industry partners for a quarter. ";
        let text = sentence.repeat(60);
        let splitter = RecursiveSplitter::new(1000, 100);
        let chunks = splitter.split(&text);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| char_len(c) <= 1000));

        // Consecutive chunks share trailing context.
        let tail: String = chunks[0].split(' ').last().unwrap().to_string();
        assert!(chunks[1].contains(&tail));
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let splitter = RecursiveSplitter::new(5, 0);
        let chunks = splitter.split("ééééé ààààà");
        assert_eq!(chunks, vec!["ééééé", "ààààà"]);
    }
}
