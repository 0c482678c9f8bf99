/// Splits raw document text into bounded, overlapping spans.
///
/// Separators are tried in order, preferring paragraph over line over
/// sentence over word boundaries; a piece that still exceeds the chunk size
/// after the last separator is force-split at character level.
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

impl Chunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap,
        }
    }

    /// Produces the ordered spans for `text`. Empty or whitespace-only input
    /// yields no spans.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        self.split_recursive(text, 0)
            .into_iter()
            .map(|span| span.trim().to_string())
            .filter(|span| !span.is_empty())
            .collect()
    }

    fn split_recursive(&self, text: &str, separator_idx: usize) -> Vec<String> {
        if text.len() <= self.chunk_size {
            return vec![text.to_string()];
        }
        if separator_idx >= SEPARATORS.len() {
            return force_split(text, self.chunk_size);
        }

        let separator = SEPARATORS[separator_idx];
        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        for piece in text.split(separator) {
            if piece.len() > self.chunk_size {
                if !pending.is_empty() {
                    chunks.extend(self.merge_parts(&pending, separator));
                    pending.clear();
                }
                chunks.extend(self.split_recursive(piece, separator_idx + 1));
            } else {
                pending.push(piece);
            }
        }
        if !pending.is_empty() {
            chunks.extend(self.merge_parts(&pending, separator));
        }

        chunks
    }

    /// Greedily packs small pieces into chunks, carrying up to
    /// `chunk_overlap` characters of trailing context into the next chunk.
    fn merge_parts(&self, parts: &[&str], separator: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_len = 0usize;

        for &part in parts {
            let sep_len = if current.is_empty() { 0 } else { separator.len() };

            if current_len + sep_len + part.len() > self.chunk_size && !current.is_empty() {
                chunks.push(current.join(separator));

                if self.chunk_overlap == 0 {
                    current.clear();
                    current_len = 0;
                } else {
                    while current_len > self.chunk_overlap && current.len() > 1 {
                        let removed = current.remove(0);
                        current_len -= removed.len() + separator.len();
                    }
                }
            }

            current.push(part);
            current_len += if current.len() == 1 {
                part.len()
            } else {
                separator.len() + part.len()
            };
        }

        if !current.is_empty() {
            chunks.push(current.join(separator));
        }

        chunks
    }
}

fn force_split(text: &str, chunk_size: usize) -> Vec<String> {
    text.chars()
        .collect::<Vec<char>>()
        .chunks(chunk_size)
        .map(|chars| chars.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_produces_no_spans() {
        let chunker = Chunker::new(100, 20);
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("   \n\n  ").is_empty());
    }

    #[test]
    fn short_input_is_a_single_span() {
        let chunker = Chunker::new(100, 20);
        let chunks = chunker.chunk("just one small paragraph");
        assert_eq!(chunks, vec!["just one small paragraph".to_string()]);
    }

    #[test]
    fn spans_are_bounded() {
        let chunker = Chunker::new(40, 10);
        let text = "word plum kiwi pear fig date ".repeat(10);
        let chunks = chunker.chunk(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= 40, "span too long: {:?}", chunk);
        }
    }

    #[test]
    fn paragraph_boundaries_are_preferred() {
        let chunker = Chunker::new(12, 0);
        let chunks = chunker.chunk("para one.\n\npara two.");
        assert_eq!(
            chunks,
            vec!["para one.".to_string(), "para two.".to_string()]
        );
    }

    #[test]
    fn long_paragraph_falls_back_to_sentences() {
        let chunker = Chunker::new(30, 0);
        let text = "First sentence here. Second sentence here. Third sentence here.";
        let chunks = chunker.chunk(text);

        assert!(chunks.len() >= 2);
        assert!(chunks[0].starts_with("First sentence"));
    }

    #[test]
    fn consecutive_spans_overlap() {
        let chunker = Chunker::new(30, 12);
        let text = "aa bb cc dd ee ff gg hh ii jj kk ll mm nn oo";
        let chunks = chunker.chunk(text);

        assert!(chunks.len() >= 2);
        let first_tail: Vec<&str> = chunks[0].split_whitespace().rev().take(2).collect();
        for word in first_tail {
            assert!(
                chunks[1].contains(word),
                "expected {:?} to carry over into {:?}",
                word,
                chunks[1]
            );
        }
    }

    #[test]
    fn unbreakable_text_is_force_split() {
        let chunker = Chunker::new(10, 0);
        let text = "x".repeat(35);
        let chunks = chunker.chunk(&text);

        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().all(|c| c.len() <= 10));
    }
}
