//! Word-boundary splitting of long replies into deliverable segments.

/// Platform limit for a single outbound message, in characters.
pub const DEFAULT_DELIVERY_LIMIT: usize = 2000;

/// Splits `text` into chunks of at most `limit` characters, breaking at spaces when possible.
///
/// ```rust
/// let chunks = pchat::split("alpha beta gamma", 11).collect::<Vec<_>>();
/// assert_eq!(chunks, vec!["alpha beta", "gamma"]);
/// ```
pub fn split(text: &str, limit: usize) -> Chunks<'_> {
    Chunks {
        remaining: text,
        limit: limit.max(1),
        emitted: false,
    }
}

#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    remaining: &'a str,
    limit: usize,
    emitted: bool,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            if self.emitted {
                return None;
            }
            self.emitted = true;
            return Some("");
        }
        self.emitted = true;

        let remaining = self.remaining;
        let Some((hard_end, _)) = remaining.char_indices().nth(self.limit) else {
            self.remaining = "";
            return Some(remaining);
        };

        let window = &remaining[..hard_end];
        let end = if remaining[hard_end..].starts_with(' ') {
            Some(hard_end)
        } else {
            window.rfind(' ')
        };

        // A window holding only leading spaces is cut at the hard limit instead.
        let chunk = end
            .map(|end| remaining[..end].trim_end_matches(' '))
            .filter(|chunk| !chunk.is_empty())
            .unwrap_or(window);
        self.remaining = remaining[chunk.len()..].trim_start_matches(' ');
        Some(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(text: &str, limit: usize) -> Vec<&str> {
        split(text, limit).collect()
    }

    #[test]
    fn short_text_is_a_single_identical_chunk() {
        assert_eq!(chunks("hello world", 2000), vec!["hello world"]);
        assert_eq!(chunks("exactly", 7), vec!["exactly"]);
        assert_eq!(chunks("", 10), vec![""]);
        assert_eq!(chunks("  padded  ", 10), vec!["  padded  "]);
    }

    #[test]
    fn long_text_breaks_before_words_and_drops_separators() {
        let text = "the quick brown fox jumps over the lazy dog";
        let parts = chunks(text, 10);

        assert_eq!(parts, vec!["the quick", "brown fox", "jumps over", "the lazy", "dog"]);
        assert!(parts.iter().all(|part| !part.starts_with(' ')));
    }

    #[test]
    fn runs_of_spaces_at_break_are_skipped() {
        assert_eq!(chunks("aaaa     bbbb", 6), vec!["aaaa", "bbbb"]);
    }

    #[test]
    fn unbroken_words_fall_back_to_hard_limit() {
        assert_eq!(chunks("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(chunks(" abcdef", 3), vec![" ab", "cde", "f"]);
    }

    #[test]
    fn zero_limit_still_makes_progress() {
        assert_eq!(chunks("abc", 0), vec!["a", "b", "c"]);
    }

    #[test]
    fn limits_count_characters_not_bytes() {
        let text = "héllo wörld ünïcode";
        let parts = chunks(text, 6);

        assert_eq!(parts, vec!["héllo", "wörld", "ünïcod", "e"]);
        assert!(parts.iter().all(|part| part.chars().count() <= 6));
    }

    #[test]
    fn splitting_is_restartable() {
        let first = split("one two three four", 8);
        let replay = first.clone();
        assert_eq!(first.collect::<Vec<_>>(), replay.collect::<Vec<_>>());
    }

    #[test]
    fn long_reply_splits_into_three_bounded_chunks() {
        let text = "word ".repeat(900);
        assert_eq!(text.len(), 4500);

        let parts = chunks(&text, DEFAULT_DELIVERY_LIMIT);
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|part| part.chars().count() <= DEFAULT_DELIVERY_LIMIT));
        assert!(parts.iter().all(|part| !part.starts_with(' ')));
    }

    #[test]
    fn chunks_rejoin_to_original_text() {
        let samples = [
            "lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod",
            "a bb ccc dddd eeeee ffffff ggggggg hhhhhhhh",
            "nospacesatallinthisverylongtokenthatkeepsgoing",
            "mixed longlonglonglongword short words",
        ];

        for text in samples {
            for limit in 1..=text.len() + 1 {
                let parts = chunks(text, limit);
                assert!(parts.iter().all(|part| part.chars().count() <= limit));

                let rebuilt = parts.join(" ");
                let squash = |value: &str| value.split_whitespace().collect::<Vec<_>>().concat();
                assert_eq!(squash(&rebuilt), squash(text), "limit {limit}");
            }
        }
    }
}
