//! Small text helpers shared by the keyword-driven stages.
//!
//! Matching is case-insensitive and word-bounded: "go" does not match "google",
//! "1 year" does not match "11 years".

/// Byte offsets (into `lower_haystack`) of every word-bounded occurrence of `lower_phrase`.
/// Both arguments must already be lowercase.
pub fn phrase_offsets(lower_haystack: &str, lower_phrase: &str) -> Vec<usize> {
    let mut hits = Vec::new();
    if lower_phrase.is_empty() {
        return hits;
    }

    let mut from = 0;
    while let Some(rel) = lower_haystack[from..].find(lower_phrase) {
        let start = from + rel;
        let end = start + lower_phrase.len();
        let before_ok = lower_haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = lower_haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            hits.push(start);
        }
        from = start + lower_phrase.chars().next().map_or(1, char::len_utf8);
    }
    hits
}

/// True if `phrase` occurs in `haystack` on word boundaries, ignoring case.
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    !phrase_offsets(&haystack.to_lowercase(), &phrase.to_lowercase()).is_empty()
}

/// Returns the first phrase from `phrases` found in `haystack`, ignoring case.
pub fn first_phrase_in<'a>(haystack: &str, phrases: &[&'a str]) -> Option<&'a str> {
    let lower = haystack.to_lowercase();
    phrases
        .iter()
        .copied()
        .find(|p| !phrase_offsets(&lower, &p.to_lowercase()).is_empty())
}

/// Splits prose into sentences, keeping terminal punctuation. Newlines also end a sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let boundary = match c {
            '.' | '!' | '?' => chars
                .peek()
                .map_or(false, |&(_, next)| next.is_whitespace())
                .then_some(i + c.len_utf8()),
            '\n' => Some(i),
            _ => None,
        };
        if let Some(end) = boundary {
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}
