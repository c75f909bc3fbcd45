/// Word characters: alphanumerics and underscore
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// End offsets (exclusive, in chars) of every maximal run of word characters
pub fn word_ends(chars: &[char]) -> Vec<usize> {
    let mut ends = Vec::new();
    let mut in_word = false;
    for (idx, &c) in chars.iter().enumerate() {
        let word = is_word_char(c);
        if in_word && !word {
            ends.push(idx);
        }
        in_word = word;
    }
    if in_word {
        ends.push(chars.len());
    }
    ends
}

/// Number of words in `text`; punctuation and whitespace never count
pub fn count_words(text: &str) -> usize {
    let chars: Vec<char> = text.chars().collect();
    word_ends(&chars).len()
}

/// Number of words whose every character lies before `index`
pub fn completed_words(ends: &[usize], index: usize) -> usize {
    ends.partition_point(|&end| end <= index)
}

/// Span of the whitespace-delimited token around `index`, used for current-word highlighting.
/// Empty when whitespace sits on both sides of the cursor.
pub fn current_word_range(chars: &[char], index: usize) -> std::ops::Range<usize> {
    let index = index.min(chars.len());
    let mut start = index;
    while start > 0 && !chars[start - 1].is_whitespace() {
        start -= 1;
    }
    let mut end = index;
    while end < chars.len() && !chars[end].is_whitespace() {
        end += 1;
    }
    start..end
}
