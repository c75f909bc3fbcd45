use crate::{catalog, rng::Mulberry32};
use clap::ValueEnum;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

const PUNCTUATION: [char; 5] = [',', '.', ';', '!', '?'];
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:\",.<>/?";
const NUMBER_CEILING: f64 = 10_000.0;

/// What kind of material to practice on
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ContentType {
    #[default]
    Words,
    Quotes,
    Numbers,
    Code,
    Custom,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase", from = "String")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    /// Parse a difficulty name, falling back to `Normal` for anything unrecognized
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Normal,
        }
    }

    pub fn caps_chance(self) -> f64 {
        match self {
            Difficulty::Easy => 0.03,
            Difficulty::Normal => 0.08,
            Difficulty::Hard => 0.15,
        }
    }

    /// Easy keeps a little punctuation even when punctuation is switched off
    pub fn punct_chance(self, include_punctuation: bool) -> f64 {
        match (self, include_punctuation) {
            (Difficulty::Easy, _) => 0.05,
            (Difficulty::Normal, true) => 0.15,
            (Difficulty::Hard, true) => 0.25,
            (_, false) => 0.0,
        }
    }
}

impl From<String> for Difficulty {
    fn from(name: String) -> Self {
        Difficulty::from_name(&name)
    }
}

/// Parameters for one generated text
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub word_count: usize,
    pub include_punctuation: bool,
    pub seed: u32,
    pub content_type: ContentType,
    pub difficulty: Difficulty,
    pub custom_text: String,
}

impl TextRequest {
    /// Plain word-mode request with a fixed seed
    pub fn words(word_count: usize, seed: u32) -> Self {
        Self {
            word_count,
            include_punctuation: true,
            seed,
            content_type: ContentType::Words,
            difficulty: Difficulty::Normal,
            custom_text: String::new(),
        }
    }
}

impl Default for TextRequest {
    fn default() -> Self {
        Self::words(50, seed_from_clock())
    }
}

/// Seed derived from the wall clock, for sessions that don't need to be reproducible
pub fn seed_from_clock() -> u32 {
    chrono::Utc::now().timestamp_millis() as u32
}

/// Produce the text to type for `request`. Identical requests yield identical text.
pub fn generate_text(request: &TextRequest) -> String {
    let mut rng = Mulberry32::new(request.seed);

    match request.content_type {
        ContentType::Custom if !request.custom_text.trim().is_empty() => {
            request.custom_text.trim().to_string()
        }
        ContentType::Quotes => pick_entry(&catalog::quotes().entries, &mut rng),
        ContentType::Code => pick_entry(&catalog::code().entries, &mut rng),
        ContentType::Numbers => generate_numbers(request.word_count, &mut rng),
        ContentType::Words | ContentType::Custom => generate_words(request, &mut rng),
    }
}

fn pick_entry(entries: &[String], rng: &mut Mulberry32) -> String {
    rng.pick(entries).cloned().unwrap_or_default()
}

fn generate_numbers(count: usize, rng: &mut Mulberry32) -> String {
    let symbols: Vec<char> = SYMBOLS.chars().collect();

    (0..count)
        .map(|_| {
            let mut token = ((rng.next_f64() * NUMBER_CEILING).floor() as u32).to_string();
            if rng.chance(0.5) {
                token.extend(rng.pick(&PUNCTUATION));
            }
            if rng.chance(0.5) {
                token.extend(rng.pick(&symbols));
            }
            token
        })
        .join(" ")
}

fn generate_words(request: &TextRequest, rng: &mut Mulberry32) -> String {
    let vocabulary = &catalog::words().entries;
    if vocabulary.is_empty() {
        return String::new();
    }

    let caps_chance = request.difficulty.caps_chance();
    let punct_chance = request.difficulty.punct_chance(request.include_punctuation);
    let last = request.word_count.saturating_sub(1);

    (0..request.word_count)
        .filter_map(|i| {
            let mut word = rng.pick(vocabulary)?.clone();
            if rng.chance(caps_chance) {
                word = capitalize(&word);
            }
            // the roll is drawn for every word so the stream stays aligned
            if rng.chance(punct_chance) && i != last {
                word.extend(rng.pick(&PUNCTUATION));
            }
            Some(word)
        })
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::count_words;

    fn request(content_type: ContentType, seed: u32) -> TextRequest {
        TextRequest {
            content_type,
            ..TextRequest::words(5, seed)
        }
    }

    #[test]
    fn test_same_seed_same_text() {
        let req = TextRequest::words(30, 1234);
        assert_eq!(generate_text(&req), generate_text(&req));
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = generate_text(&TextRequest::words(30, 1));
        let b = generate_text(&TextRequest::words(30, 2));
        assert_ne!(a, b);
    }

    #[test]
    fn test_known_word_stream() {
        assert_eq!(
            generate_text(&TextRequest::words(5, 42)),
            "seem good company come great"
        );
    }

    #[test]
    fn test_known_hard_word_stream() {
        let req = TextRequest {
            difficulty: Difficulty::Hard,
            ..TextRequest::words(8, 7)
        };
        assert_eq!(
            generate_text(&req),
            "Time first see long! want number same Place"
        );
    }

    #[test]
    fn test_word_count_respected() {
        let text = generate_text(&TextRequest::words(25, 99));
        assert_eq!(text.split(' ').count(), 25);
        assert_eq!(count_words(&text), 25);
    }

    #[test]
    fn test_last_word_never_punctuated() {
        for seed in 0..200 {
            let req = TextRequest {
                difficulty: Difficulty::Hard,
                ..TextRequest::words(6, seed)
            };
            let text = generate_text(&req);
            let last = text.chars().last().unwrap();
            assert!(!PUNCTUATION.contains(&last), "seed {seed}: {text}");
        }
    }

    #[test]
    fn test_no_punctuation_when_disabled() {
        for seed in 0..50 {
            let req = TextRequest {
                include_punctuation: false,
                ..TextRequest::words(20, seed)
            };
            let text = generate_text(&req);
            assert!(!text.chars().any(|c| PUNCTUATION.contains(&c)), "{text}");
        }
    }

    #[test]
    fn test_zero_words_is_empty() {
        assert_eq!(generate_text(&TextRequest::words(0, 5)), "");
        assert_eq!(generate_text(&request(ContentType::Numbers, 5).with_count(0)), "");
    }

    #[test]
    fn test_custom_text_is_trimmed_and_verbatim() {
        let req = TextRequest {
            content_type: ContentType::Custom,
            custom_text: "  Hello, custom world!\n".to_string(),
            difficulty: Difficulty::Hard,
            ..TextRequest::words(100, 9)
        };
        assert_eq!(generate_text(&req), "Hello, custom world!");
    }

    #[test]
    fn test_blank_custom_text_falls_back_to_words() {
        let req = TextRequest {
            content_type: ContentType::Custom,
            custom_text: "   ".to_string(),
            ..TextRequest::words(5, 42)
        };
        assert_eq!(generate_text(&req), "seem good company come great");
    }

    #[test]
    fn test_quotes_come_from_catalog() {
        let text = generate_text(&request(ContentType::Quotes, 42));
        assert_eq!(text, "Quality is not an act, it is a habit.");
        for seed in 0..20 {
            let text = generate_text(&request(ContentType::Quotes, seed));
            assert!(catalog::quotes().entries.contains(&text));
        }
    }

    #[test]
    fn test_code_comes_from_catalog() {
        let text = generate_text(&request(ContentType::Code, 42));
        assert!(text.starts_with("const greet"));
        assert!(text.contains('\n'));
    }

    #[test]
    fn test_known_numbers_stream() {
        let req = request(ContentType::Numbers, 42).with_count(4);
        assert_eq!(generate_text(&req), "6011? 1748} 8654. 7457,");
    }

    #[test]
    fn test_numbers_tokens_shape() {
        let req = request(ContentType::Numbers, 77).with_count(40);
        let text = generate_text(&req);
        let tokens: Vec<&str> = text.split(' ').collect();
        assert_eq!(tokens.len(), 40);
        for token in tokens {
            let digits: String = token.chars().take_while(|c| c.is_ascii_digit()).collect();
            let n: u32 = digits.parse().unwrap();
            assert!(n < 10_000);
            assert!(token.chars().count() - digits.len() <= 2, "{token}");
        }
    }

    #[test]
    fn test_difficulty_fallback() {
        assert_eq!(Difficulty::from_name("HARD"), Difficulty::Hard);
        assert_eq!(Difficulty::from_name("easy"), Difficulty::Easy);
        assert_eq!(Difficulty::from_name("nightmare"), Difficulty::Normal);
        let parsed: Difficulty = serde_json::from_str("\"bogus\"").unwrap();
        assert_eq!(parsed, Difficulty::Normal);
    }

    #[test]
    fn test_chances_table() {
        assert_eq!(Difficulty::Easy.punct_chance(false), 0.05);
        assert_eq!(Difficulty::Normal.punct_chance(true), 0.15);
        assert_eq!(Difficulty::Normal.punct_chance(false), 0.0);
        assert_eq!(Difficulty::Hard.punct_chance(true), 0.25);
        assert_eq!(Difficulty::Hard.caps_chance(), 0.15);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("time"), "Time");
        assert_eq!(capitalize(""), "");
    }

    impl TextRequest {
        fn with_count(mut self, word_count: usize) -> Self {
            self.word_count = word_count;
            self
        }
    }
}
