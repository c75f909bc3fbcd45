use serde::{Deserialize, Serialize};

/// Characters per "word" in the standard WPM convention
pub const CHARS_PER_WORD: f64 = 5.0;

const MS_PER_MINUTE: f64 = 60_000.0;

/// Speed and accuracy figures for a session at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub wpm: u64,
    pub raw: u64,
    pub accuracy: u8,
    pub errors: usize,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            wpm: 0,
            raw: 0,
            accuracy: 100,
            errors: 0,
        }
    }
}

/// Convert raw counters and elapsed time into wpm, raw wpm and accuracy.
///
/// Elapsed time is floored at 1ms so a freshly started session never divides by zero.
pub fn compute_stats(correct_chars: usize, total_chars: usize, errors: usize, elapsed_ms: u64) -> Stats {
    let minutes = elapsed_ms.max(1) as f64 / MS_PER_MINUTE;

    let wpm = ((correct_chars as f64 / CHARS_PER_WORD) / minutes).round() as u64;
    let raw = ((total_chars as f64 / CHARS_PER_WORD) / minutes).round() as u64;

    let accuracy = if total_chars > 0 {
        ((correct_chars as f64 / total_chars as f64) * 100.0)
            .round()
            .clamp(0.0, 100.0) as u8
    } else {
        100
    };

    Stats {
        wpm,
        raw,
        accuracy,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_minute_perfect_run() {
        let stats = compute_stats(25, 25, 0, 60_000);
        assert_eq!(
            stats,
            Stats {
                wpm: 5,
                raw: 5,
                accuracy: 100,
                errors: 0
            }
        );
    }

    #[test]
    fn test_half_minute_with_errors() {
        let stats = compute_stats(20, 25, 5, 30_000);
        assert_eq!(stats.wpm, 8);
        assert_eq!(stats.raw, 10);
        assert_eq!(stats.accuracy, 80);
        assert_eq!(stats.errors, 5);
    }

    #[test]
    fn test_nothing_typed_is_fully_accurate() {
        let stats = compute_stats(0, 0, 0, 0);
        assert_eq!(stats, Stats::default());
    }

    #[test]
    fn test_zero_elapsed_is_floored_to_one_ms() {
        // 1 correct char in 1ms -> 0.2 words / (1/60000) minutes
        let stats = compute_stats(1, 1, 0, 0);
        assert_eq!(stats.wpm, 12_000);
        assert_eq!(stats.raw, 12_000);
    }

    #[test]
    fn test_all_errors_is_zero_accuracy() {
        let stats = compute_stats(0, 10, 10, 60_000);
        assert_eq!(stats.accuracy, 0);
        assert_eq!(stats.wpm, 0);
        assert_eq!(stats.raw, 2);
    }

    #[test]
    fn test_accuracy_rounds_half_up() {
        // 1/8 = 12.5%
        assert_eq!(compute_stats(1, 8, 7, 60_000).accuracy, 13);
        // 2/3 = 66.67%
        assert_eq!(compute_stats(2, 3, 1, 60_000).accuracy, 67);
    }

    #[test]
    fn test_accuracy_always_in_range() {
        for total in 0..50usize {
            for correct in 0..=total {
                let acc = compute_stats(correct, total, total - correct, 1_000).accuracy;
                assert!(acc <= 100);
            }
        }
    }
}
