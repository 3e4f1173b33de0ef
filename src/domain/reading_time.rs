//! Word-count based reading time estimation.
//!
//! The estimate tokenizes each block body on runs of whitespace, commas and
//! slashes, sums the token counts, and divides by a fixed reading speed,
//! rounding up. Empty content estimates to zero minutes; no floor is applied
//! for very short text.

use crate::domain::posts::ContentBlock;

pub const WORDS_PER_MINUTE: u32 = 200;

/// Estimate reading time in whole minutes for an ordered block sequence.
/// Pure: identical input always yields identical output.
pub fn estimate(content: &[ContentBlock]) -> u32 {
    let total: u32 = content
        .iter()
        .map(|block| count_words(&block.body.as_text()))
        .sum();
    total.div_ceil(WORDS_PER_MINUTE)
}

fn count_words(text: &str) -> u32 {
    let tokens = text
        .split(is_word_boundary)
        .filter(|token| !token.is_empty())
        .count();
    u32::try_from(tokens).unwrap_or(u32::MAX)
}

fn is_word_boundary(ch: char) -> bool {
    ch.is_whitespace() || ch == ',' || ch == '/'
}
