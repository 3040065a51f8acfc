//! Rough token estimation

/// Estimate the token count of `text` at roughly four characters per token.
pub fn estimate_tokens(text: &str) -> usize {
    let chars = text.chars().count();
    chars.div_ceil(4)
}
