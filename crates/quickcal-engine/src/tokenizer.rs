//! Whitespace tokenization of raw input.

/// Split input on runs of whitespace. Case is preserved; stages lower-case
/// the tokens they inspect. Blank input yields an empty vector.
pub fn tokenize(input: &str) -> Vec<String> {
    input.split_whitespace().map(str::to_string).collect()
}

/// Rejoin tokens with single spaces, the form the time-of-day resolver sees.
pub(crate) fn join(tokens: &[String]) -> String {
    tokens.join(" ")
}
