//! Candidate token extraction and whole-word matching.
//!
//! Only the first entry of `experience`, `education` and `skills` is sampled.
//! Scanning every entry would change how hard the 1-2 mention cap is to hit.

use regex::RegexSet;

use super::parser::ProfileRecord;

/// Build the candidate token list for a profile.
///
/// Takes the first entry of `experience`, `education` and `skills` (in that
/// order) and splits each on whitespace. Duplicates are kept.
///
/// # Examples
///
/// ```ignore
/// // experience: ["Senior Backend Developer"], skills: ["Rust"]
/// let tokens = candidate_tokens(&profile);
/// // Returns: ["Senior", "Backend", "Developer", "Rust"]
/// ```
pub fn candidate_tokens(profile: &ProfileRecord) -> Vec<String> {
    [&profile.experience, &profile.education, &profile.skills]
        .into_iter()
        .filter_map(|field| field.first())
        .flat_map(|entry| entry.split_whitespace())
        .map(String::from)
        .collect()
}

fn token_pattern(token: &str) -> String {
    format!(
        r"(?i)\b{{start-half}}{}\b{{end-half}}",
        regex::escape(token)
    )
}

/// Check whether `token` occurs in `content` as a whole word, ignoring case.
///
/// The token is matched literally. The character before it and the character
/// after it must not be word characters, so `Developer` does not match
/// `Developers` while `C++` matches `C++ and Rust`.
pub fn mentions_token(content: &str, token: &str) -> bool {
    !matching_tokens(content, &[token.to_string()]).is_empty()
}

/// Tokens from `candidates` that `content` mentions, in candidate order.
///
/// All candidates are compiled into one `RegexSet` and matched in a single
/// pass over `content`.
pub fn matching_tokens(content: &str, candidates: &[String]) -> Vec<String> {
    let usable: Vec<&String> = candidates.iter().filter(|t| !t.is_empty()).collect();
    if usable.is_empty() {
        return Vec::new();
    }

    let set = match RegexSet::new(usable.iter().map(|token| token_pattern(token))) {
        Ok(set) => set,
        Err(e) => {
            // Only reachable when the compiled set exceeds the regex size limit
            tracing::warn!(tokens = usable.len(), error = %e, "Token patterns rejected");
            return Vec::new();
        }
    };

    let matched = set.matches(content);
    usable
        .into_iter()
        .enumerate()
        .filter(|(index, _)| matched.matched(*index))
        .map(|(_, token)| token.clone())
        .collect()
}
