//! Profile records and detail sampling.
//!
//! Profiles arrive as JSON or YAML from a profile source. This module parses
//! them into [`ProfileRecord`] and derives the candidate tokens the details
//! criterion looks for.

mod parser;
mod tokens;

pub(crate) use parser::{is_json_path, json_kind};
pub use parser::{profile_id_from_url, ProfileError, ProfileRecord};
pub use tokens::{candidate_tokens, matching_tokens, mentions_token};
