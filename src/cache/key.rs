//! Key normalization
//!
//! Turns human keys into canonical storage keys: ASCII alphanumerics and
//! single dashes, optionally namespaced by a prefix.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9\-]").unwrap());
static DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());

/// Joins the fragments with `-` and reduces the result to `[A-Za-z0-9-]`.
///
/// Whitespace runs become a single dash before other characters are
/// stripped, then repeated dashes collapse.
pub fn slugify<S: AsRef<str>>(fragments: &[S]) -> String {
    let joined = fragments
        .iter()
        .map(|f| f.as_ref())
        .collect::<Vec<&str>>()
        .join("-");
    let dashed = WHITESPACE.replace_all(&joined, "-");
    let stripped = DISALLOWED.replace_all(&dashed, "");
    DASHES.replace_all(&stripped, "-").into_owned()
}

/// Builds the storage key `<prefix>:<key>`, or just `<key>` when the
/// prefix normalizes to nothing.
pub fn cache_key<S: AsRef<str>>(prefix: &str, fragments: &[S]) -> String {
    let prefix = slugify(&[prefix]);
    let key = slugify(fragments);
    if prefix.is_empty() {
        key
    } else {
        format!("{prefix}:{key}")
    }
}
