//! Sheet-name sanitization and collision resolution
//!
//! Output sheet names must be non-empty, at most 31 characters, free of the
//! characters `: \ / ? * [ ]`, and unique case-insensitively within one run.
//! [`NameResolver`] derives such names from raw proposals, streaming
//! left-to-right with no backtracking: earlier names never change because a
//! later proposal collides.

use std::collections::HashSet;
use tracing::warn;

/// Maximum sheet name length accepted by workbook containers
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Characters that may not appear in a sheet name
pub const ILLEGAL_CHARS: [char; 7] = [':', '\\', '/', '?', '*', '[', ']'];

/// Fallback name when sanitization leaves nothing
const FALLBACK_NAME: &str = "Sheet";

/// Replace illegal characters with spaces, collapse whitespace runs, and trim.
///
/// An input that sanitizes to the empty string becomes `"Sheet"`.
/// Sanitizing an already-clean name returns it unchanged.
pub fn sanitize_sheet_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if ILLEGAL_CHARS.contains(&c) { ' ' } else { c })
        .collect();

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        collapsed
    }
}

/// Truncate a string to at most `max_len` characters (not bytes)
fn truncate_chars(s: &str, max_len: usize) -> String {
    s.chars().take(max_len).collect()
}

/// Resolves raw sheet-name proposals into unique, valid, length-bounded names.
///
/// The used-name set lives inside the resolver value, so one resolver
/// corresponds to one run and resolution is re-runnable within a process.
#[derive(Debug)]
pub struct NameResolver {
    max_len: usize,
    used: HashSet<String>,
}

impl Default for NameResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl NameResolver {
    /// Create a resolver with the standard 31-character limit
    pub fn new() -> Self {
        Self::with_max_len(MAX_SHEET_NAME_LEN)
    }

    /// Create a resolver with a custom length limit (tests use short limits)
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            max_len,
            used: HashSet::new(),
        }
    }

    /// Resolve one raw proposal against everything resolved so far.
    ///
    /// Sanitize, truncate, then disambiguate: if the lowercased candidate is
    /// taken, append `_1`, `_2`, ... to the truncated base. When `base + suffix`
    /// would exceed the limit, the base is cut (never the suffix) so the
    /// result still fits. Each retry increments the index, so termination is
    /// bounded by the length of the collision chain.
    pub fn resolve(&mut self, raw: &str) -> String {
        let base = truncate_chars(&sanitize_sheet_name(raw), self.max_len);

        let mut candidate = base.clone();
        let mut idx: usize = 1;

        while self.used.contains(&candidate.to_lowercase()) {
            let suffix = format!("_{}", idx);
            candidate = if base.chars().count() + suffix.len() > self.max_len {
                let keep = self.max_len.saturating_sub(suffix.len());
                format!("{}{}", truncate_chars(&base, keep), suffix)
            } else {
                format!("{}{}", base, suffix)
            };
            idx += 1;
        }

        self.used.insert(candidate.to_lowercase());

        if candidate != base {
            warn!("sheet name adjusted: '{}' -> '{}'", raw, candidate);
        }

        candidate
    }

    /// Resolve a whole ordered sequence, preserving order and length
    pub fn resolve_all<I, S>(&mut self, raws: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raws.into_iter().map(|r| self.resolve(r.as_ref())).collect()
    }
}

/// Resolve an ordered sequence of raw names with a fresh resolver
pub fn resolve_names<I, S>(raws: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    NameResolver::new().resolve_all(raws)
}
