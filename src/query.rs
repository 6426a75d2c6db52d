//! Query sanitizing and the minimum length policy applied by front ends

use crate::error::{PopebooksError, Result};

/// Trim leading and trailing whitespace from a raw query
pub fn sanitize(raw: &str) -> String {
    raw.trim().to_string()
}

pub fn is_blank(query: &str) -> bool {
    query.trim().is_empty()
}

/// Minimum query length gate. The search engine never applies it; callers
/// that want to reject short queries check them here first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryPolicy {
    /// Counted in chars after trimming. Zero disables the check.
    pub min_query_length: usize,
}

impl QueryPolicy {
    pub fn new(min_query_length: usize) -> Self {
        Self { min_query_length }
    }

    /// Sanitize `raw` and reject it if it is shorter than the policy allows.
    /// Blank queries pass through as empty strings.
    pub fn check(&self, raw: &str) -> Result<String> {
        let clean = sanitize(raw);
        let len = clean.chars().count();
        if len > 0 && len < self.min_query_length {
            return Err(PopebooksError::InvalidQuery(format!(
                "Query must be at least {} characters",
                self.min_query_length
            )));
        }
        Ok(clean)
    }
}
