//! Key filtering for selective listing.
//!
//! - **Pure Matcher**: [`KeyRegexFilter`] only answers "does this key match?"
//!   without include/exclude semantics.
//! - **Filter Chain**: [`FilterChain`] combines matchers:
//!   - Exclude filters: AND logic (must pass ALL excludes)
//!   - Include filters: OR logic (pass ANY include, empty = match all)

use regex::Regex;
use thiserror::Error;

/// Trait for filtering configuration keys.
pub trait KeyFilter: Send + Sync {
    /// Returns `true` if the key matches.
    fn matches(&self, key: &str) -> bool;
}

/// Error building a filter from user-supplied patterns.
#[derive(Debug, Error)]
#[error("Invalid regex pattern '{pattern}': {source}")]
pub struct FilterError {
    /// The invalid pattern
    pub pattern: String,
    /// Underlying regex error
    #[source]
    pub source: regex::Error,
}

// ============================================================================
// FilterChain - Include OR / Exclude AND semantics
// ============================================================================

/// Filter chain with include/exclude semantics.
///
/// # Examples
///
/// ```
/// use livecfg::filter::{FilterChain, KeyFilter, KeyRegexFilter};
///
/// let chain = FilterChain::new()
///     .include(KeyRegexFilter::new(r"^Item").unwrap())
///     .exclude(KeyRegexFilter::new(r"Debug").unwrap());
///
/// assert!(chain.matches("Item Colors[Set]"));
/// assert!(!chain.matches("Item Debug"));
/// assert!(!chain.matches("Verbose"));
/// ```
#[derive(Default)]
pub struct FilterChain {
    includes: Vec<Box<dyn KeyFilter>>,
    excludes: Vec<Box<dyn KeyFilter>>,
}

impl FilterChain {
    /// Creates an empty filter chain (matches all keys).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a chain of regex filters from include and exclude patterns.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] for the first pattern that is not a valid regex.
    pub fn from_patterns<S: AsRef<str>>(includes: &[S], excludes: &[S]) -> Result<Self, FilterError> {
        let mut chain = Self::new();
        for pattern in includes {
            chain = chain.include(KeyRegexFilter::checked(pattern.as_ref())?);
        }
        for pattern in excludes {
            chain = chain.exclude(KeyRegexFilter::checked(pattern.as_ref())?);
        }
        Ok(chain)
    }

    /// Adds an include filter (OR semantics).
    #[must_use]
    pub fn include<F: KeyFilter + 'static>(mut self, filter: F) -> Self {
        self.includes.push(Box::new(filter));
        self
    }

    /// Adds an exclude filter (any match rejects).
    #[must_use]
    pub fn exclude<F: KeyFilter + 'static>(mut self, filter: F) -> Self {
        self.excludes.push(Box::new(filter));
        self
    }

    /// Returns true if no filters are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }
}

impl KeyFilter for FilterChain {
    fn matches(&self, key: &str) -> bool {
        if self.excludes.iter().any(|f| f.matches(key)) {
            return false;
        }

        self.includes.is_empty() || self.includes.iter().any(|f| f.matches(key))
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("include_count", &self.includes.len())
            .field("exclude_count", &self.excludes.len())
            .finish()
    }
}

// ============================================================================
// KeyRegexFilter - Pure matcher by key pattern
// ============================================================================

/// Matches keys against a regex (the full key, bracket suffix included).
#[derive(Debug)]
pub struct KeyRegexFilter {
    pattern: Regex,
}

impl KeyRegexFilter {
    /// Creates a key filter with the given regex pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the regex pattern is invalid.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    fn checked(pattern: &str) -> Result<Self, FilterError> {
        Self::new(pattern).map_err(|source| FilterError {
            pattern: pattern.to_owned(),
            source,
        })
    }
}

impl KeyFilter for KeyRegexFilter {
    fn matches(&self, key: &str) -> bool {
        self.pattern.is_match(key)
    }
}
