//! Process-wide cache of compiled patterns.
//!
//! Patterns are compiled once per pattern string and matched against the
//! whole input, never a substring.

use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

static PATTERNS: OnceLock<RwLock<HashMap<String, Arc<Regex>>>> = OnceLock::new();

fn patterns() -> &'static RwLock<HashMap<String, Arc<Regex>>> {
    PATTERNS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Compiled full-match form of `pattern`, from the cache when possible.
///
/// Invalid patterns are not cached.
pub fn compiled(pattern: &str) -> Result<Arc<Regex>, regex::Error> {
    {
        let cache = patterns().read().unwrap_or_else(PoisonError::into_inner);
        if let Some(regex) = cache.get(pattern) {
            return Ok(Arc::clone(regex));
        }
    }

    let regex = Regex::new(&format!("^(?:{pattern})$"))?;
    tracing::trace!(pattern, "compiled pattern");

    let mut cache = patterns().write().unwrap_or_else(PoisonError::into_inner);
    let regex = cache
        .entry(pattern.to_string())
        .or_insert_with(|| Arc::new(regex));
    Ok(Arc::clone(regex))
}

/// `true` if the whole of `text` matches `pattern`.
pub fn full_match(pattern: &str, text: &str) -> Result<bool, regex::Error> {
    Ok(compiled(pattern)?.is_match(text))
}

/// `true` if `pattern` has been compiled and cached.
pub fn is_cached(pattern: &str) -> bool {
    patterns()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains_key(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_match_rejects_substrings() {
        assert!(full_match("[A-Z]+", "ABC").unwrap());
        assert!(!full_match("[A-Z]+", "xABCx").unwrap());
        assert!(!full_match("[A-Z]+", "ABC\n").unwrap());
    }

    #[test]
    fn alternation_must_cover_the_whole_input() {
        assert!(full_match("a|ab", "ab").unwrap());
        assert!(!full_match("a|ab", "abc").unwrap());
    }

    #[test]
    fn compiled_patterns_are_reused() {
        let first = compiled("^cache-[0-9]{3}$").unwrap();
        let second = compiled("^cache-[0-9]{3}$").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(is_cached("^cache-[0-9]{3}$"));
    }

    #[test]
    fn invalid_patterns_are_errors_and_not_cached() {
        assert!(compiled("(unclosed").is_err());
        assert!(!is_cached("(unclosed"));
    }

    #[test]
    fn concurrent_compilation_yields_one_entry() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| compiled("concurrent-[a-z]+").unwrap()))
            .collect();
        let compiled: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(compiled.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
