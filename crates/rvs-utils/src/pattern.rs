//! Shell-style pattern matching for explicit exclude patterns.
//!
//! Supports `*` (any run of characters), `?` (any single character), and
//! literal text. Patterns without a slash also match against the basename,
//! so `*.tmp` excludes `dir/scratch.tmp`.

/// Match a path against an explicit pattern.
pub fn matches_pattern(pattern: &str, path: &str) -> bool {
    if wildmatch(pattern.as_bytes(), path.as_bytes()) {
        return true;
    }
    if !pattern.contains('/') {
        if let Some(basename) = path.rsplit('/').next() {
            return wildmatch(pattern.as_bytes(), basename.as_bytes());
        }
    }
    false
}

/// Match a path against any of several patterns.
pub fn matches_any(patterns: &[String], path: &str) -> bool {
    patterns.iter().any(|p| matches_pattern(p, path))
}

fn wildmatch(pattern: &[u8], text: &[u8]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some((b'*', rest)) => {
            // Try every split point, shortest first.
            (0..=text.len()).any(|i| wildmatch(rest, &text[i..]))
        }
        Some((b'?', rest)) => match text.split_first() {
            Some((_, text_rest)) => wildmatch(rest, text_rest),
            None => false,
        },
        Some((&ch, rest)) => match text.split_first() {
            Some((&t, text_rest)) if t == ch => wildmatch(rest, text_rest),
            _ => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_match() {
        assert!(matches_pattern("a.txt", "a.txt"));
        assert!(!matches_pattern("a.txt", "b.txt"));
    }

    #[test]
    fn star_spans_characters() {
        assert!(matches_pattern("*.pyc", "module.pyc"));
        assert!(matches_pattern("build*", "build-output"));
        assert!(!matches_pattern("*.pyc", "module.py"));
    }

    #[test]
    fn question_matches_one() {
        assert!(matches_pattern("a?c", "abc"));
        assert!(!matches_pattern("a?c", "abbc"));
    }

    #[test]
    fn slashless_pattern_matches_basename() {
        assert!(matches_pattern("*.tmp", "deep/dir/scratch.tmp"));
        assert!(matches_pattern("scratch.tmp", "deep/dir/scratch.tmp"));
        assert!(!matches_pattern("*.tmp", "deep/dir/scratch.txt"));
    }

    #[test]
    fn slashed_pattern_matches_whole_path() {
        assert!(matches_pattern("dir/*.txt", "dir/a.txt"));
        assert!(!matches_pattern("dir/*.txt", "other/a.txt"));
    }

    #[test]
    fn matches_any_over_list() {
        let patterns = vec!["*.pyc".to_string(), "target".to_string()];
        assert!(matches_any(&patterns, "x.pyc"));
        assert!(matches_any(&patterns, "target"));
        assert!(!matches_any(&patterns, "src/lib.rs"));
    }
}
